//! UTC calendar conversion for epoch seconds.
//!
//! Uses the days-to-civil algorithm so no date crate is needed on the device.

use core::fmt;

const SECS_PER_DAY: u32 = 86_400;
const DAYS_PER_ERA: u32 = 146_097;
/// Days from 0000-03-01 to 1970-01-01.
const EPOCH_SHIFT_DAYS: u32 = 719_468;

/// Broken-down UTC date and time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilTime {
    pub year: u32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

/// Epoch seconds, displayed as `HH:MM:SS - D.M.YYYY` (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochTime(pub u32);

impl EpochTime {
    pub fn to_civil(self) -> CivilTime {
        let days = self.0 / SECS_PER_DAY;
        let secs_of_day = self.0 % SECS_PER_DAY;

        let z = days + EPOCH_SHIFT_DAYS;
        let era = z / DAYS_PER_ERA;
        let doe = z - era * DAYS_PER_ERA;
        let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let day = doy - (153 * mp + 2) / 5 + 1;
        let month = if mp < 10 { mp + 3 } else { mp - 9 };
        let year = yoe + era * 400 + u32::from(month <= 2);

        CivilTime {
            year,
            month: month as u8,
            day: day as u8,
            hour: (secs_of_day / 3600) as u8,
            minute: (secs_of_day / 60 % 60) as u8,
            second: (secs_of_day % 60) as u8,
        }
    }
}

impl fmt::Display for EpochTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.to_civil();
        write!(
            f,
            "{:02}:{:02}:{:02} - {}.{}.{}",
            t.hour, t.minute, t.second, t.day, t.month, t.year
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_zero() {
        assert_eq!(format!("{}", EpochTime(0)), "00:00:00 - 1.1.1970");
    }

    #[test]
    fn test_known_timestamp() {
        assert_eq!(
            format!("{}", EpochTime(1_432_232_648)),
            "18:24:08 - 21.5.2015"
        );
    }

    #[test]
    fn test_leap_day() {
        let t = EpochTime(951_782_400).to_civil();
        assert_eq!((t.year, t.month, t.day), (2000, 2, 29));
    }

    #[test]
    fn test_end_of_year() {
        assert_eq!(
            format!("{}", EpochTime(1_735_689_599)),
            "23:59:59 - 31.12.2024"
        );
    }

    #[test]
    fn test_largest_representable_second() {
        assert_eq!(
            format!("{}", EpochTime(u32::MAX)),
            "06:28:15 - 7.2.2106"
        );
    }
}
