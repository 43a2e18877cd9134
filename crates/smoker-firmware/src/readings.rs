//! Latest regulator readings shared between the control code and the logger.

use core::cell::Cell;

use critical_section::Mutex;
use smoker_core::Readings;

static CURRENT: Mutex<Cell<Readings>> = Mutex::new(Cell::new(Readings::new(0.0, 0.0)));

/// Replace the published readings
///
/// This is the hook for the regulator control code, which lives outside this
/// crate and calls it after each sample. Until it does, pages and the log
/// show `0.00` for both values.
pub fn publish(readings: Readings) {
    critical_section::with(|cs| CURRENT.borrow(cs).set(readings));
}

pub fn current() -> Readings {
    critical_section::with(|cs| CURRENT.borrow(cs).get())
}
