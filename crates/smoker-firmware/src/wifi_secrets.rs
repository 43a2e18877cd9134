//! Build-time network settings, exported from `.env` by `build.rs`.

pub const WIFI_SSID: &str = match option_env!("WIFI_SSID") {
    Some(ssid) => ssid,
    None => "smoker",
};

pub const WIFI_PASSWORD: &str = match option_env!("WIFI_PASSWORD") {
    Some(password) => password,
    None => "",
};

/// Host queried once at boot for the wall-clock time.
pub const NTP_SERVER: &str = match option_env!("NTP_SERVER") {
    Some(host) => host,
    None => "pool.ntp.org",
};
