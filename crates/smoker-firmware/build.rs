//! Exports the Wi-Fi credentials and time server from `.env` as compile-time
//! environment variables, and passes the linker script to the ESP toolchain.

const EXPORTED: [&str; 3] = ["WIFI_SSID", "WIFI_PASSWORD", "NTP_SERVER"];

fn main() {
    println!("cargo:rustc-link-arg=-Tlinkall.x");

    // `.env` may live next to this crate or at the workspace root
    match dotenvy::dotenv() {
        Ok(path) => println!("cargo:rerun-if-changed={}", path.display()),
        Err(e) if e.not_found() => {
            println!("cargo:warning=no .env file found; using built-in Wi-Fi defaults")
        }
        Err(e) => panic!("failed to read .env: {e}"),
    }

    for key in EXPORTED {
        println!("cargo:rerun-if-env-changed={key}");
        if let Ok(value) = std::env::var(key) {
            println!("cargo:rustc-env={key}={value}");
        }
    }
}
