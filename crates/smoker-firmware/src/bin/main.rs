#![no_std]
#![no_main]
#![deny(
    clippy::mem_forget,
    reason = "mem::forget is generally not safe to do with esp_hal types, especially those \
    holding buffers for the duration of a data transfer."
)]
#![deny(clippy::large_stack_frames)]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use log::{error, info};
use smoker_core::DataLogger;
use smoker_core::config::LoggerConfig;
use smoker_firmware::wifi_secrets::NTP_SERVER;
use smoker_firmware::{net, server, sntp};

#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    rtt_target::rprintln!("PANIC: {}", info);
    loop {}
}

extern crate alloc;

// This creates a default app-descriptor required by the esp-idf bootloader.
// For more information see: <https://docs.espressif.com/projects/esp-idf/en/stable/esp32/api-reference/system/app_image_format.html#application-description>
esp_bootloader_esp_idf::esp_app_desc!();

#[allow(
    clippy::large_stack_frames,
    reason = "it's not unusual to allocate larger buffers etc. in main"
)]
#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    rtt_target::rtt_init_log!();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    esp_alloc::heap_allocator!(#[esp_hal::ram(reclaimed)] size: 73744);
    esp_alloc::heap_allocator!(size: 64 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    info!("Embassy initialized!");

    let stack = match net::spawn_wifi(&spawner, peripherals.WIFI) {
        Ok(stack) => stack,
        Err(e) => {
            error!("{}; halting", e);
            loop {
                Timer::after(Duration::from_secs(60)).await;
            }
        }
    };

    stack.wait_config_up().await;
    let epoch = sntp::query_epoch(stack, NTP_SERVER).await;

    // Sized from whatever the radio and network stack left free
    let logger = DataLogger::begin(
        LoggerConfig::default(),
        esp_alloc::HEAP.free(),
        epoch,
        server::now_ms(),
    );

    // The regulator feeds readings::publish; the server only reads them
    server::run(stack, logger).await
}
