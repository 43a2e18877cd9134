//! Wi-Fi station bring-up and the embassy-net stack

use core::sync::atomic::{AtomicU32, Ordering};

use alloc::string::String;
use embassy_executor::Spawner;
use embassy_net::{Config as NetConfig, Stack, StackResources};
use embassy_time::{Duration, Timer};
use esp_hal::peripherals::WIFI;
use esp_hal::rng::Rng;
use esp_radio::Controller as RadioController;
use esp_radio::wifi::{self, ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent};
use log::{info, warn};
use static_cell::StaticCell;
use thiserror_no_std::Error;

use crate::wifi_secrets::{WIFI_PASSWORD, WIFI_SSID};

/// DHCP client, DNS, UDP for SNTP and TCP for the web server.
const SOCKET_COUNT: usize = 4;

static RADIO_CONTROLLER: StaticCell<RadioController<'static>> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<SOCKET_COUNT>> = StaticCell::new();

/// Times the station obtained an IPv4 configuration since boot.
static LINK_UPS: AtomicU32 = AtomicU32::new(0);

#[derive(Error, Debug)]
pub enum NetError {
    #[error("radio init failed: {0:?}")]
    Radio(esp_radio::InitializationError),
    #[error("wifi driver init failed: {0:?}")]
    Wifi(wifi::WifiError),
}

pub fn link_ups() -> u32 {
    LINK_UPS.load(Ordering::Relaxed)
}

/// Start the radio, spawn the connection and stack tasks, and return the stack.
pub fn spawn_wifi(spawner: &Spawner, wifi_peripheral: WIFI<'static>) -> Result<Stack<'static>, NetError> {
    let radio = RADIO_CONTROLLER.init(esp_radio::init().map_err(NetError::Radio)?);
    let (controller, interfaces) =
        wifi::new(radio, wifi_peripheral, Default::default()).map_err(NetError::Wifi)?;

    let rng = Rng::new();
    let seed = (rng.random() as u64) << 32 | rng.random() as u64;

    let resources = NET_RESOURCES.init(StackResources::<SOCKET_COUNT>::new());
    let (stack, runner) = embassy_net::new(
        interfaces.sta,
        NetConfig::dhcpv4(Default::default()),
        resources,
        seed,
    );

    spawner
        .spawn(wifi_task(controller, stack))
        .expect("wifi_task spawn");
    spawner
        .spawn(net_task(runner))
        .expect("net_task runner spawn");

    Ok(stack)
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, WifiDevice<'static>>) {
    runner.run().await;
}

#[embassy_executor::task]
async fn wifi_task(mut controller: WifiController<'static>, stack: Stack<'static>) {
    info!("Wi-Fi task starting (ssid=\"{}\")", WIFI_SSID);

    loop {
        if !matches!(controller.is_started(), Ok(true)) {
            let client_config = ModeConfig::Client(
                ClientConfig::default()
                    .with_ssid(String::from(WIFI_SSID))
                    .with_password(String::from(WIFI_PASSWORD)),
            );
            if let Err(err) = controller.set_config(&client_config) {
                warn!("Wi-Fi set_config error: {:?}", err);
                Timer::after(Duration::from_secs(10)).await;
                continue;
            }
            if let Err(err) = controller.start_async().await {
                warn!("Wi-Fi start error: {:?}", err);
                Timer::after(Duration::from_secs(10)).await;
                continue;
            }
        }

        match controller.connect_async().await {
            Ok(()) => {
                stack.wait_config_up().await;
                if let Some(config) = stack.config_v4() {
                    info!("Wi-Fi link up: ip={}", config.address.address());
                }
                LINK_UPS.fetch_add(1, Ordering::Relaxed);

                controller.wait_for_event(WifiEvent::StaDisconnected).await;
                warn!("Wi-Fi disconnected; reconnecting");
                Timer::after(Duration::from_secs(5)).await;
            }
            Err(err) => {
                warn!("Wi-Fi connect error: {:?}", err);
                Timer::after(Duration::from_secs(10)).await;
            }
        }
    }
}
