//! One-shot SNTP query for the boot-time wall clock.

use embassy_net::dns::DnsQueryType;
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpEndpoint, Stack};
use embassy_time::{Duration, with_timeout};
use log::{info, warn};
use smoker_core::clock::ntp::{self, NTP_PACKET_SIZE, NTP_PORT};
use thiserror_no_std::Error;

const QUERY_TIMEOUT: Duration = Duration::from_secs(5);
const LOCAL_PORT: u16 = 12_300;

#[derive(Error, Debug)]
pub enum SntpError {
    #[error("could not resolve time server: {0:?}")]
    Dns(embassy_net::dns::Error),
    #[error("time server has no IPv4 address")]
    NoAddress,
    #[error("udp bind failed: {0:?}")]
    Bind(embassy_net::udp::BindError),
    #[error("udp send failed: {0:?}")]
    Send(embassy_net::udp::SendError),
    #[error("udp receive failed: {0:?}")]
    Recv(embassy_net::udp::RecvError),
    #[error("time server did not answer")]
    Timeout,
    #[error("malformed time server reply")]
    BadReply,
}

/// Current Unix epoch seconds from `server`, or `None` when unreachable.
pub async fn query_epoch(stack: Stack<'static>, server: &str) -> Option<u32> {
    match with_timeout(QUERY_TIMEOUT, query(stack, server)).await {
        Ok(Ok(epoch)) => {
            info!("SNTP answer from {}: {}", server, epoch);
            Some(epoch)
        }
        Ok(Err(e)) => {
            warn!("SNTP query to {} failed: {}", server, e);
            None
        }
        Err(_) => {
            warn!("SNTP query to {} failed: {}", server, SntpError::Timeout);
            None
        }
    }
}

async fn query(stack: Stack<'static>, server: &str) -> Result<u32, SntpError> {
    let addresses = stack
        .dns_query(server, DnsQueryType::A)
        .await
        .map_err(SntpError::Dns)?;
    let address = addresses.first().copied().ok_or(SntpError::NoAddress)?;

    let mut rx_meta = [PacketMetadata::EMPTY; 1];
    let mut tx_meta = [PacketMetadata::EMPTY; 1];
    let mut rx_buf = [0u8; NTP_PACKET_SIZE];
    let mut tx_buf = [0u8; NTP_PACKET_SIZE];
    let mut socket = UdpSocket::new(stack, &mut rx_meta, &mut rx_buf, &mut tx_meta, &mut tx_buf);
    socket.bind(LOCAL_PORT).map_err(SntpError::Bind)?;

    socket
        .send_to(&ntp::request_packet(), IpEndpoint::new(address, NTP_PORT))
        .await
        .map_err(SntpError::Send)?;

    let mut reply = [0u8; NTP_PACKET_SIZE];
    let (len, _) = socket.recv_from(&mut reply).await.map_err(SntpError::Recv)?;
    ntp::parse_reply(&reply[..len]).ok_or(SntpError::BadReply)
}
