//! SNTP packet helpers for the boot-time epoch query.
//!
//! Only the client request and the transmit timestamp of the reply are
//! handled; the transport sends and receives the 48-byte datagrams.

/// SNTP server port.
pub const NTP_PORT: u16 = 123;

/// Size of an SNTP packet without extensions.
pub const NTP_PACKET_SIZE: usize = 48;

/// Seconds between 1900-01-01 (NTP era 0) and 1970-01-01.
pub const NTP_UNIX_OFFSET: u32 = 2_208_988_800;

const LI_VN_MODE_CLIENT: u8 = 0b00_011_011; // LI=0, VN=3, mode=3
const MODE_SERVER: u8 = 4;
const MODE_BROADCAST: u8 = 5;
const TRANSMIT_TS_OFFSET: usize = 40;

/// Build a client request datagram.
pub const fn request_packet() -> [u8; NTP_PACKET_SIZE] {
    let mut packet = [0u8; NTP_PACKET_SIZE];
    packet[0] = LI_VN_MODE_CLIENT;
    packet
}

/// Extract epoch seconds from a server reply.
///
/// Returns `None` for short packets, non-server modes, kiss-o'-death
/// replies (stratum 0) and an unset transmit timestamp.
pub fn parse_reply(packet: &[u8]) -> Option<u32> {
    if packet.len() < NTP_PACKET_SIZE {
        return None;
    }

    let mode = packet[0] & 0b111;
    if mode != MODE_SERVER && mode != MODE_BROADCAST {
        return None;
    }
    if packet[1] == 0 {
        return None;
    }

    let mut secs = [0u8; 4];
    secs.copy_from_slice(&packet[TRANSMIT_TS_OFFSET..TRANSMIT_TS_OFFSET + 4]);
    let ntp_secs = u32::from_be_bytes(secs);
    if ntp_secs == 0 {
        return None;
    }

    Some(ntp_secs.wrapping_sub(NTP_UNIX_OFFSET))
}
