//! Wialon IPS codec: CRLF-terminated ASCII messages.
//!
//! - Login: `#L#<imei>;NA`
//! - Short data: `#SD#date;time;lat1;lat2;lon1;lon2;speed;course;height;sats`

use std::io::{Read, Write};

use tracing::{error, info};

use super::error::{ProtocolError, Result};
use super::io::exchange;
use super::{NavProtocol, ProtocolKind};
use crate::navigation::NavigationPacket;

/// Successful login answer.
pub(crate) const LOGIN_OK: &[u8] = b"#AL#1\r\n";
/// Short data packet accepted.
pub(crate) const SHORT_DATA_OK: &[u8] = b"#ASD#1\r\n";

const NOT_AVAILABLE: &str = "NA";

/// Wialon IPS session.
#[derive(Debug, Default)]
pub struct Wialon {
    authenticated: bool,
}

impl Wialon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

fn login_message(packet: &NavigationPacket) -> Vec<u8> {
    format!("#L#{};{NOT_AVAILABLE}\r\n", packet.device_id).into_bytes()
}

/// Short data message. Coordinates are written as degrees x 100.
fn short_data_message(packet: &NavigationPacket) -> Vec<u8> {
    let time = packet.timestamp;
    let lat = format!("{:09.4}", (packet.latitude * 100.0).abs());
    let lat_hemisphere = if packet.latitude < 0.0 { "S" } else { "N" };
    let lon = format!("{:010.4}", (packet.longitude * 100.0).abs());
    let lon_hemisphere = if packet.longitude < 0.0 { "W" } else { "E" };

    // speed, course, height, sats
    let fields = [
        time.format("%d%m%y").to_string(),
        time.format("%H%M%S").to_string(),
        lat,
        lat_hemisphere.to_string(),
        lon,
        lon_hemisphere.to_string(),
        NOT_AVAILABLE.to_string(),
        NOT_AVAILABLE.to_string(),
        NOT_AVAILABLE.to_string(),
        NOT_AVAILABLE.to_string(),
    ];

    format!("#SD#{}\r\n", fields.join(";")).into_bytes()
}

fn expect_reply(reply: &[u8], expected: &[u8]) -> Result<()> {
    if reply != expected {
        error!(
            "Wialon wrong response: expected {:?}, got {:?}",
            String::from_utf8_lossy(expected),
            String::from_utf8_lossy(reply)
        );
        return Err(ProtocolError::wrong_response(ProtocolKind::Wialon, reply));
    }
    Ok(())
}

impl NavProtocol for Wialon {
    fn send<T: Read + Write>(&mut self, packet: &NavigationPacket, transport: &mut T) -> Result<Vec<Vec<u8>>> {
        let mut frames = Vec::with_capacity(2);

        if !self.authenticated {
            let login = login_message(packet);
            let reply = exchange(transport, ProtocolKind::Wialon, &login)?;
            frames.push(login);
            expect_reply(&reply, LOGIN_OK)?;
            self.authenticated = true;
            info!("Wialon login accepted for {}", packet.device_id);
        }

        let data = short_data_message(packet);
        let reply = exchange(transport, ProtocolKind::Wialon, &data)?;
        frames.push(data);
        expect_reply(&reply, SHORT_DATA_OK)?;

        Ok(frames)
    }
}
