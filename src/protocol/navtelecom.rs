//! Navtelecom (FLEX) codec.
//!
//! Every body is preceded by a 16-byte `@NTC` header carrying the body length,
//! an XOR checksum of the body and an XOR checksum of the header itself.
//! The session starts with an `*>S:` identification message followed by
//! `*>T` telemetry messages.

use std::io::{Read, Write};

use chrono::{DateTime, Datelike, Timelike, Utc};
use tracing::{error, info};

use super::checksum::xor;
use super::error::{ProtocolError, Result};
use super::io::exchange;
use super::{NavProtocol, ProtocolKind};
use crate::navigation::NavigationPacket;

const SIGNATURE: &[u8; 4] = b"@NTC";
const RECEIVER_ID: u32 = 1;
const SENDER_ID: u32 = 0;
const HEADER_LEN: usize = 16;

const AUTH_TAG: &[u8; 4] = b"*>S:";
const AUTH_BODY_LEN: usize = 19;
const IMEI_LEN: usize = 15;

const DATA_TAG: &[u8; 3] = b"*>T";
const DATA_BODY_LEN: usize = 75;
const DATA_MESSAGE_TYPE: u16 = 0x02;
const TIME_BLOCK_OFFSETS: [usize; 2] = [11, 43];
const LATITUDE_OFFSET: usize = 49;
const LONGITUDE_OFFSET: usize = 53;

/// Server reply to the identification message.
pub(crate) const AUTH_OK: [u8; 19] = [
    0x40, 0x4E, 0x54, 0x43, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x03, 0x00, 0x45, 0x5E, 0x2A, 0x3C, 0x53,
];

/// Server reply to a telemetry message.
pub(crate) const DATA_OK: [u8; 23] = [
    0x40, 0x4E, 0x54, 0x43, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x07, 0x00, 0x42, 0x5D, 0x2A, 0x3C, 0x54,
    0x00, 0x00, 0x00, 0x00,
];

/// Navtelecom session.
#[derive(Debug, Default)]
pub struct Navtelecom {
    authenticated: bool,
    record_number: u32,
}

impl Navtelecom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn record_number(&self) -> u32 {
        self.record_number
    }

    /// Identification body: tag followed by the 15-digit IMEI.
    fn auth_body(packet: &NavigationPacket) -> Vec<u8> {
        let imei = format!("{:015}", packet.device_id);
        let mut body = Vec::with_capacity(AUTH_BODY_LEN);
        body.extend_from_slice(AUTH_TAG);
        body.extend_from_slice(&imei.as_bytes()[..IMEI_LEN]);
        body
    }

    /// Telemetry body.
    ///
    /// Increments the record number after building the body.
    fn data_body(&mut self, packet: &NavigationPacket) -> Vec<u8> {
        let mut body = vec![0u8; DATA_BODY_LEN];
        body[0..3].copy_from_slice(DATA_TAG);
        body[3..5].copy_from_slice(&DATA_MESSAGE_TYPE.to_le_bytes());
        body[5..9].copy_from_slice(&self.record_number.to_be_bytes());

        let time = time_block(&packet.timestamp);
        for offset in TIME_BLOCK_OFFSETS {
            body[offset..offset + time.len()].copy_from_slice(&time);
        }

        body[LATITUDE_OFFSET..LATITUDE_OFFSET + 4].copy_from_slice(&(packet.latitude as f32).to_be_bytes());
        body[LONGITUDE_OFFSET..LONGITUDE_OFFSET + 4].copy_from_slice(&(packet.longitude as f32).to_be_bytes());

        self.record_number = self.record_number.wrapping_add(1);

        body
    }
}

/// Prefix a body with its header.
fn frame(body: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_LEN + body.len());
    frame.extend_from_slice(SIGNATURE);
    frame.extend_from_slice(&RECEIVER_ID.to_le_bytes());
    frame.extend_from_slice(&SENDER_ID.to_le_bytes());
    frame.extend_from_slice(&(body.len() as u16).to_le_bytes());
    frame.push(xor(body));
    let header_cs = xor(&frame);
    frame.push(header_cs);
    frame.extend_from_slice(body);
    frame
}

/// Hour, minute, second, day, month, year - 2000 (UTC).
fn time_block(timestamp: &DateTime<Utc>) -> [u8; 6] {
    [
        timestamp.hour() as u8,
        timestamp.minute() as u8,
        timestamp.second() as u8,
        timestamp.day() as u8,
        timestamp.month() as u8,
        (timestamp.year() - 2000) as u8,
    ]
}

fn check_response(reply: &[u8]) -> Result<()> {
    if reply != AUTH_OK && reply != DATA_OK {
        error!("Navtelecom wrong response: {reply:02X?}");
        return Err(ProtocolError::wrong_response(ProtocolKind::Navtelecom, reply));
    }
    Ok(())
}

impl NavProtocol for Navtelecom {
    fn send<T: Read + Write>(&mut self, packet: &NavigationPacket, transport: &mut T) -> Result<Vec<Vec<u8>>> {
        let mut frames = Vec::with_capacity(2);

        if !self.authenticated {
            let auth = frame(&Self::auth_body(packet));
            // Marked before the reply is checked: a rejected handshake is not retried.
            self.authenticated = true;

            let reply = exchange(transport, ProtocolKind::Navtelecom, &auth)?;
            frames.push(auth);
            check_response(&reply)?;
            info!("Navtelecom identification accepted");
        }

        let data = frame(&self.data_body(packet));
        let reply = exchange(transport, ProtocolKind::Navtelecom, &data)?;
        frames.push(data);
        check_response(&reply)?;

        Ok(frames)
    }
}
