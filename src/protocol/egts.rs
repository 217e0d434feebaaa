//! EGTS codec (application data packets carrying one position record).
//!
//! Packet layout:
//! - Transport header (11 bytes) ending with CRC-8 of the first 10 bytes
//! - Frame data: one service record with an EGTS_SR_POS_DATA subrecord
//! - CRC-16/CCITT-FALSE of the frame data (LE)
//!
//! There is no handshake; every packet must be answered with the fixed
//! acknowledgement below.

use std::io::{Read, Write};

use tracing::error;

use super::checksum::{crc8, crc16_ccitt_false};
use super::error::{ProtocolError, Result};
use super::io::exchange;
use super::{NavProtocol, ProtocolKind};
use crate::navigation::NavigationPacket;

const PROTOCOL_VERSION: u8 = 0x01;
const SECURITY_KEY_ID: u8 = 0x00;
const HEADER_FLAGS: u8 = 0x03;
const HEADER_LEN: usize = 11;
const HEADER_ENCODING: u8 = 0x00;
const PT_APPDATA: u8 = 0x01;

const RECORD_HEADER_LEN: usize = 11;
const RECORD_FLAGS_OBFE: u8 = 0x01;
const SERVICE_TELEDATA: u8 = 0x02;

const SUBRECORD_HEADER_LEN: usize = 3;
const SR_POS_DATA: u8 = 0x10;
const POS_DATA_LEN: usize = 21;

/// Unix time of 2010-01-01T00:00:00Z, the EGTS epoch.
const EGTS_EPOCH: i64 = 1_262_304_000;

// POS_DATA flag bits
const POS_ALTE: u8 = 0x80;
const POS_LOHS: u8 = 0x40;
const POS_LAHS: u8 = 0x20;
const POS_MV: u8 = 0x10;
const POS_FIX: u8 = 0x02;
const POS_VLD: u8 = 0x01;

/// Response for the first packet of a server session: RPID 0, RN 0, result OK.
pub(crate) const ACK: [u8; 29] = [
    0x01, // PRV
    0x00, // SKID
    0x03, // flags
    0x0B, // HL
    0x00, // HE
    0x10, 0x00, // FDL
    0x00, 0x00, // PID
    0x00, // PT (response)
    0xB3, // HCS
    0x00, 0x00, // RPID
    0x00, // PR
    0x06, 0x00, // RL
    0x00, 0x00, // RN
    0x18, // RFL
    0x02, // SST
    0x02, // RST
    0x00, // SRT (record response)
    0x03, 0x00, // SRL
    0x00, 0x00, // CRN
    0x00, // RST
    0xF7, 0x9E, // SFRCS
];

/// EGTS session.
#[derive(Debug, Default)]
pub struct Egts {
    packet_id: u16,
    record_number: u16,
}

impl Egts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packet_id(&self) -> u16 {
        self.packet_id
    }

    pub fn record_number(&self) -> u16 {
        self.record_number
    }

    /// Build a complete transport packet.
    ///
    /// Increments both the packet id and the record number.
    fn build_packet(&mut self, packet: &NavigationPacket) -> Vec<u8> {
        let record = self.build_record(packet);

        let mut frame = Vec::with_capacity(HEADER_LEN + record.len() + 2);
        frame.push(PROTOCOL_VERSION);
        frame.push(SECURITY_KEY_ID);
        frame.push(HEADER_FLAGS);
        frame.push(HEADER_LEN as u8);
        frame.push(HEADER_ENCODING);
        frame.extend_from_slice(&(record.len() as u16).to_le_bytes());
        frame.extend_from_slice(&self.packet_id.to_le_bytes());
        frame.push(PT_APPDATA);
        let hcs = crc8(&frame);
        frame.push(hcs);

        frame.extend_from_slice(&record);
        frame.extend_from_slice(&crc16_ccitt_false(&record).to_le_bytes());

        self.packet_id = self.packet_id.wrapping_add(1);

        frame
    }

    fn build_record(&mut self, packet: &NavigationPacket) -> Vec<u8> {
        let subrecord = position_subrecord(packet);

        let mut record = Vec::with_capacity(RECORD_HEADER_LEN + subrecord.len());
        record.extend_from_slice(&(subrecord.len() as u16).to_le_bytes());
        record.extend_from_slice(&self.record_number.to_le_bytes());
        record.push(RECORD_FLAGS_OBFE);
        record.extend_from_slice(&(packet.device_id as u32).to_le_bytes()); // OID
        record.push(SERVICE_TELEDATA); // SST
        record.push(SERVICE_TELEDATA); // RST
        record.extend_from_slice(&subrecord);

        self.record_number = self.record_number.wrapping_add(1);

        record
    }
}

fn position_subrecord(packet: &NavigationPacket) -> Vec<u8> {
    let data = position_data(packet);
    let mut subrecord = Vec::with_capacity(SUBRECORD_HEADER_LEN + data.len());
    subrecord.push(SR_POS_DATA);
    subrecord.extend_from_slice(&(data.len() as u16).to_le_bytes());
    subrecord.extend_from_slice(&data);
    subrecord
}

/// EGTS_SR_POS_DATA body.
fn position_data(packet: &NavigationPacket) -> [u8; POS_DATA_LEN] {
    let mut data = [0u8; POS_DATA_LEN];

    let navigation_time = (packet.timestamp.timestamp() - EGTS_EPOCH) as u32;
    data[0..4].copy_from_slice(&navigation_time.to_le_bytes());

    let lat = (packet.latitude.abs() / 90.0 * f64::from(u32::MAX)) as u32;
    data[4..8].copy_from_slice(&lat.to_le_bytes());
    let lon = (packet.longitude.abs() / 180.0 * f64::from(u32::MAX)) as u32;
    data[8..12].copy_from_slice(&lon.to_le_bytes());

    data[12] = position_flags(packet.latitude, packet.longitude, false, false);

    // No speed, bearing or altitude source
    data[13..16].copy_from_slice(&pack_speed_bearing(0.0, 0, false));

    // data[16..19]: odometer, data[19]: digital inputs, data[20]: source
    data
}

fn position_flags(latitude: f64, longitude: f64, has_altitude: bool, moving: bool) -> u8 {
    let mut flags = POS_FIX | POS_VLD;
    if has_altitude {
        flags |= POS_ALTE;
    }
    if longitude < 0.0 {
        flags |= POS_LOHS;
    }
    if latitude < 0.0 {
        flags |= POS_LAHS;
    }
    if moving {
        flags |= POS_MV;
    }
    flags
}

/// Pack SPD (0.1 km/h, 14 bits), ALTS and DIR (9 bits) into three bytes.
fn pack_speed_bearing(speed_kmh: f64, bearing: u16, altitude_negative: bool) -> [u8; 3] {
    let speed = (speed_kmh.abs() * 10.0) as u16;
    let mut packed = ((speed >> 8) & 0x3F) as u8;
    if altitude_negative {
        packed |= 0x40;
    }
    packed |= (((bearing >> 8) & 0x01) as u8) << 7;
    [speed as u8, packed, bearing as u8]
}

impl NavProtocol for Egts {
    fn send<T: Read + Write>(&mut self, packet: &NavigationPacket, transport: &mut T) -> Result<Vec<Vec<u8>>> {
        let frame = self.build_packet(packet);
        let reply = exchange(transport, ProtocolKind::Egts, &frame)?;
        if reply != ACK {
            error!("EGTS packet not confirmed: {reply:02X?}");
            return Err(ProtocolError::wrong_response(ProtocolKind::Egts, &reply));
        }
        Ok(vec![frame])
    }
}
