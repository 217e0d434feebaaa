//! NDTP codec.
//!
//! Every frame is an NPL transport header wrapping an NPH message:
//! - NPL (15 bytes): signature, payload length, flags, CRC-16/MODBUS of the
//!   NPH (big-endian), type, peer address, packet id
//! - NPH (10 bytes + body): service, message type, flags, request id
//!
//! Server responses are only diagnosed, never enforced.

use std::io::{Read, Write};

use tracing::{info, warn};

use super::checksum::crc16_modbus;
use super::error::Result;
use super::io::exchange;
use super::{NavProtocol, ProtocolKind};
use crate::navigation::NavigationPacket;

const NPL_SIGNATURE: [u8; 2] = [0x7E, 0x7E];
const NPL_HEADER_LEN: usize = 15;
const NPL_FLAGS: u16 = 0x0002;
const NPL_TYPE: u8 = 0x01;
const NPL_ADDRESS_SERVER: u32 = 0x0000_0000;

const NPH_HEADER_LEN: usize = 10;
const NPH_SRV_GENERIC_CONTROLS: u16 = 0;
const NPH_SGC_CONN_REQUEST: u16 = 100;
const NPH_SRV_NAVDATA: u16 = 1;
const NPH_SND_REALTIME: u16 = 101;

const AUTH_BODY_LEN: usize = 14;
const PROTOCOL_VERSION_HI: u16 = 6;
const PROTOCOL_VERSION_LO: u16 = 2;
const CONN_FLAGS: u16 = 0b0000_0001_0000_0010;
const MAX_PACKET_SIZE: u32 = 0x0000_0400;

const NAVDATA_BODY_LEN: usize = 28;
const NAV_VALID: u8 = 0x80;
const NAV_LON_EAST: u8 = 0x40;
const NAV_LAT_NORTH: u8 = 0x20;
const COORD_SCALE: f64 = 10_000_000.0;

/// Generic negative result returned by servers that reject a message.
pub(crate) const NEGATIVE_ACK: [u8; 29] = [
    // NPL
    0x7E, 0x7E, // signature
    0x0E, 0x00, // data size
    0x02, 0x00, // flags
    0x01, 0xAB, // crc
    0x02, // type
    0x00, 0x00, 0x00, 0x00, // peer address
    0x00, 0x00, // request id
    // NPH
    0x00, 0x00, // service id
    0x00, 0x00, // type
    0x00, 0x00, // flags
    0x00, 0x00, 0x00, 0x00, // request id
    0x00, 0x00, 0x00, 0x00, // error code
];

/// NDTP session.
#[derive(Debug, Default)]
pub struct Ndtp {
    packet_id: u16,
    authenticated: bool,
}

impl Ndtp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Packet id the next frame will carry.
    pub fn packet_id(&self) -> u16 {
        self.packet_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Connection request (NPH_SGC_CONN_REQUEST) frame.
    fn build_auth_frame(&mut self, packet: &NavigationPacket) -> Vec<u8> {
        let mut nph = nph_header(NPH_SRV_GENERIC_CONTROLS, NPH_SGC_CONN_REQUEST, self.packet_id);
        nph.reserve(AUTH_BODY_LEN);
        nph.extend_from_slice(&PROTOCOL_VERSION_HI.to_le_bytes());
        nph.extend_from_slice(&PROTOCOL_VERSION_LO.to_le_bytes());
        nph.extend_from_slice(&CONN_FLAGS.to_be_bytes());
        nph.extend_from_slice(&(packet.device_id as u32).to_le_bytes()); // peer id
        nph.extend_from_slice(&MAX_PACKET_SIZE.to_le_bytes());

        self.wrap_npl(nph)
    }

    /// Real-time navigation data (NPH_SND_REALTIME) frame.
    fn build_navdata_frame(&mut self, packet: &NavigationPacket) -> Vec<u8> {
        let mut body = [0u8; NAVDATA_BODY_LEN];
        // body[0]: cell type, body[1]: source
        body[2..6].copy_from_slice(&(packet.timestamp.timestamp() as u32).to_le_bytes());
        body[6..10].copy_from_slice(&((packet.longitude.abs() * COORD_SCALE) as u32).to_le_bytes());
        body[10..14].copy_from_slice(&((packet.latitude.abs() * COORD_SCALE) as u32).to_le_bytes());

        // Bit 5 is the latitude hemisphere bit but follows the longitude sign.
        let mut flags = NAV_VALID;
        if packet.longitude >= 0.0 {
            flags |= NAV_LON_EAST;
        }
        if packet.longitude >= 0.0 {
            flags |= NAV_LAT_NORTH;
        }
        body[14] = flags;

        let mut nph = nph_header(NPH_SRV_NAVDATA, NPH_SND_REALTIME, self.packet_id);
        nph.extend_from_slice(&body);

        self.wrap_npl(nph)
    }

    /// Prefix the NPH with its NPL header.
    ///
    /// Increments `packet_id` after building the frame.
    fn wrap_npl(&mut self, nph: Vec<u8>) -> Vec<u8> {
        let mut frame = Vec::with_capacity(NPL_HEADER_LEN + nph.len());
        frame.extend_from_slice(&NPL_SIGNATURE);
        frame.extend_from_slice(&(nph.len() as u16).to_le_bytes());
        frame.extend_from_slice(&NPL_FLAGS.to_le_bytes());
        frame.extend_from_slice(&crc16_modbus(&nph).to_be_bytes());
        frame.push(NPL_TYPE);
        frame.extend_from_slice(&NPL_ADDRESS_SERVER.to_le_bytes());
        frame.extend_from_slice(&self.packet_id.to_le_bytes());
        frame.extend_from_slice(&nph);

        self.packet_id = self.packet_id.wrapping_add(1);

        frame
    }
}

fn nph_header(service: u16, kind: u16, request_id: u16) -> Vec<u8> {
    let mut nph = Vec::with_capacity(NPH_HEADER_LEN + NAVDATA_BODY_LEN);
    nph.extend_from_slice(&service.to_le_bytes());
    nph.extend_from_slice(&kind.to_le_bytes());
    nph.extend_from_slice(&0u16.to_le_bytes()); // flags
    nph.extend_from_slice(&u32::from(request_id).to_le_bytes());
    nph
}

fn is_negative_ack(reply: &[u8]) -> bool {
    reply == NEGATIVE_ACK
}

impl NavProtocol for Ndtp {
    fn send<T: Read + Write>(&mut self, packet: &NavigationPacket, transport: &mut T) -> Result<Vec<Vec<u8>>> {
        let mut frames = Vec::with_capacity(2);

        // Same as "packet id is 0" on a fresh session, but stays set after the id wraps.
        if !self.authenticated {
            let frame = self.build_auth_frame(packet);
            self.authenticated = true;

            let reply = exchange(transport, ProtocolKind::Ndtp, &frame)?;
            if is_negative_ack(&reply) {
                warn!("NDTP connection request rejected, Resp1: {reply:02X?}");
            } else {
                info!("NDTP connection request sent, peer_id={}", packet.device_id as u32);
            }
            frames.push(frame);
        }

        let frame = self.build_navdata_frame(packet);
        let reply = exchange(transport, ProtocolKind::Ndtp, &frame)?;
        if is_negative_ack(&reply) {
            warn!("NDTP navigation data rejected, Resp2: {reply:02X?}");
        }
        frames.push(frame);

        Ok(frames)
    }
}
