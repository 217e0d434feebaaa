//! Telematics protocol codecs.
//!
//! Each codec emulates one tracker session: it owns its frame counters and
//! handshake state, builds frames from a [`NavigationPacket`], writes them to
//! an already-connected stream and validates the server's acknowledgement.
//!
//! # Example
//!
//! ```ignore
//! use rnis_emulator::protocol::{Codec, NavProtocol, ProtocolKind};
//!
//! let mut stream = std::net::TcpStream::connect("127.0.0.1:5000")?;
//! let mut codec = Codec::new(ProtocolKind::Egts);
//! let frames = codec.send(&packet, &mut stream)?;
//! ```

mod checksum;
mod egts;
mod error;
mod io;
mod navtelecom;
mod ndtp;
mod wialon;

#[cfg(test)]
mod mock;
#[cfg(test)]
mod tests;

use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

use clap::ValueEnum;
use thiserror::Error;

use crate::navigation::NavigationPacket;

pub use checksum::{crc8, crc16_ccitt_false, crc16_modbus, xor};
pub use egts::Egts;
pub use error::{ProtocolError, Result};
pub use navtelecom::Navtelecom;
pub use ndtp::Ndtp;
pub use wialon::Wialon;

/// Capability shared by every protocol codec.
pub trait NavProtocol {
    /// Report one fix to the server.
    ///
    /// Performs the handshake first when the session is not yet
    /// authenticated. Returns the frames written, in order.
    fn send<T: Read + Write>(&mut self, packet: &NavigationPacket, transport: &mut T) -> Result<Vec<Vec<u8>>>;
}

/// Supported wire protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ProtocolKind {
    Ndtp,
    Wialon,
    Egts,
    Navtelecom,
}

impl ProtocolKind {
    pub const ALL: [ProtocolKind; 4] = [Self::Ndtp, Self::Wialon, Self::Egts, Self::Navtelecom];

    /// Name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ndtp => "ndtp",
            Self::Wialon => "wialon",
            Self::Egts => "egts",
            Self::Navtelecom => "navtelecom",
        }
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Protocol name not in [`ProtocolKind::ALL`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown protocol type '{0}' (expected one of: ndtp, wialon, egts, navtelecom)")]
pub struct UnknownProtocol(pub String);

impl FromStr for ProtocolKind {
    type Err = UnknownProtocol;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| UnknownProtocol(s.to_string()))
    }
}

/// One emulated device session, for whichever protocol was selected.
#[derive(Debug)]
pub enum Codec {
    Ndtp(Ndtp),
    Wialon(Wialon),
    Egts(Egts),
    Navtelecom(Navtelecom),
}

impl Codec {
    /// Start a fresh session: counters at zero, not authenticated.
    pub fn new(kind: ProtocolKind) -> Self {
        match kind {
            ProtocolKind::Ndtp => Self::Ndtp(Ndtp::new()),
            ProtocolKind::Wialon => Self::Wialon(Wialon::new()),
            ProtocolKind::Egts => Self::Egts(Egts::new()),
            ProtocolKind::Navtelecom => Self::Navtelecom(Navtelecom::new()),
        }
    }

    pub fn kind(&self) -> ProtocolKind {
        match self {
            Self::Ndtp(_) => ProtocolKind::Ndtp,
            Self::Wialon(_) => ProtocolKind::Wialon,
            Self::Egts(_) => ProtocolKind::Egts,
            Self::Navtelecom(_) => ProtocolKind::Navtelecom,
        }
    }
}

impl NavProtocol for Codec {
    fn send<T: Read + Write>(&mut self, packet: &NavigationPacket, transport: &mut T) -> Result<Vec<Vec<u8>>> {
        match self {
            Self::Ndtp(codec) => codec.send(packet, transport),
            Self::Wialon(codec) => codec.send(packet, transport),
            Self::Egts(codec) => codec.send(packet, transport),
            Self::Navtelecom(codec) => codec.send(packet, transport),
        }
    }
}
