//! Codec error types.

use thiserror::Error;

use super::ProtocolKind;

/// Errors that can occur while exchanging frames with a telematics server.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Write or read failure on the transport stream.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Server acknowledgement does not match the expected byte pattern.
    #[error("{protocol}: wrong response ({} bytes): {received:02X?}", .received.len())]
    WrongResponse {
        protocol: ProtocolKind,
        received: Vec<u8>,
    },
}

impl ProtocolError {
    /// Create a wrong-response error from the bytes actually received.
    pub fn wrong_response(protocol: ProtocolKind, received: &[u8]) -> Self {
        Self::WrongResponse {
            protocol,
            received: received.to_vec(),
        }
    }

    /// Whether this error is an acknowledgement mismatch rather than an I/O failure.
    pub fn is_wrong_response(&self) -> bool {
        matches!(self, Self::WrongResponse { .. })
    }
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
