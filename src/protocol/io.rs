//! Blocking frame exchange over the server stream.

use std::io::{Read, Write};

use tracing::{debug, error};

use super::ProtocolKind;
use super::error::Result;

/// Receive buffer for a single server acknowledgement.
pub(crate) const RESPONSE_BUF_SIZE: usize = 256;

/// Write a frame to the transport.
pub(crate) fn write_frame<T: Write>(transport: &mut T, protocol: ProtocolKind, frame: &[u8]) -> Result<()> {
    debug!("[{protocol}] TX ({} bytes): {:02X?}", frame.len(), frame);
    transport
        .write_all(frame)
        .and_then(|()| transport.flush())
        .inspect_err(|e| error!("[{protocol}] Write failed: {e}"))?;
    Ok(())
}

/// Read one acknowledgement with a single blocking read.
///
/// Only the bytes returned by that read are kept; an empty vector means the
/// server closed the stream.
pub(crate) fn read_reply<T: Read>(transport: &mut T, protocol: ProtocolKind) -> Result<Vec<u8>> {
    let mut buf = [0u8; RESPONSE_BUF_SIZE];
    let count = transport
        .read(&mut buf)
        .inspect_err(|e| error!("[{protocol}] Read failed: {e}"))?;
    debug!("[{protocol}] RX ({count} bytes): {:02X?}", &buf[..count]);
    Ok(buf[..count].to_vec())
}

/// Send a frame and wait for the server's reply to it.
pub(crate) fn exchange<T: Read + Write>(transport: &mut T, protocol: ProtocolKind, frame: &[u8]) -> Result<Vec<u8>> {
    write_frame(transport, protocol, frame)?;
    read_reply(transport, protocol)
}
