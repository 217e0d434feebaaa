//! TCP connection to the telematics server.

use std::net::{TcpStream, ToSocketAddrs};

use tracing::{error, info};

use crate::config::ConnectionConfig;
use crate::error::{AppError, Result};

/// Connect to `host:port` and apply the configured socket timeouts.
///
/// Codecs have no deadlines of their own; the read/write timeouts set here
/// are what bound a silent server.
pub fn connect(host: &str, port: u16, settings: &ConnectionConfig) -> Result<TcpStream> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|e| AppError::connection(format!("Cannot resolve {host}:{port}: {e}")))?
        .next()
        .ok_or_else(|| AppError::connection(format!("No address for {host}:{port}")))?;

    info!("Connecting to {addr} (timeout={:?})", settings.connect_timeout());
    let stream = TcpStream::connect_timeout(&addr, settings.connect_timeout()).map_err(|e| {
        error!("Failed to connect to {addr}: {e}");
        AppError::connection(format!("Failed to connect to {addr}: {e}"))
    })?;

    stream.set_read_timeout(Some(settings.read_timeout()))?;
    stream.set_write_timeout(Some(settings.write_timeout()))?;
    stream.set_nodelay(true)?;

    info!("Connected to {addr}");
    Ok(stream)
}
