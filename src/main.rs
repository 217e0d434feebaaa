//! RNIS protocols emulator - reports one location fix to a telematics server.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use rnis_emulator as app;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use app::config::{ConfigLoadResult, EmulatorConfig, LoggingConfig};
use app::protocol::{Codec, NavProtocol, ProtocolKind};
use app::{AppError, NavigationPacket, dump, transport};

/// Emulate a tracker sending a single fix over NDTP, Wialon IPS, EGTS or Navtelecom.
#[derive(Parser)]
#[command(name = "rnis-emulator", version)]
struct Cli {
    /// Config file (default: user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Server host or IP address
    ip: String,

    /// Server TCP port
    port: u16,

    /// Wire protocol
    #[arg(value_name = "TYPE", value_enum)]
    protocol: ProtocolKind,

    /// Device identifier (IMEI / terminal id)
    id: u64,

    /// Latitude, -90.0 - 90.0
    #[arg(allow_negative_numbers = true)]
    lat: f64,

    /// Longitude, -180.0 - 180.0
    #[arg(allow_negative_numbers = true)]
    lon: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, first_run) = load_config(cli.config.as_deref())?;
    let _log_guard = init_logging(&config.logging);

    if first_run {
        let path = EmulatorConfig::default_path();
        match config.save(&path) {
            Ok(()) => info!("Wrote default config to {}", path.display()),
            Err(e) => warn!("Failed to save config to {}: {e}", path.display()),
        }
    }

    let packet = NavigationPacket::new(cli.id, Utc::now(), cli.lat, cli.lon);
    packet.validate()?;
    println!("Data: {packet}");

    let mut stream = transport::connect(&cli.ip, cli.port, &config.connection).context("Connection error")?;

    let mut codec = Codec::new(cli.protocol);
    info!("Sending fix via {}", codec.kind());
    let frames = codec.send(&packet, &mut stream).context("Send error")?;

    print!("{}", dump::render_frames(&frames));
    Ok(())
}

/// Load config from an explicit path, or the default path when present.
///
/// The flag is set when the default file does not exist yet.
fn load_config(path: Option<&Path>) -> app::Result<(EmulatorConfig, bool)> {
    let explicit = path.is_some();
    let path = path.map(Path::to_path_buf).unwrap_or_else(EmulatorConfig::default_path);

    match EmulatorConfig::try_load(&path) {
        ConfigLoadResult::Loaded(config) => Ok((config, false)),
        ConfigLoadResult::Missing if explicit => Err(AppError::config(format!("{} not found", path.display()))),
        ConfigLoadResult::Missing => Ok((EmulatorConfig::default(), true)),
        ConfigLoadResult::Invalid(e) => Err(AppError::config(format!("{}: {e}", path.display()))),
    }
}

/// Initialize logging to stderr, or to a daily file when a directory is configured.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(logging.level.to_ascii_lowercase()));

    if logging.directory.is_empty() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&logging.directory, "rnis-emulator.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}
