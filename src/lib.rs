pub mod config;
pub mod dump;
pub mod error;
pub mod navigation;
pub mod protocol;
pub mod transport;

pub use error::{AppError, Result};
pub use navigation::NavigationPacket;
