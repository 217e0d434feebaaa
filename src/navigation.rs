//! Navigation fix reported by the emulated tracker.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::error::{AppError, Result};

/// A single location fix.
///
/// Codecs only ever borrow a packet; each one truncates or formats the
/// device identifier to its own field width.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationPacket {
    /// Tracker identifier (IMEI or terminal id).
    #[serde(rename = "id")]
    pub device_id: u64,
    /// Fix instant.
    #[serde(rename = "time", serialize_with = "serialize_time")]
    pub timestamp: DateTime<Utc>,
    /// Latitude in degrees, south negative.
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude in degrees, west negative.
    #[serde(rename = "lon")]
    pub longitude: f64,
}

fn serialize_time<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&time.format("%Y-%m-%d %H:%M:%S"))
}

impl NavigationPacket {
    pub fn new(device_id: u64, timestamp: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        Self {
            device_id,
            timestamp,
            latitude,
            longitude,
        }
    }

    /// Check coordinate ranges before handing the packet to a codec.
    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(AppError::validation("LAT must be -90.0 - 90.0"));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(AppError::validation("LON must be -180.0 - 180.0"));
        }
        Ok(())
    }
}

impl fmt::Display for NavigationPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
