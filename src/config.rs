use dotenv::dotenv;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Seats in the conference room when `ROOM_TOTAL_SEATS` is not set.
pub const DEFAULT_TOTAL_SEATS: u32 = 100;

const DEFAULT_DATABASE_PATH: &str = "data/meetings.csv";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {name}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// The single conference room every booking competes for.
///
/// Fixed at startup and passed by value into the booking service, so tests
/// can build services with any capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomConfig {
    pub total_seats: u32,
}

impl RoomConfig {
    pub fn new(total_seats: u32) -> Self {
        Self { total_seats }
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_SEATS)
    }
}

// Process configuration read once at startup
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub room: RoomConfig,
    pub database_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub is_production: bool,
    pub serialize_bookings: bool,
}

impl ServiceConfig {
    /// Load configuration from the environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let total_seats = match lookup("ROOM_TOTAL_SEATS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: "ROOM_TOTAL_SEATS",
                    value: raw.clone(),
                    reason: e.to_string(),
                })?,
            None => DEFAULT_TOTAL_SEATS,
        };

        let database_path = lookup("MEETING_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

        let raw_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue {
                name: "BIND_ADDR",
                value: raw_addr.clone(),
                reason: e.to_string(),
            })?;

        let is_production = lookup("ENVIRONMENT")
            .map(|val| val.to_lowercase() == "production")
            .unwrap_or(false);

        let serialize_bookings = lookup("SERIALIZE_BOOKINGS")
            .map(|val| val.to_lowercase() == "true")
            .unwrap_or(false);

        debug!(
            total_seats,
            database_path = %database_path.display(),
            %bind_addr,
            "Configuration loaded"
        );

        if serialize_bookings {
            info!("Booking checks will be serialized across concurrent requests");
        }

        Ok(Self {
            room: RoomConfig::new(total_seats),
            database_path,
            bind_addr,
            is_production,
            serialize_bookings,
        })
    }
}
