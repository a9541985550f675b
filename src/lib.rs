//! Room Booking Service
//!
//! This library provides a small booking API for a single conference room.
//! Clients propose a meeting (start, end, required seats); the service checks
//! the room's capacity, rejects any meeting whose time overlaps an existing
//! booking, and persists accepted meetings.
//!
//! # Modules
//!
//! - `services::booking`: capacity and overlap validation around the store
//! - `services::overlap`: the closed-interval overlap test
//! - `services::store`: CSV-backed meeting persistence
//! - `client`: BookingClient for calling the HTTP API
//!
//! # Overlap policy
//!
//! Intervals are compared as closed ranges, so a meeting ending at 10:00 and
//! one starting at 10:00 are considered overlapping.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;


// Re-export the main API types for ease of use
pub use client::{BookingClient, ClientError, ScheduleMeetingRequest};
pub use config::{RoomConfig, ServiceConfig};
pub use error::BookingError;
pub use handlers::api::AppState;
pub use routes::create_router;
pub use services::booking::BookingService;
pub use services::store::{CsvMeetingStore, MeetingRepository, StoreError};
