//! wabot-core: Shared library for the wabot WhatsApp bot
//!
//! This crate provides:
//! - Layered configuration (defaults, environment, JSON file, flags)
//! - The link status store read by the HTTP surface
//! - The seam to the external WhatsApp protocol library

pub mod client;
pub mod config;
pub mod status;

pub use client::{ConnectionEvent, PairClientType, PairingClient, PairingError, SharedClient};
pub use config::{Config, Flags, Mode};
pub use status::{LinkPhase, StatusSnapshot, StatusStore};

/// Default HTTP port for the status server
pub const DEFAULT_PORT: u16 = 8080;
