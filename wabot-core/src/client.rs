//! Seam to the external WhatsApp protocol library
//!
//! The library owns the connection. It reports progress through
//! [`ConnectionEvent`]s and exposes phone-number pairing through
//! [`PairingClient`]; wabot only needs those two things from it.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Display name the linked device registers under
pub const PAIRING_DISPLAY_NAME: &str = "Chrome (Linux)";

/// Client platform reported when requesting a pairing code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PairClientType {
    #[default]
    Unknown,
    Chrome,
    Edge,
    Firefox,
    Ie,
    Opera,
    Safari,
    Electron,
    Uwp,
    OtherWebClient,
}

impl fmt::Display for PairClientType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PairClientType::Unknown => "Unknown",
            PairClientType::Chrome => "Chrome",
            PairClientType::Edge => "Edge",
            PairClientType::Firefox => "Firefox",
            PairClientType::Ie => "IE",
            PairClientType::Opera => "Opera",
            PairClientType::Safari => "Safari",
            PairClientType::Electron => "Electron",
            PairClientType::Uwp => "UWP",
            PairClientType::OtherWebClient => "Other Web Client",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PairingError {
    #[error("{0}")]
    Rejected(String),

    #[error("not connected to WhatsApp servers")]
    NotConnected,

    #[error("invalid phone number: {0}")]
    InvalidPhoneNumber(String),
}

/// Pairing capability of a messaging client
#[async_trait]
pub trait PairingClient: Send + Sync {
    /// Request a pairing code to be entered on the phone.
    async fn pair_phone(
        &self,
        phone: &str,
        show_push_notification: bool,
        client_type: PairClientType,
        client_display_name: &str,
    ) -> Result<String, PairingError>;
}

/// Shared handle to the messaging client
pub type SharedClient = Arc<dyn PairingClient>;

/// Connection progress reported by the messaging library
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// A fresh QR payload to scan
    Qr(String),
    /// Pairing code delivered out of band
    PairingCode(String),
    Connected,
    Disconnected,
    LoggedOut,
}
