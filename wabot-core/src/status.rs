//! Link status shared between the messaging library and the HTTP surface
//!
//! The library's event callbacks write; HTTP handlers read. All status fields
//! live in a single immutable [`StatusSnapshot`] that is swapped atomically on
//! every write, so readers always see fields from the same instant.

use std::sync::{Arc, PoisonError, RwLock};

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};

use crate::client::{ConnectionEvent, SharedClient};

/// Point-in-time view of the link status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Last QR payload issued, empty until the first one arrives
    pub qr_code: String,

    /// Last pairing code issued, empty until one is requested
    pub pairing_code: String,

    pub connected: bool,
}

/// What the QR page should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPhase {
    Connected,
    AwaitingQr,
    QrReady,
}

impl StatusSnapshot {
    /// Once connected, QR and pairing values are stale no matter what they hold.
    pub fn phase(&self) -> LinkPhase {
        if self.connected {
            LinkPhase::Connected
        } else if self.qr_code.is_empty() {
            LinkPhase::AwaitingQr
        } else {
            LinkPhase::QrReady
        }
    }
}

/// Owned store for link status and the client handle
pub struct StatusStore {
    snapshot: ArcSwap<StatusSnapshot>,
    client: RwLock<Option<SharedClient>>,
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusStore {
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(StatusSnapshot::default()),
            client: RwLock::new(None),
        }
    }

    /// Current status, all fields from the same write
    pub fn snapshot(&self) -> Arc<StatusSnapshot> {
        self.snapshot.load_full()
    }

    pub fn set_qr_code(&self, code: impl Into<String>) {
        let code = code.into();
        self.update(|s| s.qr_code.clone_from(&code));
    }

    pub fn set_pairing_code(&self, code: impl Into<String>) {
        let code = code.into();
        self.update(|s| s.pairing_code.clone_from(&code));
    }

    pub fn set_connected(&self, connected: bool) {
        self.update(|s| s.connected = connected);
    }

    /// Register the messaging client used for pairing requests
    pub fn set_client(&self, client: SharedClient) {
        let mut slot = self.client.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(client);
    }

    pub fn client(&self) -> Option<SharedClient> {
        self.client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Feed a connection event from the messaging library
    pub fn apply(&self, event: ConnectionEvent) {
        tracing::debug!(?event, "Connection event");

        match event {
            ConnectionEvent::Qr(code) => self.set_qr_code(code),
            ConnectionEvent::PairingCode(code) => self.set_pairing_code(code),
            ConnectionEvent::Connected => self.set_connected(true),
            ConnectionEvent::Disconnected => self.set_connected(false),
            ConnectionEvent::LoggedOut => {
                tracing::info!("Session logged out");
                self.set_connected(false);
            }
        }
    }

    // Read-copy-update; retried by arc-swap if another writer got in first.
    fn update<F>(&self, f: F)
    where
        F: Fn(&mut StatusSnapshot),
    {
        self.snapshot.rcu(|current| {
            let mut next = StatusSnapshot::clone(current);
            f(&mut next);
            next
        });
    }
}
