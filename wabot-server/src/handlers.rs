//! HTTP handlers
//!
//! Every handler answers 200. Failures travel in the JSON body or as a
//! degraded page, never as a status code.

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    response::{Html, IntoResponse},
};
use serde::{Deserialize, Serialize};

use wabot_core::client::PAIRING_DISPLAY_NAME;
use wabot_core::{LinkPhase, PairClientType, StatusSnapshot};

use crate::pages;
use crate::state::SharedState;

/// Health check endpoint
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "wabot-server",
        "mode": state.config.mode,
        "started_at": state.started_at,
        "uptime_secs": state.uptime_secs(),
    }))
}

/// QR login page
pub async fn qr_handler(State(state): State<SharedState>) -> Html<String> {
    let snapshot = state.status.snapshot();

    match snapshot.phase() {
        LinkPhase::Connected => Html(pages::connected_page()),
        LinkPhase::AwaitingQr => Html(pages::waiting_page()),
        LinkPhase::QrReady => Html(pages::qr_page(&snapshot.qr_code)),
    }
}

/// Pairing form
pub async fn pairing_page() -> Html<String> {
    Html(pages::pairing_page())
}

/// Pairing request body
#[derive(Debug, Default, Deserialize)]
pub struct PairingRequest {
    #[serde(default)]
    phone_number: String,
}

/// Pairing response
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PairingReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairing_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connected: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PairingReply {
    fn issued(code: String) -> Self {
        Self {
            success: Some(true),
            pairing_code: Some(code),
            ..Default::default()
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            error: Some(error.into()),
            ..Default::default()
        }
    }

    fn already_connected() -> Self {
        Self {
            connected: Some(true),
            message: Some("Already connected".to_string()),
            ..Default::default()
        }
    }
}

/// Request a pairing code for a phone number.
///
/// The body is decoded by hand so an unreadable or malformed body yields an
/// inline error rather than an extractor rejection.
pub async fn pairing_handler(
    State(state): State<SharedState>,
    body: Result<Bytes, BytesRejection>,
) -> Json<PairingReply> {
    if state.status.snapshot().connected {
        return Json(PairingReply::already_connected());
    }

    let req = match body.map_err(|e| e.to_string()).and_then(|b| decode_pairing_request(&b)) {
        Ok(req) => req,
        Err(e) => {
            tracing::debug!(error = %e, "Rejected pairing request body");
            return Json(PairingReply::failed("Invalid request"));
        }
    };

    let Some(client) = state.status.client() else {
        tracing::warn!("Pairing requested before the client was initialized");
        return Json(PairingReply::failed("Client not initialized"));
    };

    match client
        .pair_phone(&req.phone_number, true, PairClientType::Chrome, PAIRING_DISPLAY_NAME)
        .await
    {
        Ok(code) => {
            tracing::info!("Issued pairing code");
            state.status.set_pairing_code(code.clone());
            Json(PairingReply::issued(code))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Pairing request failed");
            Json(PairingReply::failed(e.to_string()))
        }
    }
}

/// Decode the first JSON value of the body. `null` reads as an empty request
/// and anything after the first value is ignored.
fn decode_pairing_request(body: &[u8]) -> Result<PairingRequest, String> {
    let mut values = serde_json::Deserializer::from_slice(body).into_iter::<Option<PairingRequest>>();

    match values.next() {
        Some(Ok(req)) => Ok(req.unwrap_or_default()),
        Some(Err(e)) => Err(e.to_string()),
        None => Err("empty body".to_string()),
    }
}

/// Current link status
pub async fn status_handler(State(state): State<SharedState>) -> Json<StatusSnapshot> {
    Json(StatusSnapshot::clone(&state.status.snapshot()))
}
