//! Router and listener for the status surface

use axum::{
    Router,
    routing::{any, get},
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::SharedState;

/// Build the status router
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/qr", any(handlers::qr_handler))
        .route(
            "/pairing",
            get(handlers::pairing_page)
                .post(handlers::pairing_handler)
                .fallback(handlers::pairing_page),
        )
        .route("/status", any(handlers::status_handler))
        .route("/health", any(handlers::health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until the listener fails.
///
/// Bind and serve errors are logged and end this task only; the rest of the
/// process keeps running.
pub async fn serve(state: SharedState) {
    let addr = state.config.listen_addr();

    let listener = match TcpListener::bind(addr.as_str()).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Web server failed to bind");
            return;
        }
    };

    tracing::info!("Web server started at http://localhost:{}", state.config.port);

    if let Err(e) = axum::serve(listener, router(state)).await {
        tracing::error!(error = %e, "Web server error");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode, header},
        response::Response,
    };
    use tower::ServiceExt;

    use wabot_core::{Config, PairClientType, PairingClient, PairingError, StatusStore};

    use crate::handlers::PairingReply;
    use crate::state::AppState;

    /// Records calls and answers with a fixed result
    struct MockClient {
        calls: AtomicUsize,
        phones: Mutex<Vec<String>>,
        result: Result<String, String>,
    }

    impl MockClient {
        fn ok(code: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                phones: Mutex::new(Vec::new()),
                result: Ok(code.to_string()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                phones: Mutex::new(Vec::new()),
                result: Err(message.to_string()),
            })
        }

        fn phones(&self) -> Vec<String> {
            self.phones.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PairingClient for MockClient {
        async fn pair_phone(
            &self,
            phone: &str,
            show_push_notification: bool,
            client_type: PairClientType,
            client_display_name: &str,
        ) -> Result<String, PairingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.phones.lock().unwrap().push(phone.to_string());
            assert!(show_push_notification);
            assert_eq!(client_type, PairClientType::Chrome);
            assert_eq!(client_display_name, "Chrome (Linux)");
            self.result.clone().map_err(PairingError::Rejected)
        }
    }

    fn test_state() -> SharedState {
        Arc::new(AppState::new(
            Arc::new(Config::default()),
            Arc::new(StatusStore::new()),
        ))
    }

    async fn send(state: &SharedState, method: Method, uri: &str, body: &str) -> Response {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        router(state.clone()).oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    async fn get_page(state: &SharedState, uri: &str) -> String {
        let response = send(state, Method::GET, uri, "").await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
        assert_eq!(content_type, "text/html; charset=utf-8");
        body_text(response).await
    }

    async fn post_pairing(state: &SharedState, body: &str) -> PairingReply {
        let response = send(state, Method::POST, "/pairing", body).await;
        assert_eq!(response.status(), StatusCode::OK);
        serde_json::from_str(&body_text(response).await).unwrap()
    }

    #[tokio::test]
    async fn test_qr_waiting_page() {
        let state = test_state();
        let page = get_page(&state, "/qr").await;

        assert!(page.contains("Waiting for QR Code..."));
        assert!(page.contains(r#"content="2""#));
    }

    #[tokio::test]
    async fn test_qr_ready_page_embeds_payload() {
        let state = test_state();
        let qr = "2@AbC+/d==,XyZ,123";
        state.status.set_qr_code(qr);

        let page = get_page(&state, "/qr").await;
        assert!(page.contains("Scan QR Code with WhatsApp"));
        assert!(page.contains(&format!(
            "https://api.qrserver.com/v1/create-qr-code/?size=300x300&data={}\"",
            qr
        )));
        assert!(page.contains(r#"content="5""#));
        assert!(page.contains(r#"href="/pairing""#));
    }

    #[tokio::test]
    async fn test_qr_connected_page_ignores_qr() {
        let state = test_state();
        state.status.set_connected(true);
        assert!(get_page(&state, "/qr").await.contains("Connected Successfully"));

        state.status.set_qr_code("2@stale");
        let page = get_page(&state, "/qr").await;
        assert!(page.contains("Connected Successfully"));
        assert!(!page.contains("2@stale"));
    }

    #[tokio::test]
    async fn test_pairing_form() {
        let state = test_state();
        let page = get_page(&state, "/pairing").await;

        assert!(page.contains("Get Pairing Code"));
        assert!(page.contains("fetch('/pairing'"));
        assert!(page.contains("phone_number"));

        // Anything but POST gets the form too
        let response = send(&state, Method::PUT, "/pairing", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Get Pairing Code"));
    }

    #[tokio::test]
    async fn test_pairing_when_connected_skips_client() {
        let state = test_state();
        let client = MockClient::ok("ABCD-1234");
        state.status.set_client(client.clone());
        state.status.set_connected(true);

        let reply = post_pairing(&state, r#"{"phone_number":"15551234567"}"#).await;
        assert_eq!(reply.connected, Some(true));
        assert_eq!(reply.message.as_deref(), Some("Already connected"));
        assert_eq!(reply.success, None);

        // Body is not even looked at
        let reply = post_pairing(&state, "garbage").await;
        assert_eq!(reply.connected, Some(true));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_pairing_invalid_body() {
        let state = test_state();
        let client = MockClient::ok("ABCD-1234");
        state.status.set_client(client.clone());

        for body in ["", "{", "not json", r#"{"phone_number": 15551234567}"#] {
            let reply = post_pairing(&state, body).await;
            assert_eq!(reply.success, Some(false));
            assert_eq!(reply.error.as_deref(), Some("Invalid request"));
        }
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_pairing_oversized_body_answers_inline() {
        let state = test_state();
        let client = MockClient::ok("ABCD-1234");
        state.status.set_client(client.clone());

        let body = format!(r#"{{"phone_number":"{}"}}"#, "1".repeat(3 * 1024 * 1024));
        let reply = post_pairing(&state, &body).await;

        assert_eq!(reply.success, Some(false));
        assert_eq!(reply.error.as_deref(), Some("Invalid request"));
        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_pairing_null_body_reads_as_empty_request() {
        let state = test_state();
        let client = MockClient::ok("ABCD-1234");
        state.status.set_client(client.clone());

        let reply = post_pairing(&state, "null").await;
        assert_eq!(reply.success, Some(true));
        assert_eq!(client.phones(), vec![String::new()]);
    }

    #[tokio::test]
    async fn test_pairing_ignores_trailing_data() {
        let state = test_state();
        let client = MockClient::ok("ABCD-1234");
        state.status.set_client(client.clone());

        let reply = post_pairing(&state, r#"{"phone_number":"15551234567"} {"phone_number":"1"} tail"#).await;
        assert_eq!(reply.pairing_code.as_deref(), Some("ABCD-1234"));
        assert_eq!(client.phones(), vec!["15551234567".to_string()]);
    }

    #[tokio::test]
    async fn test_pairing_without_client() {
        let state = test_state();
        let reply = post_pairing(&state, r#"{"phone_number":"15551234567"}"#).await;

        assert_eq!(reply.success, Some(false));
        assert_eq!(reply.error.as_deref(), Some("Client not initialized"));
    }

    #[tokio::test]
    async fn test_pairing_success_is_stored() {
        let state = test_state();
        let client = MockClient::ok("WXYZ-9876");
        state.status.set_client(client.clone());

        let reply = post_pairing(&state, r#"{"phone_number":"15551234567"}"#).await;
        assert_eq!(
            reply,
            PairingReply {
                success: Some(true),
                pairing_code: Some("WXYZ-9876".to_string()),
                ..Default::default()
            }
        );
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
        assert_eq!(state.status.snapshot().pairing_code, "WXYZ-9876");
    }

    #[tokio::test]
    async fn test_pairing_failure_reports_error() {
        let state = test_state();
        state.status.set_client(MockClient::failing("rate-overlimit"));

        let reply = post_pairing(&state, r#"{"phone_number":"15551234567"}"#).await;
        assert_eq!(reply.success, Some(false));
        assert_eq!(reply.error.as_deref(), Some("rate-overlimit"));
        assert_eq!(state.status.snapshot().pairing_code, "");
    }

    #[tokio::test]
    async fn test_status_mirrors_store() {
        let state = test_state();

        let response = send(&state, Method::GET, "/status", "").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"qr_code": "", "pairing_code": "", "connected": false})
        );

        state.status.set_qr_code("2@qr");
        state.status.set_pairing_code("ABCD-EFGH");
        state.status.set_connected(true);

        let response = send(&state, Method::GET, "/status", "").await;
        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"qr_code": "2@qr", "pairing_code": "ABCD-EFGH", "connected": true})
        );
    }

    #[tokio::test]
    async fn test_status_under_concurrent_writers() {
        let state = test_state();

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let status = Arc::clone(&state.status);
                std::thread::spawn(move || {
                    for n in 0..200 {
                        status.set_qr_code(format!("qr-{}-{}", w, n));
                        status.set_connected(n % 2 == 1);
                    }
                })
            })
            .collect();

        for _ in 0..20 {
            let response = send(&state, Method::GET, "/status", "").await;
            let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
            let qr = json["qr_code"].as_str().unwrap();
            assert!(qr.is_empty() || qr.starts_with("qr-"));
        }

        for writer in writers {
            writer.join().unwrap();
        }

        let snapshot = state.status.snapshot();
        assert!(snapshot.qr_code.ends_with("-199"));
        assert!(snapshot.connected);
    }

    #[tokio::test]
    async fn test_health() {
        let state = test_state();
        let response = send(&state, Method::GET, "/health", "").await;
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["mode"], "public");
    }

    #[tokio::test]
    async fn test_every_route_answers_any_method() {
        let state = test_state();

        for uri in ["/qr", "/pairing", "/status", "/health"] {
            for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
                let response = send(&state, method.clone(), uri, "{}").await;
                assert_eq!(response.status(), StatusCode::OK, "{} {}", method, uri);
            }
        }
    }

    #[tokio::test]
    async fn test_serve_returns_on_bind_failure() {
        let mut config = Config::default();
        config.port = "not-a-port".to_string();
        let state = Arc::new(AppState::new(Arc::new(config), Arc::new(StatusStore::new())));

        // Returns instead of panicking or hanging
        tokio::time::timeout(std::time::Duration::from_secs(5), serve(state))
            .await
            .unwrap();
    }
}
