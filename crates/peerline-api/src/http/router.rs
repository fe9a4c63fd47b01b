//! Axum router configuration with middleware.
//!
//! Chat routes live under `/api/peer-chat` and `/api/agent-chat`.
//! Middleware: CORS, tracing.

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers::chat;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let peer_routes = Router::new()
        .route("/start", post(chat::start_peer_session))
        .merge(session_routes());

    let agent_routes = Router::new()
        .route("/start", post(chat::start_agent_session))
        .merge(session_routes());

    Router::new()
        .nest("/api/peer-chat", peer_routes)
        .nest("/api/agent-chat", agent_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Routes that act on an existing session, shared by both session types.
fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(chat::get_session))
        .route("/{id}/message", post(chat::post_message))
        .route("/{id}/messages", get(chat::get_messages))
        .route("/{id}/close", post(chat::close_session))
        .route("/{id}/read", post(chat::mark_read))
        .route("/{id}/claim", post(chat::claim_session))
        .route("/{id}/unread", get(chat::unread_count))
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use peerline_types::config::GlobalConfig;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_state() -> (AppState, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = GlobalConfig::default();
        config.chat.long_poll_max_secs = 1;
        let state = AppState::init(tmp.path().to_path_buf(), config).await.unwrap();
        (state, tmp)
    }

    async fn send(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn start_peer(state: &AppState) -> String {
        let (status, body) = send(state, "POST", "/api/peer-chat/start", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        body["sessionId"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_reports_version() {
        let (state, _tmp) = test_state().await;
        let (status, body) = send(&state, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn start_assigns_available_advocate() {
        let (state, _tmp) = test_state().await;
        state.advocates().upsert("A1", None).await.unwrap();
        state.advocates().upsert("A2", None).await.unwrap();
        state.advocates().set_available("A2", false).await.unwrap();

        let (status, body) =
            send(&state, "POST", "/api/peer-chat/start", Some(json!({ "userId": "u-1" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["peerAdvocateId"], "A1");
        assert!(body["sessionId"].is_string());
    }

    #[tokio::test]
    async fn start_without_advocates_is_unassigned() {
        let (state, _tmp) = test_state().await;
        let (status, body) = send(&state, "POST", "/api/peer-chat/start", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.get("peerAdvocateId").is_none());
    }

    #[tokio::test]
    async fn conversation_round_trip() {
        let (state, _tmp) = test_state().await;
        let sid = start_peer(&state).await;

        let (status, body) = send(
            &state,
            "POST",
            &format!("/api/peer-chat/{sid}/message"),
            Some(json!({ "content": "Hello", "from": "user" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["message"]["id"], 1);
        assert_eq!(body["message"]["source"], "peer");

        send(
            &state,
            "POST",
            &format!("/api/peer-chat/{sid}/message"),
            Some(json!({ "content": "Hi, how can I help?", "from": "peer" })),
        )
        .await;

        let (status, body) =
            send(&state, "GET", &format!("/api/peer-chat/{sid}/messages?after=0"), None).await;
        assert_eq!(status, StatusCode::OK);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["content"], "Hello");
        assert_eq!(messages[1]["id"], 2);

        let (_, body) =
            send(&state, "GET", &format!("/api/peer-chat/{sid}/messages?after=1"), None).await;
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn post_after_close_conflicts() {
        let (state, _tmp) = test_state().await;
        let sid = start_peer(&state).await;

        let (status, body) = send(&state, "POST", &format!("/api/peer-chat/{sid}/close"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        let (status, _) = send(&state, "POST", &format!("/api/peer-chat/{sid}/close"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(
            &state,
            "POST",
            &format!("/api/peer-chat/{sid}/message"),
            Some(json!({ "content": "still there?", "from": "user" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "SESSION_CLOSED");
    }

    #[tokio::test]
    async fn validation_failures_are_bad_requests() {
        let (state, _tmp) = test_state().await;
        let sid = start_peer(&state).await;

        let (status, body) = send(
            &state,
            "POST",
            &format!("/api/peer-chat/{sid}/message"),
            Some(json!({ "content": "   ", "from": "user" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "EMPTY_CONTENT");

        let (status, _) = send(
            &state,
            "POST",
            &format!("/api/peer-chat/{sid}/message"),
            Some(json!({ "content": "hi", "from": "agent" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &state,
            "POST",
            &format!("/api/peer-chat/{sid}/message"),
            Some(json!({ "content": "hi", "from": "robot" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_session_id_is_not_found() {
        let (state, _tmp) = test_state().await;

        let (status, body) = send(&state, "GET", "/api/peer-chat/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, _) = send(&state, "POST", "/api/agent-chat/12345/close", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn start_accepts_missing_body() {
        let (state, _tmp) = test_state().await;

        let (status, body) = send(&state, "POST", "/api/peer-chat/start", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["sessionId"].is_string());

        let (status, body) = send(&state, "POST", "/api/agent-chat/start", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["sessionId"].is_string());
    }

    #[tokio::test]
    async fn start_rejects_unknown_fields() {
        let (state, _tmp) = test_state().await;

        let (status, body) = send(
            &state,
            "POST",
            "/api/peer-chat/start",
            Some(json!({ "userId": "u-1", "advocate": "A1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_INPUT");

        let (status, _) = send(
            &state,
            "POST",
            "/api/agent-chat/start",
            Some(json!({ "peerAdvocateId": "A1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (state, _tmp) = test_state().await;
        let sid = uuid::Uuid::now_v7();

        let (status, body) = send(&state, "GET", &format!("/api/peer-chat/{sid}/messages"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");

        let (status, _) = send(&state, "POST", &format!("/api/peer-chat/{sid}/close"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn read_receipts_and_unread() {
        let (state, _tmp) = test_state().await;
        let sid = start_peer(&state).await;
        send(
            &state,
            "POST",
            &format!("/api/peer-chat/{sid}/message"),
            Some(json!({ "content": "Hello", "from": "peer" })),
        )
        .await;

        let (_, body) =
            send(&state, "GET", &format!("/api/peer-chat/{sid}/unread?viewer=user"), None).await;
        assert_eq!(body["unread"], 1);

        let (status, body) = send(
            &state,
            "POST",
            &format!("/api/peer-chat/{sid}/read"),
            Some(json!({ "messageId": 1, "readerRole": "user" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"]["readAt"].is_string());

        let (_, body) =
            send(&state, "GET", &format!("/api/peer-chat/{sid}/unread?viewer=user"), None).await;
        assert_eq!(body["unread"], 0);

        let (status, _) = send(
            &state,
            "POST",
            &format!("/api/peer-chat/{sid}/read"),
            Some(json!({ "messageId": 99, "readerRole": "user" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn claim_unassigned_session() {
        let (state, _tmp) = test_state().await;
        let sid = start_peer(&state).await;

        let (status, body) = send(
            &state,
            "POST",
            &format!("/api/peer-chat/{sid}/claim"),
            Some(json!({ "advocateId": "A7" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"]["peerAdvocateId"], "A7");

        let (status, body) = send(
            &state,
            "POST",
            &format!("/api/peer-chat/{sid}/claim"),
            Some(json!({ "advocateId": "A8" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "ALREADY_ASSIGNED");

        let (_, body) = send(&state, "GET", &format!("/api/peer-chat/{sid}"), None).await;
        assert_eq!(body["session"]["type"], "peer");
        assert_eq!(body["session"]["status"], "open");
    }

    #[tokio::test]
    async fn agent_session_flow() {
        let (state, _tmp) = test_state().await;
        let (status, body) =
            send(&state, "POST", "/api/agent-chat/start", Some(json!({ "userId": "u-9" }))).await;
        assert_eq!(status, StatusCode::OK);
        let sid = body["sessionId"].as_str().unwrap().to_string();

        let (status, body) = send(
            &state,
            "POST",
            &format!("/api/agent-chat/{sid}/message"),
            Some(json!({ "content": "Hello bot", "from": "agent" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"]["source"], "agent");

        let (status, _) = send(
            &state,
            "POST",
            &format!("/api/agent-chat/{sid}/message"),
            Some(json!({ "content": "hi", "from": "user", "source": "peer" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &state,
            "POST",
            "/api/agent-chat/start",
            Some(json!({ "peerAdvocateId": "A1" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn long_poll_times_out_empty() {
        let (state, _tmp) = test_state().await;
        let sid = start_peer(&state).await;

        let started = std::time::Instant::now();
        let (status, body) = send(
            &state,
            "GET",
            &format!("/api/peer-chat/{sid}/messages?after=0&wait=30"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["messages"].as_array().unwrap().is_empty());
        // Clamped to long_poll_max_secs = 1.
        assert!(started.elapsed() < std::time::Duration::from_secs(10));
    }

    #[tokio::test]
    async fn long_poll_wakes_on_post() {
        let (state, _tmp) = test_state().await;
        let sid = start_peer(&state).await;

        let poller = {
            let state = state.clone();
            let sid = sid.clone();
            tokio::spawn(async move {
                send(&state, "GET", &format!("/api/peer-chat/{sid}/messages?after=0&wait=1"), None).await
            })
        };

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        send(
            &state,
            "POST",
            &format!("/api/peer-chat/{sid}/message"),
            Some(json!({ "content": "ping", "from": "user" })),
        )
        .await;

        let (status, body) = poller.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["messages"][0]["content"], "ping");
    }
}
