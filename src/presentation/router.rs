// Route table
use crate::domain::checkout::CheckoutFlow;
use crate::domain::deploy::DeployFlow;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::*;
use crate::presentation::wizard_handlers::*;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/session", get(current_session))
        .route("/session/login", post(login))
        .route("/session/register", post(register))
        .route("/session/logout", post(logout))
        .route("/session/balance", post(update_balance))
        .route("/catalog/gpus", get(list_gpus))
        .route("/instances", get(list_instances))
        .route("/instances/:id", delete(delete_instance))
        .route("/instances/:id/start", post(start_instance))
        .route("/instances/:id/stop", post(stop_instance))
        .route("/ssh-keys", get(list_ssh_keys).post(add_ssh_key))
        .route("/ssh-keys/:id", delete(remove_ssh_key))
        .route("/transactions", get(list_transactions))
        .route("/checkout/quote", get(checkout_quote))
        .route("/monitoring/:id", get(monitoring_snapshot))
        .route("/monitoring/:id/stream", get(monitoring_stream))
        .route("/wizards/deploy", post(create_wizard::<DeployFlow>))
        .route(
            "/wizards/deploy/:id",
            get(get_wizard::<DeployFlow>).patch(patch_wizard::<DeployFlow>),
        )
        .route("/wizards/deploy/:id/next", post(next_step::<DeployFlow>))
        .route("/wizards/deploy/:id/back", post(previous_step::<DeployFlow>))
        .route("/wizards/deploy/:id/submit", post(submit_deploy))
        .route("/wizards/checkout", post(create_wizard::<CheckoutFlow>))
        .route(
            "/wizards/checkout/:id",
            get(get_wizard::<CheckoutFlow>).patch(patch_wizard::<CheckoutFlow>),
        )
        .route("/wizards/checkout/:id/next", post(next_step::<CheckoutFlow>))
        .route("/wizards/checkout/:id/back", post(previous_step::<CheckoutFlow>))
        .route("/wizards/checkout/:id/submit", post(submit_checkout))
        .with_state(state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::{ConsoleConfig, DelayConfig};
    use crate::infrastructure::memory_session_store::MemorySessionStorage;
    use axum::body::Body;
    use axum::body::BodyDataStream;
    use axum::http::{header, Method, Request, StatusCode};
    use chrono::Utc;
    use futures::StreamExt;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app_state() -> Arc<AppState> {
        let config = ConsoleConfig {
            delays: DelayConfig {
                login_ms: 0,
                deploy_ms: 0,
                payment_ms: 0,
                boot_ms: 0,
            },
            ..Default::default()
        };
        Arc::new(AppState::from_config(
            &config,
            Arc::new(MemorySessionStorage::new()),
        ))
    }

    async fn send(state: &Arc<AppState>, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let resp = router(state.clone())
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_healthz_returns_ok() {
        let state = app_state();
        let resp = router(state)
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let state = app_state();

        let (status, _) = send(&state, Method::GET, "/session", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, user) = send(
            &state,
            Method::POST,
            "/session/login",
            Some(json!({"email": "a@b.com", "password": "x"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["email"], "a@b.com");
        assert_eq!(user["balance"], 100.0);

        let (_, user) = send(&state, Method::POST, "/session/balance", Some(json!({"delta": 12.5}))).await;
        assert_eq!(user["balance"], 112.5);

        let (status, _) = send(&state, Method::POST, "/session/logout", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&state, Method::POST, "/session/balance", Some(json!({"delta": 1.0}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_null());
    }

    #[tokio::test]
    async fn test_register_validation_error() {
        let state = app_state();
        let (status, body) = send(
            &state,
            Method::POST,
            "/session/register",
            Some(json!({"email": "a@b.com", "password": "short", "name": "A"})),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "validation");
        assert_eq!(body["field"], "password");
    }

    #[tokio::test]
    async fn test_monitoring_snapshot_for_seeded_instance() {
        let state = app_state();
        let (status, body) = send(&state, Method::GET, "/monitoring/inst-7f3a9c", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["instanceId"], "inst-7f3a9c");
        let samples = body["metrics"]["gpu_utilization"]["samples"].as_array().unwrap();
        assert_eq!(samples.len(), 60);

        let (status, _) = send(&state, Method::GET, "/monitoring/inst-missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    /// Pull `count` NDJSON lines off an open body
    async fn read_lines(body: &mut BodyDataStream, buffer: &mut Vec<u8>, count: usize) -> Vec<Value> {
        let mut lines = Vec::new();
        while lines.len() < count {
            if let Some(end) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=end).collect();
                lines.push(serde_json::from_slice(&line).unwrap());
                continue;
            }
            let chunk = tokio::time::timeout(Duration::from_secs(2), body.next())
                .await
                .expect("stream stalled")
                .expect("stream ended")
                .unwrap();
            buffer.extend_from_slice(&chunk);
        }
        lines
    }

    #[tokio::test]
    async fn test_monitoring_stream_sends_snapshot_then_own_ticks() {
        let state = app_state();
        // Both seeded instances have live series, so both publish ticks
        state.monitoring.snapshot("inst-2b81d4").await;

        let resp = router(state.clone())
            .oneshot(
                Request::builder()
                    .uri("/monitoring/inst-7f3a9c/stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/x-ndjson"
        );

        let mut body = resp.into_body().into_data_stream();
        let mut buffer = Vec::new();

        let snapshot = read_lines(&mut body, &mut buffer, 1).await.remove(0);
        assert_eq!(snapshot["type"], "snapshot");
        assert_eq!(snapshot["instanceId"], "inst-7f3a9c");
        assert_eq!(snapshot["metrics"]["cpu"]["samples"].as_array().unwrap().len(), 60);

        assert_eq!(state.monitoring.tick_all(Utc::now()).await, 8);
        assert_eq!(state.monitoring.tick_all(Utc::now()).await, 8);

        // Two rounds of four kinds for this instance; the other instance's
        // ticks never show up
        let ticks = read_lines(&mut body, &mut buffer, 8).await;
        for tick in &ticks {
            assert_eq!(tick["type"], "tick");
            assert_eq!(tick["instanceId"], "inst-7f3a9c");
        }
        assert!(buffer.is_empty());
        assert!(
            tokio::time::timeout(Duration::from_millis(50), body.next())
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_monitoring_stream_unknown_instance() {
        let state = app_state();
        let (status, body) = send(&state, Method::GET, "/monitoring/inst-missing/stream", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_checkout_quote_endpoint() {
        let state = app_state();
        let (status, body) = send(&state, Method::GET, "/checkout/quote?amount=100&currency=ETH", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["amount"], 0.028571);
        assert_eq!(body["currency"], "ETH");
    }

    #[tokio::test]
    async fn test_deploy_wizard_over_http() {
        let state = app_state();

        let (status, wizard) = send(&state, Method::POST, "/wizards/deploy", None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(wizard["step"], 1);
        let id = wizard["id"].as_str().unwrap().to_string();

        let (status, body) = send(&state, Method::POST, &format!("/wizards/deploy/{id}/next"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "wizard");

        let (status, wizard) = send(
            &state,
            Method::PATCH,
            &format!("/wizards/deploy/{id}"),
            Some(json!({"gpuId": "l40s", "name": "render", "region": "us-west"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(wizard["canAdvance"], true);

        for expected in 2..=4 {
            let (_, wizard) = send(&state, Method::POST, &format!("/wizards/deploy/{id}/next"), None).await;
            assert_eq!(wizard["step"], expected);
        }

        let (status, deployment) = send(&state, Method::POST, &format!("/wizards/deploy/{id}/submit"), None).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(deployment["instance"]["gpuId"], "l40s");
        assert_eq!(deployment["wizard"]["phase"], "completed");

        let (_, instances) = send(&state, Method::GET, "/instances", None).await;
        assert_eq!(instances.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_checkout_wizard_requires_session() {
        let state = app_state();
        let (_, wizard) = send(&state, Method::POST, "/wizards/checkout", None).await;
        let id = wizard["id"].as_str().unwrap().to_string();

        send(
            &state,
            Method::PATCH,
            &format!("/wizards/checkout/{id}"),
            Some(json!({"amount": 20.0, "currency": "USDT"})),
        )
        .await;
        for _ in 0..3 {
            send(&state, Method::POST, &format!("/wizards/checkout/{id}/next"), None).await;
        }

        let (status, _) = send(&state, Method::POST, &format!("/wizards/checkout/{id}/submit"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        send(
            &state,
            Method::POST,
            "/session/login",
            Some(json!({"email": "a@b.com", "password": "x"})),
        )
        .await;
        let (status, receipt) = send(&state, Method::POST, &format!("/wizards/checkout/{id}/submit"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(receipt["user"]["balance"], 120.0);
        assert_eq!(receipt["quote"]["amount"], 20.0);
    }

    #[tokio::test]
    async fn test_ssh_keys_and_instances() {
        let state = app_state();

        let (status, key) = send(
            &state,
            Method::POST,
            "/ssh-keys",
            Some(json!({"name": "ci", "publicKey": "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIBuild ci@runner"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let key_id = key["id"].as_str().unwrap().to_string();

        let (status, _) = send(&state, Method::DELETE, &format!("/ssh-keys/{key_id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, instance) = send(&state, Method::POST, "/instances/inst-2b81d4/start", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(instance["status"], "starting");

        let (status, _) = send(&state, Method::POST, "/instances/inst-2b81d4/start", None).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = send(&state, Method::DELETE, "/instances/inst-2b81d4", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
