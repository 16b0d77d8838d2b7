// HTTP request handlers
use crate::application::monitoring_service::{InstanceMetrics, MetricTick};
use crate::domain::catalog::{GpuOffering, Instance, SshKey, Transaction};
use crate::domain::payment::{CryptoCurrency, Quote};
use crate::domain::user::{LoginForm, RegisterForm, User};
use crate::infrastructure::ndjson_stream::stream_response;
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

#[derive(Deserialize)]
pub struct BalanceRequest {
    pub delta: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSshKeyRequest {
    pub name: String,
    pub public_key: String,
}

#[derive(Deserialize)]
pub struct QuoteQuery {
    pub amount: f64,
    pub currency: CryptoCurrency,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoringSnapshot {
    pub instance_id: String,
    pub refresh_interval_secs: u64,
    pub metrics: InstanceMetrics,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitoringEvent {
    Snapshot(MonitoringSnapshot),
    Tick(MetricTick),
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn current_session(State(state): State<Arc<AppState>>) -> Result<Json<User>, ApiError> {
    state
        .session
        .current()
        .await
        .map(Json)
        .ok_or_else(ApiError::unauthorized)
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(form): Json<LoginForm>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.session.login(form).await?))
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(form): Json<RegisterForm>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.session.register(form).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn logout(State(state): State<Arc<AppState>>) -> Result<StatusCode, ApiError> {
    state.session.logout().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Adjust the balance; responds with `null` when nobody is signed in
pub async fn update_balance(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BalanceRequest>,
) -> Result<Json<Option<User>>, ApiError> {
    Ok(Json(state.session.update_balance(request.delta).await?))
}

pub async fn list_gpus(State(state): State<Arc<AppState>>) -> Json<Vec<GpuOffering>> {
    Json(state.instances.list_gpus())
}

pub async fn list_instances(State(state): State<Arc<AppState>>) -> Json<Vec<Instance>> {
    Json(state.instances.list_instances().await)
}

pub async fn start_instance(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Instance>, ApiError> {
    Ok(Json(state.instances.start(&id).await?))
}

pub async fn stop_instance(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Instance>, ApiError> {
    Ok(Json(state.instances.stop(&id).await?))
}

pub async fn delete_instance(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    state.instances.delete(&id).await?;
    state.monitoring.forget(&id).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_ssh_keys(State(state): State<Arc<AppState>>) -> Json<Vec<SshKey>> {
    Json(state.accounts.list_ssh_keys().await)
}

pub async fn add_ssh_key(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewSshKeyRequest>,
) -> Result<(StatusCode, Json<SshKey>), ApiError> {
    let key = state
        .accounts
        .add_ssh_key(&request.name, &request.public_key)
        .await?;
    Ok((StatusCode::CREATED, Json(key)))
}

pub async fn remove_ssh_key(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, ApiError> {
    state.accounts.remove_ssh_key(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_transactions(State(state): State<Arc<AppState>>) -> Json<Vec<Transaction>> {
    Json(state.accounts.list_transactions().await)
}

pub async fn checkout_quote(
    Query(query): Query<QuoteQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Quote>, ApiError> {
    Ok(Json(state.checkout.quote(query.amount, query.currency)?))
}

pub async fn monitoring_snapshot(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MonitoringSnapshot>, ApiError> {
    state.instances.get(&id).await?;
    Ok(Json(snapshot_of(&state, id).await))
}

/// Stream the current window, then every refresh for this instance
pub async fn monitoring_stream(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    state.instances.get(&id).await?;

    // Subscribe before the snapshot so no tick is missed between the two
    let mut rx = state.monitoring.subscribe();
    let snapshot = snapshot_of(&state, id.clone()).await;

    let stream = async_stream::stream! {
        yield MonitoringEvent::Snapshot(snapshot);
        loop {
            match rx.recv().await {
                Ok(tick) if tick.instance_id == id => {
                    yield MonitoringEvent::Tick(tick);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Monitoring stream for {} skipped {} samples", id, skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Ok(stream_response(stream).into_response())
}

async fn snapshot_of(state: &AppState, instance_id: String) -> MonitoringSnapshot {
    let metrics = state.monitoring.snapshot(&instance_id).await;
    MonitoringSnapshot {
        instance_id,
        refresh_interval_secs: state.monitoring.refresh_interval().as_secs(),
        metrics,
    }
}
