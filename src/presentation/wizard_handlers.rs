// HTTP handlers for the deploy and checkout wizards
use crate::application::checkout_service::Receipt;
use crate::application::deploy_service::Deployment;
use crate::application::wizard_registry::{WizardRegistry, WizardView};
use crate::domain::checkout::CheckoutFlow;
use crate::domain::deploy::DeployFlow;
use crate::domain::wizard::WizardFlow;
use crate::presentation::app_state::AppState;
use crate::presentation::error::ApiError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// Flows reachable over HTTP, each backed by a registry in [`AppState`]
pub trait WizardRoutes: WizardFlow + Sized {
    fn registry(state: &AppState) -> &WizardRegistry<Self>;
}

impl WizardRoutes for DeployFlow {
    fn registry(state: &AppState) -> &WizardRegistry<Self> {
        state.deploy.wizards()
    }
}

impl WizardRoutes for CheckoutFlow {
    fn registry(state: &AppState) -> &WizardRegistry<Self> {
        state.checkout.wizards()
    }
}

type ViewResult<F> = Result<Json<WizardView<<F as WizardFlow>::Draft>>, ApiError>;

pub async fn create_wizard<F: WizardRoutes>(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<WizardView<F::Draft>>) {
    (StatusCode::CREATED, Json(F::registry(&state).create().await))
}

pub async fn get_wizard<F: WizardRoutes>(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> ViewResult<F> {
    Ok(Json(F::registry(&state).view(id).await?))
}

pub async fn patch_wizard<F: WizardRoutes>(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
    Json(patch): Json<F::Patch>,
) -> ViewResult<F> {
    Ok(Json(F::registry(&state).update(id, patch).await?))
}

pub async fn next_step<F: WizardRoutes>(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> ViewResult<F> {
    Ok(Json(F::registry(&state).next(id).await?))
}

pub async fn previous_step<F: WizardRoutes>(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> ViewResult<F> {
    Ok(Json(F::registry(&state).back(id).await?))
}

pub async fn submit_deploy(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<Deployment>), ApiError> {
    let deployment = state.deploy.submit(id).await?;
    Ok((StatusCode::CREATED, Json(deployment)))
}

pub async fn submit_checkout(
    Path(id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Receipt>, ApiError> {
    Ok(Json(state.checkout.submit(id).await?))
}
