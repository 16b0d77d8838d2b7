// HTTP error mapping for every service error
use crate::application::account_service::AccountError;
use crate::application::checkout_service::CheckoutError;
use crate::application::deploy_service::DeployError;
use crate::application::instance_service::InstanceError;
use crate::application::session_service::SessionError;
use crate::application::wizard_registry::RegistryError;
use crate::domain::user::FormError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
    pub field: Option<&'static str>,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            field: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", "not signed in")
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.kind,
            "message": self.message,
            "field": self.field,
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<FormError> for ApiError {
    fn from(e: FormError) -> Self {
        let mut err = Self::new(StatusCode::UNPROCESSABLE_ENTITY, "validation", e.message.clone());
        err.field = Some(e.field);
        err
    }
}

impl From<SessionError> for ApiError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Validation(form) => form.into(),
            SessionError::Unauthorized => Self::unauthorized(),
            SessionError::Storage(storage) => {
                tracing::error!("Session storage failure: {}", storage);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "storage", storage.to_string())
            }
        }
    }
}

impl From<InstanceError> for ApiError {
    fn from(e: InstanceError) -> Self {
        match e {
            InstanceError::NotFound(_) => Self::not_found(e.to_string()),
            InstanceError::UnknownGpu(_) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "validation", e.to_string())
            }
            InstanceError::InvalidState { .. } => {
                Self::new(StatusCode::CONFLICT, "invalid_state", e.to_string())
            }
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::KeyNotFound(_) => Self::not_found(e.to_string()),
            AccountError::DuplicateKey(_) => Self::new(StatusCode::CONFLICT, "conflict", e.to_string()),
            AccountError::MissingKeyName | AccountError::InvalidPublicKey => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "validation", e.to_string())
            }
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::NotFound { .. } => Self::not_found(e.to_string()),
            RegistryError::Wizard(_) => Self::new(StatusCode::CONFLICT, "wizard", e.to_string()),
        }
    }
}

impl From<DeployError> for ApiError {
    fn from(e: DeployError) -> Self {
        match e {
            DeployError::Wizard(e) => e.into(),
            DeployError::Instance(e) => e.into(),
            DeployError::UnknownSshKey(_) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "validation", e.to_string())
            }
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(e: CheckoutError) -> Self {
        match e {
            CheckoutError::Wizard(e) => e.into(),
            CheckoutError::Session(e) => e.into(),
            CheckoutError::Validation(e) => e.into(),
        }
    }
}
