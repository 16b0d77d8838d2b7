// User domain model and the sign-in / sign-up form checks
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub balance: f64,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Fabricate a brand new account; there is no backend to ask for an id.
    pub fn fabricate(email: &str, name: &str, starting_credit: f64, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.trim().to_string(),
            name: name.trim().to_string(),
            balance: starting_credit,
            created_at: now,
        }
    }

    /// Display name used when signing in without one: the local part of the email
    pub fn name_from_email(email: &str) -> String {
        email.trim().split('@').next().unwrap_or_default().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct FormError {
    pub field: &'static str,
    pub message: String,
}

impl FormError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormError> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err(FormError::new("password", "password is required"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::new("name", "name is required"));
        }
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FormError::new(
                "password",
                format!("password must be at least {MIN_PASSWORD_LEN} characters"),
            ));
        }
        if let Some(confirm) = &self.confirm_password {
            if confirm != &self.password {
                return Err(FormError::new("confirmPassword", "passwords do not match"));
            }
        }
        Ok(())
    }
}

fn validate_email(email: &str) -> Result<(), FormError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(FormError::new("email", "email is required"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(FormError::new("email", "email address is invalid")),
    }
}
