// Session service - the fake sign-in, mirrored write-through to storage
use crate::application::session_store::{SessionStorage, StorageError};
use crate::domain::user::{FormError, LoginForm, RegisterForm, User};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;

pub const STARTING_CREDIT: f64 = 100.00;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] FormError),
    #[error("not signed in")]
    Unauthorized,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Artificial latency of login/register
    pub delay: Duration,
    pub starting_credit: f64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1000),
            starting_credit: STARTING_CREDIT,
        }
    }
}

#[derive(Clone)]
pub struct SessionService {
    storage: Arc<dyn SessionStorage>,
    current: Arc<Mutex<Option<User>>>,
    settings: SessionSettings,
}

impl SessionService {
    pub fn new(storage: Arc<dyn SessionStorage>, settings: SessionSettings) -> Self {
        Self {
            storage,
            current: Arc::new(Mutex::new(None)),
            settings,
        }
    }

    /// Read the persisted record once at startup.
    ///
    /// A record that cannot be read or parsed is ignored and the service
    /// starts signed out; the file is left for the next write to replace.
    pub async fn restore(&self) -> Option<User> {
        let restored = match self.storage.load().await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("Ignoring persisted session: {}", e);
                None
            }
        };

        if let Some(user) = &restored {
            tracing::info!("Restored session for {}", user.email);
        }

        let mut current = self.current.lock().await;
        *current = restored.clone();
        restored
    }

    pub async fn current(&self) -> Option<User> {
        self.current.lock().await.clone()
    }

    /// Current user, or `Unauthorized` when signed out
    pub async fn require_user(&self) -> Result<User, SessionError> {
        self.current().await.ok_or(SessionError::Unauthorized)
    }

    /// Sign in. The password is checked for presence only.
    pub async fn login(&self, form: LoginForm) -> Result<User, SessionError> {
        form.validate()?;
        tokio::time::sleep(self.settings.delay).await;

        let name = User::name_from_email(&form.email);
        let user = User::fabricate(&form.email, &name, self.settings.starting_credit, Utc::now());
        self.establish(user).await
    }

    pub async fn register(&self, form: RegisterForm) -> Result<User, SessionError> {
        form.validate()?;
        tokio::time::sleep(self.settings.delay).await;

        let user = User::fabricate(&form.email, &form.name, self.settings.starting_credit, Utc::now());
        self.establish(user).await
    }

    pub async fn logout(&self) -> Result<(), SessionError> {
        let mut current = self.current.lock().await;
        self.storage.clear().await?;
        if let Some(user) = current.take() {
            tracing::info!("Signed out {}", user.email);
        }
        Ok(())
    }

    /// Add `delta` to the balance and persist. `Ok(None)` when signed out.
    pub async fn update_balance(&self, delta: f64) -> Result<Option<User>, SessionError> {
        if !delta.is_finite() {
            return Err(FormError::new("delta", "amount must be a finite number").into());
        }

        let mut current = self.current.lock().await;
        let Some(user) = current.as_ref() else {
            return Ok(None);
        };

        let mut updated = user.clone();
        updated.balance += delta;
        self.storage.save(&updated).await?;

        tracing::debug!("Balance for {} is now {:.2}", updated.email, updated.balance);
        *current = Some(updated.clone());
        Ok(Some(updated))
    }

    async fn establish(&self, user: User) -> Result<User, SessionError> {
        let mut current = self.current.lock().await;
        // Storage first: memory only changes once the record is durable
        self.storage.save(&user).await?;
        tracing::info!("Signed in {} ({})", user.email, user.id);
        *current = Some(user.clone());
        Ok(user)
    }
}
