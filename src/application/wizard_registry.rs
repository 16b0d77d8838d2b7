// Live wizards keyed by id, one registry per flow
use crate::domain::wizard::{Phase, Wizard, WizardError, WizardFlow};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("no {flow} wizard with id {id}")]
    NotFound { flow: &'static str, id: Uuid },
    #[error(transparent)]
    Wizard(#[from] WizardError),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView<D> {
    pub id: Uuid,
    pub flow: &'static str,
    pub step: usize,
    pub step_name: &'static str,
    pub total_steps: usize,
    pub steps: &'static [&'static str],
    pub can_advance: bool,
    pub phase: Phase,
    pub draft: D,
}

impl<D: Clone> WizardView<D> {
    fn of<F: WizardFlow<Draft = D>>(id: Uuid, wizard: &Wizard<F>) -> Self {
        Self {
            id,
            flow: F::NAME,
            step: wizard.step(),
            step_name: wizard.step_name(),
            total_steps: Wizard::<F>::total_steps(),
            steps: F::STEPS,
            can_advance: wizard.current_step_valid(),
            phase: wizard.phase(),
            draft: wizard.draft().clone(),
        }
    }
}

pub struct WizardRegistry<F: WizardFlow> {
    wizards: Arc<Mutex<HashMap<Uuid, Wizard<F>>>>,
}

impl<F: WizardFlow> Clone for WizardRegistry<F> {
    fn clone(&self) -> Self {
        Self {
            wizards: self.wizards.clone(),
        }
    }
}

impl<F: WizardFlow> Default for WizardRegistry<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: WizardFlow> WizardRegistry<F> {
    pub fn new() -> Self {
        Self {
            wizards: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn create(&self) -> WizardView<F::Draft> {
        let id = Uuid::new_v4();
        let wizard = Wizard::<F>::new();
        let view = WizardView::of(id, &wizard);
        self.wizards.lock().await.insert(id, wizard);
        tracing::debug!("Opened {} wizard {}", F::NAME, id);
        view
    }

    pub async fn view(&self, id: Uuid) -> Result<WizardView<F::Draft>, RegistryError> {
        self.with(id, |wizard| Ok(WizardView::of(id, wizard))).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        patch: F::Patch,
    ) -> Result<WizardView<F::Draft>, RegistryError> {
        self.with(id, |wizard| {
            wizard.apply(patch)?;
            Ok(WizardView::of(id, wizard))
        })
        .await
    }

    pub async fn next(&self, id: Uuid) -> Result<WizardView<F::Draft>, RegistryError> {
        self.with(id, |wizard| {
            wizard.next()?;
            Ok(WizardView::of(id, wizard))
        })
        .await
    }

    pub async fn back(&self, id: Uuid) -> Result<WizardView<F::Draft>, RegistryError> {
        self.with(id, |wizard| {
            wizard.back()?;
            Ok(WizardView::of(id, wizard))
        })
        .await
    }

    /// Lock the wizard for its terminal action; a second call while the
    /// first is in flight gets `AlreadySubmitting`.
    pub async fn begin_submit(&self, id: Uuid) -> Result<F::Draft, RegistryError> {
        self.with(id, |wizard| Ok(wizard.begin_submit()?)).await
    }

    /// Complete the wizard and drop it from the registry; the returned view
    /// is the last one it will ever have.
    pub async fn finish_submit(&self, id: Uuid) -> Result<WizardView<F::Draft>, RegistryError> {
        let mut wizards = self.wizards.lock().await;
        let mut wizard = wizards
            .remove(&id)
            .ok_or(RegistryError::NotFound { flow: F::NAME, id })?;
        wizard.finish_submit();
        tracing::debug!("Closed {} wizard {}", F::NAME, id);
        Ok(WizardView::of(id, &wizard))
    }

    pub async fn abort_submit(&self, id: Uuid) {
        let _ = self
            .with(id, |wizard| {
                wizard.abort_submit();
                Ok(())
            })
            .await;
    }

    async fn with<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut Wizard<F>) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let mut wizards = self.wizards.lock().await;
        let wizard = wizards
            .get_mut(&id)
            .ok_or(RegistryError::NotFound { flow: F::NAME, id })?;
        f(wizard)
    }
}
