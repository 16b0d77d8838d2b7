// Deploy service - drives the deploy wizard and provisions the mock instance
use crate::application::account_service::AccountService;
use crate::application::instance_service::{InstanceError, InstanceService, NewInstance};
use crate::application::wizard_registry::{RegistryError, WizardRegistry, WizardView};
use crate::domain::catalog::Instance;
use crate::domain::deploy::{DeployDraft, DeployFlow};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq)]
pub enum DeployError {
    #[error(transparent)]
    Wizard(#[from] RegistryError),
    #[error(transparent)]
    Instance(#[from] InstanceError),
    #[error("SSH key {0} not found")]
    UnknownSshKey(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct Deployment {
    pub wizard: WizardView<DeployDraft>,
    pub instance: Instance,
}

#[derive(Clone)]
pub struct DeployService {
    wizards: WizardRegistry<DeployFlow>,
    instances: InstanceService,
    accounts: AccountService,
    delay: Duration,
}

impl DeployService {
    pub fn new(instances: InstanceService, accounts: AccountService, delay: Duration) -> Self {
        Self {
            wizards: WizardRegistry::new(),
            instances,
            accounts,
            delay,
        }
    }

    pub fn wizards(&self) -> &WizardRegistry<DeployFlow> {
        &self.wizards
    }

    /// Terminal "Deploy" action. The wizard stays locked until the instance
    /// exists; any failure reopens it for editing.
    pub async fn submit(&self, id: Uuid) -> Result<Deployment, DeployError> {
        let draft = self.wizards.begin_submit(id).await?;

        match self.provision(draft).await {
            Ok(instance) => {
                let wizard = self.wizards.finish_submit(id).await?;
                Ok(Deployment { wizard, instance })
            }
            Err(e) => {
                tracing::warn!("Deploy wizard {} failed: {}", id, e);
                self.wizards.abort_submit(id).await;
                Err(e)
            }
        }
    }

    async fn provision(&self, draft: DeployDraft) -> Result<Instance, DeployError> {
        let gpu_id = draft.gpu_id.unwrap_or_default();
        if self.instances.gpu(&gpu_id).is_none() {
            return Err(InstanceError::UnknownGpu(gpu_id).into());
        }
        if let Some(key_id) = &draft.ssh_key_id {
            if !self.accounts.has_ssh_key(key_id).await {
                return Err(DeployError::UnknownSshKey(key_id.clone()));
            }
        }

        tokio::time::sleep(self.delay).await;

        let instance = self
            .instances
            .create(NewInstance {
                name: draft.name,
                gpu_id,
                gpu_count: draft.gpu_count,
                region: draft.region,
                disk_gb: draft.disk_gb,
            })
            .await?;
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::InstanceStatus;
    use crate::domain::deploy::DeployPatch;
    use crate::domain::wizard::{Phase, WizardError};
    use crate::infrastructure::mock_data;

    fn service(delay: Duration) -> DeployService {
        let instances = InstanceService::new(mock_data::gpu_catalog(), Vec::new(), Duration::from_millis(10));
        DeployService::new(instances, AccountService::new(Vec::new(), Vec::new()), delay)
    }

    async fn ready_wizard(service: &DeployService, gpu_id: &str) -> Uuid {
        let wizards = service.wizards();
        let id = wizards.create().await.id;
        wizards
            .update(
                id,
                DeployPatch {
                    gpu_id: Some(gpu_id.to_string()),
                    name: Some("finetune".to_string()),
                    region: Some("eu-west".to_string()),
                    gpu_count: Some(4),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        for _ in 0..3 {
            wizards.next(id).await.unwrap();
        }
        id
    }

    #[tokio::test]
    async fn test_submit_creates_instance() {
        let service = service(Duration::ZERO);
        let id = ready_wizard(&service, "h100-80g").await;

        let deployment = service.submit(id).await.unwrap();
        assert_eq!(deployment.instance.name, "finetune");
        assert_eq!(deployment.instance.gpu_count, 4);
        assert_eq!(deployment.instance.status, InstanceStatus::Starting);
        assert_eq!(deployment.wizard.phase, Phase::Completed);
        assert_eq!(service.instances.list_instances().await.len(), 1);
        assert!(matches!(
            service.wizards().view(id).await,
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_submit_from_earlier_step_rejected() {
        let service = service(Duration::ZERO);
        let id = service.wizards().create().await.id;
        assert_eq!(
            service.submit(id).await.unwrap_err(),
            DeployError::Wizard(RegistryError::Wizard(WizardError::NotFinalStep))
        );
    }

    #[tokio::test]
    async fn test_double_submit_rejected_while_in_flight() {
        let service = service(Duration::from_millis(100));
        let id = ready_wizard(&service, "h100-80g").await;

        let first = tokio::spawn({
            let service = service.clone();
            async move { service.submit(id).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(
            service.submit(id).await.unwrap_err(),
            DeployError::Wizard(RegistryError::Wizard(WizardError::AlreadySubmitting))
        );
        assert!(first.await.unwrap().is_ok());
        assert_eq!(service.instances.list_instances().await.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_gpu_reopens_wizard() {
        let service = service(Duration::ZERO);
        let id = ready_wizard(&service, "quantum-1").await;

        assert_eq!(
            service.submit(id).await.unwrap_err(),
            DeployError::Instance(InstanceError::UnknownGpu("quantum-1".to_string()))
        );
        let view = service.wizards().view(id).await.unwrap();
        assert_eq!(view.phase, Phase::Editing);
        assert_eq!(view.step, 4);
    }
}
