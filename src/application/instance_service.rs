// Instance service - GPU catalog lookups and the mock instance lifecycle
use crate::domain::catalog::{GpuOffering, Instance, InstanceStatus};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq)]
pub enum InstanceError {
    #[error("instance {0} not found")]
    NotFound(String),
    #[error("unknown GPU offering {0}")]
    UnknownGpu(String),
    #[error("instance {id} is {status:?}")]
    InvalidState { id: String, status: InstanceStatus },
}

/// What the deploy wizard hands over once confirmed
#[derive(Debug, Clone)]
pub struct NewInstance {
    pub name: String,
    pub gpu_id: String,
    pub gpu_count: u32,
    pub region: String,
    pub disk_gb: u32,
}

#[derive(Clone)]
pub struct InstanceService {
    catalog: Arc<Vec<GpuOffering>>,
    instances: Arc<RwLock<Vec<Instance>>>,
    boot_delay: Duration,
}

impl InstanceService {
    pub fn new(catalog: Vec<GpuOffering>, instances: Vec<Instance>, boot_delay: Duration) -> Self {
        Self {
            catalog: Arc::new(catalog),
            instances: Arc::new(RwLock::new(instances)),
            boot_delay,
        }
    }

    pub fn list_gpus(&self) -> Vec<GpuOffering> {
        self.catalog.to_vec()
    }

    pub fn gpu(&self, gpu_id: &str) -> Option<&GpuOffering> {
        self.catalog.iter().find(|g| g.id == gpu_id)
    }

    pub async fn list_instances(&self) -> Vec<Instance> {
        self.instances.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Result<Instance, InstanceError> {
        self.instances
            .read()
            .await
            .iter()
            .find(|i| i.id == id)
            .cloned()
            .ok_or_else(|| InstanceError::NotFound(id.to_string()))
    }

    /// Add an instance in `Starting`; it settles to `Running` after the boot delay.
    pub async fn create(&self, request: NewInstance) -> Result<Instance, InstanceError> {
        let gpu = self
            .gpu(&request.gpu_id)
            .ok_or_else(|| InstanceError::UnknownGpu(request.gpu_id.clone()))?;

        let instance = Instance {
            id: format!("inst-{}", Uuid::new_v4().simple()),
            name: request.name,
            gpu_id: gpu.id.clone(),
            gpu_count: request.gpu_count,
            region: request.region,
            disk_gb: request.disk_gb,
            status: InstanceStatus::Starting,
            hourly_cost: gpu.hourly_price * request.gpu_count as f64,
            created_at: Utc::now(),
        };

        self.instances.write().await.push(instance.clone());
        tracing::info!("Created instance {} ({} x{})", instance.id, instance.gpu_id, instance.gpu_count);
        self.settle_later(instance.id.clone());

        Ok(instance)
    }

    pub async fn start(&self, id: &str) -> Result<Instance, InstanceError> {
        self.transition(id, InstanceStatus::Stopped, InstanceStatus::Starting)
            .await
    }

    pub async fn stop(&self, id: &str) -> Result<Instance, InstanceError> {
        self.transition(id, InstanceStatus::Running, InstanceStatus::Stopping)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Instance, InstanceError> {
        let mut instances = self.instances.write().await;
        let idx = instances
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| InstanceError::NotFound(id.to_string()))?;
        let removed = instances.remove(idx);
        tracing::info!("Deleted instance {}", removed.id);
        Ok(removed)
    }

    async fn transition(
        &self,
        id: &str,
        from: InstanceStatus,
        to: InstanceStatus,
    ) -> Result<Instance, InstanceError> {
        let updated = {
            let mut instances = self.instances.write().await;
            let instance = instances
                .iter_mut()
                .find(|i| i.id == id)
                .ok_or_else(|| InstanceError::NotFound(id.to_string()))?;

            if instance.status != from {
                return Err(InstanceError::InvalidState {
                    id: id.to_string(),
                    status: instance.status,
                });
            }
            instance.status = to;
            instance.clone()
        };

        tracing::info!("Instance {} is {:?}", id, to);
        self.settle_later(id.to_string());
        Ok(updated)
    }

    /// Finish a transitional status after the boot delay. A deleted or
    /// already settled instance is left alone.
    fn settle_later(&self, id: String) {
        let instances = self.instances.clone();
        let delay = self.boot_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut instances = instances.write().await;
            if let Some(instance) = instances.iter_mut().find(|i| i.id == id) {
                if let Some(settled) = instance.status.settled() {
                    instance.status = settled;
                    tracing::debug!("Instance {} settled as {:?}", id, settled);
                }
            }
        });
    }
}
