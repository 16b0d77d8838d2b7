// Deploy wizard flow: Select GPU -> Configure -> Review -> Confirm
use super::wizard::WizardFlow;
use serde::{Deserialize, Serialize};

pub const MIN_DISK_GB: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployDraft {
    pub gpu_id: Option<String>,
    pub name: String,
    pub region: String,
    pub gpu_count: u32,
    pub disk_gb: u32,
    pub ssh_key_id: Option<String>,
}

impl Default for DeployDraft {
    fn default() -> Self {
        Self {
            gpu_id: None,
            name: String::new(),
            region: String::new(),
            gpu_count: 1,
            disk_gb: 50,
            ssh_key_id: None,
        }
    }
}

impl DeployDraft {
    fn gpu_selected(&self) -> bool {
        self.gpu_id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }

    fn configured(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.region.trim().is_empty()
            && self.gpu_count >= 1
            && self.disk_gb >= MIN_DISK_GB
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployPatch {
    pub gpu_id: Option<String>,
    pub name: Option<String>,
    pub region: Option<String>,
    pub gpu_count: Option<u32>,
    pub disk_gb: Option<u32>,
    pub ssh_key_id: Option<String>,
}

pub struct DeployFlow;

impl WizardFlow for DeployFlow {
    type Draft = DeployDraft;
    type Patch = DeployPatch;

    const NAME: &'static str = "deploy";
    const STEPS: &'static [&'static str] = &["select", "configure", "review", "confirm"];

    fn step_valid(draft: &DeployDraft, step: usize) -> bool {
        match step {
            1 => draft.gpu_selected(),
            2 => draft.configured(),
            _ => draft.gpu_selected() && draft.configured(),
        }
    }

    fn apply(draft: &mut DeployDraft, patch: DeployPatch) {
        if let Some(gpu_id) = patch.gpu_id {
            draft.gpu_id = Some(gpu_id);
        }
        if let Some(name) = patch.name {
            draft.name = name;
        }
        if let Some(region) = patch.region {
            draft.region = region;
        }
        if let Some(gpu_count) = patch.gpu_count {
            draft.gpu_count = gpu_count;
        }
        if let Some(disk_gb) = patch.disk_gb {
            draft.disk_gb = disk_gb;
        }
        if let Some(ssh_key_id) = patch.ssh_key_id {
            draft.ssh_key_id = Some(ssh_key_id);
        }
    }
}
