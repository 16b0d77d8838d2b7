// Mock record domain models - GPU offerings, instances, SSH keys and transactions
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GpuOffering {
    pub id: String,
    pub name: String,
    pub vram_gb: u32,
    pub hourly_price: f64,
    pub available: u32,
}

impl GpuOffering {
    pub fn new(id: &str, name: &str, vram_gb: u32, hourly_price: f64, available: u32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            vram_gb,
            hourly_price,
            available,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl InstanceStatus {
    /// Status an in-flight transition settles into, if any
    pub fn settled(&self) -> Option<InstanceStatus> {
        match self {
            InstanceStatus::Starting => Some(InstanceStatus::Running),
            InstanceStatus::Stopping => Some(InstanceStatus::Stopped),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub name: String,
    pub gpu_id: String,
    pub gpu_count: u32,
    pub region: String,
    pub disk_gb: u32,
    pub status: InstanceStatus,
    pub hourly_cost: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SshKey {
    pub id: String,
    pub name: String,
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
}

impl SshKey {
    /// Colon-separated SHA-256 prefix of the key body, e.g. `3f:a1:...`.
    /// Returns `None` when the text does not look like an OpenSSH public key.
    pub fn fingerprint(public_key: &str) -> Option<String> {
        let mut parts = public_key.split_whitespace();
        let algorithm = parts.next()?;
        let body = parts.next()?;
        if !(algorithm.starts_with("ssh-") || algorithm.starts_with("ecdsa-sha2-")) {
            return None;
        }

        let digest = Sha256::digest(body.as_bytes());
        let hex: Vec<String> = digest.iter().take(16).map(|b| format!("{:02x}", b)).collect();
        Some(hex.join(":"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    pub currency: String,
    pub crypto_amount: Option<f64>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}
