// Account service - SSH keys and the transaction ledger
use crate::domain::catalog::{SshKey, Transaction, TransactionStatus};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq)]
pub enum AccountError {
    #[error("SSH key name is required")]
    MissingKeyName,
    #[error("not an OpenSSH public key")]
    InvalidPublicKey,
    #[error("an SSH key with fingerprint {0} already exists")]
    DuplicateKey(String),
    #[error("SSH key {0} not found")]
    KeyNotFound(String),
}

#[derive(Clone)]
pub struct AccountService {
    ssh_keys: Arc<RwLock<Vec<SshKey>>>,
    transactions: Arc<RwLock<Vec<Transaction>>>,
}

impl AccountService {
    pub fn new(ssh_keys: Vec<SshKey>, transactions: Vec<Transaction>) -> Self {
        Self {
            ssh_keys: Arc::new(RwLock::new(ssh_keys)),
            transactions: Arc::new(RwLock::new(transactions)),
        }
    }

    pub async fn list_ssh_keys(&self) -> Vec<SshKey> {
        self.ssh_keys.read().await.clone()
    }

    pub async fn add_ssh_key(&self, name: &str, public_key: &str) -> Result<SshKey, AccountError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AccountError::MissingKeyName);
        }
        let fingerprint = SshKey::fingerprint(public_key).ok_or(AccountError::InvalidPublicKey)?;

        let mut keys = self.ssh_keys.write().await;
        if keys.iter().any(|k| k.fingerprint == fingerprint) {
            return Err(AccountError::DuplicateKey(fingerprint));
        }

        let key = SshKey {
            id: format!("key-{}", Uuid::new_v4().simple()),
            name: name.to_string(),
            fingerprint,
            created_at: Utc::now(),
        };
        keys.push(key.clone());
        tracing::info!("Added SSH key {} ({})", key.name, key.fingerprint);
        Ok(key)
    }

    pub async fn remove_ssh_key(&self, id: &str) -> Result<SshKey, AccountError> {
        let mut keys = self.ssh_keys.write().await;
        let idx = keys
            .iter()
            .position(|k| k.id == id)
            .ok_or_else(|| AccountError::KeyNotFound(id.to_string()))?;
        Ok(keys.remove(idx))
    }

    pub async fn has_ssh_key(&self, id: &str) -> bool {
        self.ssh_keys.read().await.iter().any(|k| k.id == id)
    }

    /// Newest first
    pub async fn list_transactions(&self) -> Vec<Transaction> {
        let mut transactions = self.transactions.read().await.clone();
        transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        transactions
    }

    pub async fn record_transaction(
        &self,
        amount: f64,
        currency: &str,
        crypto_amount: Option<f64>,
    ) -> Transaction {
        let transaction = Transaction {
            id: format!("txn-{}", Uuid::new_v4().simple()),
            amount,
            currency: currency.to_string(),
            crypto_amount,
            status: TransactionStatus::Completed,
            created_at: Utc::now(),
        };
        self.transactions.write().await.push(transaction.clone());
        transaction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIOMqqnkVzrm0SdG6UOoqKLsabgH5C9okWi0dh2l9GKJl dev@laptop";

    #[tokio::test]
    async fn test_add_and_remove_ssh_key() {
        let service = AccountService::new(Vec::new(), Vec::new());

        let key = service.add_ssh_key("laptop", KEY).await.unwrap();
        assert!(service.has_ssh_key(&key.id).await);
        assert_eq!(
            service.add_ssh_key("again", KEY).await.unwrap_err(),
            AccountError::DuplicateKey(key.fingerprint.clone())
        );

        service.remove_ssh_key(&key.id).await.unwrap();
        assert!(service.list_ssh_keys().await.is_empty());
        assert_eq!(
            service.remove_ssh_key(&key.id).await.unwrap_err(),
            AccountError::KeyNotFound(key.id)
        );
    }

    #[tokio::test]
    async fn test_add_ssh_key_validation() {
        let service = AccountService::new(Vec::new(), Vec::new());
        assert_eq!(service.add_ssh_key(" ", KEY).await.unwrap_err(), AccountError::MissingKeyName);
        assert_eq!(
            service.add_ssh_key("bad", "hello world").await.unwrap_err(),
            AccountError::InvalidPublicKey
        );
    }

    #[tokio::test]
    async fn test_transactions_newest_first() {
        let service = AccountService::new(Vec::new(), Vec::new());
        let first = service.record_transaction(10.0, "BTC", Some(0.00015)).await;
        let second = service.record_transaction(20.0, "ETH", None).await;

        let listed = service.list_transactions().await;
        assert_eq!(listed.len(), 2);
        assert!(listed[0].created_at >= listed[1].created_at);
        assert!(listed.contains(&first) && listed.contains(&second));
    }
}
