// Seed data for the mock collections; everything resets on restart
use crate::domain::catalog::{
    GpuOffering, Instance, InstanceStatus, SshKey, Transaction, TransactionStatus,
};
use chrono::{DateTime, Duration, Utc};

pub fn gpu_catalog() -> Vec<GpuOffering> {
    vec![
        GpuOffering::new("h100-80g", "NVIDIA H100 80GB", 80, 2.49, 12),
        GpuOffering::new("a100-80g", "NVIDIA A100 80GB", 80, 1.59, 24),
        GpuOffering::new("l40s", "NVIDIA L40S 48GB", 48, 0.99, 16),
        GpuOffering::new("rtx-4090", "NVIDIA RTX 4090 24GB", 24, 0.44, 40),
    ]
}

pub fn instances(now: DateTime<Utc>) -> Vec<Instance> {
    vec![
        Instance {
            id: "inst-7f3a9c".to_string(),
            name: "llama-finetune".to_string(),
            gpu_id: "h100-80g".to_string(),
            gpu_count: 8,
            region: "us-east".to_string(),
            disk_gb: 2000,
            status: InstanceStatus::Running,
            hourly_cost: 2.49 * 8.0,
            created_at: now - Duration::days(3),
        },
        Instance {
            id: "inst-2b81d4".to_string(),
            name: "sd-inference".to_string(),
            gpu_id: "rtx-4090".to_string(),
            gpu_count: 1,
            region: "eu-west".to_string(),
            disk_gb: 200,
            status: InstanceStatus::Stopped,
            hourly_cost: 0.44,
            created_at: now - Duration::hours(20),
        },
    ]
}

pub fn ssh_keys(now: DateTime<Utc>) -> Vec<SshKey> {
    vec![SshKey {
        id: "key-workstation".to_string(),
        name: "workstation".to_string(),
        fingerprint: "9c:1e:54:0a:7b:e2:33:f1:08:6d:aa:4c:91:b7:2e:5f".to_string(),
        created_at: now - Duration::days(30),
    }]
}

pub fn transactions(now: DateTime<Utc>) -> Vec<Transaction> {
    vec![
        Transaction {
            id: "txn-welcome".to_string(),
            amount: 100.0,
            currency: "USD".to_string(),
            crypto_amount: None,
            status: TransactionStatus::Completed,
            created_at: now - Duration::days(30),
        },
        Transaction {
            id: "txn-btc-topup".to_string(),
            amount: 250.0,
            currency: "BTC".to_string(),
            crypto_amount: Some(0.00384615),
            status: TransactionStatus::Completed,
            created_at: now - Duration::days(7),
        },
        Transaction {
            id: "txn-eth-awaiting".to_string(),
            amount: 50.0,
            currency: "ETH".to_string(),
            crypto_amount: Some(0.014286),
            status: TransactionStatus::Pending,
            created_at: now - Duration::hours(1),
        },
    ]
}
