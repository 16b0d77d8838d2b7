use crate::application::monitoring_service::{MetricProfile, MonitoringSettings};
use crate::application::session_service::{SessionSettings, STARTING_CREDIT};
use crate::domain::metrics::MetricKind;
use crate::domain::payment::PaymentAddresses;
use anyhow::Context;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub delays: DelayConfig,
    #[serde(default)]
    pub payment: PaymentAddresses,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    #[serde(default)]
    pub storage: StorageKind,
    #[serde(default = "default_session_path")]
    pub path: String,
    #[serde(default = "default_starting_credit")]
    pub starting_credit: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage: StorageKind::default(),
            path: default_session_path(),
            starting_credit: default_starting_credit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MetricsConfig {
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default)]
    pub profiles: ProfilesConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
            refresh_interval_secs: default_refresh_interval_secs(),
            profiles: ProfilesConfig::default(),
        }
    }
}

/// Per-metric overrides; missing entries use the built-in profile
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProfilesConfig {
    pub gpu_utilization: Option<MetricProfile>,
    pub memory: Option<MetricProfile>,
    pub temperature: Option<MetricProfile>,
    pub cpu: Option<MetricProfile>,
}

impl ProfilesConfig {
    fn get(&self, kind: MetricKind) -> Option<MetricProfile> {
        match kind {
            MetricKind::GpuUtilization => self.gpu_utilization,
            MetricKind::Memory => self.memory,
            MetricKind::Temperature => self.temperature,
            MetricKind::Cpu => self.cpu,
        }
    }
}

/// Artificial latencies, in milliseconds
#[derive(Debug, Deserialize, Clone)]
pub struct DelayConfig {
    #[serde(default = "default_login_ms")]
    pub login_ms: u64,
    #[serde(default = "default_deploy_ms")]
    pub deploy_ms: u64,
    #[serde(default = "default_payment_ms")]
    pub payment_ms: u64,
    #[serde(default = "default_boot_ms")]
    pub boot_ms: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            login_ms: default_login_ms(),
            deploy_ms: default_deploy_ms(),
            payment_ms: default_payment_ms(),
            boot_ms: default_boot_ms(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_session_path() -> String {
    "data/session.json".to_string()
}

fn default_starting_credit() -> f64 {
    STARTING_CREDIT
}

fn default_window() -> usize {
    60
}

fn default_refresh_interval_secs() -> u64 {
    5
}

fn default_login_ms() -> u64 {
    1000
}

fn default_deploy_ms() -> u64 {
    2000
}

fn default_payment_ms() -> u64 {
    3000
}

fn default_boot_ms() -> u64 {
    3000
}

impl ConsoleConfig {
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            delay: Duration::from_millis(self.delays.login_ms),
            starting_credit: self.session.starting_credit,
        }
    }

    pub fn monitoring_settings(&self) -> MonitoringSettings {
        MonitoringSettings {
            window: self.metrics.window,
            // A zero period would make the ticker spin
            refresh_interval: Duration::from_secs(self.metrics.refresh_interval_secs.max(1)),
            profiles: MetricKind::ALL
                .iter()
                .map(|kind| {
                    let profile = self
                        .metrics
                        .profiles
                        .get(*kind)
                        .unwrap_or_else(|| MetricProfile::default_for(*kind));
                    (*kind, profile)
                })
                .collect(),
        }
    }
}

pub fn load_console_config() -> anyhow::Result<ConsoleConfig> {
    load_config_file("config/console")
}

/// Layer the optional config file `name` (extension auto-detected) under
/// `CONSOLE__*` environment variables.
pub fn load_config_file(name: &str) -> anyhow::Result<ConsoleConfig> {
    load_layered(name, None)
}

/// Values stay strings until deserialization, so numeric-looking payment
/// addresses survive unchanged. `env` replaces the process environment.
fn load_layered(
    name: &str,
    env: Option<config::Map<String, String>>,
) -> anyhow::Result<ConsoleConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(name).required(false))
        .add_source(
            config::Environment::with_prefix("CONSOLE")
                .separator("__")
                .source(env),
        )
        .build()
        .with_context(|| format!("Failed to read configuration from {}", name))?;

    settings
        .try_deserialize()
        .context("Invalid console configuration")
}
