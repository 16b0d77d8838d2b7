// Monitoring service - synthetic per-instance metrics refreshed on a fixed interval
use crate::domain::metrics::{MetricKind, MetricSample, MetricSeries};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const TICK_CHANNEL_CAPACITY: usize = 256;

/// Shape of one synthetic metric: where it hovers and how far it wanders
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MetricProfile {
    pub baseline: f64,
    pub variance: f64,
    pub delta: f64,
}

impl MetricProfile {
    pub fn default_for(kind: MetricKind) -> Self {
        let (baseline, variance, delta) = match kind {
            MetricKind::GpuUtilization => (85.0, 10.0, 5.0),
            MetricKind::Memory => (70.0, 8.0, 3.0),
            MetricKind::Temperature => (72.0, 6.0, 2.0),
            MetricKind::Cpu => (45.0, 15.0, 5.0),
        };
        Self {
            baseline,
            variance,
            delta,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MonitoringSettings {
    pub window: usize,
    pub refresh_interval: Duration,
    pub profiles: HashMap<MetricKind, MetricProfile>,
}

impl MonitoringSettings {
    pub fn profile(&self, kind: MetricKind) -> MetricProfile {
        self.profiles
            .get(&kind)
            .copied()
            .unwrap_or_else(|| MetricProfile::default_for(kind))
    }
}

impl Default for MonitoringSettings {
    fn default() -> Self {
        Self {
            window: 60,
            refresh_interval: Duration::from_secs(5),
            profiles: MetricKind::ALL
                .iter()
                .map(|k| (*k, MetricProfile::default_for(*k)))
                .collect(),
        }
    }
}

pub type InstanceMetrics = BTreeMap<MetricKind, MetricSeries>;

/// One sample pushed onto one series during a refresh
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricTick {
    pub instance_id: String,
    pub kind: MetricKind,
    pub sample: MetricSample,
}

struct MonitoringState {
    rng: StdRng,
    instances: HashMap<String, InstanceMetrics>,
}

#[derive(Clone)]
pub struct MonitoringService {
    settings: Arc<MonitoringSettings>,
    state: Arc<Mutex<MonitoringState>>,
    ticks: broadcast::Sender<MetricTick>,
}

impl MonitoringService {
    pub fn new(settings: MonitoringSettings) -> Self {
        Self::with_rng(settings, StdRng::from_entropy())
    }

    pub fn with_rng(settings: MonitoringSettings, rng: StdRng) -> Self {
        let (ticks, _) = broadcast::channel(TICK_CHANNEL_CAPACITY);
        Self {
            settings: Arc::new(settings),
            state: Arc::new(Mutex::new(MonitoringState {
                rng,
                instances: HashMap::new(),
            })),
            ticks,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        self.settings.refresh_interval
    }

    /// All series for an instance, generated on first access
    pub async fn snapshot(&self, instance_id: &str) -> InstanceMetrics {
        let mut state = self.state.lock().await;
        let MonitoringState { rng, instances } = &mut *state;

        instances
            .entry(instance_id.to_string())
            .or_insert_with(|| {
                tracing::debug!("Generating metric series for {}", instance_id);
                generate_metrics(&self.settings, Utc::now(), rng)
            })
            .clone()
    }

    /// Drop an instance's series; the next snapshot starts from scratch
    pub async fn forget(&self, instance_id: &str) {
        self.state.lock().await.instances.remove(instance_id);
    }

    /// Advance every tracked series by one step and publish the new samples
    pub async fn tick_all(&self, now: DateTime<Utc>) -> usize {
        let mut state = self.state.lock().await;
        let MonitoringState { rng, instances } = &mut *state;

        let mut published = 0;
        for (instance_id, metrics) in instances.iter_mut() {
            for (kind, series) in metrics.iter_mut() {
                let delta = self.settings.profile(*kind).delta;
                let sample = series.tick(delta, now, rng);
                // No subscribers is fine
                let _ = self.ticks.send(MetricTick {
                    instance_id: instance_id.clone(),
                    kind: *kind,
                    sample,
                });
                published += 1;
            }
        }

        published
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MetricTick> {
        self.ticks.subscribe()
    }

    /// Single refresh task; a slow tick delays the next instead of piling up.
    pub fn spawn_ticker(&self) -> JoinHandle<()> {
        let service = self.clone();
        let period = self.settings.refresh_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // First tick fires immediately
            interval.tick().await;

            loop {
                interval.tick().await;
                let published = service.tick_all(Utc::now()).await;
                tracing::trace!("Metric refresh published {} samples", published);
            }
        })
    }
}

fn generate_metrics(settings: &MonitoringSettings, now: DateTime<Utc>, rng: &mut StdRng) -> InstanceMetrics {
    MetricKind::ALL
        .iter()
        .map(|kind| {
            let profile = settings.profile(*kind);
            let series = MetricSeries::generate(
                profile.baseline,
                profile.variance,
                settings.window,
                settings.refresh_interval,
                kind.bounds(),
                now,
                rng,
            );
            (*kind, series)
        })
        .collect()
}
