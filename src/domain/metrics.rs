// Metric domain models - synthetic samples and the sliding window behind the monitoring view
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    GpuUtilization,
    Memory,
    Temperature,
    Cpu,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::GpuUtilization,
        MetricKind::Memory,
        MetricKind::Temperature,
        MetricKind::Cpu,
    ];

    /// Interval every sample of this kind is clamped to
    pub fn bounds(&self) -> Bounds {
        match self {
            MetricKind::Temperature => Bounds::new(40.0, 90.0),
            MetricKind::GpuUtilization | MetricKind::Memory | MetricKind::Cpu => {
                Bounds::new(0.0, 100.0)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        if lower <= upper {
            Self { lower, upper }
        } else {
            Self {
                lower: upper,
                upper: lower,
            }
        }
    }

    /// Clamp into the interval; NaN and infinities land on the midpoint
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_finite() {
            value.clamp(self.lower, self.upper)
        } else {
            self.midpoint()
        }
    }

    pub fn midpoint(&self) -> f64 {
        self.lower + (self.upper - self.lower) / 2.0
    }

    fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl MetricSample {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Fixed-length window of samples, oldest first.
///
/// Every [`MetricSeries::tick`] appends one sample and evicts the oldest, so
/// the length chosen at generation time never changes.
#[derive(Debug, Clone, Serialize)]
pub struct MetricSeries {
    bounds: Bounds,
    samples: VecDeque<MetricSample>,
}

impl MetricSeries {
    /// Build `len` samples scattered around `baseline`, spaced `interval` apart
    /// and ending at `now`.
    pub fn generate<R: Rng + ?Sized>(
        baseline: f64,
        variance: f64,
        len: usize,
        interval: Duration,
        bounds: Bounds,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Self {
        let step_ms = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX);
        let samples = (0..len)
            .map(|i| {
                let back = i64::try_from(len - i - 1).unwrap_or(i64::MAX);
                // Windows reaching past the representable range start at its floor
                let timestamp = step_ms
                    .checked_mul(back)
                    .and_then(chrono::Duration::try_milliseconds)
                    .and_then(|offset| now.checked_sub_signed(offset))
                    .unwrap_or(DateTime::<Utc>::MIN_UTC);
                let value = bounds.clamp(baseline + perturbation(rng, variance, bounds));
                MetricSample::new(timestamp, value)
            })
            .collect();

        Self { bounds, samples }
    }

    /// Random-walk step: newest value ± `delta`, clamped, pushed at `now`.
    pub fn tick<R: Rng + ?Sized>(
        &mut self,
        delta: f64,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> MetricSample {
        let previous = self
            .newest()
            .map(|s| s.value)
            .unwrap_or(self.bounds.midpoint());
        let sample = MetricSample::new(
            now,
            self.bounds.clamp(previous + perturbation(rng, delta, self.bounds)),
        );

        // An empty window stays empty
        if self.samples.pop_front().is_some() {
            self.samples.push_back(sample.clone());
        }

        sample
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn newest(&self) -> Option<&MetricSample> {
        self.samples.back()
    }

    pub fn samples(&self) -> impl Iterator<Item = &MetricSample> {
        self.samples.iter()
    }
}

/// Uniform offset in `[-spread, spread]`. Anything wider than the bounds is
/// clamped away afterwards, so the spread is capped at their width.
fn perturbation<R: Rng + ?Sized>(rng: &mut R, spread: f64, bounds: Bounds) -> f64 {
    let spread = if spread.is_finite() { spread.abs() } else { 0.0 };
    let spread = spread.min(bounds.width());
    if spread <= 0.0 {
        return 0.0;
    }
    rng.gen_range(-spread..=spread)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn utilization_series(rng: &mut StdRng, len: usize) -> MetricSeries {
        MetricSeries::generate(
            85.0,
            10.0,
            len,
            Duration::from_secs(5),
            MetricKind::GpuUtilization.bounds(),
            Utc::now(),
            rng,
        )
    }

    #[test]
    fn test_generate_spaces_timestamps_back_from_now() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();
        let series = MetricSeries::generate(
            50.0,
            5.0,
            4,
            Duration::from_secs(2),
            Bounds::new(0.0, 100.0),
            now,
            &mut rng,
        );

        let stamps: Vec<_> = series.samples().map(|s| s.timestamp).collect();
        assert_eq!(stamps.len(), 4);
        assert_eq!(stamps[3], now);
        assert_eq!(stamps[0], now - chrono::Duration::seconds(6));
        assert!(series.samples().all(|s| (45.0..=55.0).contains(&s.value)));
    }

    #[test]
    fn test_length_is_invariant_across_ticks() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut series = utilization_series(&mut rng, 30);

        for _ in 0..200 {
            series.tick(5.0, Utc::now(), &mut rng);
            assert_eq!(series.len(), 30);
        }
    }

    #[test]
    fn test_values_stay_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let bounds = MetricKind::Temperature.bounds();
        // Baseline far outside the range and huge steps still clamp
        let mut series =
            MetricSeries::generate(200.0, 80.0, 20, Duration::from_secs(1), bounds, Utc::now(), &mut rng);

        for _ in 0..500 {
            series.tick(60.0, Utc::now(), &mut rng);
            assert!(series.samples().all(|s| bounds.contains(s.value)));
        }
    }

    #[test]
    fn test_tick_evicts_oldest_and_appends_newest() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut series = utilization_series(&mut rng, 10);
        let before: Vec<_> = series.samples().cloned().collect();

        let now = Utc::now();
        let sample = series.tick(5.0, now, &mut rng);
        let after: Vec<_> = series.samples().cloned().collect();

        assert_eq!(&after[..9], &before[1..]);
        assert_eq!(after[9], sample);
        assert_eq!(sample.timestamp, now);
        assert!((sample.value - before[9].value).abs() <= 5.0);
    }

    #[test]
    fn test_sixty_sample_scenario() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut series = utilization_series(&mut rng, 60);

        for _ in 0..5 {
            series.tick(5.0, Utc::now(), &mut rng);
        }

        assert_eq!(series.len(), 60);
        assert!(series.samples().all(|s| (0.0..=100.0).contains(&s.value)));
    }

    #[test]
    fn test_empty_window_stays_empty() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut series = utilization_series(&mut rng, 0);

        let sample = series.tick(5.0, Utc::now(), &mut rng);
        assert!(series.is_empty());
        assert!((45.0..=55.0).contains(&sample.value));
    }

    #[test]
    fn test_zero_variance_is_flat() {
        let mut rng = StdRng::seed_from_u64(11);
        let series = MetricSeries::generate(
            70.0,
            0.0,
            5,
            Duration::from_secs(1),
            Bounds::new(0.0, 100.0),
            Utc::now(),
            &mut rng,
        );
        assert!(series.samples().all(|s| s.value == 70.0));
    }

    #[test]
    fn test_non_finite_baseline_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        let bounds = MetricKind::Temperature.bounds();

        for baseline in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut series =
                MetricSeries::generate(baseline, 10.0, 3, Duration::from_secs(1), bounds, Utc::now(), &mut rng);
            assert!(series.samples().all(|s| bounds.contains(s.value)));

            series.tick(2.0, Utc::now(), &mut rng);
            assert!(series.samples().all(|s| bounds.contains(s.value)));
        }
    }

    #[test]
    fn test_huge_spread_does_not_panic() {
        let mut rng = StdRng::seed_from_u64(6);
        let bounds = Bounds::new(0.0, 100.0);
        let mut series =
            MetricSeries::generate(50.0, f64::MAX, 3, Duration::from_secs(1), bounds, Utc::now(), &mut rng);
        assert!(series.samples().all(|s| bounds.contains(s.value)));

        let sample = series.tick(f64::MAX, Utc::now(), &mut rng);
        assert!(bounds.contains(sample.value));
        assert_eq!(series.len(), 3);
    }

    #[test]
    fn test_oversized_interval_does_not_panic() {
        let mut rng = StdRng::seed_from_u64(8);
        let now = Utc::now();
        let series = MetricSeries::generate(
            50.0,
            1.0,
            3,
            Duration::from_secs(u64::MAX),
            Bounds::new(0.0, 100.0),
            now,
            &mut rng,
        );

        let stamps: Vec<_> = series.samples().map(|s| s.timestamp).collect();
        assert_eq!(stamps[2], now);
        assert_eq!(stamps[0], DateTime::<Utc>::MIN_UTC);
    }

    #[test]
    fn test_bounds_are_ordered() {
        let bounds = Bounds::new(90.0, 40.0);
        assert_eq!(bounds.lower, 40.0);
        assert_eq!(bounds.upper, 90.0);
    }
}
