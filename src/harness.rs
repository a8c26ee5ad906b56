use std::hint::black_box;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::BenchError;
use crate::stats::Summary;

/// Results whose mean is below this many milliseconds need a sub-millisecond clock.
const RELIABLE_THRESHOLD_MS: f64 = 1.0;

const CLOCK_PROBE_SAMPLES: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Profile {
    Quick,
    Full,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Quick => "quick",
            Profile::Full => "full",
        }
    }
}

/// One dataset size and the number of trials to run over it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scale {
    pub data_size: usize,
    pub trial_count: usize,
}

#[derive(Clone, Debug)]
pub struct BenchConfig {
    pub profile: Profile,
    pub seed: u64,
}

impl BenchConfig {
    pub fn warmup_trials(&self) -> usize {
        match self.profile {
            Profile::Quick => 1,
            Profile::Full => 3,
        }
    }

    /// Dataset sizes to sweep. Larger datasets get fewer trials.
    pub fn scales(&self) -> Vec<Scale> {
        let mut scales = vec![
            Scale {
                data_size: 100,
                trial_count: 10,
            },
            Scale {
                data_size: 1_000,
                trial_count: 5,
            },
        ];
        if self.profile == Profile::Full {
            scales.push(Scale {
                data_size: 10_000,
                trial_count: 3,
            });
        }
        scales
    }

    pub fn harness(&self) -> Harness {
        Harness::new().warmup(self.warmup_trials())
    }
}

/// Smallest observable step of the monotonic clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockResolution {
    pub resolution_ns: u64,
}

impl ClockResolution {
    /// Measures the smallest non-zero `Instant` delta over a handful of spins.
    pub fn probe() -> Self {
        let mut best = u64::MAX;
        for _ in 0..CLOCK_PROBE_SAMPLES {
            let start = Instant::now();
            let mut now = Instant::now();
            while now == start {
                now = Instant::now();
            }
            let step = u64::try_from(now.duration_since(start).as_nanos()).unwrap_or(u64::MAX);
            best = best.min(step);
        }
        Self {
            resolution_ns: best,
        }
    }

    pub fn from_nanos(resolution_ns: u64) -> Self {
        Self { resolution_ns }
    }

    pub fn resolution_ms(&self) -> f64 {
        self.resolution_ns as f64 / 1_000_000.0
    }

    pub fn is_sub_millisecond(&self) -> bool {
        self.resolution_ms() < RELIABLE_THRESHOLD_MS
    }
}

/// A single timed invocation of an operation over a whole dataset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    pub label: String,
    pub data_size: usize,
    pub elapsed_ms: f64,
}

/// Accumulates the trials of one scenario.
///
/// Each scenario gets its own log; [`TrialLog::clear`] resets it for reuse.
#[derive(Clone, Debug)]
pub struct TrialLog {
    label: String,
    data_size: usize,
    trials: Vec<Trial>,
}

impl TrialLog {
    pub fn new(label: impl Into<String>, data_size: usize) -> Self {
        Self {
            label: label.into(),
            data_size,
            trials: Vec::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn data_size(&self) -> usize {
        self.data_size
    }

    pub fn push(&mut self, elapsed_ms: f64) {
        self.trials.push(Trial {
            label: self.label.clone(),
            data_size: self.data_size,
            elapsed_ms,
        });
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn samples(&self) -> Vec<f64> {
        self.trials.iter().map(|t| t.elapsed_ms).collect()
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn clear(&mut self) {
        self.trials.clear();
    }

    /// Reduces the accumulated trials to a result, or `None` if nothing was recorded.
    pub fn summarize(&self, clock: ClockResolution) -> Option<BenchResult> {
        let summary = Summary::from_samples(&self.samples())?;
        let throughput_per_s = if summary.mean > 0.0 {
            self.data_size as f64 / (summary.mean / 1000.0)
        } else {
            0.0
        };
        let below_clock_resolution = summary.mean < clock.resolution_ms();
        let (ci95_low_ms, ci95_high_ms) = summary.ci95();

        if below_clock_resolution {
            tracing::warn!(
                label = %self.label,
                mean_ms = summary.mean,
                resolution_ms = clock.resolution_ms(),
                "mean trial time is below clock resolution; result is unreliable"
            );
        }

        Some(BenchResult {
            label: self.label.clone(),
            data_size: self.data_size,
            trial_count: summary.count,
            min_ms: summary.min,
            max_ms: summary.max,
            mean_ms: summary.mean,
            std_dev_ms: summary.std_dev,
            median_ms: summary.median,
            ci95_low_ms,
            ci95_high_ms,
            throughput_per_s,
            below_clock_resolution,
        })
    }
}

/// Summary statistics for one (operation, data size) pair. Times are in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BenchResult {
    pub label: String,
    pub data_size: usize,
    pub trial_count: usize,
    pub min_ms: f64,
    pub max_ms: f64,
    pub mean_ms: f64,
    /// Population standard deviation.
    pub std_dev_ms: f64,
    pub median_ms: f64,
    /// Two-sided 95% t-interval for the mean.
    pub ci95_low_ms: f64,
    pub ci95_high_ms: f64,
    /// `data_size / (mean_ms / 1000)` items per second; `0` when the mean is zero.
    pub throughput_per_s: f64,
    pub below_clock_resolution: bool,
}

/// Times whole-dataset invocations of an operation on the calling thread.
#[derive(Clone, Debug)]
pub struct Harness {
    warmup_trials: usize,
    clock: ClockResolution,
}

impl Harness {
    /// Creates a harness without warmup, probing the clock resolution.
    pub fn new() -> Self {
        Self::with_clock(ClockResolution::probe())
    }

    pub fn with_clock(clock: ClockResolution) -> Self {
        if !clock.is_sub_millisecond() {
            tracing::warn!(
                resolution_ms = clock.resolution_ms(),
                "clock cannot resolve below 1ms; trials shorter than that are unreliable"
            );
        }
        Self {
            warmup_trials: 0,
            clock,
        }
    }

    /// Unrecorded invocations to run before the measured trials.
    pub fn warmup(mut self, trials: usize) -> Self {
        self.warmup_trials = trials;
        self
    }

    pub fn clock(&self) -> ClockResolution {
        self.clock
    }

    pub fn warmup_trials(&self) -> usize {
        self.warmup_trials
    }

    /// Runs `operation` `trial_count` times and summarizes the timings.
    ///
    /// `data_size` is the number of items one invocation processes. The operation iterates the
    /// dataset itself.
    pub fn run<T, E, F>(
        &self,
        label: &str,
        data_size: usize,
        trial_count: usize,
        operation: F,
    ) -> Result<BenchResult, BenchError<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        let mut log = TrialLog::new(label, data_size);
        self.record(&mut log, trial_count, operation)?;
        log.summarize(self.clock)
            .ok_or_else(|| invalid_trial_count(trial_count))
    }

    /// Appends `trial_count` trials to `log` and returns the final trial's output.
    ///
    /// An operation error aborts the run and leaves `log` untouched, so partial timings never
    /// reach a result. Warmup failures report trial `0`; measured trials are numbered from `1`.
    pub fn record<T, E, F>(
        &self,
        log: &mut TrialLog,
        trial_count: usize,
        mut operation: F,
    ) -> Result<T, BenchError<E>>
    where
        F: FnMut() -> Result<T, E>,
    {
        if trial_count == 0 {
            return Err(invalid_trial_count(trial_count));
        }

        let fail = |trial: usize, source: E| BenchError::Operation {
            label: log.label().to_string(),
            trial,
            source,
        };

        for _ in 0..self.warmup_trials {
            black_box(operation().map_err(|e| fail(0, e))?);
        }

        let mut last = None;
        let mut elapsed_ms = Vec::with_capacity(trial_count);
        for trial in 1..=trial_count {
            let start = Instant::now();
            let out = operation();
            let elapsed = start.elapsed();
            let out = out.map_err(|e| fail(trial, e))?;
            elapsed_ms.push(elapsed.as_secs_f64() * 1000.0);
            last = Some(black_box(out));
        }

        for ms in elapsed_ms {
            log.push(ms);
        }
        tracing::debug!(label = %log.label(), trials = trial_count, "recorded trials");

        last.ok_or_else(|| invalid_trial_count(trial_count))
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_trial_count<E>(trial_count: usize) -> BenchError<E> {
    BenchError::InvalidConfiguration {
        param: "trial_count",
        value: trial_count.to_string(),
        reason: "at least one trial is required",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::thread;
    use std::time::Duration;

    fn fine_clock() -> ClockResolution {
        ClockResolution::from_nanos(100)
    }

    #[test]
    fn test_trial_log_statistics() {
        let mut log = TrialLog::new("fixed", 1_000);
        for ms in [10.0, 20.0, 30.0] {
            log.push(ms);
        }
        let r = log.summarize(fine_clock()).unwrap();

        assert_eq!(r.trial_count, 3);
        assert_eq!(r.min_ms, 10.0);
        assert_eq!(r.max_ms, 30.0);
        assert_eq!(r.mean_ms, 20.0);
        assert!((r.std_dev_ms - (200.0f64 / 3.0).sqrt()).abs() < 1e-12);
        let margin = 4.303 * 10.0 / 3f64.sqrt();
        assert!((r.ci95_low_ms - (20.0 - margin)).abs() < 1e-12);
        assert!((r.ci95_high_ms - (20.0 + margin)).abs() < 1e-12);
        assert_eq!(r.throughput_per_s, 50_000.0);
        assert!(!r.below_clock_resolution);
        assert!(log.trials().iter().all(|t| t.label == "fixed" && t.data_size == 1_000));
    }

    #[test]
    fn test_trial_log_clear() {
        let mut log = TrialLog::new("reuse", 10);
        log.push(1.0);
        log.clear();
        assert!(log.is_empty());
        assert!(log.summarize(fine_clock()).is_none());
    }

    #[test]
    fn test_zero_trials_rejected() {
        let harness = Harness::with_clock(fine_clock());
        let mut calls = 0;
        let err = harness
            .run("noop", 10, 0, || {
                calls += 1;
                Ok::<_, Infallible>(())
            })
            .unwrap_err();

        assert!(matches!(
            err,
            BenchError::InvalidConfiguration { param: "trial_count", .. }
        ));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_run_counts_trials_and_warmup() {
        let harness = Harness::with_clock(fine_clock()).warmup(2);
        let mut calls = 0;
        let r = harness
            .run("sleep", 4, 3, || {
                calls += 1;
                thread::sleep(Duration::from_millis(2));
                Ok::<_, Infallible>(calls)
            })
            .unwrap();

        assert_eq!(calls, 5);
        assert_eq!(r.trial_count, 3);
        assert_eq!(r.data_size, 4);
        assert!(r.min_ms >= 2.0, "min {} < 2ms", r.min_ms);
        assert!(r.min_ms <= r.mean_ms && r.mean_ms <= r.max_ms);
    }

    #[test]
    fn test_operation_failure_aborts_run() {
        #[derive(Debug, PartialEq)]
        struct Boom;

        let harness = Harness::with_clock(fine_clock());
        let mut log = TrialLog::new("flaky", 1);
        let mut calls = 0;
        let err = harness
            .record(&mut log, 5, || {
                calls += 1;
                if calls == 3 {
                    Err(Boom)
                } else {
                    Ok(())
                }
            })
            .unwrap_err();

        match err {
            BenchError::Operation { label, trial, source } => {
                assert_eq!(label, "flaky");
                assert_eq!(trial, 3);
                assert_eq!(source, Boom);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(calls, 3);
        assert!(log.is_empty());
    }

    #[test]
    fn test_warmup_failure_reports_trial_zero() {
        let harness = Harness::with_clock(fine_clock()).warmup(1);
        let mut log = TrialLog::new("cold", 1);
        let mut calls = 0;
        let err = harness
            .record(&mut log, 3, || {
                calls += 1;
                Err::<(), _>("not ready")
            })
            .unwrap_err();

        match err {
            BenchError::Operation { label, trial, source } => {
                assert_eq!(label, "cold");
                assert_eq!(trial, 0);
                assert_eq!(source, "not ready");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(calls, 1);
        assert!(log.is_empty());
    }

    #[test]
    fn test_record_returns_last_output() {
        let harness = Harness::with_clock(fine_clock());
        let mut log = TrialLog::new("count", 1);
        let mut n = 0;
        let last = harness
            .record(&mut log, 4, || {
                n += 1;
                Ok::<_, Infallible>(n)
            })
            .unwrap();
        assert_eq!(last, 4);
        assert_eq!(log.len(), 4);
    }

    #[test]
    fn test_coarse_clock_flags_fast_results() {
        let coarse = ClockResolution::from_nanos(15_000_000);
        assert!(!coarse.is_sub_millisecond());

        let mut log = TrialLog::new("fast", 10);
        log.push(0.5);
        let r = log.summarize(coarse).unwrap();
        assert!(r.below_clock_resolution);
    }

    #[test]
    fn test_probe_is_sub_millisecond() {
        // Any modern monotonic clock ticks well below a millisecond.
        assert!(ClockResolution::probe().is_sub_millisecond());
    }

    #[test]
    fn test_profile_scales() {
        let quick = BenchConfig {
            profile: Profile::Quick,
            seed: 0,
        };
        let full = BenchConfig {
            profile: Profile::Full,
            ..quick.clone()
        };
        assert_eq!(quick.scales().len(), 2);
        assert_eq!(
            full.scales().last(),
            Some(&Scale {
                data_size: 10_000,
                trial_count: 3
            })
        );
        assert_eq!(quick.profile.as_str(), "quick");
    }
}
