//! Generic vs specialized comparison over one shared dataset.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::BenchError;
use crate::harness::{BenchResult, Harness, TrialLog};
use crate::stats::{cohens_d, welch_t, EffectSize, WelchTest};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub label: String,
    pub generic: BenchResult,
    pub specialized: BenchResult,
    /// `(generic.mean / specialized.mean - 1) * 100`; `0` when `degenerate`.
    pub overhead_percent: f64,
    /// The specialized mean was zero, so no ratio could be formed.
    pub degenerate: bool,
    /// Both paths produced byte-identical output on their final trial.
    pub outputs_match: bool,
    pub generic_digest: String,
    pub specialized_digest: String,
    pub effect_size: Option<EffectSize>,
    /// Welch's t of generic against specialized trial times.
    pub welch: Option<WelchTest>,
}

/// Relative slowdown of `generic` over `specialized`, and whether the ratio was degenerate.
pub fn overhead_percent(generic: &BenchResult, specialized: &BenchResult) -> (f64, bool) {
    if specialized.mean_ms == 0.0 {
        (0.0, true)
    } else {
        ((generic.mean_ms / specialized.mean_ms - 1.0) * 100.0, false)
    }
}

fn hex32(d: [u8; 32]) -> String {
    let mut s = String::with_capacity(64);
    for b in d {
        s.push_str(&format!("{:02x}", b));
    }
    s
}

fn digest_outputs(outputs: &[String]) -> String {
    let mut hasher = Sha256::new();
    for out in outputs {
        hasher.update(out.as_bytes());
        hasher.update(b"\n");
    }
    hex32(hasher.finalize().into())
}

/// Times `generic` and `specialized` over the same `dataset` with the same trial count.
///
/// Both operations receive the identical slice; it is never reordered or resized between
/// runs. Each operation returns one encoded string per record, and the outputs of the final
/// trials are digested and compared.
pub fn compare<T, E, G, S>(
    harness: &Harness,
    label: &str,
    dataset: &[T],
    trial_count: usize,
    mut generic: G,
    mut specialized: S,
) -> Result<ComparisonReport, BenchError<E>>
where
    G: FnMut(&[T]) -> Result<Vec<String>, E>,
    S: FnMut(&[T]) -> Result<Vec<String>, E>,
{
    let data_size = dataset.len();

    let mut generic_log = TrialLog::new(format!("{label}.generic"), data_size);
    let generic_out = harness.record(&mut generic_log, trial_count, || generic(dataset))?;

    let mut specialized_log = TrialLog::new(format!("{label}.specialized"), data_size);
    let specialized_out =
        harness.record(&mut specialized_log, trial_count, || specialized(dataset))?;

    let clock = harness.clock();
    let (Some(generic_result), Some(specialized_result)) =
        (generic_log.summarize(clock), specialized_log.summarize(clock))
    else {
        return Err(BenchError::InvalidConfiguration {
            param: "trial_count",
            value: trial_count.to_string(),
            reason: "at least one trial is required",
        });
    };

    let (overhead_percent, degenerate) = overhead_percent(&generic_result, &specialized_result);
    if degenerate {
        tracing::warn!(label, "specialized mean is zero; overhead reported as 0");
    }

    let generic_digest = digest_outputs(&generic_out);
    let specialized_digest = digest_outputs(&specialized_out);
    let outputs_match = generic_digest == specialized_digest;
    if !outputs_match {
        tracing::warn!(label, "generic and specialized outputs differ");
    }

    let generic_samples = generic_log.samples();
    let specialized_samples = specialized_log.samples();
    let effect_size = cohens_d(&generic_samples, &specialized_samples);
    let welch = welch_t(&generic_samples, &specialized_samples);

    tracing::info!(
        label,
        data_size,
        trial_count,
        generic_mean_ms = generic_result.mean_ms,
        specialized_mean_ms = specialized_result.mean_ms,
        overhead_percent,
        outputs_match,
        "comparison complete"
    );

    Ok(ComparisonReport {
        label: label.to_string(),
        generic: generic_result,
        specialized: specialized_result,
        overhead_percent,
        degenerate,
        outputs_match,
        generic_digest,
        specialized_digest,
        effect_size,
        welch,
    })
}
