use serde::{Deserialize, Serialize};

/// Tuning knobs for the generate-and-test samplers (§4.3/§4.4). Every
/// retry loop in this crate is bounded by `max_attempts` rather than
/// looping forever on a model that happens to admit no valid sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomSamplerConfig {
    pub max_attempts: u32,
    /// Skews `sample_random`'s per-value draws toward each interval's
    /// upper bound with `p(i) ∝ i^bias`. `0` is uniform (§4.3
    /// "Variants"). One-wise sampling ignores this and always draws
    /// uniformly, per its own contract.
    pub bias: u32,
}

impl Default for RandomSamplerConfig {
    fn default() -> Self {
        Self { max_attempts: 1_000, bias: 0 }
    }
}
