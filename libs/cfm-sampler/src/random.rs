//! Random sampling by generate-and-test (§4.3): draw cardinality-respecting
//! counts top-down, retrying a subtree's child selection until its group
//! cardinalities hold, then validate the finished tree as a final check.

use crate::config::RandomSamplerConfig;
use crate::error::{Result, SamplingError};
use cfm_model::{Cardinality, Cfm, Feature, FeatureId};
use rand::Rng;
use std::collections::HashMap;

pub fn sample_random(
    cfm: &Cfm,
    config: &RandomSamplerConfig,
    rng: &mut impl Rng,
) -> Result<cfm_model::ConfigurationNode> {
    if cfm.is_unbound() {
        return Err(SamplingError::Unbound);
    }

    for attempt in 0..config.max_attempts {
        let mut global_count: HashMap<String, u32> = HashMap::new();
        let node = generate_node(cfm, cfm.root_id(), rng, config, &mut global_count)?;
        if cfm_validator::validate(&node, cfm) {
            tracing::debug!(attempt, "generated a valid random sample");
            return Ok(node);
        }
    }

    Err(SamplingError::AttemptsExhausted { attempts: config.max_attempts })
}

fn generate_node(
    cfm: &Cfm,
    feature_id: FeatureId,
    rng: &mut impl Rng,
    config: &RandomSamplerConfig,
    global_count: &mut HashMap<String, u32>,
) -> Result<cfm_model::ConfigurationNode> {
    let feature = cfm.feature(feature_id);
    let index = next_index(global_count, &feature.name);

    if feature.children.is_empty() {
        return Ok(cfm_model::ConfigurationNode::leaf(feature.name.clone(), index));
    }

    let (selected, counts) = draw_children(feature, cfm, rng, config)?;

    let mut children = Vec::new();
    for (&child_id, &count) in selected.iter().zip(counts.iter()) {
        for _ in 0..count {
            children.push(generate_node(cfm, child_id, rng, config, global_count)?);
        }
    }

    Ok(cfm_model::ConfigurationNode::new(feature.name.clone(), index, children))
}

/// Picks which children are present and how many instances of each, in
/// CFM child order, retrying until both group cardinalities hold.
fn draw_children(
    feature: &Feature,
    cfm: &Cfm,
    rng: &mut impl Rng,
    config: &RandomSamplerConfig,
) -> Result<(Vec<FeatureId>, Vec<u32>)> {
    for _ in 0..config.max_attempts {
        let group_type_count = draw_cardinality(&feature.group_type_cardinality, rng, config.bias);

        let required: Vec<FeatureId> = feature
            .children
            .iter()
            .copied()
            .filter(|&id| cfm.feature(id).is_required())
            .collect();
        let optional: Vec<FeatureId> = feature
            .children
            .iter()
            .copied()
            .filter(|&id| !cfm.feature(id).is_required())
            .collect();

        let amount_optional = (group_type_count as usize)
            .saturating_sub(required.len())
            .min(optional.len());
        let optional_sample = sample_without_replacement(&optional, amount_optional, rng);

        let mut selected: Vec<FeatureId> = required.into_iter().chain(optional_sample).collect();
        selected.sort_by_key(|id| feature.children.iter().position(|c| c == id).unwrap());

        let mut counts = Vec::with_capacity(selected.len());
        let mut sum_instances: u32 = 0;
        for &child_id in &selected {
            let child = cfm.feature(child_id);
            let count = draw_without_zero(&child.name, &child.instance_cardinality, rng, config.bias)?;
            sum_instances += count;
            counts.push(count);
        }

        if feature.group_instance_cardinality.contains(sum_instances)
            && feature.group_type_cardinality.contains(selected.len() as u32)
        {
            return Ok((selected, counts));
        }
    }

    Err(SamplingError::AttemptsExhausted { attempts: config.max_attempts })
}

fn sample_without_replacement(
    pool: &[FeatureId],
    amount: usize,
    rng: &mut impl Rng,
) -> Vec<FeatureId> {
    let mut indices: Vec<usize> = (0..pool.len()).collect();
    for i in (1..indices.len()).rev() {
        let j = rng.gen_range(0..=i);
        indices.swap(i, j);
    }
    indices.truncate(amount);
    indices.sort_unstable();
    indices.into_iter().map(|i| pool[i]).collect()
}

/// Draws a value from `card`, uniformly when `bias == 0` and weighted
/// toward the interval's upper bound by `p(i) ∝ i^bias` otherwise (§4.3
/// "Variants").
fn draw_cardinality(card: &Cardinality, rng: &mut impl Rng, bias: u32) -> u32 {
    let intervals = card.intervals();
    let interval = intervals[rng.gen_range(0..intervals.len())];
    draw_from_interval(interval, rng, bias)
}

fn draw_from_interval(interval: cfm_model::Interval, rng: &mut impl Rng, bias: u32) -> u32 {
    let upper = interval.upper.unwrap_or(interval.lower);
    if upper <= interval.lower {
        return interval.lower;
    }
    if bias == 0 {
        return rng.gen_range(interval.lower..=upper);
    }
    weighted_pick(interval.lower, upper, bias, rng)
}

/// Weighted pick within `[lower, upper]` with `p(i) ∝ i^bias`. Values of
/// 0 always carry weight 0 once `bias >= 1`, which is the point: bias
/// skews away from the low end, all the way to the upper bound.
fn weighted_pick(lower: u32, upper: u32, bias: u32, rng: &mut impl Rng) -> u32 {
    let weights: Vec<f64> = (lower..=upper).map(|i| (i as f64).powi(bias as i32)).collect();
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return lower;
    }

    let mut pick = rng.gen_range(0.0..total);
    for (offset, &weight) in weights.iter().enumerate() {
        if pick < weight {
            return lower + offset as u32;
        }
        pick -= weight;
    }
    upper
}

/// Draws a non-zero value from `card`, rejection-sampling against zero.
/// Fails outright if `card` can never produce one.
fn draw_without_zero(name: &str, card: &Cardinality, rng: &mut impl Rng, bias: u32) -> Result<u32> {
    let has_nonzero = card
        .intervals()
        .iter()
        .any(|interval| interval.upper.map_or(true, |upper| upper > 0) || interval.lower > 0);
    if !has_nonzero {
        return Err(SamplingError::NoNonZeroInterval(name.to_string()));
    }
    loop {
        let value = draw_cardinality(card, rng, bias);
        if value != 0 {
            return Ok(value);
        }
    }
}

fn next_index(global_count: &mut HashMap<String, u32>, name: &str) -> u32 {
    let counter = global_count.entry(name.to_string()).or_insert(0);
    let index = *counter;
    *counter += 1;
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfm_model::fixtures::sandwich_bounded;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn random_sampling_produces_a_valid_configuration() {
        let cfm = sandwich_bounded();
        let config = RandomSamplerConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let node = sample_random(&cfm, &config, &mut rng).unwrap();
        assert!(cfm_validator::validate(&node, &cfm));
    }

    #[test]
    fn unbound_model_is_rejected_up_front() {
        let cfm = cfm_model::fixtures::sandwich_unbounded();
        let config = RandomSamplerConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(sample_random(&cfm, &config, &mut rng), Err(SamplingError::Unbound)));
    }

    #[test]
    fn biased_sampling_still_produces_a_valid_configuration() {
        let cfm = sandwich_bounded();
        let config = RandomSamplerConfig { max_attempts: 1_000, bias: 3 };
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let node = sample_random(&cfm, &config, &mut rng).unwrap();
        assert!(cfm_validator::validate(&node, &cfm));
    }

    #[test]
    fn weighted_pick_stays_within_interval_bounds() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..50 {
            let value = weighted_pick(1, 5, 3, &mut rng);
            assert!((1..=5).contains(&value));
        }
    }

    #[test]
    fn zero_bias_draw_stays_within_interval_bounds() {
        let interval = cfm_model::Interval::new(0, Some(3)).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..50 {
            let value = draw_from_interval(interval, &mut rng, 0);
            assert!(value <= 3);
        }
    }
}
