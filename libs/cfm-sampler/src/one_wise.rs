//! One-wise sampling (§4.4): cover every interval endpoint of every
//! feature's `instance_cardinality` across a minimal set of valid
//! configurations.

use crate::config::RandomSamplerConfig;
use crate::error::{Result, SamplingError};
use cfm_model::{Cardinality, Cfm, ConfigurationNode, Feature, FeatureId};
use rand::Rng;
use std::collections::{HashMap, HashSet};

type Assignment = (String, u32);

pub fn one_wise_sampling(
    cfm: &Cfm,
    config: &RandomSamplerConfig,
    rng: &mut impl Rng,
) -> Result<Vec<ConfigurationNode>> {
    if cfm.is_unbound() {
        return Err(SamplingError::Unbound);
    }

    let mut assignments = border_assignments(cfm);
    let mut samples = Vec::new();

    while let Some(chosen) = assignments.iter().next().cloned() {
        assignments.remove(&chosen);
        let (node, covered) = generate_valid_sample(cfm, rng, config, &chosen)?;
        samples.push(node);
        assignments.retain(|a| !covered.contains(a));
    }

    tracing::debug!(samples = samples.len(), "one-wise sampling complete");
    Ok(samples)
}

fn border_assignments(cfm: &Cfm) -> HashSet<Assignment> {
    let mut assignments = HashSet::new();
    for feature_id in cfm.features() {
        let feature = cfm.feature(feature_id);
        for value in feature.instance_cardinality.endpoints() {
            assignments.insert((feature.name.clone(), value));
        }
    }
    assignments
}

fn generate_valid_sample(
    cfm: &Cfm,
    rng: &mut impl Rng,
    config: &RandomSamplerConfig,
    chosen: &Assignment,
) -> Result<(ConfigurationNode, HashSet<Assignment>)> {
    for _ in 0..config.max_attempts {
        let mut global_count: HashMap<String, u32> = HashMap::new();
        let mut covered: HashSet<Assignment> = HashSet::new();
        covered.insert((cfm.root().name.clone(), 1));

        let node = generate_node(cfm, cfm.root_id(), rng, config, chosen, &mut global_count, &mut covered)?;

        if cfm_validator::validate(&node, cfm) && covered.contains(chosen) {
            return Ok((node, covered));
        }
    }

    Err(SamplingError::AttemptsExhausted { attempts: config.max_attempts })
}

fn generate_node(
    cfm: &Cfm,
    feature_id: FeatureId,
    rng: &mut impl Rng,
    config: &RandomSamplerConfig,
    chosen: &Assignment,
    global_count: &mut HashMap<String, u32>,
    covered: &mut HashSet<Assignment>,
) -> Result<ConfigurationNode> {
    let feature = cfm.feature(feature_id);
    let index = next_index(global_count, &feature.name);

    if feature.children.is_empty() {
        return Ok(ConfigurationNode::leaf(feature.name.clone(), index));
    }

    let counts = draw_child_counts(feature, cfm, rng, config, chosen)?;
    for (&child_id, &count) in feature.children.iter().zip(counts.iter()) {
        covered.insert((cfm.feature(child_id).name.clone(), count));
    }

    let mut children = Vec::new();
    for (&child_id, &count) in feature.children.iter().zip(counts.iter()) {
        for _ in 0..count {
            children.push(generate_node(cfm, child_id, rng, config, chosen, global_count, covered)?);
        }
    }

    Ok(ConfigurationNode::new(feature.name.clone(), index, children))
}

/// Draws one count per child (possibly zero), retrying until both group
/// cardinalities hold, forcing the chosen assignment's count whenever the
/// matching child is visited. Bounded by `max_attempts`, same as the
/// group-selection retry in plain random sampling.
fn draw_child_counts(
    feature: &Feature,
    cfm: &Cfm,
    rng: &mut impl Rng,
    config: &RandomSamplerConfig,
    chosen: &Assignment,
) -> Result<Vec<u32>> {
    for _ in 0..config.max_attempts {
        let counts: Vec<u32> = feature
            .children
            .iter()
            .map(|&child_id| {
                let child = cfm.feature(child_id);
                if child.name == chosen.0 {
                    chosen.1
                } else {
                    draw_cardinality(&child.instance_cardinality, rng)
                }
            })
            .collect();

        let sum_instances: u32 = counts.iter().sum();
        let sum_types = counts.iter().filter(|&&c| c != 0).count() as u32;

        if feature.group_instance_cardinality.contains(sum_instances)
            && feature.group_type_cardinality.contains(sum_types)
        {
            return Ok(counts);
        }
    }

    Err(SamplingError::AttemptsExhausted { attempts: config.max_attempts })
}

fn draw_cardinality(card: &Cardinality, rng: &mut impl Rng) -> u32 {
    let intervals = card.intervals();
    let interval = intervals[rng.gen_range(0..intervals.len())];
    let upper = interval.upper.unwrap_or(interval.lower);
    if upper <= interval.lower {
        interval.lower
    } else {
        rng.gen_range(interval.lower..=upper)
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
    fn s5_one_wise_covers_cheese_mix_boundaries() {
        let cfm = sandwich_bounded();
        let config = RandomSamplerConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let samples = one_wise_sampling(&cfm, &config, &mut rng).unwrap();
        assert!(!samples.is_empty());
        for sample in &samples {
            assert!(cfm_validator::validate(sample, &cfm));
        }
    }

    #[test]
    fn unbound_model_is_rejected() {
        let cfm = cfm_model::fixtures::sandwich_unbounded();
        let config = RandomSamplerConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        assert!(matches!(
            one_wise_sampling(&cfm, &config, &mut rng),
            Err(SamplingError::Unbound)
        ));
    }
}
