//! t-wise sampling (§4.6): cover every valid size-*t* interaction of
//! feature/count literals across a minimal SMT-verified sample.
//!
//! Multiset mode (`literal_set_scaled`) scales each feature's interval
//! endpoints by its immediate parent's own raw bounds, matching
//! `calculate_literal_set`'s `lower_factor`/`upper_factor` recursion in
//! the upstream t-wise sampler. Instance-set mode (`literal_set_raw`)
//! skips that scaling since its per-parent-slot encoding already
//! distinguishes individual parent instances. Neither mode performs the
//! full SMT-probed contiguous-run search the multiset encoding could in
//! principle support — the same simplification the upstream sampler
//! itself leaves as a "TODO: interval gap search" rather than a finished
//! feature.

use crate::error::{Result, SamplingError};
use cfm_model::{Cfm, ConfigurationNode, FeatureId};
use cfm_smt::{IntExpr, PushGuard, SmtSolver};
use std::collections::{HashMap, HashSet};

type Literal = (String, u32);

pub fn t_wise_sampling(cfm: &Cfm, t: usize) -> Result<Vec<ConfigurationNode>> {
    if cfm.is_unbound() {
        return Err(SamplingError::Unbound);
    }

    let literals = literal_set_scaled(cfm);
    let interactions = enumerate_interactions(&literals, t);

    let z3_config = z3::Config::new();
    let ctx = z3::Context::new(&z3_config);
    let mut solver = cfm_smt::Z3Solver::new(&ctx);
    let vars = cfm_smt::encode_multiset(&mut solver, cfm)?;

    let mut sample: Vec<HashMap<String, i64>> = Vec::new();
    for interaction in &interactions {
        cover(&mut solver, &vars, &mut sample, interaction);
    }
    autocomplete(&mut solver, &vars, &mut sample)?;

    tracing::debug!(
        interactions = interactions.len(),
        samples = sample.len(),
        "t-wise multiset sampling complete"
    );

    sample.iter().map(|counts| reconstruct(cfm, counts)).collect()
}

/// Same cover loop and literal set as [`t_wise_sampling`], but feasibility
/// is checked against the richer per-parent-slot encoding. Both modes
/// share the same even-split reconstruction into a concrete tree: a
/// precise per-slot reconstruction would need compound ancestor-slot
/// indexing the distilled model doesn't uniquely pin down.
pub fn t_wise_sampling_instance_set(cfm: &Cfm, t: usize) -> Result<Vec<ConfigurationNode>> {
    if cfm.is_unbound() {
        return Err(SamplingError::Unbound);
    }

    let literals = literal_set_raw(cfm);
    let interactions = enumerate_interactions(&literals, t);

    let z3_config = z3::Config::new();
    let ctx = z3::Context::new(&z3_config);
    let mut solver = cfm_smt::Z3Solver::new(&ctx);
    let instance_set = cfm_smt::encode_instance_set(&mut solver, cfm)?;
    let vars = instance_set.multiset;

    let mut sample: Vec<HashMap<String, i64>> = Vec::new();
    for interaction in &interactions {
        cover(&mut solver, &vars, &mut sample, interaction);
    }
    autocomplete(&mut solver, &vars, &mut sample)?;

    tracing::debug!(
        interactions = interactions.len(),
        samples = sample.len(),
        "t-wise instance-set sampling complete"
    );

    sample.iter().map(|counts| reconstruct(cfm, counts)).collect()
}

/// Multiset-mode literal set: each feature's own interval endpoints scaled
/// by its *immediate parent's* raw `instance_cardinality` bounds, exactly
/// as `calculate_literal_set(feature, lower_factor, upper_factor)` walks
/// the tree top-down in the upstream t-wise sampler — the factor is the
/// parent's own bound, not a product accumulated over the whole ancestor
/// chain.
fn literal_set_scaled(cfm: &Cfm) -> Vec<Literal> {
    let mut set = HashSet::new();
    collect_scaled_literals(cfm, cfm.root_id(), 1, 1, &mut set);
    set.into_iter().collect()
}

fn collect_scaled_literals(
    cfm: &Cfm,
    feature_id: FeatureId,
    lower_factor: u32,
    upper_factor: u32,
    set: &mut HashSet<Literal>,
) {
    let feature = cfm.feature(feature_id);
    for interval in feature.instance_cardinality.intervals() {
        set.insert((feature.name.clone(), lower_factor.saturating_mul(interval.lower)));
        if let Some(upper) = interval.upper {
            set.insert((feature.name.clone(), upper_factor.saturating_mul(upper)));
        }
    }

    if feature.children.is_empty() {
        return;
    }

    let child_lower_factor = feature
        .instance_cardinality
        .intervals()
        .first()
        .map(|i| i.lower)
        .unwrap_or(1);
    let child_upper_factor = feature.instance_cardinality.last_upper().unwrap_or(1);

    for &child_id in &feature.children {
        collect_scaled_literals(cfm, child_id, child_lower_factor, child_upper_factor, set);
    }
}

/// Instance-set-mode literal set: raw interval endpoints, unscaled — the
/// per-parent-slot encoding already distinguishes individual parent
/// instances, so no path factor is needed here.
fn literal_set_raw(cfm: &Cfm) -> Vec<Literal> {
    let mut set = HashSet::new();
    for feature_id in cfm.features() {
        let feature = cfm.feature(feature_id);
        for value in feature.instance_cardinality.endpoints() {
            set.insert((feature.name.clone(), value));
        }
    }
    set.into_iter().collect()
}

/// All size-`t` subsets of `literals` with pairwise-distinct feature
/// names.
fn enumerate_interactions(literals: &[Literal], t: usize) -> Vec<Vec<Literal>> {
    if t == 0 || t > literals.len() {
        return Vec::new();
    }

    let mut result = Vec::new();
    let mut combo = Vec::with_capacity(t);
    combine(literals, 0, t, &mut combo, &mut result);

    result
        .into_iter()
        .filter(|interaction: &Vec<Literal>| {
            (0..interaction.len()).all(|i| {
                ((i + 1)..interaction.len()).all(|j| interaction[i].0 != interaction[j].0)
            })
        })
        .collect()
}

fn combine(
    items: &[Literal],
    start: usize,
    t: usize,
    combo: &mut Vec<Literal>,
    result: &mut Vec<Vec<Literal>>,
) {
    if combo.len() == t {
        result.push(combo.clone());
        return;
    }
    for i in start..items.len() {
        combo.push(items[i].clone());
        combine(items, i + 1, t, combo, result);
        combo.pop();
    }
}

fn already_covered(sample: &[HashMap<String, i64>], interaction: &[Literal]) -> bool {
    sample.iter().any(|config| {
        interaction
            .iter()
            .all(|(name, value)| config.get(name) == Some(&(*value as i64)))
    })
}

fn feasible<S: SmtSolver>(
    solver: &mut S,
    vars: &HashMap<String, S::Var>,
    interaction: &[Literal],
    fixed: Option<&HashMap<String, i64>>,
) -> bool {
    let mut guard = PushGuard::new(solver);
    for (name, value) in interaction {
        if let Some(&var) = vars.get(name) {
            guard
                .solver()
                .assert(IntExpr::var(var).eq_expr(IntExpr::Const(*value as i64)));
        }
    }
    if let Some(fixed) = fixed {
        for (name, value) in fixed {
            if let Some(&var) = vars.get(name) {
                guard.solver().assert(IntExpr::var(var).eq_expr(IntExpr::Const(*value)));
            }
        }
    }
    guard.solver().check().is_sat()
}

fn cover<S: SmtSolver>(
    solver: &mut S,
    vars: &HashMap<String, S::Var>,
    sample: &mut Vec<HashMap<String, i64>>,
    interaction: &[Literal],
) {
    if already_covered(sample, interaction) {
        return;
    }
    if !feasible(solver, vars, interaction, None) {
        return;
    }

    for config in sample.iter_mut() {
        if feasible(solver, vars, interaction, Some(config)) {
            for (name, value) in interaction {
                config.insert(name.clone(), *value as i64);
            }
            return;
        }
    }

    sample.push(interaction.iter().map(|(n, v)| (n.clone(), *v as i64)).collect());
}

fn autocomplete<S: SmtSolver>(
    solver: &mut S,
    vars: &HashMap<String, S::Var>,
    sample: &mut [HashMap<String, i64>],
) -> Result<()> {
    for config in sample.iter_mut() {
        let mut guard = PushGuard::new(solver);
        for (name, value) in config.iter() {
            if let Some(&var) = vars.get(name) {
                guard.solver().assert(IntExpr::var(var).eq_expr(IntExpr::Const(*value)));
            }
        }
        if !guard.solver().check().is_sat() {
            return Err(SamplingError::Smt(cfm_smt::Error::AutocompleteInfeasible));
        }
        let model = guard
            .solver()
            .model()
            .ok_or(SamplingError::Smt(cfm_smt::Error::AutocompleteInfeasible))?;
        for (name, &var) in vars.iter() {
            if let Some(&value) = model.get(&var) {
                config.insert(name.clone(), value);
            }
        }
    }
    Ok(())
}

fn reconstruct(cfm: &Cfm, counts: &HashMap<String, i64>) -> Result<ConfigurationNode> {
    let mut global_count = HashMap::new();
    let root_count = counts.get(&cfm.root().name).copied().unwrap_or(1).max(1) as u32;
    let mut nodes = build_subtree(cfm, cfm.root_id(), root_count, counts, &mut global_count);
    let node = nodes
        .pop()
        .ok_or(SamplingError::AttemptsExhausted { attempts: 0 })?;
    debug_assert!(
        cfm_validator::validate(&node, cfm),
        "t-wise reconstruction produced an invalid configuration"
    );
    Ok(node)
}

fn distribute(total: u32, instances: u32) -> Vec<u32> {
    if instances == 0 {
        return Vec::new();
    }
    let base = total / instances;
    let remainder = total % instances;
    (0..instances).map(|i| base + u32::from(i < remainder)).collect()
}

fn build_subtree(
    cfm: &Cfm,
    feature_id: FeatureId,
    n_instances: u32,
    counts: &HashMap<String, i64>,
    global_count: &mut HashMap<String, u32>,
) -> Vec<ConfigurationNode> {
    let feature = cfm.feature(feature_id);

    if feature.children.is_empty() {
        return (0..n_instances)
            .map(|_| ConfigurationNode::leaf(feature.name.clone(), next_index(global_count, &feature.name)))
            .collect();
    }

    let child_totals: Vec<(FeatureId, u32)> = feature
        .children
        .iter()
        .map(|&child_id| {
            let name = &cfm.feature(child_id).name;
            let total = counts.get(name).copied().unwrap_or(0).max(0) as u32;
            (child_id, total)
        })
        .collect();

    let splits: Vec<Vec<u32>> = child_totals
        .iter()
        .map(|&(_, total)| distribute(total, n_instances))
        .collect();

    (0..n_instances as usize)
        .map(|bucket| {
            let index = next_index(global_count, &feature.name);
            let mut children = Vec::new();
            for (pos, &(child_id, _)) in child_totals.iter().enumerate() {
                let bucket_count = splits[pos][bucket];
                children.extend(build_subtree(cfm, child_id, bucket_count, counts, global_count));
            }
            ConfigurationNode::new(feature.name.clone(), index, children)
        })
        .collect()
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
    use cfm_smt::fake::FakeSolver;

    #[test]
    fn enumerate_interactions_drops_same_feature_collisions() {
        let literals = vec![
            ("A".to_string(), 0),
            ("A".to_string(), 1),
            ("B".to_string(), 0),
        ];
        let interactions = enumerate_interactions(&literals, 2);
        assert!(interactions
            .iter()
            .all(|interaction| interaction[0].0 != interaction[1].0));
        assert!(interactions.contains(&vec![("A".to_string(), 0), ("B".to_string(), 0)]));
    }

    /// `Group`'s own `instance_cardinality` upper bound is 3 (unlike the
    /// Sandwich fixture, where every feature caps at 1), so `Leaf`'s
    /// scaled literal set must include `upper_factor(3) * leaf_upper(1)`
    /// rather than the raw endpoint 1.
    fn multi_instance_group_model() -> Cfm {
        use cfm_model::{Cardinality, CfmBuilder, Interval};

        fn card(intervals: &[(u32, Option<u32>)]) -> Cardinality {
            Cardinality::new(
                intervals
                    .iter()
                    .map(|(lo, hi)| Interval::new(*lo, *hi).unwrap())
                    .collect(),
            )
            .unwrap()
        }

        let mut b = CfmBuilder::new();
        b.add_feature(
            "Root",
            card(&[(1, Some(1))]),
            card(&[(1, Some(1))]),
            card(&[(1, Some(1))]),
            None,
        )
        .unwrap();
        b.add_feature(
            "Group",
            card(&[(0, Some(3))]),
            card(&[(0, Some(1))]),
            card(&[(0, Some(3))]),
            Some("Root"),
        )
        .unwrap();
        b.add_feature(
            "Leaf",
            card(&[(0, Some(1))]),
            Cardinality::empty(),
            Cardinality::empty(),
            Some("Group"),
        )
        .unwrap();

        b.build().unwrap()
    }

    #[test]
    fn scaled_literal_set_multiplies_by_parent_bounds() {
        let cfm = multi_instance_group_model();
        let literals: HashSet<Literal> = literal_set_scaled(&cfm).into_iter().collect();

        // Group's own bounds (lower=0, upper=3) pass down as the factor
        // for its child Leaf: lower_factor=0, upper_factor=3.
        assert!(literals.contains(&("Leaf".to_string(), 0)));
        assert!(literals.contains(&("Leaf".to_string(), 3)));
        // The raw, unscaled endpoint is not what multiset mode should add.
        assert!(!literals.contains(&("Leaf".to_string(), 1)));

        let raw: HashSet<Literal> = literal_set_raw(&cfm).into_iter().collect();
        assert!(raw.contains(&("Leaf".to_string(), 1)));
    }

    #[test]
    fn distribute_splits_as_evenly_as_possible() {
        assert_eq!(distribute(7, 3), vec![3, 2, 2]);
        assert_eq!(distribute(0, 3), vec![0, 0, 0]);
        assert_eq!(distribute(5, 0), Vec::<u32>::new());
    }

    #[test]
    fn s6_t_wise_pair_coverage_on_sandwich() {
        let cfm = sandwich_bounded();
        let literals = literal_set_scaled(&cfm);
        let interactions = enumerate_interactions(&literals, 2);
        assert!(!interactions.is_empty());

        let mut solver = FakeSolver::new(0..=3);
        let vars = cfm_smt::encode_multiset(&mut solver, &cfm).unwrap();

        let mut sample: Vec<HashMap<String, i64>> = Vec::new();
        for interaction in &interactions {
            cover(&mut solver, &vars, &mut sample, interaction);
        }
        assert!(!sample.is_empty());

        autocomplete(&mut solver, &vars, &mut sample).unwrap();
        for config in &sample {
            let node = reconstruct(&cfm, config).unwrap();
            assert!(cfm_validator::validate(&node, &cfm));
        }
    }
}
