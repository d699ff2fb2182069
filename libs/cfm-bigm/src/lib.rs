//! Replaces every unbounded cardinality upper bound in a feature model with
//! a finite global bound (§4.2), so the samplers in `cfm-sampler` never
//! have to reason about `None` uppers.
//!
//! The global bound is the largest product of `instance_cardinality`
//! uppers along any root-to-leaf path that never passes through an
//! unbounded feature — any finite configuration was already within that
//! bound before this pass, so applying it cannot make a previously valid
//! configuration invalid.

use cfm_model::{Cfm, FeatureId};

/// Apply the Big-M bound in place. Infallible: a model with no unbounded
/// cardinalities is simply left untouched.
pub fn apply_big_m(cfm: &mut Cfm) {
    let global_upper_bound = get_global_upper_bound(cfm, cfm.root_id());
    tracing::debug!(global_upper_bound, "computed global upper bound");

    replace_infinite_upper_bounds(cfm, cfm.root_id(), global_upper_bound);
    tracing::debug!("applied Big-M global bound");
}

/// Largest product of `instance_cardinality` uppers along any finite path
/// rooted at `feature_id`. A feature whose own instance cardinality is
/// unbounded contributes 0, terminating any path through it.
fn get_global_upper_bound(cfm: &Cfm, feature_id: FeatureId) -> u32 {
    let feature = cfm.feature(feature_id);
    let Some(local_upper_bound) = feature.instance_cardinality.last_upper() else {
        return 0;
    };

    let mut global_upper_bound = local_upper_bound;
    for &child_id in &feature.children {
        let child_bound = get_global_upper_bound(cfm, child_id);
        global_upper_bound =
            global_upper_bound.max(local_upper_bound.saturating_mul(child_bound));
    }
    global_upper_bound
}

fn replace_infinite_upper_bounds(cfm: &mut Cfm, feature_id: FeatureId, global_upper_bound: u32) {
    let children: Vec<FeatureId> = cfm.feature(feature_id).children.clone();

    for &child_id in &children {
        if cfm.feature(child_id).instance_cardinality.is_unbound() {
            cfm.feature_mut(child_id)
                .instance_cardinality_mut()
                .set_last_upper(global_upper_bound);
            tracing::debug!(
                feature = %cfm.feature(child_id).name,
                global_upper_bound,
                "replaced unbounded instance cardinality"
            );
        }
        replace_infinite_upper_bounds(cfm, child_id, global_upper_bound);
    }

    let feature = cfm.feature(feature_id);
    if !feature.children.is_empty() && feature.group_instance_cardinality.is_unbound() {
        let new_upper: u32 = children
            .iter()
            .filter_map(|&id| cfm.feature(id).instance_cardinality.last_upper())
            .sum();
        cfm.feature_mut(feature_id)
            .group_instance_cardinality_mut()
            .set_last_upper(new_upper);
        tracing::debug!(
            feature = %cfm.feature(feature_id).name,
            new_upper,
            "replaced unbounded group instance cardinality"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    /// Mirrors the fixed Veggies/Tomato/Lettuce/Onion model used to pin
    /// down the exact arithmetic: global bound 12 turns an unbounded
    /// group instance cardinality into `[1, 27]` and each unbounded child
    /// instance cardinality into `[0, 12]`, while Onion's already-finite
    /// `[0, 3]` is left alone.
    fn veggies_model() -> Cfm {
        let mut b = CfmBuilder::new();
        b.add_feature(
            "Veggies",
            card(&[(1, Some(1))]),
            card(&[(1, Some(3))]),
            Cardinality::new(vec![Interval::unbounded(1)]).unwrap(),
            None,
        )
        .unwrap();
        b.add_feature(
            "Tomato",
            Cardinality::new(vec![Interval::unbounded(0)]).unwrap(),
            Cardinality::empty(),
            Cardinality::empty(),
            Some("Veggies"),
        )
        .unwrap();
        b.add_feature(
            "Lettuce",
            Cardinality::new(vec![Interval::unbounded(0)]).unwrap(),
            Cardinality::empty(),
            Cardinality::empty(),
            Some("Veggies"),
        )
        .unwrap();
        b.add_feature("Onion", card(&[(0, Some(3))]), Cardinality::empty(), Cardinality::empty(), Some("Veggies"))
            .unwrap();
        b.build().unwrap()
    }

    #[test]
    fn replaces_unbound_uppers_with_exact_arithmetic() {
        let mut cfm = veggies_model();
        replace_infinite_upper_bounds(&mut cfm, cfm.root_id(), 12);

        let veggies = cfm.root();
        assert_eq!(veggies.group_instance_cardinality.last_upper(), Some(27));

        let tomato = cfm.feature(veggies.children[0]);
        assert_eq!(tomato.instance_cardinality.last_upper(), Some(12));
        let lettuce = cfm.feature(veggies.children[1]);
        assert_eq!(lettuce.instance_cardinality.last_upper(), Some(12));
        let onion = cfm.feature(veggies.children[2]);
        assert_eq!(onion.instance_cardinality.last_upper(), Some(3));
    }

    #[test]
    fn apply_big_m_fully_bounds_the_sandwich_model() {
        let mut cfm = cfm_model::fixtures::sandwich_unbounded();
        assert!(cfm.is_unbound());

        apply_big_m(&mut cfm);

        assert!(!cfm.is_unbound());
    }

    #[test]
    fn already_bounded_model_is_left_unchanged() {
        let mut cfm = cfm_model::fixtures::sandwich_bounded();
        let before: Vec<Option<u32>> = cfm.features().map(|id| cfm.feature(id).instance_cardinality.last_upper()).collect();

        apply_big_m(&mut cfm);

        let after: Vec<Option<u32>> = cfm.features().map(|id| cfm.feature(id).instance_cardinality.last_upper()).collect();
        assert_eq!(before, after);
    }
}
