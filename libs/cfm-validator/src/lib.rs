//! Validates a [`ConfigurationNode`] tree against a [`Cfm`] (§4.1).
//!
//! `validate` is a pure predicate: it never panics on malformed input and
//! never returns an error — `false` is the only failure signal (§7).

use cfm_model::{Cfm, ConfigurationNode, Feature, FeatureId};
use std::collections::HashMap;

/// Validate a configuration against a feature model.
///
/// Checks both the structural rules (cardinalities at every level,
/// partitioned by CFM child order) and the cross-tree constraint rules.
pub fn validate(config: &ConfigurationNode, cfm: &Cfm) -> bool {
    if config.name != cfm.root().name {
        tracing::debug!(root = %config.name, expected = %cfm.root().name, "root name mismatch");
        return false;
    }

    let valid = validate_node(config, cfm.root_id(), cfm) && validate_constraints(config, cfm);
    tracing::debug!(valid, "validated configuration");
    valid
}

fn validate_node(node: &ConfigurationNode, feature_id: FeatureId, cfm: &Cfm) -> bool {
    let feature = cfm.feature(feature_id);

    if feature.is_leaf() {
        return node.children.is_empty();
    }

    let groups = partition_children(&node.children, &feature.children, cfm);

    if !feature
        .group_instance_cardinality
        .contains(node.children.len() as u32)
    {
        return false;
    }

    let distinct_present = groups.iter().filter(|g| !g.is_empty()).count();
    if !feature.group_type_cardinality.contains(distinct_present as u32) {
        return false;
    }

    for (child_id, group) in feature.children.iter().zip(groups.iter()) {
        let child: &Feature = cfm.feature(*child_id);
        if !child.instance_cardinality.contains(group.len() as u32) {
            return false;
        }
        if !group.iter().all(|n| validate_node(n, *child_id, cfm)) {
            return false;
        }
    }

    true
}

/// A single left-to-right pass that greedily consumes nodes whose name
/// matches the current expected child; a mismatch advances to the next
/// expected child instead of the next node. Nodes matching no remaining
/// expected child are left out of every group (§4.1 "why partitioning
/// matters").
fn partition_children<'a>(
    children: &'a [ConfigurationNode],
    expected: &[FeatureId],
    cfm: &Cfm,
) -> Vec<Vec<&'a ConfigurationNode>> {
    let mut groups: Vec<Vec<&ConfigurationNode>> = expected.iter().map(|_| Vec::new()).collect();
    let mut expected_idx = 0;
    let mut child_idx = 0;

    while child_idx < children.len() && expected_idx < expected.len() {
        let expected_name = &cfm.feature(expected[expected_idx]).name;
        if children[child_idx].name == *expected_name {
            groups[expected_idx].push(&children[child_idx]);
            child_idx += 1;
        } else {
            expected_idx += 1;
        }
    }

    groups
}

fn validate_constraints(config: &ConfigurationNode, cfm: &Cfm) -> bool {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    count_names(config, &mut counts);

    cfm.constraints().iter().all(|constraint| {
        let first_name = cfm.feature(constraint.first).name.as_str();
        let second_name = cfm.feature(constraint.second).name.as_str();
        let first_count = counts.get(first_name).copied().unwrap_or(0);
        let second_count = counts.get(second_name).copied().unwrap_or(0);
        constraint.is_satisfied(first_count, second_count)
    })
}

fn count_names<'a>(node: &'a ConfigurationNode, counts: &mut HashMap<&'a str, u32>) {
    *counts.entry(node.name.as_str()).or_insert(0) += 1;
    for child in &node.children {
        count_names(child, counts);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfm_model::fixtures::{sandwich_bounded, sandwich_with_wheat_requires_tomato};

    fn leaf(name: &str, idx: u32) -> ConfigurationNode {
        ConfigurationNode::leaf(name, idx)
    }

    #[test]
    fn s2_sandwich_validates() {
        let cfm = sandwich_bounded();
        let config = ConfigurationNode::new(
            "Sandwich",
            0,
            vec![
                ConfigurationNode::new("Bread", 0, vec![leaf("Sourdough", 0)]),
                ConfigurationNode::new("CheeseMix", 0, vec![leaf("Cheddar", 0)]),
            ],
        );
        assert!(validate(&config, &cfm));
    }

    #[test]
    fn wrong_root_name_fails() {
        let cfm = sandwich_bounded();
        let config = ConfigurationNode::new("NotSandwich", 0, Vec::new());
        assert!(!validate(&config, &cfm));
    }

    #[test]
    fn missing_required_bread_fails() {
        let cfm = sandwich_bounded();
        let config = ConfigurationNode::new(
            "Sandwich",
            0,
            vec![ConfigurationNode::new("CheeseMix", 0, vec![leaf("Cheddar", 0)])],
        );
        // Only one child present: group_instance_cardinality [1,3] still
        // holds for a count of 1, but Bread (required, [1,1]) is absent
        // so its own instance_cardinality check (0 ∈ [1,1]) fails.
        assert!(!validate(&config, &cfm));
    }

    #[test]
    fn leaf_feature_with_children_fails() {
        let cfm = sandwich_bounded();
        let config = ConfigurationNode::new(
            "Sandwich",
            0,
            vec![
                ConfigurationNode::new(
                    "Bread",
                    0,
                    vec![ConfigurationNode::new("Sourdough", 0, vec![leaf("Ghost", 0)])],
                ),
                ConfigurationNode::new("CheeseMix", 0, vec![leaf("Cheddar", 0)]),
            ],
        );
        assert!(!validate(&config, &cfm));
    }

    #[test]
    fn out_of_order_children_fail_partitioning() {
        let cfm = sandwich_bounded();
        // CheeseMix before Bread: CFM child order is Bread, CheeseMix,
        // Veggies, so this must not validate even though the same nodes
        // would validate in the correct order.
        let config = ConfigurationNode::new(
            "Sandwich",
            0,
            vec![
                ConfigurationNode::new("CheeseMix", 0, vec![leaf("Cheddar", 0)]),
                ConfigurationNode::new("Bread", 0, vec![leaf("Sourdough", 0)]),
            ],
        );
        assert!(!validate(&config, &cfm));
    }

    #[test]
    fn s4_constraint_rejection() {
        let cfm = sandwich_with_wheat_requires_tomato();
        let config = ConfigurationNode::new(
            "Sandwich",
            0,
            vec![
                ConfigurationNode::new("Bread", 0, vec![leaf("Wheat", 0)]),
                ConfigurationNode::new("Veggies", 0, vec![leaf("Lettuce", 0)]),
            ],
        );
        assert!(!validate(&config, &cfm));
    }

    #[test]
    fn s4_constraint_satisfied_when_tomato_present() {
        let cfm = sandwich_with_wheat_requires_tomato();
        let config = ConfigurationNode::new(
            "Sandwich",
            0,
            vec![
                ConfigurationNode::new("Bread", 0, vec![leaf("Wheat", 0)]),
                ConfigurationNode::new(
                    "Veggies",
                    0,
                    vec![leaf("Lettuce", 0), leaf("Tomato", 0)],
                ),
            ],
        );
        assert!(validate(&config, &cfm));
    }

    #[test]
    fn exclude_constraint_does_not_fire_when_antecedent_absent() {
        // §9 open question #1: an exclude constraint whose antecedent is
        // out of cardinality simply does not fire, same as require.
        let cfm = {
            let mut b = cfm_model::CfmBuilder::new();
            let one = cfm_model::Cardinality::new(vec![cfm_model::Interval::new(1, Some(1)).unwrap()]).unwrap();
            let zero_one = cfm_model::Cardinality::new(vec![cfm_model::Interval::new(0, Some(1)).unwrap()]).unwrap();
            b.add_feature("Root", one.clone(), zero_one.clone(), zero_one.clone(), None)
                .unwrap();
            b.add_feature("A", zero_one.clone(), cfm_model::Cardinality::empty(), cfm_model::Cardinality::empty(), Some("Root"))
                .unwrap();
            b.add_feature("B", zero_one.clone(), cfm_model::Cardinality::empty(), cfm_model::Cardinality::empty(), Some("Root"))
                .unwrap();
            b.add_constraint(false, "A", one.clone(), "B", one.clone()).unwrap();
            b.build().unwrap()
        };

        // A is absent (count 0, not in [1,1]) so the exclude constraint
        // does not fire, even though B is present.
        let config = ConfigurationNode::new("Root", 0, vec![leaf("B", 0)]);
        assert!(validate(&config, &cfm));
    }
}
