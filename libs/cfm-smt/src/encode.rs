//! Builds SMT assertions for a bounded [`Cfm`] (§4.5). Two encodings share
//! the same cardinality-membership and constraint helpers: `encode_multiset`
//! (one variable per feature name) and `encode_instance_set` (additionally,
//! one variable per parent-slot).

use crate::error::{Error, Result};
use crate::expr::IntExpr;
use crate::solver::SmtSolver;
use cfm_model::{Cardinality, Cfm, FeatureId};
use std::collections::HashMap;

fn get_or_declare<S: SmtSolver>(
    solver: &mut S,
    vars: &mut HashMap<String, S::Var>,
    name: &str,
) -> S::Var {
    if let Some(var) = vars.get(name) {
        *var
    } else {
        let var = solver.declare_int(name);
        vars.insert(name.to_string(), var);
        var
    }
}

/// `var ∈ card`, expressed as a disjunction of the interval-membership
/// assertions `lower ≤ var ≤ upper`.
fn cardinality_membership<V: Copy>(var: V, card: &Cardinality) -> IntExpr<V> {
    let disjuncts = card
        .intervals()
        .iter()
        .map(|interval| {
            let ge = IntExpr::var(var).ge(IntExpr::Const(interval.lower as i64));
            match interval.upper {
                Some(upper) => IntExpr::and(vec![ge, IntExpr::var(var).le(IntExpr::Const(upper as i64))]),
                None => ge,
            }
        })
        .collect();
    IntExpr::or(disjuncts)
}

/// `sum_expr ∈ card`, with both bounds of every interval scaled by `scale`
/// — the group-instance-cardinality shape, scaled by the owning feature's
/// own count.
fn scaled_membership<V: Copy>(sum_expr: IntExpr<V>, card: &Cardinality, scale: IntExpr<V>) -> IntExpr<V> {
    let disjuncts = card
        .intervals()
        .iter()
        .map(|interval| {
            let lower = IntExpr::mul(interval.lower as i64, scale.clone());
            let ge = sum_expr.clone().ge(lower);
            match interval.upper {
                Some(upper) => {
                    let upper = IntExpr::mul(upper as i64, scale.clone());
                    IntExpr::and(vec![ge, sum_expr.clone().le(upper)])
                }
                None => ge,
            }
        })
        .collect();
    IntExpr::or(disjuncts)
}

fn encode_constraints<S: SmtSolver>(
    solver: &mut S,
    cfm: &Cfm,
    vars: &mut HashMap<String, S::Var>,
) {
    for constraint in cfm.constraints() {
        let first_name = cfm.feature(constraint.first).name.clone();
        let second_name = cfm.feature(constraint.second).name.clone();
        let first_var = get_or_declare(solver, vars, &first_name);
        let second_var = get_or_declare(solver, vars, &second_name);

        let antecedent = cardinality_membership(first_var, &constraint.first_card);
        let consequent = cardinality_membership(second_var, &constraint.second_card);

        if constraint.require {
            solver.assert(antecedent.implies(consequent));
        } else {
            solver.assert(IntExpr::and(vec![antecedent, consequent]).not());
        }
    }
}

/// One integer variable per feature name, holding its global instance
/// count. Returns the name→variable map the t-wise sampler probes.
pub fn encode_multiset<S: SmtSolver>(solver: &mut S, cfm: &Cfm) -> Result<HashMap<String, S::Var>> {
    if cfm.is_unbound() {
        return Err(Error::Unbound);
    }

    let mut vars = HashMap::new();
    encode_multiset_rec(solver, cfm, cfm.root_id(), None, &mut vars);
    encode_constraints(solver, cfm, &mut vars);
    tracing::debug!(variables = vars.len(), "encoded multiset constraints");
    Ok(vars)
}

fn encode_multiset_rec<S: SmtSolver>(
    solver: &mut S,
    cfm: &Cfm,
    feature_id: FeatureId,
    parent_var: Option<S::Var>,
    vars: &mut HashMap<String, S::Var>,
) -> S::Var {
    let feature = cfm.feature(feature_id);
    let var = get_or_declare(solver, vars, &feature.name);

    if !feature.instance_cardinality.is_empty() {
        let parent_expr = match parent_var {
            Some(p) => IntExpr::var(p),
            None => IntExpr::Const(1),
        };
        solver.assert(scaled_membership(IntExpr::var(var), &feature.instance_cardinality, parent_expr));
    }

    let child_vars: Vec<S::Var> = feature
        .children
        .iter()
        .map(|&child_id| get_or_declare(solver, vars, &cfm.feature(child_id).name))
        .collect();

    if !feature.children.is_empty() {
        if !feature.group_instance_cardinality.is_empty() {
            let sum_expr = IntExpr::sum(child_vars.iter().map(|&v| IntExpr::var(v)).collect());
            solver.assert(scaled_membership(sum_expr, &feature.group_instance_cardinality, IntExpr::var(var)));
        }
        if !feature.group_type_cardinality.is_empty() {
            let present_count = IntExpr::sum(
                child_vars
                    .iter()
                    .map(|&v| IntExpr::var(v).present_indicator())
                    .collect(),
            );
            let scale = IntExpr::var(var).present_indicator();
            solver.assert(scaled_membership(present_count, &feature.group_type_cardinality, scale));
        }
    }

    for &child_id in &feature.children {
        encode_multiset_rec(solver, cfm, child_id, Some(var), vars);
    }

    var
}

/// Per-feature slot variables `name#i`, `i ∈ [0, max_parents)`, alongside
/// the plain multiset variables.
pub struct InstanceSetVars<V> {
    pub multiset: HashMap<String, V>,
    pub slots: HashMap<String, Vec<V>>,
}

/// Group cardinalities are asserted at the aggregate (multiset) level
/// rather than re-derived per parent slot: the distilled model does not
/// pin down how a parent slot's children map onto the children's own
/// (differently sized) slot spaces, and aggregate enforcement is a sound
/// relaxation — any per-slot-valid assignment is aggregate-valid too.
pub fn encode_instance_set<S: SmtSolver>(
    solver: &mut S,
    cfm: &Cfm,
) -> Result<InstanceSetVars<S::Var>> {
    if cfm.is_unbound() {
        return Err(Error::Unbound);
    }

    let mut multiset = HashMap::new();
    let mut slots = HashMap::new();
    encode_instance_set_rec(solver, cfm, cfm.root_id(), 1, None, &mut multiset, &mut slots);
    encode_constraints(solver, cfm, &mut multiset);
    tracing::debug!(
        variables = multiset.len(),
        slot_features = slots.len(),
        "encoded instance-set constraints"
    );
    Ok(InstanceSetVars { multiset, slots })
}

fn encode_instance_set_rec<S: SmtSolver>(
    solver: &mut S,
    cfm: &Cfm,
    feature_id: FeatureId,
    max_parents: u64,
    parent_multiset_var: Option<S::Var>,
    multiset: &mut HashMap<String, S::Var>,
    slots: &mut HashMap<String, Vec<S::Var>>,
) {
    let feature = cfm.feature(feature_id);
    let name = feature.name.clone();
    let multiset_var = get_or_declare(solver, multiset, &name);

    let slot_count = max_parents.max(1);
    let slot_vars: Vec<S::Var> = (0..slot_count)
        .map(|i| solver.declare_int(&format!("{name}#{i}")))
        .collect();

    solver.assert(
        IntExpr::sum(slot_vars.iter().map(|&v| IntExpr::var(v)).collect())
            .eq_expr(IntExpr::var(multiset_var)),
    );

    for (i, &slot_var) in slot_vars.iter().enumerate() {
        let membership = cardinality_membership(slot_var, &feature.instance_cardinality);
        match parent_multiset_var {
            None => solver.assert(membership),
            Some(parent_var) => {
                let exists =
                    IntExpr::Le(Box::new(IntExpr::var(parent_var)), Box::new(IntExpr::Const(i as i64)))
                        .not();
                solver.assert(exists.clone().implies(membership));
                solver.assert(
                    exists
                        .not()
                        .implies(IntExpr::var(slot_var).eq_expr(IntExpr::Const(0))),
                );
            }
        }
    }

    if !feature.children.is_empty() {
        let child_vars: Vec<S::Var> = feature
            .children
            .iter()
            .map(|&child_id| get_or_declare(solver, multiset, &cfm.feature(child_id).name))
            .collect();

        if !feature.group_instance_cardinality.is_empty() {
            let sum_expr = IntExpr::sum(child_vars.iter().map(|&v| IntExpr::var(v)).collect());
            solver.assert(scaled_membership(
                sum_expr,
                &feature.group_instance_cardinality,
                IntExpr::var(multiset_var),
            ));
        }
        if !feature.group_type_cardinality.is_empty() {
            let present_count = IntExpr::sum(
                child_vars
                    .iter()
                    .map(|&v| IntExpr::var(v).present_indicator())
                    .collect(),
            );
            let scale = IntExpr::var(multiset_var).present_indicator();
            solver.assert(scaled_membership(present_count, &feature.group_type_cardinality, scale));
        }
    }

    let child_max_parents = slot_count * feature.instance_cardinality.last_upper().unwrap_or(1) as u64;
    for &child_id in &feature.children {
        encode_instance_set_rec(
            solver,
            cfm,
            child_id,
            child_max_parents,
            Some(multiset_var),
            multiset,
            slots,
        );
    }

    slots.insert(name, slot_vars);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeSolver;
    use crate::solver::CheckResult;
    use cfm_model::fixtures::sandwich_bounded;

    #[test]
    fn multiset_encoding_is_satisfiable_for_a_bounded_model() {
        let cfm = sandwich_bounded();
        let mut solver = FakeSolver::new(0..=3);
        let vars = encode_multiset(&mut solver, &cfm).unwrap();
        assert!(vars.contains_key("Sandwich"));
        assert!(vars.contains_key("Bread"));
        assert_eq!(solver.check(), CheckResult::Sat);
    }

    #[test]
    fn unbound_model_is_rejected() {
        let cfm = sandwich_unbounded_like();
        let mut solver = FakeSolver::new(0..=3);
        assert!(matches!(encode_multiset(&mut solver, &cfm), Err(Error::Unbound)));
    }

    fn sandwich_unbounded_like() -> Cfm {
        cfm_model::fixtures::sandwich_unbounded()
    }

    #[test]
    fn instance_set_encoding_declares_slot_variables() {
        let cfm = sandwich_bounded();
        let mut solver = FakeSolver::new(0..=3);
        let result = encode_instance_set(&mut solver, &cfm).unwrap();
        // Root has a single slot; Bread (child of root) has as many slots
        // as the root's own instance cardinality upper bound allows.
        assert_eq!(result.slots["Sandwich"].len(), 1);
        assert!(!result.slots["Bread"].is_empty());
    }
}
