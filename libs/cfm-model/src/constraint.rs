use crate::feature::FeatureId;
use crate::interval::Cardinality;

/// A cross-tree require/exclude constraint.
///
/// *require*: if `count(first) ∈ first_card`, then `count(second) ∈
/// second_card` must hold. *exclude* (`require = false`): the consequent
/// must **not** hold when the antecedent fires. When the antecedent does
/// not fire, neither form asserts anything (§9 open question #1).
#[derive(Debug, Clone)]
pub struct Constraint {
    pub require: bool,
    pub first: FeatureId,
    pub first_card: Cardinality,
    pub second: FeatureId,
    pub second_card: Cardinality,
}

impl Constraint {
    /// Whether the antecedent `count(first) ∈ first_card` fires.
    pub fn antecedent_fires(&self, first_count: u32) -> bool {
        self.first_card.contains(first_count)
    }

    /// Whether the constraint holds given the observed counts.
    pub fn is_satisfied(&self, first_count: u32, second_count: u32) -> bool {
        if !self.antecedent_fires(first_count) {
            return true;
        }
        let consequent_holds = self.second_card.contains(second_count);
        if self.require {
            consequent_holds
        } else {
            !consequent_holds
        }
    }
}
