use crate::constraint::Constraint;
use crate::feature::{Feature, FeatureId};
use std::collections::HashMap;

/// A cardinality-based feature model: a rooted feature tree plus
/// cross-tree constraints.
pub struct Cfm {
    pub(crate) arena: Vec<Feature>,
    pub(crate) root: FeatureId,
    pub(crate) constraints: Vec<Constraint>,
    pub(crate) by_name: HashMap<String, FeatureId>,
}

impl Cfm {
    pub fn root_id(&self) -> FeatureId {
        self.root
    }

    pub fn root(&self) -> &Feature {
        self.feature(self.root)
    }

    pub fn feature(&self, id: FeatureId) -> &Feature {
        &self.arena[id.index()]
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn find(&self, name: &str) -> Option<FeatureId> {
        self.by_name.get(name).copied()
    }

    /// Pre-order traversal: root first, then children left-to-right,
    /// recursively (§3 derived `features`).
    pub fn features(&self) -> impl Iterator<Item = FeatureId> + '_ {
        PreOrder {
            cfm: self,
            stack: vec![self.root],
        }
    }

    /// `CFM.is_unbound` ⇔ `root.is_unbound`, where a feature's
    /// `is_unbound` considers its own cardinalities *and* its whole
    /// subtree (§3).
    pub fn is_unbound(&self) -> bool {
        self.features().any(|id| self.feature(id).is_locally_unbound())
    }

    /// Mutable access to a feature's cardinalities, used by `cfm-bigm` to
    /// replace unbounded uppers in place. Deliberately narrow: callers
    /// cannot rewire parent/child edges or feature names through this.
    pub fn feature_mut(&mut self, id: FeatureId) -> FeatureMut<'_> {
        FeatureMut {
            feature: &mut self.arena[id.index()],
        }
    }
}

pub struct FeatureMut<'a> {
    feature: &'a mut Feature,
}

impl FeatureMut<'_> {
    pub fn instance_cardinality_mut(&mut self) -> &mut crate::Cardinality {
        &mut self.feature.instance_cardinality
    }

    pub fn group_instance_cardinality_mut(&mut self) -> &mut crate::Cardinality {
        &mut self.feature.group_instance_cardinality
    }
}

struct PreOrder<'a> {
    cfm: &'a Cfm,
    stack: Vec<FeatureId>,
}

impl Iterator for PreOrder<'_> {
    type Item = FeatureId;

    fn next(&mut self) -> Option<FeatureId> {
        let id = self.stack.pop()?;
        let children = &self.cfm.feature(id).children;
        for child in children.iter().rev() {
            self.stack.push(*child);
        }
        Some(id)
    }
}
