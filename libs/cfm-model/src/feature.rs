use crate::interval::Cardinality;
use std::fmt;

/// Index into a [`crate::Cfm`]'s feature arena.
///
/// Features are stored by value in a flat `Vec` and referred to by index
/// rather than through `Rc<RefCell<_>>` parent/child links, which would
/// otherwise form reference cycles (§9 design notes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureId(pub(crate) u32);

impl FeatureId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One node of the feature tree.
///
/// `parent`/`children` are arena indices rather than owned references;
/// look them up through the owning [`crate::Cfm`].
#[derive(Debug, Clone)]
pub struct Feature {
    pub name: String,
    pub instance_cardinality: Cardinality,
    pub group_type_cardinality: Cardinality,
    pub group_instance_cardinality: Cardinality,
    pub parent: Option<FeatureId>,
    pub children: Vec<FeatureId>,
}

impl Feature {
    /// `is_required` ⇔ lower bound of the first interval of
    /// `instance_cardinality` ≠ 0.
    pub fn is_required(&self) -> bool {
        self.instance_cardinality
            .intervals()
            .first()
            .is_some_and(|first| first.lower != 0)
    }

    /// Whether this feature's own cardinalities carry an unbounded upper.
    /// Does not look at children — see [`crate::Cfm::is_unbound`] for the
    /// whole-subtree version used by §3's `CFM.is_unbound`.
    pub fn is_locally_unbound(&self) -> bool {
        self.instance_cardinality.is_unbound()
            || self.group_type_cardinality.is_unbound()
            || self.group_instance_cardinality.is_unbound()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
