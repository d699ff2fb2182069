use crate::cfm::Cfm;
use crate::constraint::Constraint;
use crate::error::{Error, Result};
use crate::feature::{Feature, FeatureId};
use crate::interval::Cardinality;
use std::collections::HashMap;

/// Incrementally assembles a [`Cfm`], checking the §3 invariants that an
/// importer would otherwise have to re-derive by hand: exactly one root,
/// globally unique names, and constraints that only reference features
/// that exist.
#[derive(Default)]
pub struct CfmBuilder {
    arena: Vec<Feature>,
    by_name: HashMap<String, FeatureId>,
    root: Option<FeatureId>,
    constraints: Vec<PendingConstraint>,
}

struct PendingConstraint {
    require: bool,
    first: String,
    first_card: Cardinality,
    second: String,
    second_card: Cardinality,
}

impl CfmBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feature. `parent` is `None` for the root; every other
    /// feature must name an already-added parent.
    pub fn add_feature(
        &mut self,
        name: impl Into<String>,
        instance_cardinality: Cardinality,
        group_type_cardinality: Cardinality,
        group_instance_cardinality: Cardinality,
        parent: Option<&str>,
    ) -> Result<FeatureId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(Error::DuplicateFeatureName(name));
        }

        let parent_id = match parent {
            Some(parent_name) => {
                let id = self
                    .by_name
                    .get(parent_name)
                    .copied()
                    .ok_or_else(|| Error::UnknownParent(parent_name.to_string()))?;
                Some(id)
            }
            None => {
                if self.root.is_some() {
                    return Err(Error::MultipleRoots(name));
                }
                None
            }
        };

        let id = FeatureId(self.arena.len() as u32);
        self.arena.push(Feature {
            name: name.clone(),
            instance_cardinality,
            group_type_cardinality,
            group_instance_cardinality,
            parent: parent_id,
            children: Vec::new(),
        });
        self.by_name.insert(name, id);

        match parent_id {
            Some(parent_id) => self.arena[parent_id.index()].children.push(id),
            None => self.root = Some(id),
        }

        Ok(id)
    }

    /// Add a cross-tree constraint by feature name; resolved to
    /// [`FeatureId`]s at `build()` time would be premature here since
    /// both features must already exist.
    pub fn add_constraint(
        &mut self,
        require: bool,
        first: impl Into<String>,
        first_card: Cardinality,
        second: impl Into<String>,
        second_card: Cardinality,
    ) -> Result<()> {
        let first = first.into();
        let second = second.into();
        if !self.by_name.contains_key(&first) {
            return Err(Error::UnknownConstraintFeature(first));
        }
        if !self.by_name.contains_key(&second) {
            return Err(Error::UnknownConstraintFeature(second));
        }
        self.constraints.push(PendingConstraint {
            require,
            first,
            first_card,
            second,
            second_card,
        });
        Ok(())
    }

    pub fn build(self) -> Result<Cfm> {
        let root = self.root.ok_or(Error::NoRoot)?;
        let constraints: Vec<Constraint> = self
            .constraints
            .into_iter()
            .map(|pending| Constraint {
                require: pending.require,
                first: self.by_name[&pending.first],
                first_card: pending.first_card,
                second: self.by_name[&pending.second],
                second_card: pending.second_card,
            })
            .collect();

        tracing::debug!(
            features = self.arena.len(),
            constraints = constraints.len(),
            "built CFM"
        );

        Ok(Cfm {
            arena: self.arena,
            root,
            constraints,
            by_name: self.by_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::Interval;

    fn card(intervals: &[(u32, Option<u32>)]) -> Cardinality {
        Cardinality::new(
            intervals
                .iter()
                .map(|(lo, hi)| Interval::new(*lo, *hi).unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn builds_a_minimal_tree() {
        let mut builder = CfmBuilder::new();
        builder
            .add_feature(
                "Root",
                card(&[(1, Some(1))]),
                card(&[(0, Some(1))]),
                card(&[(0, Some(1))]),
                None,
            )
            .unwrap();
        builder
            .add_feature(
                "Child",
                card(&[(0, Some(1))]),
                Cardinality::empty(),
                Cardinality::empty(),
                Some("Root"),
            )
            .unwrap();

        let cfm = builder.build().unwrap();
        assert_eq!(cfm.root().name, "Root");
        assert_eq!(cfm.root().children.len(), 1);
        let child_id = cfm.root().children[0];
        assert_eq!(cfm.feature(child_id).name, "Child");
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut builder = CfmBuilder::new();
        builder
            .add_feature(
                "Root",
                card(&[(1, Some(1))]),
                Cardinality::empty(),
                Cardinality::empty(),
                None,
            )
            .unwrap();
        let err = builder
            .add_feature(
                "Root",
                card(&[(1, Some(1))]),
                Cardinality::empty(),
                Cardinality::empty(),
                Some("Root"),
            )
            .unwrap_err();
        assert_eq!(err, Error::DuplicateFeatureName("Root".into()));
    }

    #[test]
    fn rejects_second_root() {
        let mut builder = CfmBuilder::new();
        builder
            .add_feature("A", card(&[(1, Some(1))]), Cardinality::empty(), Cardinality::empty(), None)
            .unwrap();
        let err = builder
            .add_feature("B", card(&[(1, Some(1))]), Cardinality::empty(), Cardinality::empty(), None)
            .unwrap_err();
        assert_eq!(err, Error::MultipleRoots("B".into()));
    }

    #[test]
    fn rejects_constraint_on_unknown_feature() {
        let mut builder = CfmBuilder::new();
        builder
            .add_feature("A", card(&[(1, Some(1))]), Cardinality::empty(), Cardinality::empty(), None)
            .unwrap();
        let err = builder
            .add_constraint(true, "A", card(&[(1, Some(1))]), "Ghost", card(&[(1, Some(1))]))
            .unwrap_err();
        assert_eq!(err, Error::UnknownConstraintFeature("Ghost".into()));
    }

    #[test]
    fn build_without_any_feature_fails() {
        let builder = CfmBuilder::new();
        assert_eq!(builder.build().unwrap_err(), Error::NoRoot);
    }
}
