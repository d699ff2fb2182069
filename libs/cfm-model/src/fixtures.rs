//! The "Sandwich" example model from the testable-properties scenarios
//! (S2-S6), shared across crates via the `testing` feature so every
//! sampler/validator test suite exercises the same fixture instead of
//! each redefining it slightly differently.

use crate::builder::CfmBuilder;
use crate::cfm::Cfm;
use crate::interval::{Cardinality, Interval};

fn card(intervals: &[(u32, Option<u32>)]) -> Cardinality {
    Cardinality::new(
        intervals
            .iter()
            .map(|(lo, hi)| Interval::new(*lo, *hi).unwrap())
            .collect(),
    )
    .unwrap()
}

fn one_one() -> Cardinality {
    card(&[(1, Some(1))])
}

fn zero_one() -> Cardinality {
    card(&[(0, Some(1))])
}

/// Bounded Sandwich from S2/S4: every upper bound is finite.
pub fn sandwich_bounded() -> Cfm {
    build_sandwich(zero_one(), card(&[(1, Some(2))]))
}

/// Same tree as [`sandwich_bounded`] but with `Tomato` and the `Veggies`
/// group instance cardinality left unbounded, matching S3.
pub fn sandwich_unbounded() -> Cfm {
    build_sandwich(
        Cardinality::new(vec![Interval::unbounded(0)]).unwrap(),
        Cardinality::new(vec![Interval::unbounded(1)]).unwrap(),
    )
}

fn build_sandwich(tomato_instance: Cardinality, veggies_group_instance: Cardinality) -> Cfm {
    let mut b = CfmBuilder::new();
    b.add_feature("Sandwich", one_one(), card(&[(1, Some(3))]), card(&[(1, Some(3))]), None)
        .unwrap();

    b.add_feature("Bread", one_one(), card(&[(1, Some(1))]), card(&[(1, Some(1))]), Some("Sandwich"))
        .unwrap();
    b.add_feature("Sourdough", zero_one(), Cardinality::empty(), Cardinality::empty(), Some("Bread"))
        .unwrap();
    b.add_feature("Wheat", zero_one(), Cardinality::empty(), Cardinality::empty(), Some("Bread"))
        .unwrap();

    b.add_feature(
        "CheeseMix",
        zero_one(),
        card(&[(1, Some(3))]),
        card(&[(1, Some(3))]),
        Some("Sandwich"),
    )
    .unwrap();
    b.add_feature("Cheddar", zero_one(), Cardinality::empty(), Cardinality::empty(), Some("CheeseMix"))
        .unwrap();
    b.add_feature("Swiss", zero_one(), Cardinality::empty(), Cardinality::empty(), Some("CheeseMix"))
        .unwrap();
    b.add_feature("Gouda", zero_one(), Cardinality::empty(), Cardinality::empty(), Some("CheeseMix"))
        .unwrap();

    b.add_feature(
        "Veggies",
        zero_one(),
        card(&[(1, Some(2))]),
        veggies_group_instance,
        Some("Sandwich"),
    )
    .unwrap();
    b.add_feature("Lettuce", zero_one(), Cardinality::empty(), Cardinality::empty(), Some("Veggies"))
        .unwrap();
    b.add_feature("Tomato", tomato_instance, Cardinality::empty(), Cardinality::empty(), Some("Veggies"))
        .unwrap();

    b.build().unwrap()
}

/// Adds the S4 `Wheat ⇒ Tomato` require constraint to a freshly built
/// bounded Sandwich.
pub fn sandwich_with_wheat_requires_tomato() -> Cfm {
    let mut b = CfmBuilder::new();
    b.add_feature("Sandwich", one_one(), card(&[(1, Some(3))]), card(&[(1, Some(3))]), None)
        .unwrap();
    b.add_feature("Bread", one_one(), card(&[(1, Some(1))]), card(&[(1, Some(1))]), Some("Sandwich"))
        .unwrap();
    b.add_feature("Sourdough", zero_one(), Cardinality::empty(), Cardinality::empty(), Some("Bread"))
        .unwrap();
    b.add_feature("Wheat", zero_one(), Cardinality::empty(), Cardinality::empty(), Some("Bread"))
        .unwrap();
    b.add_feature(
        "CheeseMix",
        zero_one(),
        card(&[(1, Some(3))]),
        card(&[(1, Some(3))]),
        Some("Sandwich"),
    )
    .unwrap();
    b.add_feature("Cheddar", zero_one(), Cardinality::empty(), Cardinality::empty(), Some("CheeseMix"))
        .unwrap();
    b.add_feature("Swiss", zero_one(), Cardinality::empty(), Cardinality::empty(), Some("CheeseMix"))
        .unwrap();
    b.add_feature("Gouda", zero_one(), Cardinality::empty(), Cardinality::empty(), Some("CheeseMix"))
        .unwrap();
    b.add_feature(
        "Veggies",
        zero_one(),
        card(&[(1, Some(2))]),
        card(&[(1, Some(2))]),
        Some("Sandwich"),
    )
    .unwrap();
    b.add_feature("Lettuce", zero_one(), Cardinality::empty(), Cardinality::empty(), Some("Veggies"))
        .unwrap();
    b.add_feature("Tomato", zero_one(), Cardinality::empty(), Cardinality::empty(), Some("Veggies"))
        .unwrap();

    b.add_constraint(true, "Wheat", one_one(), "Tomato", one_one()).unwrap();

    b.build().unwrap()
}
