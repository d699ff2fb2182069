//! Core data types for cardinality-based feature models (CFMs): trees of
//! features where every node carries three independent cardinality
//! annotations, plus cross-tree require/exclude constraints.
//!
//! This crate owns only the data model (§3 of the design). Validation,
//! Big-M bounding, SMT encoding, and sampling live in sibling crates that
//! depend on it read-only.

mod builder;
mod cfm;
mod config;
mod constraint;
mod error;
mod feature;
mod interval;

#[cfg(feature = "testing")]
pub mod fixtures;

pub use builder::CfmBuilder;
pub use cfm::{Cfm, FeatureMut};
pub use config::ConfigurationNode;
pub use constraint::Constraint;
pub use error::{Error, Result};
pub use feature::{Feature, FeatureId};
pub use interval::{Cardinality, Interval};
