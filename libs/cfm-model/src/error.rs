use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while constructing or mutating a [`crate::Cfm`].
///
/// These signal broken §3 invariants (duplicate names, overlapping
/// intervals, dangling references). Once a `Cfm` is built, downstream
/// crates assume these invariants hold and do not re-check them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("interval lower bound {lower} is greater than upper bound {upper}")]
    InvalidInterval { lower: u32, upper: u32 },

    #[error("cardinality intervals are not sorted and non-overlapping: {0:?}")]
    UnsortedIntervals(Vec<crate::Interval>),

    #[error("feature name '{0}' is already in use")]
    DuplicateFeatureName(String),

    #[error("feature '{0}' has no parent but a root was already added")]
    MultipleRoots(String),

    #[error("model has no root feature")]
    NoRoot,

    #[error("parent feature '{0}' does not exist")]
    UnknownParent(String),

    #[error("constraint references unknown feature '{0}'")]
    UnknownConstraintFeature(String),

    #[error("configuration value '{0}' is not in the '<name>#<index>' form")]
    MalformedConfigurationValue(String),
}
