use thiserror::Error;

pub type Result<T> = std::result::Result<T, SamplingError>;

#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("Model is unbound. Please apply big-m global bound first.")]
    Unbound,
    #[error("exhausted {attempts} attempts generating a valid sample")]
    AttemptsExhausted { attempts: u32 },
    #[error("feature '{0}' has no cardinality interval with a non-zero value to draw from")]
    NoNonZeroInterval(String),
    #[error(transparent)]
    Smt(#[from] cfm_smt::Error),
}
