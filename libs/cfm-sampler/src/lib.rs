//! Sample generation over cardinality-based feature models: plain random
//! sampling, one-wise boundary coverage, and SMT-backed t-wise coverage
//! (§4.3-4.6).

mod config;
mod error;
mod one_wise;
mod random;
mod t_wise;

pub use config::RandomSamplerConfig;
pub use error::{Result, SamplingError};
pub use one_wise::one_wise_sampling;
pub use random::sample_random;
pub use t_wise::{t_wise_sampling, t_wise_sampling_instance_set};
