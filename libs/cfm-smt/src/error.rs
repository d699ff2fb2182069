use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Model is unbound. Please apply big-m global bound first.")]
    Unbound,
    #[error("constraint references unknown feature '{0}'")]
    UnknownFeature(String),
    #[error("autocomplete found no model for a configuration the cover loop accepted as feasible")]
    AutocompleteInfeasible,
}
