//! SMT encoding for cardinality-based feature models (§4.5), behind a
//! solver-agnostic [`SmtSolver`] trait so the t-wise sampler in
//! `cfm-sampler` never talks to z3 directly.

mod encode;
mod error;
mod expr;
mod solver;
mod z3_backend;

#[cfg(any(test, feature = "testing"))]
pub mod fake;

pub use encode::{encode_instance_set, encode_multiset, InstanceSetVars};
pub use error::{Error, Result};
pub use expr::IntExpr;
pub use solver::{CheckResult, PushGuard, SmtSolver};
pub use z3_backend::Z3Solver;
