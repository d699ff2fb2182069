use crate::expr::IntExpr;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    Sat,
    Unsat,
    Unknown,
}

impl CheckResult {
    pub fn is_sat(self) -> bool {
        matches!(self, CheckResult::Sat)
    }
}

/// Narrow capability trait over an SMT solver: named integer variables,
/// linear-arithmetic assertions, a push/pop backtracking stack, and model
/// extraction. Lets the t-wise encoder (`encode.rs`) stay oblivious to
/// which concrete solver backs it, the same shape as `fhir-context`'s
/// `ConformanceResourceProvider`, minus the async.
pub trait SmtSolver {
    type Var: Copy + Eq + std::hash::Hash;

    fn declare_int(&mut self, name: &str) -> Self::Var;
    fn assert(&mut self, expr: IntExpr<Self::Var>);
    fn push(&mut self);
    fn pop(&mut self);
    fn check(&mut self) -> CheckResult;
    /// Only meaningful immediately after a `check()` that returned `Sat`.
    fn model(&mut self) -> Option<HashMap<Self::Var, i64>>;
}

/// RAII wrapper around a solver's push/pop pair: `Drop` always calls
/// `pop()`, so an early return or `?` inside the guarded scope can never
/// leave the backtracking stack unbalanced.
pub struct PushGuard<'a, S: SmtSolver> {
    solver: &'a mut S,
}

impl<'a, S: SmtSolver> PushGuard<'a, S> {
    pub fn new(solver: &'a mut S) -> Self {
        solver.push();
        Self { solver }
    }

    pub fn solver(&mut self) -> &mut S {
        self.solver
    }
}

impl<S: SmtSolver> Drop for PushGuard<'_, S> {
    fn drop(&mut self) {
        self.solver.pop();
    }
}
