//! An in-memory brute-force solver used only by tests (here and in
//! `cfm-sampler`), so the encoder and cover-loop logic can be exercised
//! without linking z3. Exhaustive over a small fixed domain — never use
//! this outside a test with a handful of variables.

use crate::expr::IntExpr;
use crate::solver::{CheckResult, SmtSolver};
use std::collections::HashMap;
use std::ops::RangeInclusive;

pub struct FakeSolver {
    names: Vec<String>,
    assertions: Vec<IntExpr<usize>>,
    checkpoints: Vec<usize>,
    domain: RangeInclusive<i64>,
    last_model: Option<HashMap<usize, i64>>,
}

impl FakeSolver {
    pub fn new(domain: RangeInclusive<i64>) -> Self {
        Self {
            names: Vec::new(),
            assertions: Vec::new(),
            checkpoints: Vec::new(),
            domain,
            last_model: None,
        }
    }
}

impl SmtSolver for FakeSolver {
    type Var = usize;

    fn declare_int(&mut self, name: &str) -> usize {
        let idx = self.names.len();
        self.names.push(name.to_string());
        idx
    }

    fn assert(&mut self, expr: IntExpr<usize>) {
        self.assertions.push(expr);
    }

    fn push(&mut self) {
        self.checkpoints.push(self.assertions.len());
    }

    fn pop(&mut self) {
        if let Some(checkpoint) = self.checkpoints.pop() {
            self.assertions.truncate(checkpoint);
        }
    }

    fn check(&mut self) -> CheckResult {
        let mut assignment = Vec::with_capacity(self.names.len());
        if search(self.names.len(), &mut assignment, &self.domain, &self.assertions) {
            self.last_model = Some(assignment.into_iter().enumerate().collect());
            CheckResult::Sat
        } else {
            self.last_model = None;
            CheckResult::Unsat
        }
    }

    fn model(&mut self) -> Option<HashMap<usize, i64>> {
        self.last_model.clone()
    }
}

fn search(
    vars_left: usize,
    assignment: &mut Vec<i64>,
    domain: &RangeInclusive<i64>,
    assertions: &[IntExpr<usize>],
) -> bool {
    if vars_left == 0 {
        return assertions.iter().all(|a| eval_bool(a, assignment));
    }
    for value in domain.clone() {
        assignment.push(value);
        if search(vars_left - 1, assignment, domain, assertions) {
            return true;
        }
        assignment.pop();
    }
    false
}

fn eval_int(expr: &IntExpr<usize>, assignment: &[i64]) -> i64 {
    match expr {
        IntExpr::Const(n) => *n,
        IntExpr::Var(v) => assignment[*v],
        IntExpr::Add(a, b) => eval_int(a, assignment) + eval_int(b, assignment),
        IntExpr::Mul(factor, e) => factor * eval_int(e, assignment),
        IntExpr::If(cond, then, else_) => {
            if eval_bool(cond, assignment) {
                eval_int(then, assignment)
            } else {
                eval_int(else_, assignment)
            }
        }
        IntExpr::Le(..) | IntExpr::Eq(..) | IntExpr::Or(..) | IntExpr::And(..)
        | IntExpr::Not(..) | IntExpr::Implies(..) => {
            unreachable!("boolean-valued IntExpr node used where an integer was expected")
        }
    }
}

fn eval_bool(expr: &IntExpr<usize>, assignment: &[i64]) -> bool {
    match expr {
        IntExpr::Le(a, b) => eval_int(a, assignment) <= eval_int(b, assignment),
        IntExpr::Eq(a, b) => eval_int(a, assignment) == eval_int(b, assignment),
        IntExpr::Or(es) => es.iter().any(|e| eval_bool(e, assignment)),
        IntExpr::And(es) => es.iter().all(|e| eval_bool(e, assignment)),
        IntExpr::Not(e) => !eval_bool(e, assignment),
        IntExpr::Implies(a, b) => !eval_bool(a, assignment) || eval_bool(b, assignment),
        IntExpr::Const(..) | IntExpr::Var(..) | IntExpr::Add(..) | IntExpr::Mul(..)
        | IntExpr::If(..) => {
            unreachable!("integer-valued IntExpr node used where a boolean was expected")
        }
    }
}
