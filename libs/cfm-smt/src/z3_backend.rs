use crate::expr::IntExpr;
use crate::solver::{CheckResult, SmtSolver};
use std::collections::HashMap;
use z3::ast::{self, Ast};
use z3::{Context, SatResult, Solver};

/// The concrete [`SmtSolver`] used outside of tests. `Var` is an index
/// into `vars` rather than a borrowed `z3::ast::Int` directly, so it
/// stays `Copy` and cheap to embed in [`IntExpr`] nodes.
pub struct Z3Solver<'ctx> {
    ctx: &'ctx Context,
    solver: Solver<'ctx>,
    vars: Vec<ast::Int<'ctx>>,
}

impl<'ctx> Z3Solver<'ctx> {
    pub fn new(ctx: &'ctx Context) -> Self {
        Self {
            ctx,
            solver: Solver::new(ctx),
            vars: Vec::new(),
        }
    }

    fn lower_int(&self, expr: &IntExpr<usize>) -> ast::Int<'ctx> {
        match expr {
            IntExpr::Const(n) => ast::Int::from_i64(self.ctx, *n),
            IntExpr::Var(v) => self.vars[*v].clone(),
            IntExpr::Add(a, b) => ast::Int::add(self.ctx, &[&self.lower_int(a), &self.lower_int(b)]),
            IntExpr::Mul(factor, e) => {
                let factor = ast::Int::from_i64(self.ctx, *factor);
                ast::Int::mul(self.ctx, &[&factor, &self.lower_int(e)])
            }
            IntExpr::If(cond, then, else_) => {
                self.lower_bool(cond).ite(&self.lower_int(then), &self.lower_int(else_))
            }
            IntExpr::Le(..) | IntExpr::Eq(..) | IntExpr::Or(..) | IntExpr::And(..)
            | IntExpr::Not(..) | IntExpr::Implies(..) => {
                unreachable!("boolean-valued IntExpr node used where an integer was expected")
            }
        }
    }

    fn lower_bool(&self, expr: &IntExpr<usize>) -> ast::Bool<'ctx> {
        match expr {
            IntExpr::Le(a, b) => self.lower_int(a).le(&self.lower_int(b)),
            IntExpr::Eq(a, b) => self.lower_int(a)._eq(&self.lower_int(b)),
            IntExpr::Or(es) => {
                let lowered: Vec<ast::Bool<'ctx>> = es.iter().map(|e| self.lower_bool(e)).collect();
                let refs: Vec<&ast::Bool<'ctx>> = lowered.iter().collect();
                ast::Bool::or(self.ctx, &refs)
            }
            IntExpr::And(es) => {
                let lowered: Vec<ast::Bool<'ctx>> = es.iter().map(|e| self.lower_bool(e)).collect();
                let refs: Vec<&ast::Bool<'ctx>> = lowered.iter().collect();
                ast::Bool::and(self.ctx, &refs)
            }
            IntExpr::Not(e) => self.lower_bool(e).not(),
            IntExpr::Implies(a, b) => self.lower_bool(a).implies(&self.lower_bool(b)),
            IntExpr::Const(..) | IntExpr::Var(..) | IntExpr::Add(..) | IntExpr::Mul(..)
            | IntExpr::If(..) => {
                unreachable!("integer-valued IntExpr node used where a boolean was expected")
            }
        }
    }
}

impl<'ctx> SmtSolver for Z3Solver<'ctx> {
    type Var = usize;

    fn declare_int(&mut self, name: &str) -> usize {
        let idx = self.vars.len();
        self.vars.push(ast::Int::new_const(self.ctx, name));
        idx
    }

    fn assert(&mut self, expr: IntExpr<usize>) {
        let lowered = self.lower_bool(&expr);
        self.solver.assert(&lowered);
    }

    fn push(&mut self) {
        self.solver.push();
    }

    fn pop(&mut self) {
        self.solver.pop(1);
    }

    fn check(&mut self) -> CheckResult {
        match self.solver.check() {
            SatResult::Sat => CheckResult::Sat,
            SatResult::Unsat => CheckResult::Unsat,
            SatResult::Unknown => CheckResult::Unknown,
        }
    }

    fn model(&mut self) -> Option<HashMap<usize, i64>> {
        let model = self.solver.get_model()?;
        let mut result = HashMap::with_capacity(self.vars.len());
        for (idx, var) in self.vars.iter().enumerate() {
            let value = model.eval(var, true)?.as_i64()?;
            result.insert(idx, value);
        }
        Some(result)
    }
}
