/// A small, solver-agnostic linear-arithmetic AST.
///
/// Mixes integer-valued nodes (`Const`, `Var`, `Add`, `Mul`, `If`) and
/// boolean-valued nodes (`Le`, `Eq`, `Or`, `And`, `Not`, `Implies`)
/// untyped, the same way the encoding it mirrors builds expressions
/// dynamically. `assert` only ever receives a boolean-valued root.
#[derive(Debug, Clone)]
pub enum IntExpr<V> {
    Const(i64),
    Var(V),
    Add(Box<IntExpr<V>>, Box<IntExpr<V>>),
    /// Scalar multiplication; the left side is always a plain constant; an
    /// expression-times-expression product is never needed by this
    /// encoding (cardinalities scale a variable by an integer factor).
    Mul(i64, Box<IntExpr<V>>),
    Le(Box<IntExpr<V>>, Box<IntExpr<V>>),
    Eq(Box<IntExpr<V>>, Box<IntExpr<V>>),
    Or(Vec<IntExpr<V>>),
    And(Vec<IntExpr<V>>),
    Not(Box<IntExpr<V>>),
    Implies(Box<IntExpr<V>>, Box<IntExpr<V>>),
    If(Box<IntExpr<V>>, Box<IntExpr<V>>, Box<IntExpr<V>>),
}

impl<V> IntExpr<V> {
    pub fn var(v: V) -> Self {
        IntExpr::Var(v)
    }

    pub fn add(self, other: Self) -> Self {
        IntExpr::Add(Box::new(self), Box::new(other))
    }

    pub fn mul(factor: i64, expr: Self) -> Self {
        IntExpr::Mul(factor, Box::new(expr))
    }

    pub fn le(self, other: Self) -> Self {
        IntExpr::Le(Box::new(self), Box::new(other))
    }

    pub fn ge(self, other: Self) -> Self {
        IntExpr::Le(Box::new(other), Box::new(self))
    }

    pub fn eq_expr(self, other: Self) -> Self {
        IntExpr::Eq(Box::new(self), Box::new(other))
    }

    pub fn not(self) -> Self {
        IntExpr::Not(Box::new(self))
    }

    pub fn implies(self, then: Self) -> Self {
        IntExpr::Implies(Box::new(self), Box::new(then))
    }

    pub fn if_then_else(cond: Self, then: Self, else_: Self) -> Self {
        IntExpr::If(Box::new(cond), Box::new(then), Box::new(else_))
    }

    /// 1 when `self > 0`, 0 otherwise — the `If(f > 0, 1, 0)` indicator
    /// used to turn a group type cardinality into a count of present
    /// children.
    pub fn present_indicator(self) -> Self {
        let not_positive = IntExpr::Le(Box::new(self), Box::new(IntExpr::Const(0)));
        IntExpr::if_then_else(not_positive.not(), IntExpr::Const(1), IntExpr::Const(0))
    }

    pub fn sum(exprs: Vec<Self>) -> Self
    where
        V: Clone,
    {
        let mut iter = exprs.into_iter();
        let Some(first) = iter.next() else {
            return IntExpr::Const(0);
        };
        iter.fold(first, |acc, next| acc.add(next))
    }

    pub fn or(exprs: Vec<Self>) -> Self {
        IntExpr::Or(exprs)
    }

    pub fn and(exprs: Vec<Self>) -> Self {
        IntExpr::And(exprs)
    }
}
