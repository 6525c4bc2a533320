use std::collections::HashMap;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::rc::Rc;

/// A node in the symbolic expression graph.
///
/// Every derived quantity of the sizing model (areas, masses, drag, scores) is
/// built from these nodes so that the optimizer can evaluate it and its
/// gradient at any point of the decision space. Sub-expressions are shared by
/// reference counting; a [`Tape`] visits each shared node once.
#[derive(Clone, Debug)]
pub struct Expr(Rc<Node>);

#[derive(Debug)]
enum Node {
    Constant(f64),
    Variable(usize),
    Unary(UnaryOp, Expr),
    Binary(BinaryOp, Expr, Expr),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum UnaryOp {
    Neg,
    Sqrt,
    Exp,
    Ln,
    Powf(f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl UnaryOp {
    fn apply(self, a: f64) -> f64 {
        match self {
            UnaryOp::Neg => -a,
            UnaryOp::Sqrt => a.sqrt(),
            UnaryOp::Exp => a.exp(),
            UnaryOp::Ln => a.ln(),
            UnaryOp::Powf(c) => a.powf(c),
        }
    }
}

impl BinaryOp {
    fn apply(self, a: f64, b: f64) -> f64 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
        }
    }
}

impl Expr {
    pub fn constant(value: f64) -> Self {
        Expr(Rc::new(Node::Constant(value)))
    }

    /// Handle for decision variable `index`. Only [`Problem`](super::Problem)
    /// hands these out so that indices always refer to declared variables.
    pub(crate) fn variable(index: usize) -> Self {
        Expr(Rc::new(Node::Variable(index)))
    }

    pub fn as_constant(&self) -> Option<f64> {
        match *self.0 {
            Node::Constant(c) => Some(c),
            _ => None,
        }
    }

    pub fn variable_index(&self) -> Option<usize> {
        match *self.0 {
            Node::Variable(i) => Some(i),
            _ => None,
        }
    }

    fn unary(op: UnaryOp, a: &Expr) -> Expr {
        if let Some(c) = a.as_constant() {
            return Expr::constant(op.apply(c));
        }
        Expr(Rc::new(Node::Unary(op, a.clone())))
    }

    fn binary(op: BinaryOp, a: &Expr, b: &Expr) -> Expr {
        match (op, a.as_constant(), b.as_constant()) {
            (_, Some(x), Some(y)) => Expr::constant(op.apply(x, y)),
            (BinaryOp::Add, Some(x), _) if x == 0.0 => b.clone(),
            (BinaryOp::Add | BinaryOp::Sub, _, Some(y)) if y == 0.0 => a.clone(),
            (BinaryOp::Mul, Some(x), _) if x == 1.0 => b.clone(),
            (BinaryOp::Mul | BinaryOp::Div, _, Some(y)) if y == 1.0 => a.clone(),
            _ => Expr(Rc::new(Node::Binary(op, a.clone(), b.clone()))),
        }
    }

    pub fn powf(&self, exponent: f64) -> Expr {
        if exponent == 1.0 {
            return self.clone();
        }
        Expr::unary(UnaryOp::Powf(exponent), self)
    }

    pub fn powi(&self, exponent: i32) -> Expr {
        self.powf(exponent as f64)
    }

    pub fn square(&self) -> Expr {
        self.powf(2.0)
    }

    pub fn sqrt(&self) -> Expr {
        Expr::unary(UnaryOp::Sqrt, self)
    }

    pub fn exp(&self) -> Expr {
        Expr::unary(UnaryOp::Exp, self)
    }

    pub fn ln(&self) -> Expr {
        Expr::unary(UnaryOp::Ln, self)
    }

    /// Sum of an arbitrary number of terms; zero when empty.
    pub fn sum<I>(terms: I) -> Expr
    where
        I: IntoIterator<Item = Expr>,
    {
        terms
            .into_iter()
            .fold(Expr::constant(0.0), |acc, term| acc + term)
    }

    /// `self <= rhs`
    pub fn le(&self, rhs: impl Into<Expr>) -> Relation {
        Relation::new(self.clone(), rhs.into(), RelationKind::LessEqual)
    }

    /// `self >= rhs`
    pub fn ge(&self, rhs: impl Into<Expr>) -> Relation {
        Relation::new(rhs.into(), self.clone(), RelationKind::LessEqual)
    }

    /// `self == rhs`
    pub fn eq_to(&self, rhs: impl Into<Expr>) -> Relation {
        Relation::new(self.clone(), rhs.into(), RelationKind::Equal)
    }

    /// Evaluates the expression with the variable vector `x`.
    pub fn eval(&self, x: &[f64]) -> f64 {
        let tape = Tape::new(std::slice::from_ref(self));
        let values = tape.forward(x);
        tape.root_value(&values, 0)
    }

    /// Value of an expression that does not depend on any variable. Variables
    /// evaluate to NaN here.
    pub fn value(&self) -> f64 {
        self.eval(&[])
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::constant(value)
    }
}

impl From<&Expr> for Expr {
    fn from(value: &Expr) -> Self {
        value.clone()
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Neg, &self)
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Neg, self)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait<Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, &self, &rhs)
            }
        }
        impl $trait<&Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($op, &self, rhs)
            }
        }
        impl $trait<Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, self, &rhs)
            }
        }
        impl $trait<&Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }
        impl $trait<f64> for Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                Expr::binary($op, &self, &Expr::constant(rhs))
            }
        }
        impl $trait<f64> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: f64) -> Expr {
                Expr::binary($op, self, &Expr::constant(rhs))
            }
        }
        impl $trait<Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, &Expr::constant(self), &rhs)
            }
        }
        impl $trait<&Expr> for f64 {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($op, &Expr::constant(self), rhs)
            }
        }
    };
}

impl_binary_op!(Add, add, BinaryOp::Add);
impl_binary_op!(Sub, sub, BinaryOp::Sub);
impl_binary_op!(Mul, mul, BinaryOp::Mul);
impl_binary_op!(Div, div, BinaryOp::Div);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// `lhs - rhs <= 0`
    LessEqual,
    /// `lhs - rhs == 0`
    Equal,
}

/// An inequality or equality between two expressions, ready to be attached
/// to a [`Problem`](super::Problem).
#[derive(Debug, Clone)]
pub struct Relation {
    pub lhs: Expr,
    pub rhs: Expr,
    pub kind: RelationKind,
}

impl Relation {
    fn new(lhs: Expr, rhs: Expr, kind: RelationKind) -> Self {
        Self { lhs, rhs, kind }
    }

    /// Signed residual, non-positive (or zero for equalities) when satisfied.
    pub fn residual(&self) -> Expr {
        &self.lhs - &self.rhs
    }

    /// Amount by which the relation is violated at `x`.
    pub fn violation(&self, x: &[f64]) -> f64 {
        let r = self.residual().eval(x);
        match self.kind {
            RelationKind::LessEqual => r.max(0.0),
            RelationKind::Equal => r.abs(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum TapeOp {
    Constant(f64),
    Variable(usize),
    Unary(UnaryOp, usize),
    Binary(BinaryOp, usize, usize),
}

/// Topologically ordered linearisation of one or more expressions.
///
/// Shared sub-expressions appear once, so a forward sweep costs one operation
/// per distinct node and a reverse sweep gives the gradient of any weighted
/// combination of the roots.
#[derive(Debug, Clone)]
pub struct Tape {
    ops: Vec<TapeOp>,
    roots: Vec<usize>,
}

impl Tape {
    pub fn new(roots: &[Expr]) -> Self {
        let mut tape = Tape {
            ops: Vec::new(),
            roots: Vec::with_capacity(roots.len()),
        };
        let mut index: HashMap<*const Node, usize> = HashMap::new();
        for root in roots {
            let slot = tape.visit(root, &mut index);
            tape.roots.push(slot);
        }
        tape
    }

    fn visit(&mut self, expr: &Expr, index: &mut HashMap<*const Node, usize>) -> usize {
        let key = Rc::as_ptr(&expr.0);
        if let Some(&slot) = index.get(&key) {
            return slot;
        }
        let op = match &*expr.0 {
            Node::Constant(c) => TapeOp::Constant(*c),
            Node::Variable(v) => TapeOp::Variable(*v),
            Node::Unary(op, a) => TapeOp::Unary(*op, self.visit(a, index)),
            Node::Binary(op, a, b) => {
                let ia = self.visit(a, index);
                let ib = self.visit(b, index);
                TapeOp::Binary(*op, ia, ib)
            }
        };
        self.ops.push(op);
        let slot = self.ops.len() - 1;
        index.insert(key, slot);
        slot
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Values of every node at `x`. Variables outside `x` are NaN.
    pub fn forward(&self, x: &[f64]) -> Vec<f64> {
        let mut values = Vec::with_capacity(self.ops.len());
        for op in &self.ops {
            let v = match *op {
                TapeOp::Constant(c) => c,
                TapeOp::Variable(i) => x.get(i).copied().unwrap_or(f64::NAN),
                TapeOp::Unary(op, a) => op.apply(values[a]),
                TapeOp::Binary(op, a, b) => op.apply(values[a], values[b]),
            };
            values.push(v);
        }
        values
    }

    pub fn root_value(&self, values: &[f64], root: usize) -> f64 {
        values[self.roots[root]]
    }

    pub fn root_values(&self, values: &[f64]) -> Vec<f64> {
        self.roots.iter().map(|&r| values[r]).collect()
    }

    /// Gradient of `sum_k root_adjoints[k] * root_k` with respect to the
    /// `n_vars` decision variables, given the node values of a forward sweep.
    pub fn reverse(&self, values: &[f64], root_adjoints: &[f64], n_vars: usize) -> Vec<f64> {
        let mut adjoint = vec![0.0; self.ops.len()];
        for (&root, &a) in self.roots.iter().zip(root_adjoints) {
            adjoint[root] += a;
        }
        let mut grad = vec![0.0; n_vars];
        for i in (0..self.ops.len()).rev() {
            let a = adjoint[i];
            if a == 0.0 {
                continue;
            }
            match self.ops[i] {
                TapeOp::Constant(_) => {}
                TapeOp::Variable(v) => {
                    if v < n_vars {
                        grad[v] += a;
                    }
                }
                TapeOp::Unary(op, j) => {
                    let x = values[j];
                    adjoint[j] += a * match op {
                        UnaryOp::Neg => -1.0,
                        UnaryOp::Sqrt => 0.5 / values[i],
                        UnaryOp::Exp => values[i],
                        UnaryOp::Ln => 1.0 / x,
                        UnaryOp::Powf(c) => c * x.powf(c - 1.0),
                    };
                }
                TapeOp::Binary(op, l, r) => {
                    let (x, y) = (values[l], values[r]);
                    match op {
                        BinaryOp::Add => {
                            adjoint[l] += a;
                            adjoint[r] += a;
                        }
                        BinaryOp::Sub => {
                            adjoint[l] += a;
                            adjoint[r] -= a;
                        }
                        BinaryOp::Mul => {
                            adjoint[l] += a * y;
                            adjoint[r] += a * x;
                        }
                        BinaryOp::Div => {
                            adjoint[l] += a / y;
                            adjoint[r] -= a * x / (y * y);
                        }
                    }
                }
            }
        }
        grad
    }
}
