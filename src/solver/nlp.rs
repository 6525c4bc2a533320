use std::cell::RefCell;
use std::rc::Rc;

use argmin::{
    core::{CostFunction, Error, Executor, Gradient, State},
    solver::{linesearch::MoreThuenteLineSearch, quasinewton::LBFGS},
};
use tracing::{debug, info, warn};

use super::config::SolverConfig;
use super::error::SolverError;
use super::expr::{RelationKind, Tape};
use super::problem::{Objective, Problem, Sense, Variable};

/// Smooth map from an unconstrained internal coordinate to a variable that
/// always respects its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Transform {
    Free { scale: f64 },
    Lower { lower: f64, scale: f64 },
    Upper { upper: f64, scale: f64 },
    Boxed { lower: f64, upper: f64 },
}

const BOX_MARGIN: f64 = 1e-4;

/// Internal coordinates are pulled back inside this range before every outer
/// step, so a variable parked on a bound keeps a usable derivative.
const RECENTRE_LIMIT: f64 = 8.0;

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn softplus(z: f64) -> f64 {
    if z > 30.0 {
        z
    } else {
        z.exp().ln_1p()
    }
}

fn softplus_inverse(y: f64) -> f64 {
    let y = y.max(1e-8);
    if y > 30.0 {
        y
    } else {
        y + (-(-y).exp()).ln_1p()
    }
}

impl Transform {
    pub(crate) fn for_variable(v: &Variable) -> Self {
        let magnitude = |x: f64| if x.abs() > 1e-8 { x.abs() } else { 1.0 };
        match (v.lower, v.upper) {
            (Some(lower), Some(upper)) if upper > lower => Transform::Boxed { lower, upper },
            (Some(lower), Some(_)) => Transform::Free {
                scale: magnitude(lower),
            },
            (Some(lower), None) => Transform::Lower {
                lower,
                scale: v.scale.unwrap_or_else(|| magnitude(v.init - lower)),
            },
            (None, Some(upper)) => Transform::Upper {
                upper,
                scale: v.scale.unwrap_or_else(|| magnitude(upper - v.init)),
            },
            (None, None) => Transform::Free {
                scale: v.scale.unwrap_or_else(|| magnitude(v.init)),
            },
        }
    }

    pub(crate) fn to_external(self, z: f64) -> f64 {
        match self {
            Transform::Free { scale } => scale * z,
            Transform::Lower { lower, scale } => lower + scale * softplus(z),
            Transform::Upper { upper, scale } => upper - scale * softplus(z),
            Transform::Boxed { lower, upper } => lower + (upper - lower) * sigmoid(z),
        }
    }

    /// dx/dz
    pub(crate) fn derivative(self, z: f64) -> f64 {
        match self {
            Transform::Free { scale } => scale,
            Transform::Lower { scale, .. } => scale * sigmoid(z),
            Transform::Upper { scale, .. } => -scale * sigmoid(z),
            Transform::Boxed { lower, upper } => {
                let s = sigmoid(z);
                (upper - lower) * s * (1.0 - s)
            }
        }
    }

    /// Length a variable is measured in when testing stationarity.
    fn extent(self) -> f64 {
        match self {
            Transform::Free { scale } | Transform::Lower { scale, .. } | Transform::Upper { scale, .. } => scale,
            Transform::Boxed { lower, upper } => upper - lower,
        }
    }

    fn limits(self) -> (f64, f64) {
        match self {
            Transform::Free { .. } => (f64::NEG_INFINITY, f64::INFINITY),
            Transform::Lower { lower, .. } => (lower, f64::INFINITY),
            Transform::Upper { upper, .. } => (f64::NEG_INFINITY, upper),
            Transform::Boxed { lower, upper } => (lower, upper),
        }
    }

    /// Scaled length of a projected gradient step from `x`. Zero when `x` is
    /// stationary, or sits on a bound the gradient pushes against.
    pub(crate) fn projected_gradient(self, x: f64, gradient: f64) -> f64 {
        let extent = self.extent();
        let (lower, upper) = self.limits();
        let step = (x - gradient * extent * extent).clamp(lower, upper);
        ((x - step) / extent).abs()
    }

    /// Moves a saturated internal coordinate back to where dx/dz is not
    /// negligible. The external value changes by at most `e^-8` of the extent.
    pub(crate) fn recentre(self, z: f64) -> f64 {
        match self {
            Transform::Free { .. } => z,
            Transform::Lower { .. } | Transform::Upper { .. } => z.max(-RECENTRE_LIMIT),
            Transform::Boxed { .. } => z.clamp(-RECENTRE_LIMIT, RECENTRE_LIMIT),
        }
    }

    pub(crate) fn to_internal(self, x: f64) -> f64 {
        match self {
            Transform::Free { scale } => x / scale,
            Transform::Lower { lower, scale } => softplus_inverse((x - lower) / scale),
            Transform::Upper { upper, scale } => softplus_inverse((upper - x) / scale),
            Transform::Boxed { lower, upper } => {
                let t = ((x - lower) / (upper - lower)).clamp(BOX_MARGIN, 1.0 - BOX_MARGIN);
                (t / (1.0 - t)).ln()
            }
        }
    }
}

/// Objective and constraints lowered onto one tape, with the scaling that
/// makes their magnitudes comparable.
#[derive(Debug)]
struct Compiled {
    tape: Tape,
    transforms: Vec<Transform>,
    kinds: Vec<RelationKind>,
    constraint_scales: Vec<f64>,
    objective_scale: f64,
    /// +1 when minimising, -1 when maximising.
    sign: f64,
}

fn magnitude_scale(values: &[f64]) -> f64 {
    let m = values
        .iter()
        .filter(|v| v.is_finite())
        .fold(0.0_f64, |acc, v| acc.max(v.abs()));
    if m > 1e-12 {
        m
    } else {
        1.0
    }
}

impl Compiled {
    fn new(problem: &Problem, objective: &Objective) -> Self {
        let declared = problem.declared_point();
        let mut roots = Vec::with_capacity(problem.constraints().len() + 1);
        roots.push(objective.expr.clone());
        let mut kinds = Vec::new();
        let mut constraint_scales = Vec::new();
        for c in problem.constraints() {
            roots.push(c.relation.residual());
            kinds.push(c.relation.kind);
            constraint_scales.push(magnitude_scale(&[
                c.relation.lhs.eval(&declared),
                c.relation.rhs.eval(&declared),
            ]));
        }
        let objective_scale = magnitude_scale(&[objective.expr.eval(&declared)]);
        Self {
            tape: Tape::new(&roots),
            transforms: problem.variables().iter().map(Transform::for_variable).collect(),
            kinds,
            constraint_scales,
            objective_scale,
            sign: match objective.sense {
                Sense::Minimize => 1.0,
                Sense::Maximize => -1.0,
            },
        }
    }

    fn external(&self, z: &[f64]) -> Vec<f64> {
        self.transforms
            .iter()
            .zip(z)
            .map(|(t, &zi)| t.to_external(zi))
            .collect()
    }

    fn internal(&self, x: &[f64]) -> Vec<f64> {
        self.transforms
            .iter()
            .zip(x)
            .map(|(t, &xi)| t.to_internal(xi))
            .collect()
    }

    fn recentre(&self, z: &mut [f64]) {
        for (zi, t) in z.iter_mut().zip(&self.transforms) {
            *zi = t.recentre(*zi);
        }
    }

    /// Scaled objective (always minimised) and scaled constraint residuals.
    fn evaluate(&self, x: &[f64]) -> (Vec<f64>, f64, Vec<f64>) {
        let values = self.tape.forward(x);
        let roots = self.tape.root_values(&values);
        let objective = self.sign * roots[0] / self.objective_scale;
        let residuals = roots[1..]
            .iter()
            .zip(&self.constraint_scales)
            .map(|(r, s)| r / s)
            .collect();
        (values, objective, residuals)
    }

    fn max_violation(&self, residuals: &[f64]) -> f64 {
        worst(residuals.iter().zip(&self.kinds).map(|(&r, kind)| match kind {
            RelationKind::LessEqual => r.max(0.0),
            RelationKind::Equal => r.abs(),
        }))
    }

    /// Augmented Lagrangian value at `x`, with the tape adjoints of its roots.
    fn merit(&self, x: &[f64], multipliers: &[f64], rho: f64) -> MeritPoint {
        let (values, objective, residuals) = self.evaluate(x);
        let mut merit = objective;
        let mut adjoints = Vec::with_capacity(residuals.len() + 1);
        adjoints.push(self.sign / self.objective_scale);
        for (k, &g) in residuals.iter().enumerate() {
            let lambda = multipliers[k];
            let scale = self.constraint_scales[k];
            match self.kinds[k] {
                RelationKind::LessEqual => {
                    let shifted = (g + lambda / rho).max(0.0);
                    merit += 0.5 * rho * (shifted * shifted - (lambda / rho).powi(2));
                    adjoints.push(rho * shifted / scale);
                }
                RelationKind::Equal => {
                    merit += lambda * g + 0.5 * rho * g * g;
                    adjoints.push((lambda + rho * g) / scale);
                }
            }
        }
        MeritPoint {
            values,
            objective,
            residuals,
            merit,
            adjoints,
        }
    }

    /// First-order optimality of `x` for the multipliers a step at `rho`
    /// would produce.
    ///
    /// The merit gradient with the old multipliers is the Lagrangian gradient
    /// with the updated ones, so stationarity is read straight off it.
    fn optimality(&self, x: &[f64], multipliers: &[f64], rho: f64) -> Optimality {
        let point = self.merit(x, multipliers, rho);
        let gradient = self.tape.reverse(&point.values, &point.adjoints, self.transforms.len());
        let scale = 1.0 + point.objective.abs();

        let stationarity = worst(
            self.transforms
                .iter()
                .zip(x)
                .zip(&gradient)
                .map(|((t, &xi), &g)| t.projected_gradient(xi, g)),
        ) / scale;

        let updated: Vec<f64> = point
            .residuals
            .iter()
            .zip(&self.kinds)
            .zip(multipliers)
            .map(|((&g, kind), &lambda)| match kind {
                RelationKind::LessEqual => (lambda + rho * g).clamp(0.0, MULTIPLIER_CAP),
                RelationKind::Equal => (lambda + rho * g).clamp(-MULTIPLIER_CAP, MULTIPLIER_CAP),
            })
            .collect();

        // an inequality may only carry a multiplier while it is tight
        let complementarity = worst(
            point
                .residuals
                .iter()
                .zip(&self.kinds)
                .zip(&updated)
                .filter(|((_, kind), _)| matches!(kind, RelationKind::LessEqual))
                .map(|((&g, _), &lambda)| (lambda / scale).min((-g).max(0.0))),
        );

        Optimality {
            objective: point.objective,
            violation: self.max_violation(&point.residuals),
            stationarity,
            complementarity,
            multipliers: updated,
        }
    }
}

/// Largest value, with NaN counted as infinitely bad.
fn worst(values: impl Iterator<Item = f64>) -> f64 {
    values
        .map(|v| if v.is_nan() { f64::INFINITY } else { v })
        .fold(0.0, f64::max)
}

/// Multipliers are clamped to this magnitude (scaled units).
const MULTIPLIER_CAP: f64 = 1e8;
/// Violation below which the first multiplier update is taken.
const INITIAL_FEASIBILITY_TARGET: f64 = 0.1;
/// Shrinks the target after every multiplier update.
const FEASIBILITY_TARGET_DECAY: f64 = 0.25;

#[derive(Debug)]
struct MeritPoint {
    values: Vec<f64>,
    objective: f64,
    residuals: Vec<f64>,
    merit: f64,
    adjoints: Vec<f64>,
}

#[derive(Debug)]
struct Optimality {
    objective: f64,
    violation: f64,
    stationarity: f64,
    complementarity: f64,
    multipliers: Vec<f64>,
}

#[derive(Debug, Default)]
struct BestPoint {
    merit: f64,
    z: Option<Vec<f64>>,
    gradient_evaluations: usize,
}

/// Augmented Lagrangian merit function for fixed multipliers and penalty.
struct Merit {
    compiled: Rc<Compiled>,
    multipliers: Vec<f64>,
    penalty: f64,
    best: Rc<RefCell<BestPoint>>,
}

impl CostFunction for Merit {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, z: &Self::Param) -> Result<Self::Output, Error> {
        let x = self.compiled.external(z);
        let merit = self.compiled.merit(&x, &self.multipliers, self.penalty).merit;
        if !merit.is_finite() {
            return Err(Error::msg("merit function is not finite"));
        }
        let mut best = self.best.borrow_mut();
        if best.z.is_none() || merit < best.merit {
            best.merit = merit;
            best.z = Some(z.clone());
        }
        Ok(merit)
    }
}

impl Gradient for Merit {
    type Param = Vec<f64>;
    type Gradient = Vec<f64>;

    fn gradient(&self, z: &Self::Param) -> Result<Self::Gradient, Error> {
        let c = &self.compiled;
        let point = c.merit(&c.external(z), &self.multipliers, self.penalty);
        let grad_x = c.tape.reverse(&point.values, &point.adjoints, c.transforms.len());
        let grad: Vec<f64> = grad_x
            .iter()
            .zip(z)
            .zip(&c.transforms)
            .map(|((g, &zi), t)| g * t.derivative(zi))
            .collect();
        if grad.iter().any(|g| !g.is_finite()) {
            return Err(Error::msg("merit gradient is not finite"));
        }
        self.best.borrow_mut().gradient_evaluations += 1;
        Ok(grad)
    }
}

/// Result of the augmented Lagrangian loop, before policy is applied.
#[derive(Debug)]
pub(crate) struct Outcome {
    pub x: Vec<f64>,
    pub objective: f64,
    pub max_violation: f64,
    pub iterations: usize,
    pub failure: Option<SolverError>,
}

/// Minimises the merit from `z0` with L-BFGS; returns the best internal point
/// found and the number of iterations spent. Line search breakdowns fall back
/// to the best point evaluated so far.
fn inner_solve(
    merit: Merit,
    z0: &[f64],
    max_iters: u64,
    config: &SolverConfig,
) -> Result<(Vec<f64>, usize), SolverError> {
    let best = Rc::clone(&merit.best);
    let linesearch = MoreThuenteLineSearch::new()
        .with_c(1e-4, 0.9)
        .map_err(|e| SolverError::Backend(e.to_string()))?;
    let solver = LBFGS::new(linesearch, config.lbfgs_memory)
        .with_tolerance_grad(config.gradient_tolerance)
        .map_err(|e| SolverError::Backend(e.to_string()))?;

    let result = Executor::new(merit, solver)
        .configure(|state| state.param(z0.to_vec()).max_iters(max_iters))
        .run();

    match result {
        Ok(res) => {
            let iterations = res.state().get_iter() as usize;
            let z = res
                .state()
                .get_best_param()
                .cloned()
                .or_else(|| best.borrow().z.clone())
                .unwrap_or_else(|| z0.to_vec());
            Ok((z, iterations.max(1)))
        }
        Err(e) => {
            let best = best.borrow();
            debug!(error = %e, "inner solve stopped early, keeping best evaluated point");
            let z = best.z.clone().unwrap_or_else(|| z0.to_vec());
            Ok((z, best.gradient_evaluations.max(1)))
        }
    }
}

pub(crate) fn solve(
    problem: &Problem,
    objective: &Objective,
    start: &[f64],
    config: &SolverConfig,
) -> Result<Outcome, SolverError> {
    let compiled = Rc::new(Compiled::new(problem, objective));
    let n_constraints = compiled.kinds.len();
    let mut z = compiled.internal(start);
    let mut multipliers = vec![0.0; n_constraints];
    let mut penalty = config.initial_penalty;
    let mut target = INITIAL_FEASIBILITY_TARGET.max(config.feasibility_tolerance);
    let mut iterations = 0usize;
    let mut stalled_at_max_penalty = 0usize;
    let mut converged = false;

    info!(
        variables = start.len(),
        constraints = n_constraints,
        tape = compiled.tape.len(),
        "starting solve"
    );

    for outer in 0..config.max_outer_iterations {
        let remaining = config.max_iterations.saturating_sub(iterations);
        if remaining == 0 {
            break;
        }
        compiled.recentre(&mut z);
        let merit = Merit {
            compiled: Rc::clone(&compiled),
            multipliers: multipliers.clone(),
            penalty,
            best: Rc::new(RefCell::new(BestPoint::default())),
        };
        let budget = remaining.min(config.inner_iterations) as u64;
        let (z_next, spent) = inner_solve(merit, &z, budget, config)?;
        iterations += spent;
        z = z_next;

        let x = compiled.external(&z);
        let check = compiled.optimality(&x, &multipliers, penalty);

        debug!(
            outer,
            iterations,
            objective = check.objective,
            violation = check.violation,
            stationarity = check.stationarity,
            complementarity = check.complementarity,
            penalty,
            "augmented Lagrangian step"
        );

        if check.objective.is_finite()
            && check.violation <= config.feasibility_tolerance
            && check.stationarity <= config.optimality_tolerance
            && check.complementarity <= config.optimality_tolerance
        {
            converged = true;
            break;
        }

        // multipliers only move once the subproblem lands near the feasible
        // set; far from it they overshoot and the next subproblem runs away
        if check.violation <= target {
            multipliers = check.multipliers;
            target = (target * FEASIBILITY_TARGET_DECAY).max(config.feasibility_tolerance);
        } else if penalty >= config.max_penalty {
            stalled_at_max_penalty += 1;
            if stalled_at_max_penalty >= 3 {
                break;
            }
        } else {
            penalty = (penalty * config.penalty_growth).min(config.max_penalty);
        }
    }

    let x = compiled.external(&z);
    let (_, scaled_objective, residuals) = compiled.evaluate(&x);
    let max_violation = compiled.max_violation(&residuals);
    let objective_value = compiled.sign * scaled_objective * compiled.objective_scale;

    let failure = if converged {
        None
    } else if max_violation > config.feasibility_tolerance && iterations < config.max_iterations {
        Some(SolverError::InfeasibleConstraintSet {
            violation: max_violation,
            iterations,
        })
    } else {
        // feasible but not yet stationary counts as running out of budget
        Some(SolverError::IterationLimitExceeded {
            iterations,
            violation: max_violation,
        })
    };

    match &failure {
        None => info!(objective = objective_value, iterations, "solve converged"),
        Some(SolverError::IterationLimitExceeded { .. }) => {
            warn!(iterations, violation = max_violation, "solve hit its iteration limit")
        }
        Some(_) => warn!(
            iterations,
            violation = max_violation,
            "solve ended infeasible"
        ),
    }

    Ok(Outcome {
        x,
        objective: objective_value,
        max_violation,
        iterations,
        failure,
    })
}
