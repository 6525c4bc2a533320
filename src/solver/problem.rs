use tracing::{debug, warn};

use super::config::{OnFailure, SolverConfig};
use super::error::SolverError;
use super::expr::{Expr, Relation};
use super::nlp;

/// Declaration of a continuous decision variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    /// Initial guess (m, kg, J ... whatever the quantity is in).
    pub init: f64,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    /// Typical magnitude used to normalise the variable internally. Defaults
    /// to the initial guess.
    pub scale: Option<f64>,
}

impl Variable {
    pub fn new(name: impl Into<String>, init: f64) -> Self {
        Self {
            name: name.into(),
            init,
            lower: None,
            upper: None,
            scale: None,
        }
    }

    pub fn lower(mut self, lower: f64) -> Self {
        self.lower = Some(lower);
        self
    }

    pub fn upper(mut self, upper: f64) -> Self {
        self.upper = Some(upper);
        self
    }

    pub fn bounds(self, lower: f64, upper: f64) -> Self {
        self.lower(lower).upper(upper)
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Initial guess pulled inside the bounds.
    pub fn clamped_init(&self) -> f64 {
        let mut x = self.init;
        if let Some(lo) = self.lower {
            x = x.max(lo);
        }
        if let Some(hi) = self.upper {
            x = x.min(hi);
        }
        x
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

#[derive(Debug, Clone)]
pub struct Objective {
    pub expr: Expr,
    pub sense: Sense,
}

#[derive(Debug, Clone)]
pub struct NamedConstraint {
    pub name: String,
    pub relation: Relation,
}

/// The optimisation context: owns the decision variables, the constraint set
/// and the current objective.
///
/// Models are built by asking the problem for variables and composing the
/// returned [`Expr`] handles; nothing else holds solver state.
#[derive(Debug, Clone, Default)]
pub struct Problem {
    variables: Vec<Variable>,
    constraints: Vec<NamedConstraint>,
    objective: Option<Objective>,
    warm_start: Option<Vec<f64>>,
}

impl Problem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a decision variable and returns its symbolic handle.
    pub fn variable(&mut self, variable: Variable) -> Expr {
        debug!(
            name = %variable.name,
            init = variable.init,
            lower = ?variable.lower,
            upper = ?variable.upper,
            "declared variable"
        );
        self.variables.push(variable);
        Expr::variable(self.variables.len() - 1)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Attaches a relation that every accepted solution must satisfy.
    pub fn constrain(&mut self, name: impl Into<String>, relation: Relation) {
        let name = name.into();
        if self.has_constraint(&name) {
            warn!(constraint = %name, "constraint registered twice");
        }
        self.constraints.push(NamedConstraint { name, relation });
    }

    pub fn constraints(&self) -> &[NamedConstraint] {
        &self.constraints
    }

    pub fn has_constraint(&self, name: &str) -> bool {
        self.constraints.iter().any(|c| c.name == name)
    }

    /// Attaches or replaces the objective.
    pub fn set_objective(&mut self, expr: Expr, sense: Sense) {
        self.objective = Some(Objective { expr, sense });
    }

    pub fn objective(&self) -> Option<&Objective> {
        self.objective.as_ref()
    }

    /// Declared initial guesses, clamped into bounds.
    pub fn declared_point(&self) -> Vec<f64> {
        self.variables.iter().map(Variable::clamped_init).collect()
    }

    /// Point the next solve starts from: the warm start when present, the
    /// declared guesses otherwise.
    pub fn initial_point(&self) -> Vec<f64> {
        let declared = self.declared_point();
        match &self.warm_start {
            Some(ws) => declared
                .iter()
                .enumerate()
                .map(|(i, &d)| ws.get(i).copied().unwrap_or(d))
                .collect(),
            None => declared,
        }
    }

    /// Value of `expr` at the declared initial guesses.
    pub fn initial_value(&self, expr: &Expr) -> f64 {
        expr.eval(&self.declared_point())
    }

    pub fn bounds(&self, expr: &Expr) -> Result<(Option<f64>, Option<f64>), SolverError> {
        let index = expr.variable_index().ok_or(SolverError::UnknownVariable)?;
        self.variables
            .get(index)
            .map(|v| (v.lower, v.upper))
            .ok_or(SolverError::UnknownVariable)
    }

    pub fn variable_spec(&self, expr: &Expr) -> Result<&Variable, SolverError> {
        let index = expr.variable_index().ok_or(SolverError::UnknownVariable)?;
        self.variables.get(index).ok_or(SolverError::UnknownVariable)
    }

    pub fn set_warm_start(&mut self, solution: &Solution) {
        self.warm_start = Some(solution.values.clone());
    }

    pub fn has_warm_start(&self) -> bool {
        self.warm_start.is_some()
    }

    /// Constraints violated by more than `tolerance` (relative to the
    /// magnitude of their two sides) at `solution`.
    pub fn violated_constraints(&self, solution: &Solution, tolerance: f64) -> Vec<(String, f64)> {
        self.constraints
            .iter()
            .filter_map(|c| {
                let lhs = solution.value(&c.relation.lhs);
                let rhs = solution.value(&c.relation.rhs);
                let scale = lhs.abs().max(rhs.abs()).max(1.0);
                let violation = c.relation.violation(&solution.values) / scale;
                (violation > tolerance).then(|| (c.name.clone(), violation))
            })
            .collect()
    }

    /// Runs the nonlinear solve on the current objective and constraints.
    pub fn solve(&self, config: &SolverConfig, on_failure: OnFailure) -> Result<Solution, SolverError> {
        let objective = self.objective.as_ref().ok_or(SolverError::MissingObjective)?;
        let start = if config.warm_start {
            self.initial_point()
        } else {
            self.declared_point()
        };
        let outcome = nlp::solve(self, objective, &start, config)?;
        let solution = Solution {
            names: self.variables.iter().map(|v| v.name.clone()).collect(),
            values: outcome.x,
            objective: outcome.objective,
            max_violation: outcome.max_violation,
            iterations: outcome.iterations,
            converged: outcome.failure.is_none(),
        };
        match (outcome.failure, on_failure) {
            (None, _) => Ok(solution),
            (Some(err), OnFailure::Error) => Err(err),
            (Some(err), OnFailure::ReturnLast) => {
                warn!(%err, "returning last iterate of failed solve");
                Ok(solution)
            }
        }
    }
}

/// Variable assignment produced by a solve.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    names: Vec<String>,
    values: Vec<f64>,
    /// Objective value in its own units (not negated for maximisation).
    pub objective: f64,
    /// Largest scaled constraint violation.
    pub max_violation: f64,
    /// Inner iterations spent.
    pub iterations: usize,
    pub converged: bool,
}

impl Solution {
    /// Evaluates any expression built on the solved problem's variables.
    pub fn value(&self, expr: &Expr) -> f64 {
        expr.eval(&self.values)
    }

    pub fn variable(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_variable_builder() {
        let v = Variable::new("span", 2.0).bounds(0.9, 1.5);
        assert_eq!(v.lower, Some(0.9));
        assert_eq!(v.upper, Some(1.5));
        assert_relative_eq!(v.clamped_init(), 1.5);
    }

    #[test]
    fn test_initial_values_and_bounds() {
        let mut p = Problem::new();
        let x = p.variable(Variable::new("x", 3.0).lower(1.0));
        let y = p.variable(Variable::new("y", 4.0));
        assert_relative_eq!(p.initial_value(&(&x * &y)), 12.0);
        assert_eq!(p.bounds(&x).unwrap(), (Some(1.0), None));
        assert_eq!(p.bounds(&(&x + 1.0)), Err(SolverError::UnknownVariable));
    }

    #[test]
    fn test_missing_objective() {
        let mut p = Problem::new();
        p.variable(Variable::new("x", 1.0));
        let err = p.solve(&SolverConfig::default(), OnFailure::Error).unwrap_err();
        assert_eq!(err, SolverError::MissingObjective);
    }
}
