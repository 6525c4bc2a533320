//! Parameter sweeps: re-solve with one or two variables pinned to grid
//! values by a quadratic penalty.

use nalgebra::DMatrix;
use tracing::{info, warn};

use crate::error::{SizingError, SizingResult};
use crate::solver::{Expr, Objective, Sense, Solution};

use super::driver::Driver;

/// A quantity recorded at every sweep point.
#[derive(Debug, Clone)]
pub struct Monitor {
    pub name: String,
    pub expr: Expr,
}

impl Monitor {
    pub fn new(name: impl Into<String>, expr: &Expr) -> Self {
        Self {
            name: name.into(),
            expr: expr.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    /// Grid value the variable was pinned towards
    pub target: f64,
    /// Objective without the penalty; `None` where the solve failed
    pub score: Option<f64>,
    /// Value the swept variable actually took
    pub achieved: Option<f64>,
    /// Monitor values, in monitor order
    pub monitors: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub variable: String,
    pub monitor_names: Vec<String>,
    pub points: Vec<SweepPoint>,
}

impl SweepResult {
    /// Scores of the solved points, in grid order.
    pub fn solved(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().filter_map(|p| p.score.map(|s| (p.target, s)))
    }

    pub fn failures(&self) -> usize {
        self.points.iter().filter(|p| p.score.is_none()).count()
    }
}

/// Scores over a two variable grid; rows follow the first variable.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceResult {
    pub row_variable: String,
    pub column_variable: String,
    pub rows: Vec<f64>,
    pub columns: Vec<f64>,
    pub scores: DMatrix<Option<f64>>,
}

impl SurfaceResult {
    pub fn failures(&self) -> usize {
        self.scores.iter().filter(|s| s.is_none()).count()
    }

    /// Best solved cell as `(row target, column target, score)`.
    pub fn best(&self, sense: Sense) -> Option<(f64, f64, f64)> {
        let better = |a: f64, b: f64| match sense {
            Sense::Maximize => a > b,
            Sense::Minimize => a < b,
        };
        let mut best: Option<(f64, f64, f64)> = None;
        for i in 0..self.rows.len() {
            for j in 0..self.columns.len() {
                if let Some(score) = self.scores[(i, j)] {
                    if best.map_or(true, |(_, _, b)| better(score, b)) {
                        best = Some((self.rows[i], self.columns[j], score));
                    }
                }
            }
        }
        best
    }
}

/// `objective ∓ w (x − t)²`, penalised in the direction that hurts.
fn pinned(objective: &Objective, pins: &[(&Expr, f64)], weight: f64) -> Expr {
    let penalty = weight * Expr::sum(pins.iter().map(|(x, target)| (*x - *target).square()));
    match objective.sense {
        Sense::Maximize => &objective.expr - penalty,
        Sense::Minimize => &objective.expr + penalty,
    }
}

impl Driver {
    fn check_grid(&self, variable: &Expr, grid: &[f64]) -> SizingResult<String> {
        let spec = self
            .study
            .problem
            .variable_spec(variable)
            .map_err(|_| SizingError::InvalidSweep("swept expression is not a decision variable".to_string()))?;
        if grid.is_empty() {
            return Err(SizingError::InvalidSweep(format!("empty grid for {}", spec.name)));
        }
        if let Some(bad) = grid.iter().find(|g| !g.is_finite()) {
            return Err(SizingError::InvalidSweep(format!("grid value {bad} for {}", spec.name)));
        }
        Ok(spec.name.clone())
    }

    /// One pinned solve; recoverable failures become `None`.
    fn pinned_solve(&mut self, objective: &Objective, pins: &[(&Expr, f64)]) -> SizingResult<Option<Solution>> {
        let expr = pinned(objective, pins, self.config.sweep_penalty_weight);
        match self.run(expr, objective.sense) {
            Ok(solution) if solution.converged => Ok(Some(solution)),
            Ok(solution) => {
                warn!(violation = solution.max_violation, "sweep point did not converge, recording a gap");
                Ok(None)
            }
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, "sweep point failed, recording a gap");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Solves `objective` once per grid value with `variable` pinned to it.
    ///
    /// Points are solved in grid order, each warm started from the last
    /// successful one.
    pub fn sweep(
        &mut self,
        variable: &Expr,
        grid: &[f64],
        objective: &Objective,
        monitors: &[Monitor],
    ) -> SizingResult<SweepResult> {
        let name = self.check_grid(variable, grid)?;
        info!(variable = %name, points = grid.len(), "starting sweep");

        let mut points = Vec::with_capacity(grid.len());
        for &target in grid {
            let solved = self.pinned_solve(objective, &[(variable, target)])?;
            let point = match solved {
                Some(solution) => SweepPoint {
                    target,
                    score: Some(solution.value(&objective.expr)),
                    achieved: Some(solution.value(variable)),
                    monitors: Some(monitors.iter().map(|p| solution.value(&p.expr)).collect()),
                },
                None => SweepPoint {
                    target,
                    score: None,
                    achieved: None,
                    monitors: None,
                },
            };
            points.push(point);
        }

        let result = SweepResult {
            variable: name,
            monitor_names: monitors.iter().map(|p| p.name.clone()).collect(),
            points,
        };
        info!(variable = %result.variable, failures = result.failures(), "sweep finished");
        self.mark_swept();
        Ok(result)
    }

    /// Solves `objective` over the grid of two pinned variables.
    ///
    /// Rows are walked alternately forwards and backwards so each point is
    /// seeded by a neighbour.
    pub fn sweep_2d(
        &mut self,
        row_variable: &Expr,
        rows: &[f64],
        column_variable: &Expr,
        columns: &[f64],
        objective: &Objective,
    ) -> SizingResult<SurfaceResult> {
        let row_name = self.check_grid(row_variable, rows)?;
        let column_name = self.check_grid(column_variable, columns)?;
        if row_variable.variable_index() == column_variable.variable_index() {
            return Err(SizingError::InvalidSweep(format!("{row_name} swept against itself")));
        }
        info!(rows = %row_name, columns = %column_name, points = rows.len() * columns.len(), "starting surface sweep");

        let mut scores = DMatrix::from_element(rows.len(), columns.len(), None);
        for (i, &row) in rows.iter().enumerate() {
            let order: Vec<usize> = if i % 2 == 0 {
                (0..columns.len()).collect()
            } else {
                (0..columns.len()).rev().collect()
            };
            for j in order {
                let pins = [(row_variable, row), (column_variable, columns[j])];
                scores[(i, j)] = self
                    .pinned_solve(objective, &pins)?
                    .map(|solution| solution.value(&objective.expr));
            }
        }

        let result = SurfaceResult {
            row_variable: row_name,
            column_variable: column_name,
            rows: rows.to_vec(),
            columns: columns.to_vec(),
            scores,
        };
        info!(failures = result.failures(), "surface sweep finished");
        self.mark_swept();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::ModelConfig;
    use crate::mission::{MissionKind, Study};
    use crate::optimizer::{DriverConfig, DriverState};
    use crate::solver::Problem;
    use approx::assert_relative_eq;

    fn driver() -> Driver {
        let study = Study::new(&ModelConfig::default()).unwrap();
        let mut driver = Driver::new(study, DriverConfig::default());
        driver.assemble_constraints();
        driver
    }

    fn ground(driver: &Driver) -> Objective {
        let objective = driver.study().objective(MissionKind::Ground);
        Objective {
            expr: objective.score,
            sense: objective.sense,
        }
    }

    #[test]
    fn test_penalty_direction() {
        let mut problem = Problem::new();
        let x = problem.variable(crate::solver::Variable::new("x", 2.0));
        let max = Objective {
            expr: Expr::constant(10.0),
            sense: Sense::Maximize,
        };
        let min = Objective {
            expr: Expr::constant(10.0),
            sense: Sense::Minimize,
        };
        assert_relative_eq!(pinned(&max, &[(&x, 1.0)], 400.0).eval(&[2.0]), 10.0 - 400.0);
        assert_relative_eq!(pinned(&min, &[(&x, 1.0)], 400.0).eval(&[2.0]), 10.0 + 400.0);
        assert_relative_eq!(pinned(&min, &[(&x, 1.0)], 400.0).eval(&[1.0]), 10.0);
    }

    #[test]
    fn test_rejects_invalid_grids() {
        let mut driver = driver();
        let objective = ground(&driver);
        let passengers = driver.study().aircraft.passengers.clone();
        let area = driver.study().aircraft.wing.area.clone();

        let empty = driver.sweep(&passengers, &[], &objective, &[]);
        assert!(matches!(empty, Err(SizingError::InvalidSweep(_))));
        let nan = driver.sweep(&passengers, &[3.0, f64::NAN], &objective, &[]);
        assert!(matches!(nan, Err(SizingError::InvalidSweep(_))));
        let derived = driver.sweep(&area, &[0.3], &objective, &[]);
        assert!(matches!(derived, Err(SizingError::InvalidSweep(_))));
        let itself = driver.sweep_2d(&passengers, &[3.0], &passengers, &[4.0], &objective);
        assert!(matches!(itself, Err(SizingError::InvalidSweep(_))));
        assert_eq!(driver.state(), DriverState::Unsolved);
    }

    #[test]
    fn test_ground_sweep_tracks_passengers() {
        let mut driver = driver();
        let objective = ground(&driver);
        let passengers = driver.study().aircraft.passengers.clone();
        let cargo = driver.study().aircraft.cargo.clone();
        let result = driver
            .sweep(&passengers, &[3.0, 6.0], &objective, &[Monitor::new("cargo", &cargo)])
            .unwrap();

        assert_eq!(result.variable, "passengers");
        assert_eq!(result.monitor_names, vec!["cargo".to_string()]);
        assert_eq!(result.points.len(), 2);
        for point in &result.points {
            let achieved = point.achieved.unwrap();
            assert!((achieved - point.target).abs() < 0.1, "pinned {} got {achieved}", point.target);
        }
        // more passengers, longer ground mission
        let scores: Vec<f64> = result.solved().map(|(_, s)| s).collect();
        assert!(scores[1] > scores[0]);
        assert_eq!(driver.state(), DriverState::SweepSolved);
    }

    #[test]
    fn test_surface_best_cell() {
        let surface = SurfaceResult {
            row_variable: "passengers".into(),
            column_variable: "cargo".into(),
            rows: vec![3.0, 6.0],
            columns: vec![1.0, 2.0],
            scores: DMatrix::from_row_slice(2, 2, &[Some(1.0), None, Some(4.0), Some(2.0)]),
        };
        assert_eq!(surface.failures(), 1);
        assert_eq!(surface.best(Sense::Maximize), Some((6.0, 1.0, 4.0)));
        assert_eq!(surface.best(Sense::Minimize), Some((3.0, 1.0, 1.0)));
    }
}
