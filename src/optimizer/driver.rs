use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::constraints::ConstraintOptions;
use crate::error::{SizingError, SizingResult};
use crate::mission::{mission_1, normalized_term, MissionKind, MissionObjective, Study};
use crate::solver::{Expr, Objective, OnFailure, Sense, Solution, SolverConfig, SolverError};

/// Score recorded in place of a failed solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentinelScore {
    Zero,
    Nan,
}

impl SentinelScore {
    pub fn value(&self) -> f64 {
        match self {
            SentinelScore::Zero => 0.0,
            SentinelScore::Nan => f64::NAN,
        }
    }
}

/// What the driver does when a solve fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailurePolicy {
    /// Propagate the solver error
    Abort,
    /// Record the sentinel score and carry on
    Sentinel(SentinelScore),
    /// Use the solver's last iterate, flagged as not converged
    ReturnLast,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Sentinel(SentinelScore::Nan)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriverConfig {
    pub solver: SolverConfig,
    pub failure_policy: FailurePolicy,
    /// Weight of the quadratic term pinning a swept variable to its target
    pub sweep_penalty_weight: f64,
    pub constraints: ConstraintOptions,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            failure_policy: FailurePolicy::default(),
            sweep_penalty_weight: 400.0,
            constraints: ConstraintOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Unsolved,
    SingleObjectiveSolved,
    NormalizationPending,
    CompositeSolved,
    SweepSolved,
}

/// Outcome of one objective solve.
#[derive(Debug, Clone)]
pub struct SingleSolve {
    /// Objective value, or the sentinel when the solve failed
    pub score: f64,
    pub solution: Option<Solution>,
    pub failure: Option<SolverError>,
}

impl SingleSolve {
    /// Whether the score comes from a converged solve.
    pub fn is_converged(&self) -> bool {
        self.solution.as_ref().map_or(false, |s| s.converged)
    }
}

/// One mission's normaliser and its score at the composite optimum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MissionScore {
    pub kind: MissionKind,
    /// Best value the mission reaches when optimised alone
    pub normalizer: f64,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct MultiMissionResult {
    pub missions: Vec<MissionScore>,
    /// Composite score including the flat mission 1 points
    pub composite_score: f64,
    pub composite: SingleSolve,
}

/// Runs every solve of one optimisation session.
///
/// The study is built once; each successful solve seeds the next one.
#[derive(Debug)]
pub struct Driver {
    pub(crate) study: Study,
    pub(crate) config: DriverConfig,
    state: DriverState,
    last_solution: Option<Solution>,
    composite: Option<Objective>,
}

impl Driver {
    pub fn new(study: Study, config: DriverConfig) -> Self {
        Self {
            study,
            config,
            state: DriverState::Unsolved,
            last_solution: None,
            composite: None,
        }
    }

    pub fn study(&self) -> &Study {
        &self.study
    }

    /// Mutable access for attaching or removing constraints between solves.
    pub fn study_mut(&mut self) -> &mut Study {
        &mut self.study
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn last_solution(&self) -> Option<&Solution> {
        self.last_solution.as_ref()
    }

    /// Registers the configured constraint set on the study.
    pub fn assemble_constraints(&mut self) {
        let options = self.config.constraints;
        crate::constraints::assemble(&mut self.study, &options);
    }

    /// Composite objective built by the last multi-mission solve.
    pub fn composite_objective(&self) -> SizingResult<Objective> {
        self.composite.clone().ok_or_else(|| {
            SizingError::InvalidState(format!(
                "no composite objective in state {:?}, run a multi-mission solve first",
                self.state
            ))
        })
    }

    fn transition(&mut self, next: DriverState) {
        if self.state != next {
            debug!(from = ?self.state, to = ?next, "driver state change");
            self.state = next;
        }
    }

    /// Sets the objective and solves, keeping the warm start on the last
    /// converged solution.
    pub(crate) fn run(&mut self, expr: Expr, sense: Sense) -> Result<Solution, SolverError> {
        let on_failure = match self.config.failure_policy {
            FailurePolicy::ReturnLast => OnFailure::ReturnLast,
            FailurePolicy::Abort | FailurePolicy::Sentinel(_) => OnFailure::Error,
        };
        self.study.problem.set_objective(expr, sense);
        debug!(warm_start = self.study.problem.has_warm_start(), ?sense, "solving");
        let solution = self.study.problem.solve(&self.config.solver, on_failure)?;
        if solution.converged {
            self.study.problem.set_warm_start(&solution);
            self.last_solution = Some(solution.clone());
        }
        Ok(solution)
    }

    /// Solves one objective under the configured failure policy.
    pub fn solve_objective(&mut self, objective: &Objective) -> SizingResult<SingleSolve> {
        let result = self.run(objective.expr.clone(), objective.sense);
        let single = match result {
            Ok(solution) => {
                // only reachable under ReturnLast
                let failure = (!solution.converged).then(|| {
                    if solution.max_violation > self.config.solver.feasibility_tolerance {
                        SolverError::InfeasibleConstraintSet {
                            violation: solution.max_violation,
                            iterations: solution.iterations,
                        }
                    } else {
                        SolverError::IterationLimitExceeded {
                            iterations: solution.iterations,
                            violation: solution.max_violation,
                        }
                    }
                });
                SingleSolve {
                    score: solution.objective,
                    solution: Some(solution),
                    failure,
                }
            }
            Err(err) => match self.config.failure_policy {
                FailurePolicy::Sentinel(sentinel) if err.is_recoverable() => {
                    warn!(error = %err, sentinel = ?sentinel, "recording sentinel score");
                    SingleSolve {
                        score: sentinel.value(),
                        solution: None,
                        failure: Some(err),
                    }
                }
                _ => return Err(err.into()),
            },
        };
        if self.state == DriverState::Unsolved {
            self.transition(DriverState::SingleObjectiveSolved);
        }
        Ok(single)
    }

    /// Solves with one mission score as the objective.
    pub fn solve_single(&mut self, objective: &MissionObjective) -> SizingResult<SingleSolve> {
        info!(mission = %objective.kind, sense = ?objective.sense, "solving single mission");
        let single = self.solve_objective(&Objective {
            expr: objective.score.clone(),
            sense: objective.sense,
        })?;
        info!(mission = %objective.kind, score = single.score, converged = single.is_converged(), "single mission solved");
        Ok(single)
    }

    /// Normalises each mission by its own optimum, then solves the composite.
    ///
    /// `constraint_fn` runs once on the study before any solve. Every
    /// normaliser is a frozen number by the time the composite objective is
    /// built.
    pub fn solve_multi_mission<F>(&mut self, constraint_fn: F, missions: &[MissionKind]) -> SizingResult<MultiMissionResult>
    where
        F: FnOnce(&mut Study),
    {
        if missions.is_empty() {
            return Err(SizingError::InvalidState("no missions to normalise".to_string()));
        }
        constraint_fn(&mut self.study);
        self.transition(DriverState::NormalizationPending);

        let mut normalizers = Vec::with_capacity(missions.len());
        for &kind in missions {
            let objective = self.study.objective(kind);
            let single = self.solve_single(&objective).map_err(|err| SizingError::NormalizationFailed {
                mission: kind.to_string(),
                reason: err.to_string(),
            })?;
            if !single.is_converged() {
                let reason = single
                    .failure
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "solve did not converge".to_string());
                return Err(SizingError::NormalizationFailed {
                    mission: kind.to_string(),
                    reason,
                });
            }
            if !single.score.is_finite() || single.score.abs() < f64::EPSILON {
                return Err(SizingError::NormalizationFailed {
                    mission: kind.to_string(),
                    reason: format!("normaliser {} cannot divide a score", single.score),
                });
            }
            info!(mission = %kind, normalizer = single.score, "normaliser frozen");
            normalizers.push((objective, single.score));
        }

        let composite_expr = mission_1()
            + Expr::sum(
                normalizers
                    .iter()
                    .map(|(objective, best)| normalized_term(&objective.score, *best, objective.sense)),
            );
        let composite = Objective {
            expr: composite_expr,
            sense: Sense::Maximize,
        };
        self.composite = Some(composite.clone());

        info!(missions = missions.len(), "solving composite objective");
        let single = self.solve_objective(&composite)?;
        let missions = normalizers
            .iter()
            .map(|(objective, best)| MissionScore {
                kind: objective.kind,
                normalizer: *best,
                score: single
                    .solution
                    .as_ref()
                    .map_or(f64::NAN, |s| s.value(&objective.score)),
            })
            .collect();
        self.transition(DriverState::CompositeSolved);
        info!(composite = single.score, converged = single.is_converged(), "composite solved");

        Ok(MultiMissionResult {
            missions,
            composite_score: single.score,
            composite: single,
        })
    }

    pub(crate) fn mark_swept(&mut self) {
        self.transition(DriverState::SweepSolved);
    }
}
