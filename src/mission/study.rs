use tracing::info;

use crate::aircraft::{Aircraft, Loadout, ModelConfig};
use crate::constants::{MISSION_2_TIME, MISSION_3_TIME};
use crate::error::SizingResult;
use crate::solver::{Expr, Problem};

use super::course::Course;
use super::lap::LapSimulator;
use super::scoring::*;

/// One optimisation session: the problem, the aircraft built on it and the
/// two flown missions.
#[derive(Debug, Clone)]
pub struct Study {
    pub problem: Problem,
    pub aircraft: Aircraft,
    pub course: Course,
    /// Mission 2, passengers and cargo aboard
    pub payload_lap: LapSimulator,
    /// Mission 3, banner in tow
    pub banner_lap: LapSimulator,
}

impl Study {
    pub fn new(config: &ModelConfig) -> SizingResult<Self> {
        Self::with_course(config, Course::default())
    }

    pub fn with_course(config: &ModelConfig, course: Course) -> SizingResult<Self> {
        let mut problem = Problem::new();
        let aircraft = Aircraft::new(&mut problem, config)?;
        let payload_lap = LapSimulator::new(&mut problem, &aircraft, "m2", Loadout::Payload, course, MISSION_2_TIME);
        let banner_lap = LapSimulator::new(&mut problem, &aircraft, "m3", Loadout::Banner, course, MISSION_3_TIME);

        info!(
            variables = problem.variables().len(),
            constraints = problem.constraints().len(),
            "study assembled"
        );

        Ok(Self {
            problem,
            aircraft,
            course,
            payload_lap,
            banner_lap,
        })
    }

    /// Flown missions, payload first.
    pub fn laps(&self) -> [&LapSimulator; 2] {
        [&self.payload_lap, &self.banner_lap]
    }

    pub fn score(&self, kind: MissionKind) -> Expr {
        match kind {
            MissionKind::Ground => ground_mission(&self.aircraft),
            MissionKind::Delivery => mission_2(&self.aircraft, &self.payload_lap),
            MissionKind::BannerTow => mission_3(&self.aircraft, &self.banner_lap),
        }
    }

    pub fn objective(&self, kind: MissionKind) -> MissionObjective {
        MissionObjective {
            kind,
            score: self.score(kind),
            sense: kind.sense(),
        }
    }

    /// Looks up a declared variable by name.
    pub fn variable(&self, name: &str) -> Option<Expr> {
        self.problem
            .variables()
            .iter()
            .position(|v| v.name == name)
            .map(Expr::variable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_study_declares_both_missions() {
        let study = Study::new(&ModelConfig::default()).unwrap();
        // 10 aircraft variables, 4 per flown mission
        assert_eq!(study.problem.variables().len(), 18);
        assert_eq!(study.payload_lap.label, "m2");
        assert_eq!(study.banner_lap.loadout, Loadout::Banner);
        assert!(study.problem.has_constraint("energy_budget/m3"));
    }

    #[test]
    fn test_variable_lookup() {
        let study = Study::new(&ModelConfig::default()).unwrap();
        let span = study.variable("span").unwrap();
        assert_eq!(span.variable_index(), study.aircraft.wing.span.variable_index());
        assert!(study.variable("m3_laps").is_some());
        assert!(study.variable("tail_boom").is_none());
    }

    #[test]
    fn test_objectives_carry_sense() {
        let study = Study::new(&ModelConfig::default()).unwrap();
        let ground = study.objective(MissionKind::Ground);
        assert_eq!(ground.sense, crate::solver::Sense::Minimize);
        let passengers = study.problem.initial_value(&study.aircraft.passengers);
        let cargo = study.problem.initial_value(&study.aircraft.cargo);
        assert_relative_eq!(
            study.problem.initial_value(&ground.score),
            1.5 * (passengers + cargo) + 15.0,
            epsilon = 1e-12
        );
    }
}
