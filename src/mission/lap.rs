use tracing::debug;

use crate::aero::SectionCoefficients;
use crate::aircraft::aerodynamics::turn_radius;
use crate::aircraft::{Aircraft, Loadout};
use crate::constants::GRAVITATIONAL_ACCELERATION;
use crate::solver::{Expr, Problem};

use super::course::Course;

/// Lap level performance of one flown mission.
///
/// The speed, turn load factor, angle of attack and number of laps are
/// decision variables of their own; everything else is derived. The laps
/// flown are limited by inequality constraints on the energy and time
/// budgets rather than computed from them.
#[derive(Debug, Clone)]
pub struct LapSimulator {
    pub label: String,
    pub loadout: Loadout,
    pub course: Course,
    /// Seconds available to fly laps
    pub time_budget: f64,
    pub speed: Expr,
    pub load_factor: Expr,
    /// Angle of attack in the turns (deg)
    pub alpha: Expr,
    pub laps: Expr,
    pub section: SectionCoefficients,
    pub turn_radius: Expr,
    pub straight_cl: Expr,
    pub turn_cl: Expr,
    pub straight_drag: Expr,
    pub turn_drag: Expr,
    pub lap_distance: Expr,
    /// Battery energy drawn per lap (J)
    pub lap_energy: Expr,
    pub lap_time: Expr,
    pub total_energy: Expr,
    pub total_time: Expr,
    available_energy: Expr,
}

impl LapSimulator {
    /// Declares the mission variables on `problem` and attaches the stall
    /// margin and budget constraints of this mission.
    pub fn new(
        problem: &mut Problem,
        aircraft: &Aircraft,
        label: &str,
        loadout: Loadout,
        course: Course,
        time_budget: f64,
    ) -> Self {
        let bounds = &aircraft.config.bounds;
        let speed = problem.variable(bounds.speed.to_variable(&format!("{label}_speed")));
        let load_factor = problem.variable(bounds.load_factor.to_variable(&format!("{label}_load_factor")));
        let alpha = problem.variable(bounds.alpha.to_variable(&format!("{label}_alpha")));
        let laps = problem.variable(bounds.laps.to_variable(&format!("{label}_laps")));

        let section = aircraft.section_at(&speed, &alpha);
        let level = Expr::constant(1.0);

        let turn_radius = turn_radius(&speed, &load_factor, GRAVITATIONAL_ACCELERATION);
        let straight_cl = aircraft.lift_coefficient(&speed, &level, loadout);
        let turn_cl = aircraft.lift_coefficient(&speed, &load_factor, loadout);
        let straight_drag = aircraft.drag(&speed, &level, loadout, &section);
        let turn_drag = aircraft.drag(&speed, &load_factor, loadout, &section);

        let turn_distance = course.turn_distance(&turn_radius);
        let lap_distance = course.lap_distance(&turn_radius);
        let lap_energy = (&straight_drag * course.straight_distance() + &turn_drag * &turn_distance)
            / aircraft.config.propulsion.efficiency;
        let lap_time = &lap_distance / &speed;
        let total_energy = &laps * &lap_energy;
        let total_time = &laps * &lap_time;
        let available_energy = aircraft.propulsion_energy.clone();

        problem.constrain(format!("stall_margin/straight/{label}"), straight_cl.le(&aircraft.cl_max));
        problem.constrain(format!("stall_margin/turn/{label}"), turn_cl.le(&aircraft.cl_max));
        problem.constrain(format!("energy_budget/{label}"), total_energy.le(&available_energy));
        problem.constrain(format!("time_budget/{label}"), total_time.le(time_budget));

        debug!(mission = label, ?loadout, "lap simulator attached");

        Self {
            label: label.to_string(),
            loadout,
            course,
            time_budget,
            speed,
            load_factor,
            alpha,
            laps,
            section,
            turn_radius,
            straight_cl,
            turn_cl,
            straight_drag,
            turn_drag,
            lap_distance,
            lap_energy,
            lap_time,
            total_energy,
            total_time,
            available_energy,
        }
    }

    /// Laps the stored energy would last, ignoring the time budget.
    pub fn energy_limited_laps(&self) -> Expr {
        &self.available_energy / &self.lap_energy
    }

    /// Laps that fit in the time budget, ignoring energy.
    pub fn time_limited_laps(&self) -> Expr {
        self.time_budget / &self.lap_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::ModelConfig;
    use crate::constants::MISSION_2_TIME;
    use approx::assert_relative_eq;

    fn setup() -> (Problem, Aircraft, LapSimulator) {
        let mut problem = Problem::new();
        let aircraft = Aircraft::new(&mut problem, &ModelConfig::manta_ray()).unwrap();
        let lap = LapSimulator::new(
            &mut problem,
            &aircraft,
            "m2",
            Loadout::Payload,
            Course::default(),
            MISSION_2_TIME,
        );
        (problem, aircraft, lap)
    }

    #[test]
    fn test_attaches_budget_constraints() {
        let (problem, _, _) = setup();
        for name in [
            "stall_margin/straight/m2",
            "stall_margin/turn/m2",
            "energy_budget/m2",
            "time_budget/m2",
        ] {
            assert!(problem.has_constraint(name), "missing {name}");
        }
    }

    #[test]
    fn test_load_factor_bound_keeps_turns_finite() {
        let (problem, _, lap) = setup();
        let (lower, upper) = problem.bounds(&lap.load_factor).unwrap();
        assert_eq!(lower, Some(1.5));
        assert_eq!(upper, Some(8.0));
        let radius = problem.initial_value(&lap.turn_radius);
        assert!(radius.is_finite() && radius > 0.0);
    }

    #[test]
    fn test_lap_time_and_energy() {
        let (problem, aircraft, lap) = setup();
        let v = problem.initial_value(&lap.speed);
        let r = problem.initial_value(&lap.turn_radius);
        let distance = lap.course.straight_distance() + 2.0 * std::f64::consts::PI * r;
        assert_relative_eq!(problem.initial_value(&lap.lap_time), distance / v, epsilon = 1e-9);

        let straight = problem.initial_value(&lap.straight_drag);
        let turn = problem.initial_value(&lap.turn_drag);
        assert!(turn > straight);
        let expected = (straight * lap.course.straight_distance() + turn * (distance - lap.course.straight_distance()))
            / aircraft.config.propulsion.efficiency;
        assert_relative_eq!(problem.initial_value(&lap.lap_energy), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_energy_limited_laps() {
        let (problem, aircraft, lap) = setup();
        let laps = problem.initial_value(&lap.energy_limited_laps());
        let energy = problem.initial_value(&aircraft.propulsion_energy);
        let per_lap = problem.initial_value(&lap.lap_energy);
        assert_relative_eq!(laps * per_lap, energy, epsilon = 1e-6);
        assert_relative_eq!(
            problem.initial_value(&lap.time_limited_laps()) * problem.initial_value(&lap.lap_time),
            MISSION_2_TIME,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_turn_lift_coefficient_scales_with_load_factor() {
        let (problem, _, lap) = setup();
        let n = problem.initial_value(&lap.load_factor);
        assert_relative_eq!(
            problem.initial_value(&lap.turn_cl),
            n * problem.initial_value(&lap.straight_cl),
            epsilon = 1e-9
        );
    }
}
