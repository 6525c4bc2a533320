use approx::assert_relative_eq;
use dbf_sizing::aircraft::aerodynamics::{dynamic_pressure, lift_coefficient, turn_radius};
use dbf_sizing::aircraft::{Loadout, ModelConfig};
use dbf_sizing::constants::{BATTERY_SPECIFIC_ENERGY, GRAVITATIONAL_ACCELERATION, MIN_TURN_LOAD_FACTOR};
use dbf_sizing::{Expr, MissionKind, Study};

use crate::common::{assert_budgets_hold, create_driver, create_strict_driver_config, solve_mission};

#[test]
fn test_force_balance_round_trip() {
    for (v, s, w, n) in [(12.0, 0.2, 25.0, 1.0), (22.0, 0.3, 31.0, 2.5), (35.0, 0.45, 48.0, 5.0)] {
        let q = dynamic_pressure(&Expr::constant(v));
        let cl = lift_coefficient(&Expr::constant(n), &Expr::constant(w), &q, &Expr::constant(s));
        let lift = &cl * &q * s;
        assert_relative_eq!(lift.value(), n * w, epsilon = 1e-9);
    }
}

#[test]
fn test_load_factor_bound_excludes_level_turns() {
    // n = 1 would put the turn radius at infinity
    let level = turn_radius(&Expr::constant(20.0), &Expr::constant(1.0), GRAVITATIONAL_ACCELERATION);
    assert!(level.value().is_infinite());

    let study = Study::new(&ModelConfig::default()).unwrap();
    for lap in study.laps() {
        let (lower, _) = study.problem.bounds(&lap.load_factor).unwrap();
        assert!(lower.unwrap() >= MIN_TURN_LOAD_FACTOR);
    }

    let mut config = ModelConfig::default();
    config.bounds.load_factor.lower = Some(1.0);
    assert!(Study::new(&config).is_err());
}

#[test]
fn test_budgets_hold_at_accepted_solutions() {
    let mut driver = create_driver(&ModelConfig::default(), create_strict_driver_config());
    for kind in [MissionKind::Delivery, MissionKind::BannerTow] {
        let single = solve_mission(&mut driver, kind);
        let solution = single.solution.expect("converged solve carries a solution");
        assert!(solution.converged);
        assert_budgets_hold(driver.study(), &solution);

        for lap in driver.study().laps() {
            let n = solution.value(&lap.load_factor);
            assert!(n >= MIN_TURN_LOAD_FACTOR - 1e-9, "{} load factor {n}", lap.label);
            assert!(solution.value(&lap.turn_radius).is_finite());
        }
    }
}

#[test]
fn test_banner_drag_strictly_increases_with_length() {
    let study = Study::new(&ModelConfig::default()).unwrap();
    let lap = &study.banner_lap;
    let index = study.aircraft.banner.length.variable_index().unwrap();
    let mut x = study.problem.declared_point();

    let mut previous = lap.straight_drag.eval(&x);
    for _ in 0..20 {
        x[index] += 0.05;
        let drag = lap.straight_drag.eval(&x);
        assert!(drag > previous, "drag {drag} after {previous}");
        previous = drag;
    }
}

#[test]
fn test_payload_lap_ignores_banner() {
    let study = Study::new(&ModelConfig::default()).unwrap();
    let index = study.aircraft.banner.length.variable_index().unwrap();
    let mut x = study.problem.declared_point();
    let before = study.payload_lap.straight_drag.eval(&x);
    x[index] *= 2.0;
    assert_relative_eq!(study.payload_lap.straight_drag.eval(&x), before);
}

#[test]
fn test_battery_mass_follows_energy() {
    let study = Study::new(&ModelConfig::default()).unwrap();
    let index = study.aircraft.propulsion_energy.variable_index().unwrap();
    let mut x = study.problem.declared_point();
    let gross = study.aircraft.gross_mass(Loadout::Payload);

    let base = gross.eval(&x);
    x[index] += BATTERY_SPECIFIC_ENERGY;
    assert_relative_eq!(gross.eval(&x) - base, 1.0, epsilon = 1e-9);
}
