use approx::assert_relative_eq;
use dbf_sizing::aircraft::{Loadout, ModelConfig};
use dbf_sizing::constants::MIN_ASPECT_RATIO;
use dbf_sizing::optimizer::DriverConfig;
use dbf_sizing::units::feet_to_meters;
use dbf_sizing::{ConstraintOptions, MissionKind};

use crate::common::{
    assert_at_most_one_turn, assert_budgets_hold, assert_rules_hold, create_driver,
    create_lenient_driver_config, create_scenario_a_config, create_strict_driver_config,
    mission_objective, solve_mission, BUDGET_TOLERANCE,
};

#[test]
fn test_scenario_a_delivery_alone() {
    let config = create_scenario_a_config();
    let mut driver = create_driver(&config, create_strict_driver_config());
    let single = solve_mission(&mut driver, MissionKind::Delivery);
    let solution = single.solution.expect("delivery solve converged");
    let study = driver.study();
    let aircraft = &study.aircraft;

    assert_rules_hold(study, &solution);
    assert_budgets_hold(study, &solution);

    let span = solution.value(&aircraft.wing.span);
    assert!(span >= feet_to_meters(3.0) - 1e-9 && span <= feet_to_meters(5.0) + 1e-9, "span {span}");
    let aspect_ratio = solution.value(&aircraft.wing.aspect_ratio);
    assert!(aspect_ratio >= MIN_ASPECT_RATIO * (1.0 - BUDGET_TOLERANCE), "AR {aspect_ratio}");

    // gross mass carries the battery sized on stored energy
    let energy = solution.value(&aircraft.propulsion_energy);
    let battery = solution.value(&aircraft.mass.battery);
    assert_relative_eq!(
        battery,
        energy / config.propulsion.battery_specific_energy,
        max_relative = 1e-12
    );
    let gross = solution.value(&aircraft.gross_mass(Loadout::Payload));
    let without_battery = gross - battery;
    assert!(without_battery > 0.0 && without_battery < gross);
    assert!(single.score > 0.0);
}

#[test]
fn test_scenario_b_passenger_sweep_shape() {
    let mut driver = create_driver(&ModelConfig::default(), create_lenient_driver_config());
    let objective = mission_objective(&driver, MissionKind::Delivery);
    let passengers = driver.study().aircraft.passengers.clone();
    let grid = [3.0, 6.0, 9.0, 12.0, 15.0];

    let result = driver.sweep(&passengers, &grid, &objective, &[]).unwrap();
    assert_eq!(result.points.len(), grid.len());

    let scores: Vec<f64> = result.solved().map(|(_, score)| score).collect();
    assert!(scores.len() >= 3, "only {} of {} points solved", scores.len(), grid.len());
    let scale = scores.iter().fold(1.0_f64, |m, s| m.max(s.abs()));
    assert_at_most_one_turn(&scores, 1e-3 * scale);
}

/// Solves delivery with or without the stall limit and reports the span,
/// the score and the smallest stall margin (m²/s²).
fn delivery_with_stall(stall_speed: bool) -> (f64, f64, f64) {
    let config = DriverConfig {
        constraints: ConstraintOptions {
            stall_speed,
            takeoff: true,
        },
        ..create_strict_driver_config()
    };
    let model = ModelConfig::default();
    let mut driver = create_driver(&model, config);
    let single = solve_mission(&mut driver, MissionKind::Delivery);
    let solution = single.solution.expect("delivery solve converged");

    let aircraft = &driver.study().aircraft;
    let limit = model.max_stall_speed * model.max_stall_speed;
    let margin = [Loadout::Payload, Loadout::Banner]
        .iter()
        .map(|&l| limit - solution.value(&aircraft.stall_speed_squared(l)))
        .fold(f64::INFINITY, f64::min);
    (solution.value(&aircraft.wing.span), single.score, margin)
}

#[test]
fn test_scenario_c_slack_stall_limit_does_not_move_span() {
    let (span, score, margin) = delivery_with_stall(true);
    let (free_span, free_score, _) = delivery_with_stall(false);

    if margin > 1.0 {
        assert_relative_eq!(free_span, span, max_relative = 1e-2);
        assert_relative_eq!(free_score, score, max_relative = 1e-3);
    } else {
        // active limit: relaxing it can only help
        assert!(free_score >= score * (1.0 - 1e-3), "{free_score} < {score}");
    }
}
