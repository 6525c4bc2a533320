use approx::assert_relative_eq;
use dbf_sizing::aircraft::{Loadout, ModelConfig};
use dbf_sizing::constants::MISSION_1_POINTS;
use dbf_sizing::optimizer::{solution_table, DriverState};
use dbf_sizing::{assemble, ConstraintOptions, MissionKind};

use crate::common::{
    assert_budgets_hold, assert_rules_hold, create_driver, create_strict_driver_config, solve_mission,
    BUDGET_TOLERANCE,
};

#[test]
fn test_multi_mission_composite() {
    let mut driver = create_driver(&ModelConfig::default(), create_strict_driver_config());
    let result = driver
        .solve_multi_mission(|study| assemble(study, &ConstraintOptions::default()), &MissionKind::ALL)
        .unwrap();

    assert_eq!(driver.state(), DriverState::CompositeSolved);
    let kinds: Vec<MissionKind> = result.missions.iter().map(|m| m.kind).collect();
    assert_eq!(kinds, MissionKind::ALL.to_vec());

    let ground = &result.missions[0];
    assert_relative_eq!(ground.normalizer, 21.0, epsilon = 1e-2);
    for mission in &result.missions {
        assert!(mission.normalizer.is_finite() && mission.normalizer > 0.0, "{mission:?}");
        assert!(mission.score.is_finite() && mission.score > 0.0, "{mission:?}");
    }
    // every normalised term is above one when all scores are positive
    assert!(result.composite_score > MISSION_1_POINTS + 3.0, "{}", result.composite_score);

    let solution = result.composite.solution.as_ref().expect("composite converged");
    assert_budgets_hold(driver.study(), solution);
    assert_rules_hold(driver.study(), solution);

    let composite = driver.composite_objective().unwrap();
    assert_relative_eq!(solution.value(&composite.expr), result.composite_score, max_relative = 1e-9);

    let table = solution_table(driver.study(), solution);
    for section in ["Geometry", "Mission m2", "Mission m3", "Scores"] {
        assert!(table.contains(section), "missing {section}");
    }
}

#[test]
fn test_warm_start_carries_between_solves() {
    let mut driver = create_driver(&ModelConfig::default(), create_strict_driver_config());
    let first = solve_mission(&mut driver, MissionKind::BannerTow);
    assert!(first.is_converged());
    let seeded = driver.last_solution().unwrap().clone();
    assert!(driver.study().problem.has_warm_start());
    assert_eq!(driver.study().problem.initial_point(), seeded.values().to_vec());

    let second = solve_mission(&mut driver, MissionKind::BannerTow);
    assert_relative_eq!(second.score, first.score, max_relative = 1e-3);
}

#[test]
fn test_gross_mass_scaled_structure_covers_every_mission() {
    let mut driver = create_driver(&ModelConfig::foam_wing(), create_strict_driver_config());
    let single = solve_mission(&mut driver, MissionKind::BannerTow);
    let solution = single.solution.expect("banner solve converged");
    let aircraft = &driver.study().aircraft;
    let design = solution.value(aircraft.design_gross_mass.as_ref().unwrap());

    for loadout in [Loadout::Payload, Loadout::Banner] {
        let gross = solution.value(&aircraft.gross_mass(loadout));
        assert!(design >= gross * (1.0 - BUDGET_TOLERANCE), "{loadout:?}: {design} < {gross}");
    }
    assert_budgets_hold(driver.study(), &solution);
}
