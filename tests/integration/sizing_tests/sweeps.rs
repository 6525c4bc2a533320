use approx::assert_relative_eq;
use dbf_sizing::aircraft::ModelConfig;
use dbf_sizing::optimizer::{surface_table, sweep_table, DriverState, Monitor};
use dbf_sizing::solver::Sense;
use dbf_sizing::MissionKind;

use crate::common::{create_driver, create_lenient_driver_config, mission_objective};

#[test]
fn test_failed_points_are_recorded_as_gaps() {
    let mut driver = create_driver(&ModelConfig::default(), create_lenient_driver_config());
    let span = driver.study().aircraft.wing.span.clone();
    driver.study_mut().problem.constrain("span/unreachable", span.ge(10.0));

    let objective = mission_objective(&driver, MissionKind::Ground);
    let passengers = driver.study().aircraft.passengers.clone();
    let result = driver
        .sweep(&passengers, &[3.0, 4.0, 5.0], &objective, &[Monitor::new("span", &span)])
        .unwrap();

    assert_eq!(result.points.len(), 3);
    assert_eq!(result.failures(), 3);
    assert!(result.points.iter().all(|p| p.monitors.is_none()));
    assert_eq!(driver.state(), DriverState::SweepSolved);

    let table = sweep_table(&result);
    // header, rule and one line per point
    assert_eq!(table.lines().count(), 5);
}

#[test]
fn test_passenger_cargo_surface() {
    let mut driver = create_driver(&ModelConfig::default(), create_lenient_driver_config());
    let objective = mission_objective(&driver, MissionKind::Ground);
    let passengers = driver.study().aircraft.passengers.clone();
    let cargo = driver.study().aircraft.cargo.clone();

    let surface = driver
        .sweep_2d(&passengers, &[3.0, 6.0], &cargo, &[1.0, 2.0], &objective)
        .unwrap();

    assert_eq!(surface.scores.shape(), (2, 2));
    assert_eq!(surface.failures(), 0);
    let (rows, columns, best) = surface.best(Sense::Minimize).unwrap();
    assert_eq!((rows, columns), (3.0, 1.0));
    assert_relative_eq!(best, 21.0, epsilon = 0.1);
    // 6 passengers and 2 cargo satisfy every rule, so the pins hold
    assert_relative_eq!(surface.scores[(1, 1)].unwrap(), 27.0, epsilon = 0.1);

    let table = surface_table(&surface);
    assert_eq!(table.lines().count(), 3);
    assert!(table.contains("passengers\\cargo"));
}
