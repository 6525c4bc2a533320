use dbf_sizing::constants::{MIN_CARGO, MIN_PASSENGERS, PASSENGERS_PER_CARGO};
use dbf_sizing::solver::Solution;
use dbf_sizing::Study;

/// Relative slack allowed on constraints at an accepted solution.
pub const BUDGET_TOLERANCE: f64 = 1e-4;

/// Assert that laps flown fit both the energy and the time budget of every
/// mission.
#[track_caller]
pub fn assert_budgets_hold(study: &Study, solution: &Solution) {
    let energy = solution.value(&study.aircraft.propulsion_energy);
    for lap in study.laps() {
        let laps = solution.value(&lap.laps);
        let used = laps * solution.value(&lap.lap_energy);
        let time = laps * solution.value(&lap.lap_time);

        assert!(laps >= 0.0, "{}: negative laps {laps}", lap.label);
        assert!(
            used <= energy * (1.0 + BUDGET_TOLERANCE),
            "{}: {used} J used with {energy} J stored",
            lap.label
        );
        assert!(
            time <= lap.time_budget * (1.0 + BUDGET_TOLERANCE),
            "{}: {time} s flown in a {} s window",
            lap.label,
            lap.time_budget
        );
    }
}

/// Assert the passenger and cargo rules.
#[track_caller]
pub fn assert_rules_hold(study: &Study, solution: &Solution) {
    let passengers = solution.value(&study.aircraft.passengers);
    let cargo = solution.value(&study.aircraft.cargo);
    let slack = 1.0 - BUDGET_TOLERANCE;

    assert!(passengers >= MIN_PASSENGERS * slack, "passengers {passengers}");
    assert!(cargo >= MIN_CARGO * slack, "cargo {cargo}");
    assert!(
        passengers >= PASSENGERS_PER_CARGO * cargo * slack,
        "{passengers} passengers for {cargo} cargo"
    );
}

/// Assert that a sequence rises then falls at most once, allowing `tolerance`
/// of noise between neighbours.
#[track_caller]
pub fn assert_at_most_one_turn(values: &[f64], tolerance: f64) {
    let mut falling = false;
    for pair in values.windows(2) {
        let step = pair[1] - pair[0];
        if step < -tolerance {
            falling = true;
        } else if step > tolerance {
            assert!(!falling, "score rises again after falling: {values:?}");
        }
    }
}
