use dbf_sizing::aircraft::ModelConfig;
use dbf_sizing::optimizer::{Driver, DriverConfig, SingleSolve};
use dbf_sizing::solver::Objective;
use dbf_sizing::{MissionKind, Study};

/// Creates a driver over `config` with the configured constraints attached.
pub fn create_driver(config: &ModelConfig, driver_config: DriverConfig) -> Driver {
    let study = Study::new(config).expect("model config is valid");
    let mut driver = Driver::new(study, driver_config);
    driver.assemble_constraints();
    driver
}

/// Solves one mission alone and returns the outcome.
pub fn solve_mission(driver: &mut Driver, kind: MissionKind) -> SingleSolve {
    let objective = driver.study().objective(kind);
    driver
        .solve_single(&objective)
        .unwrap_or_else(|e| panic!("{kind} solve failed: {e}"))
}

/// Mission score wrapped as a plain objective.
pub fn mission_objective(driver: &Driver, kind: MissionKind) -> Objective {
    let objective = driver.study().objective(kind);
    Objective {
        expr: objective.score,
        sense: objective.sense,
    }
}
