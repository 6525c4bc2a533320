use dbf_sizing::aircraft::{ModelConfig, VariableSpec};
use dbf_sizing::optimizer::{DriverConfig, FailurePolicy};
use dbf_sizing::units::feet_to_meters;

/// Default model with the span box pulled in to the competition limits, so
/// the bounds alone already keep it between 3 and 5 ft.
pub fn create_scenario_a_config() -> ModelConfig {
    let mut config = ModelConfig::default();
    config.name = "ScenarioA".to_string();
    config.bounds.span = VariableSpec::new(1.2, Some(feet_to_meters(3.0)), Some(feet_to_meters(5.0)));
    config
}

/// Driver settings for tests: failures become errors so nothing is silently
/// replaced by a sentinel.
pub fn create_strict_driver_config() -> DriverConfig {
    DriverConfig {
        failure_policy: FailurePolicy::Abort,
        ..DriverConfig::default()
    }
}

/// Driver settings that record failed solves as gaps.
pub fn create_lenient_driver_config() -> DriverConfig {
    DriverConfig::default()
}
