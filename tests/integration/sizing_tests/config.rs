use std::io::Write;

use dbf_sizing::aero::{AirfoilId, AirfoilSelection};
use dbf_sizing::aircraft::{ModelConfig, StructureRule};
use dbf_sizing::ConfigError;
use pretty_assertions::assert_eq;

use crate::common::create_scenario_a_config;

#[test]
fn test_yaml_round_trip_through_file() {
    let config = ModelConfig::foam_wing().with_airfoil(AirfoilSelection::Fixed(AirfoilId::Sd7037));
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(config.to_yaml().unwrap().as_bytes()).unwrap();

    let loaded = ModelConfig::from_file(file.path()).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.structure, StructureRule::GrossMassScaled(0.08));
}

#[test]
fn test_scenario_config_round_trip() {
    let config = create_scenario_a_config();
    let yaml = config.to_yaml().unwrap();
    assert_eq!(ModelConfig::from_yaml(&yaml).unwrap(), config);
}

#[test]
fn test_invalid_file_is_rejected() {
    let mut config = ModelConfig::default();
    config.oswald_efficiency = 1.5;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_yaml::to_string(&config).unwrap().as_bytes()).unwrap();

    let err = ModelConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError(_)), "{err}");
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = ModelConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::FileError(_)));
}

#[test]
fn test_malformed_yaml() {
    let err = ModelConfig::from_yaml("name: [unclosed").unwrap_err();
    assert!(matches!(err, ConfigError::YamlError(_)));
}
