use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::aero::AirfoilSelection;
use crate::constants::*;
use crate::error::ConfigError;
use crate::solver::Variable;

/// Initial guess and bounds of one design variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub init: f64,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl VariableSpec {
    pub const fn new(init: f64, lower: Option<f64>, upper: Option<f64>) -> Self {
        Self { init, lower, upper }
    }

    pub fn to_variable(&self, name: &str) -> Variable {
        let mut v = Variable::new(name, self.init);
        v.lower = self.lower;
        v.upper = self.upper;
        v
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        if !self.init.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "{name}: initial guess must be finite"
            )));
        }
        if let (Some(lo), Some(hi)) = (self.lower, self.upper) {
            if lo >= hi {
                return Err(ConfigError::ValidationError(format!(
                    "{name}: lower bound {lo} is not below upper bound {hi}"
                )));
            }
        }
        if self.lower.is_some_and(|lo| self.init < lo) || self.upper.is_some_and(|hi| self.init > hi) {
            return Err(ConfigError::ValidationError(format!(
                "{name}: initial guess {} outside its bounds",
                self.init
            )));
        }
        Ok(())
    }

    fn require_positive_lower(&self, name: &str) -> Result<(), ConfigError> {
        match self.lower {
            Some(lo) if lo > 0.0 => Ok(()),
            _ => Err(ConfigError::ValidationError(format!(
                "{name}: needs a strictly positive lower bound"
            ))),
        }
    }
}

/// Bounds of every design variable the model declares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableBounds {
    pub span: VariableSpec,
    pub chord: VariableSpec,
    pub fuselage_length: VariableSpec,
    pub fuselage_width: VariableSpec,
    pub fuselage_height: VariableSpec,
    pub passengers: VariableSpec,
    pub cargo: VariableSpec,
    pub banner_length: VariableSpec,
    pub banner_width: VariableSpec,
    /// Stored propulsion energy (J)
    pub propulsion_energy: VariableSpec,
    pub speed: VariableSpec,
    pub load_factor: VariableSpec,
    /// Angle of attack (deg)
    pub alpha: VariableSpec,
    pub laps: VariableSpec,
}

impl Default for VariableBounds {
    fn default() -> Self {
        Self {
            span: VariableSpec::new(1.2, Some(0.3), Some(3.0)),
            chord: VariableSpec::new(0.25, Some(0.05), Some(0.8)),
            fuselage_length: VariableSpec::new(1.0, Some(0.4), Some(2.0)),
            fuselage_width: VariableSpec::new(0.12, Some(0.05), Some(0.4)),
            fuselage_height: VariableSpec::new(0.1, Some(0.05), Some(0.4)),
            passengers: VariableSpec::new(6.0, Some(MIN_PASSENGERS), Some(60.0)),
            cargo: VariableSpec::new(2.0, Some(MIN_CARGO), Some(20.0)),
            banner_length: VariableSpec::new(1.0, Some(0.1), Some(10.0)),
            banner_width: VariableSpec::new(0.2, Some(0.02), Some(2.0)),
            propulsion_energy: VariableSpec::new(
                0.5 * BATTERY_ENERGY_LIMIT_WH * 3600.0,
                Some(1.0e3),
                Some(2.0 * BATTERY_ENERGY_LIMIT_WH * 3600.0),
            ),
            speed: VariableSpec::new(22.0, Some(5.0), Some(PROPELLER_PITCH_SPEED)),
            load_factor: VariableSpec::new(2.5, Some(MIN_TURN_LOAD_FACTOR), Some(LOAD_FACTOR_LIMIT)),
            alpha: VariableSpec::new(6.0, Some(-5.0), Some(15.0)),
            laps: VariableSpec::new(5.0, Some(0.0), Some(100.0)),
        }
    }
}

impl VariableBounds {
    fn validate(&self) -> Result<(), ConfigError> {
        let specs = [
            ("span", &self.span),
            ("chord", &self.chord),
            ("fuselage_length", &self.fuselage_length),
            ("fuselage_width", &self.fuselage_width),
            ("fuselage_height", &self.fuselage_height),
            ("passengers", &self.passengers),
            ("cargo", &self.cargo),
            ("banner_length", &self.banner_length),
            ("banner_width", &self.banner_width),
            ("propulsion_energy", &self.propulsion_energy),
            ("speed", &self.speed),
            ("load_factor", &self.load_factor),
            ("alpha", &self.alpha),
            ("laps", &self.laps),
        ];
        for (name, spec) in specs {
            spec.validate(name)?;
        }
        // quantities that end up in a denominator
        for (name, spec) in [
            ("span", &self.span),
            ("chord", &self.chord),
            ("fuselage_length", &self.fuselage_length),
            ("fuselage_width", &self.fuselage_width),
            ("fuselage_height", &self.fuselage_height),
            ("propulsion_energy", &self.propulsion_energy),
            ("speed", &self.speed),
            ("cargo", &self.cargo),
        ] {
            spec.require_positive_lower(name)?;
        }
        // payload counts may not be explored below the competition minimums
        for (name, spec, minimum) in [
            ("passengers", &self.passengers, MIN_PASSENGERS),
            ("cargo", &self.cargo, MIN_CARGO),
        ] {
            if spec.lower.map_or(true, |lo| lo < minimum) {
                return Err(ConfigError::ValidationError(format!(
                    "{name}: lower bound must be at least {minimum}"
                )));
            }
        }
        if self.load_factor.lower.map_or(true, |n| n <= 1.0) {
            return Err(ConfigError::ValidationError(
                "load_factor: lower bound must exceed 1 g so turn radius stays finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Composite skin layup, used for fuselage and wing skins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkinLayup {
    pub carbon_plies: f64,
    pub nomex_plies: f64,
    pub carbon_areal_density: f64,
    pub nomex_areal_density: f64,
    pub resin_modifier: f64,
}

impl Default for SkinLayup {
    fn default() -> Self {
        Self {
            carbon_plies: 2.0,
            nomex_plies: 1.0,
            carbon_areal_density: CARBON_FIBER_AREAL_DENSITY,
            nomex_areal_density: NOMEX_AREAL_DENSITY,
            resin_modifier: RESIN_MODIFIER,
        }
    }
}

impl SkinLayup {
    /// Mass per unit wetted area (kg/m^2).
    pub fn areal_density(&self) -> f64 {
        (self.carbon_plies * self.carbon_areal_density + self.nomex_plies * self.nomex_areal_density)
            * self.resin_modifier
    }
}

/// How the fuselage parasite drag is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FuselageDragModel {
    /// Turbulent skin friction correlation with a fineness ratio form factor.
    SkinFriction,
    /// Fixed coefficient referenced to the wing area.
    Constant(f64),
}

/// Rule used to size the internal structure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StructureRule {
    /// Structure is this fraction of the payload mass.
    PayloadFraction(f64),
    /// Wing internal structure is this fraction of the design gross mass.
    GrossMassScaled(f64),
}

/// Horizontal and vertical tail sized from volume coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailSizing {
    pub horizontal_volume: f64,
    pub vertical_volume: f64,
    /// Distance from wing to tail aerodynamic centres (m)
    pub arm: f64,
    /// Drag coefficient referenced to the tail planform
    pub drag_coefficient: f64,
}

impl Default for TailSizing {
    fn default() -> Self {
        Self {
            horizontal_volume: 0.4,
            vertical_volume: 0.04,
            arm: 0.8,
            drag_coefficient: 0.02,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropulsionConfig {
    /// Fraction of battery energy turned into thrust power
    pub efficiency: f64,
    /// J/kg
    pub battery_specific_energy: f64,
}

impl Default for PropulsionConfig {
    fn default() -> Self {
        Self {
            efficiency: PROPULSION_EFFICIENCY,
            battery_specific_energy: BATTERY_SPECIFIC_ENERGY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedMasses {
    pub motor: f64,
    pub wiring: f64,
    pub landing_gear: f64,
}

impl Default for FixedMasses {
    fn default() -> Self {
        Self {
            motor: MOTOR_MASS,
            wiring: WIRING_MASS,
            landing_gear: LANDING_GEAR_MASS,
        }
    }
}

impl FixedMasses {
    pub fn total(&self) -> f64 {
        self.motor + self.wiring + self.landing_gear
    }
}

/// Named coefficients of one aircraft variant.
///
/// Every variant of the sizing model is an instance of this structure; the
/// model code itself has a single path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub airfoil: AirfoilSelection,
    pub skin: SkinLayup,
    pub fuselage_drag: FuselageDragModel,
    pub structure: StructureRule,
    pub tail: TailSizing,
    pub propulsion: PropulsionConfig,
    pub fixed_masses: FixedMasses,
    pub oswald_efficiency: f64,
    /// Interference and miscellaneous drag referenced to the wing area
    pub parasite_drag: f64,
    /// Banner drag coefficient referenced to the banner planform
    pub banner_drag: f64,
    pub banner_areal_density: f64,
    /// Wing lift coefficient held during the ground roll
    pub ground_roll_lift_coefficient: f64,
    pub rolling_friction: f64,
    pub max_stall_speed: f64,
    pub bounds: VariableBounds,
}

impl Default for ModelConfig {
    /// The `manta_ray` carbon and Nomex layup is the default.
    fn default() -> Self {
        Self::manta_ray()
    }
}

impl ModelConfig {
    /// Carbon/Nomex sandwich airframe with structure scaled on payload.
    pub fn manta_ray() -> Self {
        Self {
            name: "MantaRay".to_string(),
            airfoil: AirfoilSelection::default(),
            skin: SkinLayup::default(),
            fuselage_drag: FuselageDragModel::SkinFriction,
            structure: StructureRule::PayloadFraction(0.1),
            tail: TailSizing::default(),
            propulsion: PropulsionConfig::default(),
            fixed_masses: FixedMasses::default(),
            oswald_efficiency: 0.7,
            parasite_drag: 0.005,
            banner_drag: 0.04,
            banner_areal_density: BANNER_AREAL_DENSITY,
            ground_roll_lift_coefficient: 0.5,
            rolling_friction: ROLLING_FRICTION,
            max_stall_speed: MAX_STALL_SPEED,
            bounds: VariableBounds::default(),
        }
    }

    /// Foam core wing with a single carbon ply, where the internal structure
    /// follows the gross mass.
    pub fn foam_wing() -> Self {
        Self {
            name: "FoamWing".to_string(),
            skin: SkinLayup {
                carbon_plies: 1.0,
                ..SkinLayup::default()
            },
            fuselage_drag: FuselageDragModel::Constant(0.012),
            structure: StructureRule::GrossMassScaled(0.08),
            oswald_efficiency: 0.8,
            banner_drag: 0.075,
            ..Self::manta_ray()
        }
    }

    pub fn with_airfoil(mut self, airfoil: AirfoilSelection) -> Self {
        self.airfoil = airfoil;
        self
    }

    /// Reads a model from YAML and validates it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: ModelConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let in_unit = |name: &str, value: f64| {
            if value > 0.0 && value <= 1.0 {
                Ok(())
            } else {
                Err(ConfigError::ValidationError(format!(
                    "{name} must lie in (0, 1], got {value}"
                )))
            }
        };
        let positive = |name: &str, value: f64| {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::ValidationError(format!(
                    "{name} must be positive, got {value}"
                )))
            }
        };
        let non_negative = |name: &str, value: f64| {
            if value >= 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(ConfigError::ValidationError(format!(
                    "{name} must be non-negative, got {value}"
                )))
            }
        };

        in_unit("oswald_efficiency", self.oswald_efficiency)?;
        in_unit("propulsion.efficiency", self.propulsion.efficiency)?;
        positive("propulsion.battery_specific_energy", self.propulsion.battery_specific_energy)?;
        positive("skin areal density", self.skin.areal_density())?;
        positive("tail.arm", self.tail.arm)?;
        non_negative("tail.horizontal_volume", self.tail.horizontal_volume)?;
        non_negative("tail.vertical_volume", self.tail.vertical_volume)?;
        non_negative("tail.drag_coefficient", self.tail.drag_coefficient)?;
        non_negative("parasite_drag", self.parasite_drag)?;
        non_negative("banner_drag", self.banner_drag)?;
        non_negative("banner_areal_density", self.banner_areal_density)?;
        non_negative("ground_roll_lift_coefficient", self.ground_roll_lift_coefficient)?;
        non_negative("rolling_friction", self.rolling_friction)?;
        non_negative("fixed mass", self.fixed_masses.total())?;
        positive("max_stall_speed", self.max_stall_speed)?;

        match self.fuselage_drag {
            FuselageDragModel::Constant(cd) => non_negative("fuselage_drag", cd)?,
            FuselageDragModel::SkinFriction => {}
        }
        match self.structure {
            StructureRule::PayloadFraction(f) => non_negative("structure payload fraction", f)?,
            StructureRule::GrossMassScaled(k) => {
                if !(0.0..1.0).contains(&k) {
                    return Err(ConfigError::ValidationError(format!(
                        "gross mass structure factor must lie in [0, 1), got {k}"
                    )));
                }
            }
        }
        self.bounds.validate()
    }
}
