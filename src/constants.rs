//! Physical, material and competition-rule constants shared by every model.
//!
//! All values are SI unless the name says otherwise. Competition lengths are
//! kept in the units the rules are written in and converted at the point of use.

use crate::solver::Expr;

// =========== PHYSICAL ===========
pub const GRAVITATIONAL_ACCELERATION: f64 = 9.806_65; // m/s^2
pub const GAS_CONSTANT_AIR: f64 = 287.05; // J/(kg K)
pub const STANDARD_PRESSURE: f64 = 101_325.0; // Pa
pub const STANDARD_TEMPERATURE: f64 = 288.15; // K
pub const AIR_DENSITY: f64 = 1.225; // kg/m^3
pub const DYNAMIC_VISCOSITY: f64 = 1.802e-5; // kg/(m s)
pub const SPEED_OF_SOUND: f64 = 340.294; // m/s

// =========== MATERIALS ===========
pub const CARBON_FIBER_AREAL_DENSITY: f64 = 0.088; // kg/m^2 per ply
pub const NOMEX_AREAL_DENSITY: f64 = 0.058; // kg/m^2 per ply
pub const RESIN_MODIFIER: f64 = 1.12;
pub const BANNER_AREAL_DENSITY: f64 = 0.075; // kg/m^2

// =========== STRUCTURES ===========
pub const LOAD_FACTOR_LIMIT: f64 = 8.0; // g
pub const MIN_TURN_LOAD_FACTOR: f64 = 1.5; // g
pub const STRUCTURAL_SAFETY_FACTOR: f64 = 1.5;
pub const MIN_ASPECT_RATIO: f64 = 4.0;
pub const MAX_ASPECT_RATIO: f64 = 20.0;

// =========== PROPULSION ===========
pub const PROPULSION_EFFICIENCY: f64 = 0.75;
pub const BATTERY_ENERGY_LIMIT_WH: f64 = 100.0; // Wh
pub const BATTERY_SPECIFIC_ENERGY: f64 = 178_000.0; // J/kg
pub const BATTERY_FOOTPRINT: f64 = 0.011; // m^2
pub const STATIC_THRUST: f64 = 30.0; // N
pub const PROPELLER_PITCH_SPEED: f64 = 40.0; // m/s
pub const ROLLING_FRICTION: f64 = 0.04;

// =========== FIXED MASSES ===========
pub const MOTOR_MASS: f64 = 0.450; // kg
pub const WIRING_MASS: f64 = 0.400; // kg
pub const LANDING_GEAR_MASS: f64 = 0.250; // kg

// =========== PAYLOAD ===========
pub const DUCK_WIDTH: f64 = 0.0584; // m
pub const DUCK_HEIGHT: f64 = 0.0635; // m
pub const DUCK_LENGTH: f64 = 0.0635; // m
pub const PUCK_DIAMETER: f64 = 0.0762; // m
pub const PUCK_PACKING_COEFFICIENT: f64 = 0.65;
pub const PASSENGER_MASS: f64 = 0.03; // kg, duck plus restraint
pub const CARGO_MASS: f64 = 0.170; // kg
pub const PAYLOAD_PACKING_MARGIN: f64 = 1.2;

// =========== COURSE AND RULES ===========
pub const COURSE_STRAIGHT_LENGTH_FT: f64 = 1000.0;
pub const MIN_WING_SPAN_FT: f64 = 3.0;
pub const MAX_WING_SPAN_FT: f64 = 5.0;
pub const MIN_PASSENGERS: f64 = 3.0;
pub const MIN_CARGO: f64 = 1.0;
pub const PASSENGERS_PER_CARGO: f64 = 3.0;
pub const MAX_BANNER_ASPECT_RATIO: f64 = 5.0;
pub const MIN_BANNER_LENGTH_IN: f64 = 10.0;
pub const MAX_STALL_SPEED: f64 = 13.0; // m/s

// =========== MISSIONS ===========
pub const MISSION_1_POINTS: f64 = 1.0;
pub const MISSION_2_TIME: f64 = 300.0; // s
pub const MISSION_3_TIME: f64 = 300.0; // s

pub const PASSENGER_INCOME_FIXED: f64 = 6.0; // $/passenger
pub const PASSENGER_INCOME_LAP: f64 = 2.0; // $/passenger/lap
pub const CARGO_INCOME_FIXED: f64 = 10.0; // $/cargo
pub const CARGO_INCOME_LAP: f64 = 8.0; // $/cargo/lap
pub const BASE_OPERATING_COST: f64 = 10.0; // $/lap
pub const PER_PASSENGER_COST: f64 = 0.5; // $/passenger/lap
pub const PER_CARGO_COST: f64 = 2.0; // $/cargo/lap
pub const EFFICIENCY_REFERENCE_ENERGY: f64 = 100.0 * 3600.0; // J

pub const GROUND_MISSION_PER_ITEM: f64 = 1.5; // s per passenger or cargo
pub const GROUND_MISSION_BASE: f64 = 15.0; // s

pub const RAC_BASE: f64 = 0.75;
pub const RAC_PER_SPAN: f64 = 0.05;

/// Propeller thrust available at airspeed `v`, a linear fall-off from the
/// static value to zero at pitch speed.
pub fn dynamic_thrust(v: &Expr) -> Expr {
    STATIC_THRUST * (1.0 - v / PROPELLER_PITCH_SPEED)
}
