//! Assembly of the geometric, structural, rule and performance constraints.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aero::{AeroSurrogate, KulfanShape};
use crate::constants::*;
use crate::mission::Study;
use crate::units::{feet_to_meters, inches_to_meters};

/// Name of the first constraint registered; its presence marks a study as
/// already assembled.
const ASSEMBLED_MARKER: &str = "span/min";

const STALL_PREFIX: &str = "stall/";

/// Minimum surrogate confidence when the airfoil shape is optimised.
pub const MIN_SURROGATE_CONFIDENCE: f64 = 0.90;
/// Floor on a learned section's maximum lift coefficient, keeping the stall
/// and takeoff expressions away from a zero or negative denominator.
pub const MIN_SECTION_CL_MAX: f64 = 0.5;
/// Thickness floors of an optimised airfoil, `(x/c, t/c)`.
pub const THICKNESS_FLOORS: [(f64, f64); 2] = [(0.33, 0.128), (0.90, 0.014)];
/// Magnitude the first upper and lower CST weights must exceed.
pub const LEADING_EDGE_WEIGHT: f64 = 0.05;

/// Optional performance constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintOptions {
    /// Cap the stall speed at the model's maximum
    pub stall_speed: bool,
    /// Ground roll within half a straight
    pub takeoff: bool,
}

impl Default for ConstraintOptions {
    fn default() -> Self {
        Self {
            stall_speed: true,
            takeoff: true,
        }
    }
}

/// Registers every constraint on the study's problem.
///
/// Calling it again on the same study is a no-op.
pub fn assemble(study: &mut Study, options: &ConstraintOptions) {
    if study.problem.has_constraint(ASSEMBLED_MARKER) {
        debug!("constraints already assembled, skipping");
        return;
    }
    let before = study.problem.constraints().len();

    geometry(study);
    rules(study);
    fuselage(study);
    performance(study, options);
    structure(study);
    airfoil(study);

    info!(
        added = study.problem.constraints().len() - before,
        stall_speed = options.stall_speed,
        takeoff = options.takeoff,
        "constraints assembled"
    );
}

fn geometry(study: &mut Study) {
    let wing = &study.aircraft.wing;
    let problem = &mut study.problem;
    problem.constrain(ASSEMBLED_MARKER, wing.span.ge(feet_to_meters(MIN_WING_SPAN_FT)));
    problem.constrain("span/max", wing.span.le(feet_to_meters(MAX_WING_SPAN_FT)));
    problem.constrain("aspect_ratio/min", wing.aspect_ratio.ge(MIN_ASPECT_RATIO));
    problem.constrain("aspect_ratio/max", wing.aspect_ratio.le(MAX_ASPECT_RATIO));

    for lap in [&study.payload_lap, &study.banner_lap] {
        problem.constrain(
            format!("load_factor/{}", lap.label),
            (STRUCTURAL_SAFETY_FACTOR * &lap.load_factor).le(LOAD_FACTOR_LIMIT),
        );
    }
}

fn rules(study: &mut Study) {
    let aircraft = &study.aircraft;
    let problem = &mut study.problem;
    problem.constrain(
        "rules/passenger_ratio",
        aircraft.passengers.ge(PASSENGERS_PER_CARGO * &aircraft.cargo),
    );
    problem.constrain("rules/min_passengers", aircraft.passengers.ge(MIN_PASSENGERS));
    problem.constrain("rules/min_cargo", aircraft.cargo.ge(MIN_CARGO));
    problem.constrain(
        "rules/banner_aspect",
        aircraft.banner.length.le(MAX_BANNER_ASPECT_RATIO * &aircraft.banner.width),
    );
    problem.constrain(
        "rules/banner_min_length",
        aircraft.banner.length.ge(inches_to_meters(MIN_BANNER_LENGTH_IN)),
    );
    problem.constrain(
        "rules/battery_energy",
        aircraft.propulsion_energy.le(BATTERY_ENERGY_LIMIT_WH * 3600.0),
    );
}

fn fuselage(study: &mut Study) {
    let aircraft = &study.aircraft;
    let problem = &mut study.problem;
    problem.constrain(
        "fuselage/floor_area",
        aircraft.fuselage.floor_area().ge(&aircraft.layout.required_area),
    );
    problem.constrain("fuselage/height", aircraft.fuselage.height.ge(DUCK_HEIGHT));
    problem.constrain("fuselage/box_length", aircraft.fuselage.box_length.ge(DUCK_LENGTH));
}

fn performance(study: &mut Study, options: &ConstraintOptions) {
    let aircraft = &study.aircraft;
    let takeoff_limit = study.course.takeoff_limit();
    let max_stall = aircraft.config.max_stall_speed;
    let problem = &mut study.problem;

    for lap in [&study.payload_lap, &study.banner_lap] {
        let label = &lap.label;
        let available = aircraft.available_lift(&lap.speed, &lap.section);
        let weight = aircraft.weight(lap.loadout);
        let thrust = aircraft.thrust(&lap.speed);

        problem.constrain(format!("lift/cruise/{label}"), available.ge(&weight));
        problem.constrain(format!("lift/turn/{label}"), available.ge(&lap.load_factor * &weight));
        problem.constrain(format!("thrust/straight/{label}"), thrust.ge(&lap.straight_drag));
        problem.constrain(format!("thrust/turn/{label}"), thrust.ge(&lap.turn_drag));

        if options.takeoff {
            problem.constrain(
                format!("takeoff/{label}"),
                aircraft.takeoff_within(lap.loadout, takeoff_limit),
            );
        }
        if options.stall_speed {
            problem.constrain(
                format!("{STALL_PREFIX}{label}"),
                aircraft.stall_speed_squared(lap.loadout).le(max_stall * max_stall),
            );
        }
    }
}

fn structure(study: &mut Study) {
    let aircraft = &study.aircraft;
    let Some(design) = &aircraft.design_gross_mass else {
        return;
    };
    for lap in [&study.payload_lap, &study.banner_lap] {
        study.problem.constrain(
            format!("structure/design_gross_mass/{}", lap.label),
            design.ge(aircraft.gross_mass(lap.loadout)),
        );
    }
}

fn airfoil(study: &mut Study) {
    let aircraft = &study.aircraft;
    let problem = &mut study.problem;

    if aircraft.section.is_learned() {
        for lap in [&study.payload_lap, &study.banner_lap] {
            problem.constrain(
                format!("airfoil/confidence/{}", lap.label),
                lap.section.confidence.ge(MIN_SURROGATE_CONFIDENCE),
            );
        }
        problem.constrain("airfoil/cl_max", aircraft.cl_max.ge(MIN_SECTION_CL_MAX));
    }

    let Some(shape) = aircraft.section.shape() else {
        return;
    };
    for (station, floor) in THICKNESS_FLOORS {
        problem.constrain(
            format!("airfoil/thickness_floor/{station}"),
            shape.local_thickness(station).ge(floor),
        );
    }
    if let Some(first) = shape.lower.first() {
        problem.constrain("airfoil/lower_leading_weight", first.le(-LEADING_EDGE_WEIGHT));
    }
    if let Some(first) = shape.upper.first() {
        problem.constrain("airfoil/upper_leading_weight", first.ge(LEADING_EDGE_WEIGHT));
    }
    for (i, station) in KulfanShape::thickness_stations().enumerate() {
        problem.constrain(
            format!("airfoil/thickness/{i}"),
            shape.local_thickness(station).ge(0.0),
        );
    }
}
