//! Mission score functions.
//!
//! All scores are expressions on the same variable graph so any of them can
//! be handed to the solver as an objective.

use serde::{Deserialize, Serialize};

use crate::aircraft::Aircraft;
use crate::constants::*;
use crate::solver::{Expr, Sense};

use super::lap::LapSimulator;

/// Missions that take part in the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionKind {
    /// Timed ground handling, lower is better
    Ground,
    /// Mission 2, passenger and cargo revenue
    Delivery,
    /// Mission 3, banner tow
    BannerTow,
}

impl MissionKind {
    pub const ALL: [MissionKind; 3] = [MissionKind::Ground, MissionKind::Delivery, MissionKind::BannerTow];

    pub fn label(&self) -> &'static str {
        match self {
            MissionKind::Ground => "GM",
            MissionKind::Delivery => "M2",
            MissionKind::BannerTow => "M3",
        }
    }

    pub fn sense(&self) -> Sense {
        match self {
            MissionKind::Ground => Sense::Minimize,
            MissionKind::Delivery | MissionKind::BannerTow => Sense::Maximize,
        }
    }
}

impl std::fmt::Display for MissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A mission score ready to be used as an objective.
#[derive(Debug, Clone)]
pub struct MissionObjective {
    pub kind: MissionKind,
    pub score: Expr,
    pub sense: Sense,
}

/// Ground mission time, `1.5 (cargo + passengers) + 15`.
pub fn ground_mission(aircraft: &Aircraft) -> Expr {
    GROUND_MISSION_PER_ITEM * (&aircraft.cargo + &aircraft.passengers) + GROUND_MISSION_BASE
}

/// Flat participation score for the first flight mission.
pub fn mission_1() -> f64 {
    MISSION_1_POINTS
}

/// Stored energy relative to the 100 Wh reference.
pub fn efficiency_factor(aircraft: &Aircraft) -> Expr {
    &aircraft.propulsion_energy / EFFICIENCY_REFERENCE_ENERGY
}

/// Net income of the delivery mission.
pub fn mission_2(aircraft: &Aircraft, lap: &LapSimulator) -> Expr {
    let passengers = &aircraft.passengers;
    let cargo = &aircraft.cargo;
    let laps = &lap.laps;

    let income = passengers * (PASSENGER_INCOME_FIXED + PASSENGER_INCOME_LAP * laps)
        + cargo * (CARGO_INCOME_FIXED + CARGO_INCOME_LAP * laps);
    let cost = laps
        * (BASE_OPERATING_COST + PER_PASSENGER_COST * passengers + PER_CARGO_COST * cargo)
        * efficiency_factor(aircraft);
    income - cost
}

/// Rated aircraft cost, grows with span.
pub fn rated_aircraft_cost(aircraft: &Aircraft) -> Expr {
    RAC_BASE + RAC_PER_SPAN * &aircraft.wing.span
}

/// Banner length times laps over rated aircraft cost.
pub fn mission_3(aircraft: &Aircraft, lap: &LapSimulator) -> Expr {
    &aircraft.banner.length * &lap.laps / rated_aircraft_cost(aircraft)
}

/// Contribution of one mission to the composite score given its best
/// achievable value: `1 + score / best` when maximising, `1 + best / score`
/// when minimising.
pub fn normalized_term(score: &Expr, best: f64, sense: Sense) -> Expr {
    match sense {
        Sense::Maximize => 1.0 + score / best,
        Sense::Minimize => 1.0 + best / score,
    }
}
