use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

use crate::constants::COURSE_STRAIGHT_LENGTH_FT;
use crate::solver::Expr;
use crate::units::feet_to_meters;

/// Closed circuit of straight legs joined by quarter circle turns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Length of one straight leg (m)
    pub straight_length: f64,
    pub straights: u32,
    pub quarter_turns: u32,
}

impl Default for Course {
    /// Two 1000 ft straights and four quarter turns.
    fn default() -> Self {
        Self {
            straight_length: feet_to_meters(COURSE_STRAIGHT_LENGTH_FT),
            straights: 2,
            quarter_turns: 4,
        }
    }
}

impl Course {
    pub fn straight_distance(&self) -> f64 {
        self.straights as f64 * self.straight_length
    }

    /// Arc length flown in turns of radius `radius`.
    pub fn turn_distance(&self, radius: &Expr) -> Expr {
        self.quarter_turns as f64 * FRAC_PI_2 * radius
    }

    pub fn lap_distance(&self, radius: &Expr) -> Expr {
        self.straight_distance() + self.turn_distance(radius)
    }

    /// Longest allowed ground roll, half a straight.
    pub fn takeoff_limit(&self) -> f64 {
        self.straight_length / 2.0
    }
}
