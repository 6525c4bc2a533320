use std::f64::consts::PI;

use crate::constants::{
    BATTERY_FOOTPRINT, DUCK_LENGTH, DUCK_WIDTH, PAYLOAD_PACKING_MARGIN, PUCK_DIAMETER,
    PUCK_PACKING_COEFFICIENT,
};
use crate::solver::Expr;

use super::config::TailSizing;

/// Rectangular wing planform.
#[derive(Debug, Clone)]
pub struct WingGeometry {
    pub span: Expr,
    pub chord: Expr,
    pub area: Expr,
    pub aspect_ratio: Expr,
}

impl WingGeometry {
    pub fn new(span: Expr, chord: Expr) -> Self {
        let area = &span * &chord;
        let aspect_ratio = &span / &chord;
        Self {
            span,
            chord,
            area,
            aspect_ratio,
        }
    }
}

/// Box fuselage.
#[derive(Debug, Clone)]
pub struct FuselageGeometry {
    pub length: Expr,
    pub width: Expr,
    pub height: Expr,
    /// Length left for payload once nose and tail taper are removed
    pub box_length: Expr,
    pub frontal_area: Expr,
    /// Diameter of the circle with the frontal area
    pub effective_diameter: Expr,
    pub fineness_ratio: Expr,
    pub wetted_area: Expr,
}

impl FuselageGeometry {
    pub fn new(length: Expr, width: Expr, height: Expr) -> Self {
        let box_length = &length - 2.5 * &width;
        let frontal_area = &height * &width;
        let effective_diameter = (&frontal_area / PI).sqrt() * 2.0;
        let fineness_ratio = &length / &effective_diameter;
        let wetted_area = 2.0 * (&height * &width) + 2.0 * (&height * &length) + 2.0 * (&width * &length);
        Self {
            length,
            width,
            height,
            box_length,
            frontal_area,
            effective_diameter,
            fineness_ratio,
            wetted_area,
        }
    }

    /// Floor area available for payload and battery.
    pub fn floor_area(&self) -> Expr {
        &self.box_length * &self.width
    }
}

#[derive(Debug, Clone)]
pub struct TailGeometry {
    pub horizontal_area: Expr,
    pub vertical_area: Expr,
}

impl TailGeometry {
    /// `S_h = V_h S c / l`, `S_v = V_v S b / l`
    pub fn from_volume_coefficients(wing: &WingGeometry, sizing: &TailSizing) -> Self {
        Self {
            horizontal_area: sizing.horizontal_volume * &wing.area * &wing.chord / sizing.arm,
            vertical_area: sizing.vertical_volume * &wing.area * &wing.span / sizing.arm,
        }
    }

    pub fn planform_area(&self) -> Expr {
        &self.horizontal_area + &self.vertical_area
    }
}

/// Floor space required by the passengers, cargo and battery.
#[derive(Debug, Clone)]
pub struct PayloadLayout {
    pub passenger_area: Expr,
    pub cargo_area: Expr,
    pub required_area: Expr,
}

impl PayloadLayout {
    pub fn new(passengers: &Expr, cargo: &Expr) -> Self {
        let passenger_area = passengers * (DUCK_LENGTH * DUCK_WIDTH);
        let puck_footprint = PI * (PUCK_DIAMETER / 2.0).powi(2) / PUCK_PACKING_COEFFICIENT;
        let cargo_area = cargo * puck_footprint;
        let required_area =
            PAYLOAD_PACKING_MARGIN * (BATTERY_FOOTPRINT + &passenger_area + &cargo_area);
        Self {
            passenger_area,
            cargo_area,
            required_area,
        }
    }
}

/// Towed banner, a flat rectangle.
#[derive(Debug, Clone)]
pub struct BannerGeometry {
    pub length: Expr,
    pub width: Expr,
    pub area: Expr,
    pub aspect_ratio: Expr,
}

impl BannerGeometry {
    pub fn new(length: Expr, width: Expr) -> Self {
        let area = &length * &width;
        let aspect_ratio = &length / &width;
        Self {
            length,
            width,
            area,
            aspect_ratio,
        }
    }
}
