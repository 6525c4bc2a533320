use std::f64::consts::PI;

use crate::solver::{Expr, Problem};

use super::airfoil::{AirfoilSelection, KulfanShape, TabulatedAirfoil};

/// Section coefficients at one operating point.
#[derive(Debug, Clone)]
pub struct SectionCoefficients {
    pub cl: Expr,
    pub cd: Expr,
    pub cm: Expr,
    /// In [0, 1]; how far the operating point is inside the model's envelope.
    pub confidence: Expr,
}

/// Maps an airfoil and an operating point to section coefficients.
///
/// Implementors must stay smooth in every argument since the results feed a
/// gradient based solve.
pub trait AeroSurrogate {
    fn name(&self) -> &str;

    fn evaluate(&self, alpha_deg: &Expr, reynolds: &Expr, mach: f64) -> SectionCoefficients;

    /// Maximum section lift coefficient.
    fn cl_max(&self) -> Expr;

    /// Whether the confidence output carries information worth constraining.
    fn is_learned(&self) -> bool {
        false
    }
}

fn prandtl_glauert(mach: f64) -> f64 {
    1.0 / (1.0 - mach * mach).max(0.1).sqrt()
}

impl AeroSurrogate for TabulatedAirfoil {
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate(&self, alpha_deg: &Expr, reynolds: &Expr, mach: f64) -> SectionCoefficients {
        let cl = self.lift_slope * prandtl_glauert(mach) * (alpha_deg - self.zero_lift_alpha);
        let reynolds_factor = (reynolds / self.reference_reynolds).powf(-0.2);
        let cd = self.cd_min * reynolds_factor + self.drag_curvature * (&cl - self.cl_min_drag).square();
        SectionCoefficients {
            cl,
            cd,
            cm: Expr::constant(self.cm),
            confidence: Expr::constant(1.0),
        }
    }

    fn cl_max(&self) -> Expr {
        Expr::constant(self.cl_max)
    }
}

/// Thin airfoil theory on a CST shape, with a flat plate friction estimate
/// and an envelope based confidence.
#[derive(Debug, Clone)]
pub struct ThinAirfoilSurrogate {
    pub shape: KulfanShape,
}

const TRAINING_ALPHA: f64 = 4.0; // deg
const TRAINING_ALPHA_WIDTH: f64 = 12.0; // deg
const TRAINING_THICKNESS: f64 = 0.12;
const TRAINING_THICKNESS_WIDTH: f64 = 0.10;
const TRAINING_REYNOLDS: f64 = 5.0e5;
const TRAINING_REYNOLDS_WIDTH: f64 = 3.0; // in ln(Re)

impl ThinAirfoilSurrogate {
    pub fn new(shape: KulfanShape) -> Self {
        Self { shape }
    }

    /// Camber sampled near the usual maximum camber station.
    fn max_camber(&self) -> Expr {
        self.shape.camber(0.4)
    }

    fn max_thickness(&self) -> Expr {
        self.shape.local_thickness(0.3)
    }
}

impl AeroSurrogate for ThinAirfoilSurrogate {
    fn name(&self) -> &str {
        "optimized"
    }

    fn evaluate(&self, alpha_deg: &Expr, reynolds: &Expr, mach: f64) -> SectionCoefficients {
        let camber = self.max_camber();
        let thickness = self.max_thickness();
        let alpha = alpha_deg * (PI / 180.0);
        // zero lift angle of a parabolic camber line, in radians
        let zero_lift_alpha = &camber * -2.1;
        let slope = 2.0 * PI * prandtl_glauert(mach) * (1.0 + 0.77 * &thickness);
        let cl = slope * (alpha - zero_lift_alpha);

        let skin_friction = 0.074 * reynolds.powf(-0.2);
        let form_factor = 1.0 + 2.0 * &thickness + 60.0 * thickness.powi(4);
        let cd = 2.0 * skin_friction * form_factor + 0.008 * (&cl - 0.5).square();
        let cm = &camber * -2.5;

        let confidence = (-(((alpha_deg - TRAINING_ALPHA) / TRAINING_ALPHA_WIDTH).square()
            + ((&thickness - TRAINING_THICKNESS) / TRAINING_THICKNESS_WIDTH).square()
            + ((reynolds / TRAINING_REYNOLDS).ln() / TRAINING_REYNOLDS_WIDTH).square()))
        .exp();

        SectionCoefficients {
            cl,
            cd,
            cm,
            confidence,
        }
    }

    fn cl_max(&self) -> Expr {
        0.9 + 8.0 * self.max_camber() + 3.0 * self.max_thickness()
    }

    fn is_learned(&self) -> bool {
        true
    }
}

/// Airfoil model chosen once when the aircraft is built.
#[derive(Debug, Clone)]
pub enum SectionModel {
    Fixed(TabulatedAirfoil),
    Optimized(ThinAirfoilSurrogate),
}

impl SectionModel {
    /// Resolves the selection, declaring shape variables on `problem` when
    /// the shape is optimised.
    pub fn resolve(selection: &AirfoilSelection, problem: &mut Problem) -> Self {
        match selection {
            AirfoilSelection::Fixed(id) => SectionModel::Fixed(id.section_data()),
            AirfoilSelection::Optimized(bounds) => {
                SectionModel::Optimized(ThinAirfoilSurrogate::new(KulfanShape::declare(problem, bounds)))
            }
        }
    }

    pub fn shape(&self) -> Option<&KulfanShape> {
        match self {
            SectionModel::Fixed(_) => None,
            SectionModel::Optimized(s) => Some(&s.shape),
        }
    }

    fn inner(&self) -> &dyn AeroSurrogate {
        match self {
            SectionModel::Fixed(a) => a,
            SectionModel::Optimized(s) => s,
        }
    }
}

impl AeroSurrogate for SectionModel {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn evaluate(&self, alpha_deg: &Expr, reynolds: &Expr, mach: f64) -> SectionCoefficients {
        self.inner().evaluate(alpha_deg, reynolds, mach)
    }

    fn cl_max(&self) -> Expr {
        self.inner().cl_max()
    }

    fn is_learned(&self) -> bool {
        self.inner().is_learned()
    }
}
