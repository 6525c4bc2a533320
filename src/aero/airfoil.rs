use serde::{Deserialize, Serialize};

use crate::solver::{Expr, Problem, Variable};

/// Airfoils with tabulated section data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AirfoilId {
    #[default]
    E216,
    Sd7037,
    Naca0012,
}

impl AirfoilId {
    pub fn name(&self) -> &'static str {
        match self {
            AirfoilId::E216 => "e216",
            AirfoilId::Sd7037 => "sd7037",
            AirfoilId::Naca0012 => "naca0012",
        }
    }

    /// Low Reynolds number section data, referenced to Re = 3e5.
    pub fn section_data(&self) -> TabulatedAirfoil {
        match self {
            AirfoilId::E216 => TabulatedAirfoil {
                name: self.name().to_string(),
                lift_slope: 0.105,
                zero_lift_alpha: -5.0,
                cd_min: 0.0095,
                cl_min_drag: 0.6,
                drag_curvature: 0.009,
                cm: -0.12,
                cl_max: 1.4,
                thickness: 0.104,
                reference_reynolds: 3.0e5,
            },
            AirfoilId::Sd7037 => TabulatedAirfoil {
                name: self.name().to_string(),
                lift_slope: 0.105,
                zero_lift_alpha: -3.0,
                cd_min: 0.0095,
                cl_min_drag: 0.5,
                drag_curvature: 0.010,
                cm: -0.08,
                cl_max: 1.2,
                thickness: 0.092,
                reference_reynolds: 3.0e5,
            },
            AirfoilId::Naca0012 => TabulatedAirfoil {
                name: self.name().to_string(),
                lift_slope: 0.100,
                zero_lift_alpha: 0.0,
                cd_min: 0.0085,
                cl_min_drag: 0.0,
                drag_curvature: 0.012,
                cm: 0.0,
                cl_max: 1.0,
                thickness: 0.12,
                reference_reynolds: 3.0e5,
            },
        }
    }
}

/// Section polar reduced to a handful of coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TabulatedAirfoil {
    pub name: String,
    /// Lift curve slope (1/deg)
    pub lift_slope: f64,
    /// Zero lift angle of attack (deg)
    pub zero_lift_alpha: f64,
    /// Minimum drag coefficient at the reference Reynolds number
    pub cd_min: f64,
    /// Lift coefficient at minimum drag
    pub cl_min_drag: f64,
    /// Curvature of the drag bucket
    pub drag_curvature: f64,
    /// Quarter chord pitching moment coefficient
    pub cm: f64,
    pub cl_max: f64,
    /// Maximum thickness to chord ratio
    pub thickness: f64,
    pub reference_reynolds: f64,
}

/// Bounds and starting weights of a Kulfan (CST) parametrised airfoil.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeBounds {
    pub upper_init: Vec<f64>,
    pub lower_init: Vec<f64>,
    pub leading_edge_init: f64,
    pub upper_range: (f64, f64),
    pub lower_range: (f64, f64),
    pub leading_edge_range: (f64, f64),
}

impl Default for ShapeBounds {
    /// Starts from a CST fit close to the E216.
    fn default() -> Self {
        Self {
            upper_init: vec![0.20, 0.25, 0.25, 0.22],
            lower_init: vec![-0.12, -0.02, 0.02, 0.05],
            leading_edge_init: 0.0,
            upper_range: (-0.25, 0.5),
            lower_range: (-0.5, 0.25),
            leading_edge_range: (-1.0, 1.0),
        }
    }
}

/// Either a fixed tabulated airfoil or a shape left to the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AirfoilSelection {
    Fixed(AirfoilId),
    Optimized(ShapeBounds),
}

impl Default for AirfoilSelection {
    fn default() -> Self {
        AirfoilSelection::Fixed(AirfoilId::E216)
    }
}

impl AirfoilSelection {
    pub fn is_optimized(&self) -> bool {
        matches!(self, AirfoilSelection::Optimized(_))
    }
}

/// Class-shape transformation airfoil with zero trailing edge thickness.
///
/// Surfaces are `y(x) = sqrt(x) (1 - x) S(x)`, where `S` is a Bernstein
/// polynomial of the weights, plus a leading edge modification term.
#[derive(Debug, Clone)]
pub struct KulfanShape {
    pub upper: Vec<Expr>,
    pub lower: Vec<Expr>,
    pub leading_edge: Expr,
}

fn binomial(n: usize, k: usize) -> f64 {
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f64 / (i + 1) as f64)
}

fn bernstein(n: usize, k: usize, x: f64) -> f64 {
    binomial(n, k) * x.powi(k as i32) * (1.0 - x).powi((n - k) as i32)
}

impl KulfanShape {
    /// Declares every weight as a bounded decision variable.
    pub fn declare(problem: &mut Problem, bounds: &ShapeBounds) -> Self {
        let upper = bounds
            .upper_init
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                problem.variable(
                    Variable::new(format!("airfoil_upper_{i}"), w)
                        .bounds(bounds.upper_range.0, bounds.upper_range.1),
                )
            })
            .collect();
        let lower = bounds
            .lower_init
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                problem.variable(
                    Variable::new(format!("airfoil_lower_{i}"), w)
                        .bounds(bounds.lower_range.0, bounds.lower_range.1),
                )
            })
            .collect();
        let leading_edge = problem.variable(
            Variable::new("airfoil_leading_edge", bounds.leading_edge_init)
                .bounds(bounds.leading_edge_range.0, bounds.leading_edge_range.1)
                .scale(0.1),
        );
        Self {
            upper,
            lower,
            leading_edge,
        }
    }

    /// Shape with constant weights.
    pub fn fixed(upper: &[f64], lower: &[f64], leading_edge: f64) -> Self {
        Self {
            upper: upper.iter().copied().map(Expr::constant).collect(),
            lower: lower.iter().copied().map(Expr::constant).collect(),
            leading_edge: Expr::constant(leading_edge),
        }
    }

    fn surface(&self, weights: &[Expr], x: f64) -> Expr {
        let n = weights.len().saturating_sub(1);
        let class = x.sqrt() * (1.0 - x);
        let shape = Expr::sum(
            weights
                .iter()
                .enumerate()
                .map(|(k, w)| w * bernstein(n, k, x)),
        );
        let lem = &self.leading_edge * (x.sqrt() * (1.0 - x).powf(n as f64 + 0.5));
        class * shape + lem
    }

    pub fn upper_surface(&self, x: f64) -> Expr {
        self.surface(&self.upper, x)
    }

    pub fn lower_surface(&self, x: f64) -> Expr {
        self.surface(&self.lower, x)
    }

    /// Thickness to chord ratio at station `x` (0 at the leading edge).
    pub fn local_thickness(&self, x: f64) -> Expr {
        self.upper_surface(x) - self.lower_surface(x)
    }

    /// Mean camber line height at station `x`.
    pub fn camber(&self, x: f64) -> Expr {
        (self.upper_surface(x) + self.lower_surface(x)) * 0.5
    }

    /// Stations used when checking the surfaces never cross.
    pub fn thickness_stations() -> impl Iterator<Item = f64> {
        (1..20).map(|i| i as f64 * 0.05)
    }
}
