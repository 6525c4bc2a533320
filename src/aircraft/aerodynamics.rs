//! Closed-form aerodynamic relations on symbolic quantities.
//!
//! None of these branch on the value of their arguments, so every result
//! stays differentiable for the solver.

use std::f64::consts::PI;

use crate::constants::{AIR_DENSITY, DYNAMIC_VISCOSITY};
use crate::solver::Expr;

/// `q = ½ ρ V²`
pub fn dynamic_pressure(speed: &Expr) -> Expr {
    0.5 * AIR_DENSITY * speed.square()
}

/// `Re = ρ V L / μ`
pub fn reynolds_number(speed: &Expr, length: &Expr) -> Expr {
    AIR_DENSITY * (speed * length) / DYNAMIC_VISCOSITY
}

/// Turbulent flat plate skin friction, `Cf = 0.0391 Re^-0.157`.
pub fn skin_friction_coefficient(reynolds: &Expr) -> Expr {
    0.0391 * reynolds.powf(-0.157)
}

/// Body form factor `1 + 60 / (L/D)³ + 0.0025 L/D`.
pub fn body_form_factor(fineness_ratio: &Expr) -> Expr {
    1.0 + 60.0 / fineness_ratio.powi(3) + 0.0025 * fineness_ratio
}

/// Lift coefficient that balances `n` times `weight`.
pub fn lift_coefficient(load_factor: &Expr, weight: &Expr, dynamic_pressure: &Expr, area: &Expr) -> Expr {
    load_factor * weight / (dynamic_pressure * area)
}

/// Induced drag factor `k = 1 / (π e AR)`.
pub fn induced_drag_factor(aspect_ratio: &Expr, oswald_efficiency: f64) -> Expr {
    1.0 / (PI * oswald_efficiency * aspect_ratio)
}

/// Lift slope reduction of a finite wing, `AR / (AR + 2)`.
pub fn finite_wing_factor(aspect_ratio: &Expr) -> Expr {
    aspect_ratio / (aspect_ratio + 2.0)
}

/// Turn radius at speed `V` and load factor `n`, `V² / (g √(n² − 1))`.
///
/// Only defined for `n > 1`; callers bound the load factor away from 1.
pub fn turn_radius(speed: &Expr, load_factor: &Expr, gravity: f64) -> Expr {
    speed.square() / (gravity * (load_factor.square() - 1.0).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GRAVITATIONAL_ACCELERATION;
    use approx::assert_relative_eq;

    fn c(v: f64) -> Expr {
        Expr::constant(v)
    }

    #[test]
    fn test_dynamic_pressure() {
        assert_relative_eq!(dynamic_pressure(&c(20.0)).value(), 245.0, epsilon = 1e-9);
    }

    #[test]
    fn test_lift_round_trip() {
        for (q, s, w, n) in [(245.0, 0.3, 35.0, 1.0), (600.0, 0.45, 42.0, 3.2), (50.0, 0.1, 9.0, 1.5)] {
            let cl = lift_coefficient(&c(n), &c(w), &c(q), &c(s));
            let lift = cl * q * s;
            assert_relative_eq!(lift.value(), n * w, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_skin_friction_correlation() {
        let re: f64 = 1.0e6;
        assert_relative_eq!(
            skin_friction_coefficient(&c(re)).value(),
            0.0391 * re.powf(-0.157),
            epsilon = 1e-15
        );
        let low = skin_friction_coefficient(&c(2.0e5)).value();
        assert!(low > skin_friction_coefficient(&c(re)).value());
    }

    #[test]
    fn test_reynolds_number() {
        let re = reynolds_number(&c(20.0), &c(0.25)).value();
        assert_relative_eq!(re, 1.225 * 20.0 * 0.25 / 1.802e-5, epsilon = 1e-6);
    }

    #[test]
    fn test_form_factor_penalises_stubby_bodies() {
        assert!(body_form_factor(&c(3.0)).value() > body_form_factor(&c(8.0)).value());
    }

    #[test]
    fn test_turn_radius() {
        let n = 2.0_f64;
        let r = turn_radius(&c(20.0), &c(n), GRAVITATIONAL_ACCELERATION).value();
        assert_relative_eq!(r, 400.0 / (GRAVITATIONAL_ACCELERATION * 3.0_f64.sqrt()), epsilon = 1e-9);
        let tighter = turn_radius(&c(20.0), &c(4.0), GRAVITATIONAL_ACCELERATION).value();
        assert!(tighter < r);
    }

    #[test]
    fn test_turn_radius_undefined_in_level_flight() {
        let r = turn_radius(&c(20.0), &c(1.0), GRAVITATIONAL_ACCELERATION).value();
        assert!(r.is_infinite());
    }

    #[test]
    fn test_finite_wing_and_induced_factor() {
        assert_relative_eq!(finite_wing_factor(&c(6.0)).value(), 0.75);
        assert_relative_eq!(induced_drag_factor(&c(6.0), 0.7).value(), 1.0 / (PI * 4.2), epsilon = 1e-12);
    }
}
