use tracing::debug;

use crate::constants::{CARGO_MASS, PASSENGER_MASS};
use crate::error::{SizingError, SizingResult};
use crate::solver::Expr;

/// What the aircraft carries on a given flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Loadout {
    /// Airframe, battery and systems only
    Empty,
    /// Passengers and cargo (mission 2)
    Payload,
    /// Towed banner (mission 3)
    Banner,
}

/// Mass breakdown of the configuration (kg).
#[derive(Debug, Clone)]
pub struct MassBreakdown {
    pub fuselage_skin: Expr,
    pub wing_skin: Expr,
    pub structure: Expr,
    pub battery: Expr,
    pub passengers: Expr,
    pub cargo: Expr,
    pub banner: Expr,
    pub fixed: f64,
}

impl MassBreakdown {
    pub fn payload(&self) -> Expr {
        &self.passengers + &self.cargo
    }

    /// Mass flown on every mission.
    pub fn flight(&self) -> Expr {
        &self.battery + &self.fuselage_skin + &self.wing_skin + &self.structure + self.fixed
    }

    pub fn gross(&self, loadout: Loadout) -> Expr {
        match loadout {
            Loadout::Empty => self.flight(),
            Loadout::Payload => self.flight() + self.payload(),
            Loadout::Banner => self.flight() + &self.banner,
        }
    }
}

pub fn passenger_mass(passengers: &Expr) -> Expr {
    passengers * PASSENGER_MASS
}

pub fn cargo_mass(cargo: &Expr) -> Expr {
    cargo * CARGO_MASS
}

/// Battery mass holding `energy` joules.
pub fn battery_mass(energy: &Expr, specific_energy: f64) -> Expr {
    energy / specific_energy
}

/// Convergence settings of the gross mass iteration.
pub const GROSS_MASS_TOLERANCE: f64 = 1e-9; // kg
pub const GROSS_MASS_MAX_ITERATIONS: usize = 100;

/// Solves `m = base + factor * m` by fixed-point iteration.
///
/// Used when part of the structure is sized on the gross mass it has to
/// carry. Stops once successive estimates differ by less than `tolerance`
/// and errors after `max_iterations`.
pub fn converge_gross_mass(
    base: f64,
    factor: f64,
    tolerance: f64,
    max_iterations: usize,
) -> SizingResult<f64> {
    let mut mass = base;
    let mut residual = f64::INFINITY;
    for iteration in 1..=max_iterations {
        let next = base + factor * mass;
        residual = (next - mass).abs();
        mass = next;
        if !mass.is_finite() {
            break;
        }
        if residual < tolerance {
            debug!(iteration, mass, "gross mass converged");
            return Ok(mass);
        }
    }
    Err(SizingError::MassIterationDiverged {
        iterations: max_iterations,
        residual,
    })
}
