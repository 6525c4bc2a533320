use tracing::{debug, info};

use crate::aero::{AeroSurrogate, SectionCoefficients, SectionModel};
use crate::constants::{dynamic_thrust, AIR_DENSITY, GRAVITATIONAL_ACCELERATION, SPEED_OF_SOUND};
use crate::error::SizingResult;
use crate::solver::{Expr, Problem, Relation, Variable};

use super::aerodynamics::*;
use super::config::{FuselageDragModel, ModelConfig, StructureRule};
use super::geometry::*;
use super::mass::*;

/// Fraction of the stall speed at which the aircraft rotates.
pub const TAKEOFF_SPEED_RATIO: f64 = 0.84;
/// Takeoff distance coefficient, `1.44 W² / (g ρ S CLmax F)`.
pub const TAKEOFF_COEFFICIENT: f64 = 1.44;

/// One aircraft configuration with every derived quantity expressed on the
/// decision variables of the problem it was built on.
#[derive(Debug, Clone)]
pub struct Aircraft {
    pub config: ModelConfig,
    pub section: SectionModel,
    pub wing: WingGeometry,
    pub fuselage: FuselageGeometry,
    pub tail: TailGeometry,
    pub layout: PayloadLayout,
    pub banner: BannerGeometry,
    pub passengers: Expr,
    pub cargo: Expr,
    /// Stored propulsion energy (J)
    pub propulsion_energy: Expr,
    /// Present when the structure is sized on gross mass
    pub design_gross_mass: Option<Expr>,
    pub mass: MassBreakdown,
    /// Maximum lift coefficient of the wing
    pub cl_max: Expr,
    /// Mach number the section model is evaluated at
    pub design_mach: f64,
}

impl Aircraft {
    /// Declares the configuration variables on `problem` and builds the
    /// geometry, mass and aerodynamic model on top of them.
    pub fn new(problem: &mut Problem, config: &ModelConfig) -> SizingResult<Self> {
        config.validate()?;
        let b = &config.bounds;

        let span = problem.variable(b.span.to_variable("span"));
        let chord = problem.variable(b.chord.to_variable("chord"));
        let fuselage_length = problem.variable(b.fuselage_length.to_variable("fuselage_length"));
        let fuselage_width = problem.variable(b.fuselage_width.to_variable("fuselage_width"));
        let fuselage_height = problem.variable(b.fuselage_height.to_variable("fuselage_height"));
        let passengers = problem.variable(b.passengers.to_variable("passengers"));
        let cargo = problem.variable(b.cargo.to_variable("cargo"));
        let banner_length = problem.variable(b.banner_length.to_variable("banner_length"));
        let banner_width = problem.variable(b.banner_width.to_variable("banner_width"));
        let propulsion_energy = problem.variable(b.propulsion_energy.to_variable("propulsion_energy"));

        let section = SectionModel::resolve(&config.airfoil, problem);

        let wing = WingGeometry::new(span, chord);
        let fuselage = FuselageGeometry::new(fuselage_length, fuselage_width, fuselage_height);
        let tail = TailGeometry::from_volume_coefficients(&wing, &config.tail);
        let layout = PayloadLayout::new(&passengers, &cargo);
        let banner = BannerGeometry::new(banner_length, banner_width);

        let areal = config.skin.areal_density();
        let fuselage_skin = areal * &fuselage.wetted_area;
        let wing_skin = 2.0 * areal * &wing.area;
        let battery = battery_mass(&propulsion_energy, config.propulsion.battery_specific_energy);
        let passenger = passenger_mass(&passengers);
        let cargo_m = cargo_mass(&cargo);
        let banner_m = config.banner_areal_density * &banner.area;
        let fixed = config.fixed_masses.total();

        let (structure, design_gross_mass) = match config.structure {
            StructureRule::PayloadFraction(fraction) => (fraction * (&passenger + &cargo_m), None),
            StructureRule::GrossMassScaled(factor) => {
                // everything but the structure, heaviest loadout
                let bare = &battery + &fuselage_skin + &wing_skin + fixed;
                let base = problem
                    .initial_value(&(&bare + &passenger + &cargo_m))
                    .max(problem.initial_value(&(&bare + &banner_m)));
                let seed = converge_gross_mass(base, factor, GROSS_MASS_TOLERANCE, GROSS_MASS_MAX_ITERATIONS)?;
                debug!(base, seed, "seeded design gross mass");
                let design = problem.variable(
                    Variable::new("design_gross_mass", seed)
                        .lower(0.1)
                        .scale(seed),
                );
                (factor * &design, Some(design))
            }
        };

        let mass = MassBreakdown {
            fuselage_skin,
            wing_skin,
            structure,
            battery,
            passengers: passenger,
            cargo: cargo_m,
            banner: banner_m,
            fixed,
        };

        let cl_max = section.cl_max();
        let design_mach = b.speed.init / SPEED_OF_SOUND;

        info!(
            model = %config.name,
            airfoil = section.name(),
            variables = problem.variables().len(),
            "aircraft model built"
        );

        Ok(Self {
            config: config.clone(),
            section,
            wing,
            fuselage,
            tail,
            layout,
            banner,
            passengers,
            cargo,
            propulsion_energy,
            design_gross_mass,
            mass,
            cl_max,
            design_mach,
        })
    }

    pub fn gross_mass(&self, loadout: Loadout) -> Expr {
        self.mass.gross(loadout)
    }

    pub fn weight(&self, loadout: Loadout) -> Expr {
        GRAVITATIONAL_ACCELERATION * self.gross_mass(loadout)
    }

    pub fn lift_coefficient(&self, speed: &Expr, load_factor: &Expr, loadout: Loadout) -> Expr {
        lift_coefficient(
            load_factor,
            &self.weight(loadout),
            &dynamic_pressure(speed),
            &self.wing.area,
        )
    }

    /// `q S CL`, which by construction equals `n W`.
    pub fn lift(&self, speed: &Expr, load_factor: &Expr, loadout: Loadout) -> Expr {
        dynamic_pressure(speed) * &self.wing.area * self.lift_coefficient(speed, load_factor, loadout)
    }

    /// Section coefficients at the wing chord Reynolds number.
    pub fn section_at(&self, speed: &Expr, alpha_deg: &Expr) -> SectionCoefficients {
        let reynolds = reynolds_number(speed, &self.wing.chord);
        self.section.evaluate(alpha_deg, &reynolds, self.design_mach)
    }

    /// Lift the wing produces with `section`, the section lift reduced for
    /// finite aspect ratio.
    pub fn available_lift(&self, speed: &Expr, section: &SectionCoefficients) -> Expr {
        let cl = &section.cl * finite_wing_factor(&self.wing.aspect_ratio);
        dynamic_pressure(speed) * &self.wing.area * cl
    }

    /// Fuselage drag coefficient referenced to the wing area.
    pub fn fuselage_drag_coefficient(&self, speed: &Expr) -> Expr {
        match self.config.fuselage_drag {
            FuselageDragModel::SkinFriction => {
                let reynolds = reynolds_number(speed, &self.fuselage.length);
                skin_friction_coefficient(&reynolds)
                    * body_form_factor(&self.fuselage.fineness_ratio)
                    * &self.fuselage.wetted_area
                    / &self.wing.area
            }
            FuselageDragModel::Constant(cd) => Expr::constant(cd),
        }
    }

    pub fn banner_drag(&self, speed: &Expr) -> Expr {
        self.config.banner_drag * dynamic_pressure(speed) * &self.banner.area
    }

    /// Total drag in flight at load factor `n`.
    pub fn drag(
        &self,
        speed: &Expr,
        load_factor: &Expr,
        loadout: Loadout,
        section: &SectionCoefficients,
    ) -> Expr {
        let q = dynamic_pressure(speed);
        let cl = self.lift_coefficient(speed, load_factor, loadout);
        let induced = induced_drag_factor(&self.wing.aspect_ratio, self.config.oswald_efficiency) * cl.square();
        let wing_cd = &section.cd + self.config.parasite_drag + induced;
        let cd = wing_cd + self.fuselage_drag_coefficient(speed);
        let airframe = &q * (&self.wing.area * cd + self.config.tail.drag_coefficient * self.tail.planform_area());
        match loadout {
            Loadout::Banner => airframe + self.banner_drag(speed),
            Loadout::Empty | Loadout::Payload => airframe,
        }
    }

    pub fn thrust(&self, speed: &Expr) -> Expr {
        dynamic_thrust(speed)
    }

    pub fn stall_speed(&self, loadout: Loadout) -> Expr {
        (self.stall_speed_squared(loadout)).sqrt()
    }

    /// `V_s² = 2 W / (ρ S CLmax)`
    pub fn stall_speed_squared(&self, loadout: Loadout) -> Expr {
        2.0 * self.weight(loadout) / (AIR_DENSITY * &self.wing.area * &self.cl_max)
    }

    /// Net accelerating force during the ground roll, at the rotation speed.
    fn takeoff_force(&self, loadout: Loadout) -> (Expr, Expr) {
        let speed = TAKEOFF_SPEED_RATIO * self.stall_speed(loadout);
        let q = dynamic_pressure(&speed);
        let cl = self.config.ground_roll_lift_coefficient;
        let lift = &q * &self.wing.area * cl;
        let cd = self.config.parasite_drag
            + induced_drag_factor(&self.wing.aspect_ratio, self.config.oswald_efficiency) * (cl * cl)
            + self.fuselage_drag_coefficient(&speed);
        let drag = &q * &self.wing.area * cd;
        let weight = self.weight(loadout);
        let net = self.thrust(&speed) - drag - self.config.rolling_friction * (&weight - lift);
        (weight, net)
    }

    /// Ground roll distance, `1.44 W² / (g ρ S CLmax (T − D − μ (W − L)))`.
    pub fn takeoff_distance(&self, loadout: Loadout) -> Expr {
        let (weight, net) = self.takeoff_force(loadout);
        TAKEOFF_COEFFICIENT * weight.square()
            / (GRAVITATIONAL_ACCELERATION * AIR_DENSITY * &self.wing.area * &self.cl_max * net)
    }

    /// `takeoff_distance <= max_distance` with the denominator multiplied
    /// through, so the relation stays defined when the net force vanishes.
    pub fn takeoff_within(&self, loadout: Loadout, max_distance: f64) -> Relation {
        let (weight, net) = self.takeoff_force(loadout);
        let lhs = TAKEOFF_COEFFICIENT * weight.square();
        let rhs = max_distance
            * GRAVITATIONAL_ACCELERATION
            * AIR_DENSITY
            * &self.wing.area
            * &self.cl_max
            * net;
        lhs.le(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aircraft::ModelConfig;
    use crate::constants::{BATTERY_SPECIFIC_ENERGY, STATIC_THRUST};
    use approx::assert_relative_eq;

    fn build(config: &ModelConfig) -> (Problem, Aircraft) {
        let mut problem = Problem::new();
        let aircraft = Aircraft::new(&mut problem, config).unwrap();
        (problem, aircraft)
    }

    #[test]
    fn test_declares_design_variables() {
        let (problem, aircraft) = build(&ModelConfig::manta_ray());
        assert_eq!(problem.variables().len(), 10);
        assert!(aircraft.design_gross_mass.is_none());
        assert_eq!(problem.bounds(&aircraft.wing.span).unwrap(), (Some(0.3), Some(3.0)));
    }

    #[test]
    fn test_battery_mass_in_gross_mass() {
        let (problem, aircraft) = build(&ModelConfig::manta_ray());
        let energy = problem.initial_value(&aircraft.propulsion_energy);
        assert_relative_eq!(
            problem.initial_value(&aircraft.mass.battery),
            energy / BATTERY_SPECIFIC_ENERGY,
            epsilon = 1e-12
        );
        let with = problem.initial_value(&aircraft.gross_mass(Loadout::Payload));
        let without = problem.initial_value(&aircraft.gross_mass(Loadout::Empty));
        assert!(with > without);
    }

    #[test]
    fn test_gross_mass_structure_seeded_by_fixed_point() {
        let (problem, aircraft) = build(&ModelConfig::foam_wing());
        let design = aircraft.design_gross_mass.clone().unwrap();
        let seed = problem.initial_value(&design);
        let payload = problem.initial_value(&aircraft.gross_mass(Loadout::Payload));
        let banner = problem.initial_value(&aircraft.gross_mass(Loadout::Banner));
        // the seed is the converged gross mass of the heavier loadout
        assert_relative_eq!(seed, payload.max(banner), epsilon = 1e-6);
    }

    #[test]
    fn test_lift_recovers_force_balance() {
        let (problem, aircraft) = build(&ModelConfig::manta_ray());
        let v = Expr::constant(22.0);
        let n = Expr::constant(2.5);
        let lift = problem.initial_value(&aircraft.lift(&v, &n, Loadout::Payload));
        let weight = problem.initial_value(&aircraft.weight(Loadout::Payload));
        assert_relative_eq!(lift, 2.5 * weight, epsilon = 1e-9);
    }

    #[test]
    fn test_banner_drag_increases_with_length() {
        let mut problem = Problem::new();
        let aircraft = Aircraft::new(&mut problem, &ModelConfig::manta_ray()).unwrap();
        let v = Expr::constant(20.0);
        let section = aircraft.section_at(&v, &Expr::constant(4.0));
        let drag = aircraft.drag(&v, &Expr::constant(1.0), Loadout::Banner, &section);
        let mut x = problem.declared_point();
        let index = aircraft.banner.length.variable_index().unwrap();
        let h = 1e-4;
        let mut last = drag.eval(&x);
        for _ in 0..5 {
            x[index] += h;
            let next = drag.eval(&x);
            assert!(next > last);
            last = next;
        }
    }

    #[test]
    fn test_fuselage_drag_models() {
        let (problem, skin) = build(&ModelConfig::manta_ray());
        let cd = problem.initial_value(&skin.fuselage_drag_coefficient(&Expr::constant(25.0)));
        assert!(cd > 0.0 && cd < 0.05, "cd {cd}");
        let (_, constant) = build(&ModelConfig::foam_wing());
        assert_relative_eq!(constant.fuselage_drag_coefficient(&Expr::constant(25.0)).value(), 0.012);
    }

    #[test]
    fn test_thrust_and_takeoff() {
        let (problem, aircraft) = build(&ModelConfig::manta_ray());
        assert_relative_eq!(aircraft.thrust(&Expr::constant(0.0)).value(), STATIC_THRUST);
        let distance = problem.initial_value(&aircraft.takeoff_distance(Loadout::Payload));
        assert!(distance > 0.0 && distance < 150.0, "takeoff {distance}");
        let within = aircraft.takeoff_within(Loadout::Payload, 152.4);
        assert_relative_eq!(within.violation(&problem.declared_point()), 0.0);
        let too_short = aircraft.takeoff_within(Loadout::Payload, 0.1 * distance);
        assert!(too_short.violation(&problem.declared_point()) > 0.0);
    }

    #[test]
    fn test_stall_speed() {
        let (problem, aircraft) = build(&ModelConfig::manta_ray());
        let vs = problem.initial_value(&aircraft.stall_speed(Loadout::Payload));
        let w = problem.initial_value(&aircraft.weight(Loadout::Payload));
        let s = problem.initial_value(&aircraft.wing.area);
        assert_relative_eq!(vs, (2.0 * w / (1.225 * s * 1.4)).sqrt(), epsilon = 1e-9);
    }
}
