use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dbf_sizing::aero::{AirfoilSelection, ShapeBounds};
use dbf_sizing::constants::MIN_PASSENGERS;
use dbf_sizing::optimizer::{solution_table, sweep_table, Monitor};
use dbf_sizing::{assemble, Driver, DriverConfig, MissionKind, ModelConfig, Study};

#[derive(Parser)]
#[command(author, version, about = "Design/Build/Fly aircraft sizing and mission scoring")]
struct Cli {
    /// Treat the airfoil shape as a design variable (slow)
    #[arg(short = 'a', long)]
    optimize_airfoil: bool,

    /// Model variant as YAML (defaults to the built-in preset)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sweep the passenger count from the rule minimum up to this value
    /// after the composite solve
    #[arg(long)]
    sweep_passengers: Option<u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut model = match &cli.config {
        Some(path) => ModelConfig::from_file(path)
            .with_context(|| format!("loading model config {}", path.display()))?,
        None => ModelConfig::default(),
    };
    if cli.optimize_airfoil {
        model = model.with_airfoil(AirfoilSelection::Optimized(ShapeBounds::default()));
    }
    info!(model = %model.name, optimize_airfoil = model.airfoil.is_optimized(), "sizing");

    let study = Study::new(&model).context("building the aircraft model")?;
    let config = DriverConfig::default();
    let options = config.constraints;
    let mut driver = Driver::new(study, config);

    let result = driver
        .solve_multi_mission(|study| assemble(study, &options), &MissionKind::ALL)
        .context("multi-mission solve")?;

    println!("{:<6} {:>14} {:>14}", "", "normaliser", "score");
    for mission in &result.missions {
        println!("{:<6} {:>14.4} {:>14.4}", mission.kind.label(), mission.normalizer, mission.score);
    }
    println!("composite score {:.4}\n", result.composite_score);

    match &result.composite.solution {
        Some(solution) => println!("{}", solution_table(driver.study(), solution)),
        None => println!("composite solve failed, no solution to report"),
    }

    if let Some(max) = cli.sweep_passengers {
        let min = MIN_PASSENGERS as u32;
        if max < min {
            bail!("--sweep-passengers must be at least {min}");
        }
        let grid: Vec<f64> = (min..=max).map(f64::from).collect();
        let objective = driver.composite_objective()?;
        let aircraft = &driver.study().aircraft;
        let passengers = aircraft.passengers.clone();
        let monitors = [
            Monitor::new("cargo", &aircraft.cargo),
            Monitor::new("span", &aircraft.wing.span),
            Monitor::new("m2_laps", &driver.study().payload_lap.laps),
        ];
        let sweep = driver
            .sweep(&passengers, &grid, &objective, &monitors)
            .context("passenger sweep")?;
        println!("{}", sweep_table(&sweep));
    }

    Ok(())
}
