//! Plain text tables of solutions and sweeps.

use crate::aero::AeroSurrogate;
use crate::mission::{MissionKind, Study};
use crate::solver::Solution;
use crate::units::*;

use super::sweep::{SurfaceResult, SweepResult};

const NAME_WIDTH: usize = 28;

fn heading(out: &mut String, title: &str) {
    out.push_str(&format!("{title}\n{}\n", "-".repeat(title.len())));
}

fn row(out: &mut String, name: &str, value: f64, unit: &str) {
    out.push_str(&format!("{name:<width$} {value:>12.4} {unit}\n", width = NAME_WIDTH));
}

/// Row with an imperial equivalent alongside the SI value.
fn row_imperial(out: &mut String, name: &str, value: f64, unit: &str, imperial: f64, imperial_unit: &str) {
    out.push_str(&format!(
        "{name:<width$} {value:>12.4} {unit:<6} ({imperial:.3} {imperial_unit})\n",
        width = NAME_WIDTH,
    ));
}

fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| "--".to_string(), |v| format!("{v:.4}"))
}

/// Every decision variable followed by the derived sizing quantities.
pub fn solution_table(study: &Study, solution: &Solution) -> String {
    let aircraft = &study.aircraft;
    let mut out = String::new();

    heading(
        &mut out,
        &format!("{} ({})", aircraft.config.name, aircraft.section.name()),
    );
    if !solution.converged {
        out.push_str(&format!(
            "not converged, max violation {:.3e}\n",
            solution.max_violation
        ));
    }
    for (name, value) in solution.iter() {
        row(&mut out, name, value, "");
    }

    out.push('\n');
    heading(&mut out, "Geometry");
    let span = solution.value(&aircraft.wing.span);
    let chord = solution.value(&aircraft.wing.chord);
    let area = solution.value(&aircraft.wing.area);
    row_imperial(&mut out, "span", span, "m", meters_to_feet(span), "ft");
    row_imperial(&mut out, "chord", chord, "m", 12.0 * meters_to_feet(chord), "in");
    row_imperial(&mut out, "wing area", area, "m^2", square_meters_to_square_feet(area), "ft^2");
    row(&mut out, "aspect ratio", solution.value(&aircraft.wing.aspect_ratio), "");
    row_imperial(
        &mut out,
        "fuselage length",
        solution.value(&aircraft.fuselage.length),
        "m",
        meters_to_feet(solution.value(&aircraft.fuselage.length)),
        "ft",
    );
    row_imperial(
        &mut out,
        "banner area",
        solution.value(&aircraft.banner.area),
        "m^2",
        square_meters_to_square_feet(solution.value(&aircraft.banner.area)),
        "ft^2",
    );
    row_imperial(
        &mut out,
        "battery energy",
        solution.value(&aircraft.propulsion_energy),
        "J",
        joules_to_watt_hours(solution.value(&aircraft.propulsion_energy)),
        "Wh",
    );

    for lap in study.laps() {
        out.push('\n');
        heading(&mut out, &format!("Mission {}", lap.label));
        let gross = solution.value(&aircraft.gross_mass(lap.loadout));
        let stall = solution.value(&aircraft.stall_speed(lap.loadout));
        let takeoff = solution.value(&aircraft.takeoff_distance(lap.loadout));
        let speed = solution.value(&lap.speed);
        let radius = solution.value(&lap.turn_radius);
        row_imperial(&mut out, "gross mass", gross, "kg", kg_to_lbs(gross), "lb");
        row_imperial(&mut out, "stall speed", stall, "m/s", mps_to_mph(stall), "mph");
        row_imperial(&mut out, "takeoff distance", takeoff, "m", meters_to_feet(takeoff), "ft");
        row_imperial(&mut out, "speed", speed, "m/s", mps_to_mph(speed), "mph");
        row(&mut out, "load factor", solution.value(&lap.load_factor), "g");
        row_imperial(&mut out, "turn radius", radius, "m", meters_to_feet(radius), "ft");
        row(&mut out, "lap time", solution.value(&lap.lap_time), "s");
        row_imperial(
            &mut out,
            "lap energy",
            solution.value(&lap.lap_energy),
            "J",
            joules_to_watt_hours(solution.value(&lap.lap_energy)),
            "Wh",
        );
        row(&mut out, "laps", solution.value(&lap.laps), "");
        row(&mut out, "energy limited laps", solution.value(&lap.energy_limited_laps()), "");
    }

    out.push('\n');
    heading(&mut out, "Scores");
    for kind in MissionKind::ALL {
        row(&mut out, kind.label(), solution.value(&study.score(kind)), "");
    }
    out
}

/// One line per grid point; failed points show `--`.
pub fn sweep_table(result: &SweepResult) -> String {
    let mut out = String::new();
    let mut header = format!("{:>12} {:>12} {:>12}", result.variable, "achieved", "score");
    for name in &result.monitor_names {
        header.push_str(&format!(" {name:>12}"));
    }
    out.push_str(&header);
    out.push('\n');
    out.push_str(&"-".repeat(header.len()));
    out.push('\n');

    for point in &result.points {
        out.push_str(&format!(
            "{:>12.4} {:>12} {:>12}",
            point.target,
            cell(point.achieved),
            cell(point.score)
        ));
        for i in 0..result.monitor_names.len() {
            let value = point.monitors.as_ref().and_then(|p| p.get(i).copied());
            out.push_str(&format!(" {:>12}", cell(value)));
        }
        out.push('\n');
    }
    out
}

/// Score grid with row targets down the side and column targets across.
pub fn surface_table(result: &SurfaceResult) -> String {
    let mut out = String::new();
    let corner = format!("{}\\{}", result.row_variable, result.column_variable);
    out.push_str(&format!("{corner:>20}"));
    for column in &result.columns {
        out.push_str(&format!(" {column:>10.3}"));
    }
    out.push('\n');
    for (i, row_target) in result.rows.iter().enumerate() {
        out.push_str(&format!("{row_target:>20.3}"));
        for j in 0..result.columns.len() {
            out.push_str(&format!(" {:>10}", cell(result.scores[(i, j)])));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::SweepPoint;
    use nalgebra::DMatrix;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sweep_table_marks_gaps() {
        let result = SweepResult {
            variable: "passengers".into(),
            monitor_names: vec!["cargo".into()],
            points: vec![
                SweepPoint {
                    target: 3.0,
                    score: Some(120.5),
                    achieved: Some(3.0),
                    monitors: Some(vec![1.0]),
                },
                SweepPoint {
                    target: 9.0,
                    score: None,
                    achieved: None,
                    monitors: None,
                },
            ],
        };
        let table = sweep_table(&result);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("passengers"));
        assert!(lines[2].contains("120.5000"));
        assert_eq!(lines[3].matches("--").count(), 3);
    }

    #[test]
    fn test_surface_table_layout() {
        let result = SurfaceResult {
            row_variable: "passengers".into(),
            column_variable: "cargo".into(),
            rows: vec![3.0, 6.0],
            columns: vec![1.0, 2.0, 3.0],
            scores: DMatrix::from_row_slice(2, 3, &[Some(1.0), Some(2.0), None, Some(3.0), None, None]),
        };
        let table = surface_table(&result);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("passengers\\cargo"));
        assert_eq!(lines[2].matches("--").count(), 2);
    }

    #[test]
    fn test_cell_format() {
        assert_eq!(cell(Some(2.0)), "2.0000");
        assert_eq!(cell(None), "--");
    }
}
