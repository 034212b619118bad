// src/visualisation.rs

use crate::hysteresis::HysteresisEngine;
use plotters::prelude::*;

/// Map a value to a blue–white–red colour using a *local* min/max,
/// so small frequency shifts are still visible.
///
/// lo maps to blue, hi maps to red, midpoint to white.
fn value_to_color(v: f64, lo: f64, hi: f64) -> RGBColor {
    // Protect against lo ≈ hi (e.g. a single cell)
    let (lo, hi) = if !lo.is_finite() || !hi.is_finite() || (hi - lo).abs() < 1e-12 {
        (lo - 1.0, lo + 1.0)
    } else {
        (lo, hi)
    };

    let x = ((v - lo) / (hi - lo)).clamp(0.0, 1.0);

    let r = (255.0 * x) as u8;
    let b = (255.0 * (1.0 - x)) as u8;
    let g = (255.0 * (1.0 - (2.0 * (x - 0.5).abs()))).clamp(0.0, 255.0) as u8;

    RGBColor(r, g, b)
}

/// Plot the full (input, output) trace of a hysteresis engine.
///
/// The x window spans the active input range with a small margin, the
/// y window is 10% wider than the largest reachable output.
pub fn save_hysteresis_plot(
    engine: &HysteresisEngine,
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let history = engine.history();
    if history.is_empty() {
        return Ok(());
    }

    let x_lim = (engine.size() as f64 / engine.x_scale()) / 1.7;
    let y_lim = engine.y_max().abs() * 1.1;
    let params = engine.params();

    let root = BitMapBackend::new(filename, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Hysteresis loop", ("sans-serif", 30))
        .set_left_and_bottom_label_area_size(70)
        .build_cartesian_2d(-x_lim..x_lim, -y_lim..y_lim)?;

    chart
        .configure_mesh()
        .x_desc(params.x_label.as_str())
        .y_desc(params.y_label.as_str())
        .draw()?;

    chart.draw_series(LineSeries::new(history.iter().copied(), &BLUE))?;

    // Mark the virgin starting point.
    chart.draw_series(std::iter::once(Circle::new(history[0], 4, RED.filled())))?;

    root.present()?;
    Ok(())
}

/// Draw the detector's present frequencies as a colour map, one rectangle per cell.
/// Row 0 is drawn at the top.
pub fn save_frequency_map(
    freqs: &[Vec<f64>],
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let rows = freqs.len() as i32;
    let cols = freqs.first().map_or(0, |r| r.len()) as i32;
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &f in freqs.iter().flatten() {
        if f.is_finite() {
            lo = lo.min(f);
            hi = hi.max(f);
        }
    }

    let root = BitMapBackend::new(filename, (800, 800)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(40)
        .caption(
            format!("resonant frequency (blue = {:.3}, red = {:.3})", lo, hi),
            ("sans-serif", 20),
        )
        .x_label_area_size(40)
        .y_label_area_size(40)
        .build_cartesian_2d(0..cols, 0..rows)?;

    chart
        .configure_mesh()
        .x_desc("column")
        .y_desc("row")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(freqs.iter().enumerate().flat_map(|(r, row)| {
        let y = rows - 1 - r as i32;
        row.iter().enumerate().map(move |(c, &f)| {
            let c = c as i32;
            Rectangle::new([(c, y), (c + 1, y + 1)], value_to_color(f, lo, hi).filled())
        })
    }))?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colour_map_ends_are_blue_and_red() {
        assert_eq!(value_to_color(0.0, 0.0, 1.0), RGBColor(0, 0, 255));
        assert_eq!(value_to_color(1.0, 0.0, 1.0), RGBColor(255, 0, 0));
        // Out of range values clamp.
        assert_eq!(value_to_color(5.0, 0.0, 1.0), RGBColor(255, 0, 0));
    }

    #[test]
    fn flat_map_is_drawn_white() {
        let c = value_to_color(3.0, 3.0, 3.0);
        assert_eq!(c, RGBColor(127, 255, 127));
    }
}
