use crate::polar::errors::{PolarError, Result};
use crate::polar::sampler::SampleGrid;
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;

/// One cell of the surface mesh, corners in `(x, y, z)` order going around the cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceQuad {
    pub corners: [(f64, f64, f64); 4],
    pub mean_z: f64,
}

/// Splits the sampled grid into quads, one per pair of neighbouring rows and columns.
pub fn surface_polygons(grid: &SampleGrid) -> Vec<SurfaceQuad> {
    let n = grid.size();
    let point = |i: usize, j: usize| (grid.x[[i, j]], grid.y[[i, j]], grid.z[[i, j]]);
    let mut quads = Vec::with_capacity(n.saturating_sub(1).pow(2));
    for i in 0..n.saturating_sub(1) {
        for j in 0..n.saturating_sub(1) {
            let corners = [point(i, j), point(i, j + 1), point(i + 1, j + 1), point(i + 1, j)];
            let mean_z = corners.iter().map(|c| c.2).sum::<f64>() / 4.0;
            quads.push(SurfaceQuad { corners, mean_z });
        }
    }
    quads
}

fn padded_range<'a>(values: impl Iterator<Item = &'a f64>) -> Range<f64> {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        return -1.0..1.0;
    }
    if hi - lo < 1e-12 {
        return (lo - 1.0)..(hi + 1.0);
    }
    lo..hi
}

fn draw_surface<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, grid: &SampleGrid, title: &str) -> Result<()> {
    let export = |e: String| PolarError::Export(format!("plot: {}", e));
    root.fill(&WHITE).map_err(|e| export(e.to_string()))?;
    let x_range = padded_range(grid.x.iter());
    let y_range = padded_range(grid.y.iter());
    let z_range = padded_range(grid.z.iter());
    let (z_lo, z_hi) = (z_range.start, z_range.end);

    // plotters puts the second axis upwards, so z goes there
    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 30))
        .margin(20)
        .build_cartesian_3d(x_range, z_range, y_range)
        .map_err(|e| export(e.to_string()))?;
    chart.with_projection(|mut pb| {
        pb.pitch = 0.5;
        pb.yaw = 0.6;
        pb.scale = 0.8;
        pb.into_matrix()
    });
    chart
        .configure_axes()
        .draw()
        .map_err(|e| export(e.to_string()))?;

    let quads = surface_polygons(grid);
    chart
        .draw_series(quads.iter().map(|quad| {
            let t = (quad.mean_z - z_lo) / (z_hi - z_lo);
            let color = HSLColor(0.66 * (1.0 - t.clamp(0.0, 1.0)), 0.8, 0.5);
            Polygon::new(
                quad.corners.iter().map(|&(x, y, z)| (x, z, y)).collect::<Vec<_>>(),
                color.mix(0.9).filled(),
            )
        }))
        .map_err(|e| export(e.to_string()))?;
    root.present().map_err(|e| export(e.to_string()))?;
    Ok(())
}

/// Renders the surface into an SVG document
pub fn surface_svg(grid: &SampleGrid, title: &str) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (800, 600)).into_drawing_area();
        draw_surface(&root, grid, title)?;
    }
    Ok(svg)
}

/// Renders the surface into a PNG file
pub fn surface_png(grid: &SampleGrid, title: &str, path: &Path) -> Result<()> {
    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    draw_surface(&root, grid, title)?;
    info!("surface plot saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn grid(n: usize) -> SampleGrid {
        SampleGrid {
            x: Array2::from_shape_fn((n, n), |(_, j)| j as f64),
            y: Array2::from_shape_fn((n, n), |(i, _)| i as f64),
            z: Array2::from_shape_fn((n, n), |(i, j)| (i * j) as f64),
            zero_filled: 0,
        }
    }

    #[test]
    fn test_surface_polygons() {
        let quads = surface_polygons(&grid(3));
        assert_eq!(quads.len(), 4);
        assert_eq!(
            quads[3].corners,
            [(1.0, 1.0, 1.0), (2.0, 1.0, 2.0), (2.0, 2.0, 4.0), (1.0, 2.0, 2.0)]
        );
        assert_eq!(quads[3].mean_z, 2.25);
    }

    #[test]
    fn test_padded_range() {
        let flat = [3.0, 3.0];
        assert_eq!(padded_range(flat.iter()), 2.0..4.0);
        let spread = [1.0, -2.0, 5.0];
        assert_eq!(padded_range(spread.iter()), -2.0..5.0);
    }
}
