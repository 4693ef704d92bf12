use crate::polar::errors::Warning;
use crate::polar::expression_builder::ParsedIntegral;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::linspace;
use log::{debug, warn};
use ndarray::{Array1, Array2, Zip};
use strum_macros::{Display, EnumIter, EnumString};

pub const DEFAULT_GRID_SIZE: usize = 50;

/// How the x-limits, which may depend on `y`, are turned into numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum BoundaryMode {
    /// every row uses the x-limits evaluated at its own `y`
    #[default]
    PerRow,
    /// the x-limits are evaluated once, at the first `y` sample
    FirstRow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SampleOptions {
    pub grid_size: usize,
    pub boundary: BoundaryMode,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            boundary: BoundaryMode::default(),
        }
    }
}

/// Integrand values on an `n x n` grid. Row `i` holds the samples at `y[i, _]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
    pub z: Array2<f64>,
    /// number of non-finite samples replaced by zero
    pub zero_filled: usize,
}

impl SampleGrid {
    pub fn size(&self) -> usize {
        self.z.nrows()
    }

    /// (min, max) of the z values
    pub fn z_range(&self) -> (f64, f64) {
        self.z
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridOutcome {
    pub grid: Option<SampleGrid>,
    pub warnings: Vec<Warning>,
}

fn finite(value: f64, what: &str) -> Result<f64, String> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{} evaluates to {}", what, value))
    }
}

fn x_bounds(parsed: &ParsedIntegral, ys: &Array1<f64>, mode: BoundaryMode) -> Result<Vec<(f64, f64)>, String> {
    let lower = parsed.x_lower.compile(&["y"])?;
    let upper = parsed.x_upper.compile(&["y"])?;
    let at = |y: f64| -> Result<(f64, f64), String> {
        Ok((
            finite(lower.eval(&[y]), &format!("x lower limit at y = {}", y))?,
            finite(upper.eval(&[y]), &format!("x upper limit at y = {}", y))?,
        ))
    };
    match mode {
        BoundaryMode::PerRow => ys.iter().map(|&y| at(y)).collect(),
        BoundaryMode::FirstRow => {
            let first = at(ys[0])?;
            Ok(vec![first; ys.len()])
        }
    }
}

fn build_grid(f: &Expr, parsed: &ParsedIntegral, options: &SampleOptions) -> Result<SampleGrid, String> {
    let n = options.grid_size;
    if n < 2 {
        return Err(format!("grid size must be at least 2, got {}", n));
    }
    let y_lo = finite(parsed.y_lower.eval_constant()?, "y lower limit")?;
    let y_hi = finite(parsed.y_upper.eval_constant()?, "y upper limit")?;
    let ys = Array1::from(linspace(y_lo, y_hi, n));
    let bounds = x_bounds(parsed, &ys, options.boundary)?;
    let rows: Vec<Vec<f64>> = bounds.iter().map(|&(lo, hi)| linspace(lo, hi, n)).collect();

    let x = Array2::from_shape_fn((n, n), |(i, j)| rows[i][j]);
    let y = Array2::from_shape_fn((n, n), |(i, _)| ys[i]);
    let integrand = f.compile(&["x", "y"])?;
    let mut z = Array2::<f64>::zeros((n, n));
    Zip::from(&mut z)
        .and(&x)
        .and(&y)
        .for_each(|z, &x, &y| *z = integrand.eval(&[x, y]));

    let mut zero_filled = 0;
    z.mapv_inplace(|v| {
        if v.is_finite() {
            v
        } else {
            zero_filled += 1;
            0.0
        }
    });
    Ok(SampleGrid { x, y, z, zero_filled })
}

/// Samples `f` over the region given by the Cartesian limits.
///
/// Never fails: problems end up in [`GridOutcome::warnings`] and a grid that
/// could not be built at all is `None`.
pub fn sample_grid(f: &Expr, parsed: &ParsedIntegral, options: &SampleOptions) -> GridOutcome {
    match build_grid(f, parsed, options) {
        Ok(grid) => {
            let mut warnings = Vec::new();
            if grid.zero_filled > 0 {
                let msg = format!(
                    "{} of {} samples are not finite and were set to 0",
                    grid.zero_filled,
                    grid.z.len()
                );
                warn!("{}", msg);
                warnings.push(Warning::PlotEvaluation(msg));
            }
            debug!("sampled {}x{} grid, z in {:?}", grid.size(), grid.size(), grid.z_range());
            GridOutcome {
                grid: Some(grid),
                warnings,
            }
        }
        Err(msg) => {
            warn!("plot skipped: {}", msg);
            GridOutcome {
                grid: None,
                warnings: vec![Warning::PlotEvaluation(msg)],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polar::expression_builder::{IntegralForm, build_expressions};
    use approx::assert_relative_eq;
    use std::str::FromStr;

    fn circle() -> ParsedIntegral {
        build_expressions(&IntegralForm::new(
            "x**2 + y**2",
            "-sqrt(4 - y**2)",
            "sqrt(4 - y**2)",
            "-2",
            "2",
        ))
        .unwrap()
    }

    #[test]
    fn test_default_grid_shape() {
        let parsed = build_expressions(&IntegralForm::default()).unwrap();
        let outcome = sample_grid(&parsed.integrand, &parsed, &SampleOptions::default());
        assert!(outcome.warnings.is_empty());
        let grid = outcome.grid.unwrap();
        assert_eq!(grid.z.dim(), (DEFAULT_GRID_SIZE, DEFAULT_GRID_SIZE));
        assert_eq!(grid.z[[0, 0]], 0.0);
        assert_relative_eq!(grid.z[[49, 49]], 32.0, epsilon = 1e-12);
    }

    #[test]
    fn test_per_row_boundaries_follow_circle() {
        let parsed = circle();
        let options = SampleOptions { grid_size: 11, boundary: BoundaryMode::PerRow };
        let grid = sample_grid(&parsed.integrand, &parsed, &options).grid.unwrap();
        // every sample lies inside the disc of radius 2
        for (&x, &y) in grid.x.iter().zip(grid.y.iter()) {
            assert!(x * x + y * y <= 4.0 + 1e-9);
        }
        // middle row spans the full diameter
        assert_relative_eq!(grid.x[[5, 0]], -2.0, epsilon = 1e-12);
        assert_relative_eq!(grid.x[[5, 10]], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_first_row_boundaries_collapse() {
        let parsed = circle();
        let options = SampleOptions { grid_size: 11, boundary: BoundaryMode::FirstRow };
        let grid = sample_grid(&parsed.integrand, &parsed, &options).grid.unwrap();
        // at y = -2 the x-range collapses to a point
        assert!(grid.x.iter().all(|&x| x.abs() < 1e-12));
    }

    #[test]
    fn test_non_finite_samples_are_zero_filled() {
        let parsed = build_expressions(&IntegralForm::new("1/x", "0", "1", "0", "1")).unwrap();
        let options = SampleOptions { grid_size: 5, boundary: BoundaryMode::PerRow };
        let outcome = sample_grid(&parsed.integrand, &parsed, &options);
        let grid = outcome.grid.unwrap();
        assert_eq!(grid.zero_filled, 5);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(grid.z[[2, 0]], 0.0);
    }

    #[test]
    fn test_symbolic_y_limits_give_warning() {
        let parsed = build_expressions(&IntegralForm::new("x", "0", "1", "x", "2")).unwrap();
        let outcome = sample_grid(&parsed.integrand, &parsed, &SampleOptions::default());
        assert!(outcome.grid.is_none());
        assert!(matches!(outcome.warnings[0], Warning::PlotEvaluation(_)));
    }

    #[test]
    fn test_boundary_mode_names() {
        assert_eq!(BoundaryMode::from_str("first_row").unwrap(), BoundaryMode::FirstRow);
        assert_eq!(BoundaryMode::PerRow.to_string(), "per_row");
    }
}
