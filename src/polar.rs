//! Double integrals in polar coordinates.
//!
//! A compute action takes the integrand `f(x, y)` and four Cartesian limits as
//! text, parses them, substitutes `x = r*cos(theta)`, `y = r*sin(theta)` with
//! the Jacobian `r` and integrates over the disc `theta in [0, 2*pi]`,
//! `r in [0, 2]`. The region is fixed; the limits are used for the plot only.
//! Symbolic integration is tried first, Gauss-Legendre quadrature is the fallback.
//!
//! # Example
//! ```
//! use RustedPolar::polar::expression_builder::IntegralForm;
//! use RustedPolar::polar::pipeline::{ComputeOptions, compute};
//! let report = compute(&IntegralForm::circle_example(), &ComputeOptions::default()).unwrap();
//! assert_eq!(report.result_text(), "25.1327");
//! ```
/// errors and warnings of the compute action
pub mod errors;
/// turns the five text fields into symbolic expressions
pub mod expression_builder;
/// polar substitution and the integration region
pub mod polar_transform;
/// symbolic integration with numeric fallback
pub mod evaluator;
/// integrand values on a grid for the surface plot
pub mod sampler;
/// the compute action
pub mod pipeline;
/// form state between actions
pub mod session;
