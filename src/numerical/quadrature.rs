//! Tensor-product Gauss-Legendre quadrature over rectangles.
//!
//! Used as the numeric tier when an integral has no closed form. The inner
//! variable is integrated for every node of the outer one.
//!
//! # Example
//! ```
//! use RustedPolar::numerical::quadrature::TensorQuadrature;
//! let quad = TensorQuadrature::new(20).unwrap();
//! // ∫0^1 ∫0^2 x*y dx dy = 1
//! let value = quad.integrate_2d(|x, y| x * y, (0.0, 2.0), (0.0, 1.0));
//! assert!((value - 1.0).abs() < 1e-12);
//! ```
use gauss_quad::GaussLegendre;
use log::debug;

pub const DEFAULT_QUADRATURE_DEGREE: usize = 48;

pub struct TensorQuadrature {
    degree: usize,
    rule: GaussLegendre,
}

impl TensorQuadrature {
    pub fn new(degree: usize) -> Result<Self, String> {
        if degree < 2 {
            return Err(format!("quadrature degree must be at least 2, got {}", degree));
        }
        let rule = GaussLegendre::new(degree)
            .map_err(|e| format!("Failed to create Gauss-Legendre quadrature: {:?}", e))?;
        Ok(Self { degree, rule })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// ∫∫ f(inner, outer) d(inner) d(outer), inner range first
    pub fn integrate_2d<F>(&self, f: F, inner: (f64, f64), outer: (f64, f64)) -> f64
    where
        F: Fn(f64, f64) -> f64,
    {
        debug!(
            "tensor Gauss-Legendre, degree {}, inner {:?}, outer {:?}",
            self.degree, inner, outer
        );
        self.rule.integrate(outer.0, outer.1, |o| {
            self.rule.integrate(inner.0, inner.1, |i| f(i, o))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_degree_validation() {
        assert!(TensorQuadrature::new(1).is_err());
        assert_eq!(TensorQuadrature::new(12).unwrap().degree(), 12);
    }

    #[test]
    fn test_polynomial_is_exact() {
        // the inner variable does not appear, the outer range has length 1
        let quad = TensorQuadrature::new(10).unwrap();
        let value = quad.integrate_2d(|_, t| t.powi(5) - 2.0 * t, (0.0, 1.0), (-1.0, 3.0));
        assert_relative_eq!(value, (3.0_f64.powi(6) - 1.0) / 6.0 - 8.0, epsilon = 1e-10);
    }

    #[test]
    fn test_disc_area_in_polar_coordinates() {
        // ∫0^2 ∫0^2π r dθ dr = 4π
        let quad = TensorQuadrature::new(DEFAULT_QUADRATURE_DEGREE).unwrap();
        let value = quad.integrate_2d(|_theta, r| r, (0.0, 2.0 * PI), (0.0, 2.0));
        assert_relative_eq!(value, 4.0 * PI, epsilon = 1e-10);
    }

    #[test]
    fn test_gaussian_over_disc() {
        // ∫0^2 ∫0^2π exp(-r^2) r dθ dr = π (1 - e^-4)
        let quad = TensorQuadrature::new(DEFAULT_QUADRATURE_DEGREE).unwrap();
        let value = quad.integrate_2d(
            |_theta, r| (-r * r).exp() * r,
            (0.0, 2.0 * PI),
            (0.0, 2.0),
        );
        assert_relative_eq!(value, PI * (1.0 - (-4.0_f64).exp()), epsilon = 1e-10);
    }
}
