/// tensor Gauss-Legendre quadrature over rectangles
/// Example#
/// ```
/// use RustedPolar::numerical::quadrature::TensorQuadrature;
/// let quad = TensorQuadrature::new(10).unwrap();
/// let area = quad.integrate_2d(|_theta, r| r, (0.0, 2.0 * std::f64::consts::PI), (0.0, 2.0));
/// assert!((area - 4.0 * std::f64::consts::PI).abs() < 1e-10);
/// ```
pub mod quadrature;
