use crate::numerical::quadrature::{DEFAULT_QUADRATURE_DEGREE, TensorQuadrature};
use crate::polar::errors::{PolarError, Result, Warning};
use crate::polar::polar_transform::{ANGLE, PolarIntegrand, PolarRegion, RADIUS};
use crate::symbolic::symbolic_engine::Expr;
use log::{debug, info, warn};
use std::fmt;

/// Value of the double integral.
#[derive(Debug, Clone, PartialEq)]
pub enum IntegralValue {
    Exact(Expr),
    Numeric(f64),
}

impl IntegralValue {
    /// Finite `f64` form of the value, if there is one.
    pub fn to_f64(&self) -> std::result::Result<f64, String> {
        let value = match self {
            IntegralValue::Exact(expr) => expr.eval_constant()?,
            IntegralValue::Numeric(value) => *value,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(format!("{} is not a finite number", self))
        }
    }

    pub fn to_latex(&self) -> String {
        match self {
            IntegralValue::Exact(expr) => expr.to_latex(),
            IntegralValue::Numeric(value) => format!("{:.4}", value),
        }
    }
}

impl fmt::Display for IntegralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegralValue::Exact(expr) => write!(f, "{}", expr),
            IntegralValue::Numeric(value) => write!(f, "{}", value),
        }
    }
}

/// Which tier produced the value.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationTier {
    Symbolic,
    NumericFallback { reason: String },
}

impl fmt::Display for EvaluationTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationTier::Symbolic => write!(f, "symbolic"),
            EvaluationTier::NumericFallback { reason } => {
                write!(f, "numeric fallback ({})", reason)
            }
        }
    }
}

/// Relative gap between the degree `n` and `2n` estimates, measured against
/// the integral of `|f|`, above which the quadrature value is flagged.
const QUADRATURE_AGREEMENT: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationOptions {
    /// Gauss-Legendre degree of the coarse estimate, the reported one uses twice as many nodes
    pub quadrature_degree: usize,
}

impl Default for EvaluationOptions {
    fn default() -> Self {
        Self {
            quadrature_degree: DEFAULT_QUADRATURE_DEGREE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: IntegralValue,
    pub tier: EvaluationTier,
    /// result of the inner (theta) integration, when the symbolic tier got that far
    pub inner: Option<Expr>,
    pub warnings: Vec<Warning>,
}

// theta first, then r
fn symbolic_tier(polar: &PolarIntegrand, region: &PolarRegion) -> std::result::Result<(Expr, Expr), String> {
    let inner = polar
        .integrand
        .definite_integral(ANGLE, &region.theta.0, &region.theta.1);
    debug!("inner integral over {}: {}", ANGLE, inner);
    if inner.has_integral() {
        return Err(format!("no antiderivative in {} for {}", ANGLE, polar.integrand));
    }
    let outer = inner.definite_integral(RADIUS, &region.r.0, &region.r.1);
    debug!("outer integral over {}: {}", RADIUS, outer);
    if outer.has_integral() {
        return Err(format!("no antiderivative in {} for {}", RADIUS, inner));
    }
    if !outer.is_constant() {
        return Err(format!("result {} still depends on {:?}", outer, outer.extract_variables()));
    }
    Ok((inner, outer))
}

fn numeric_tier(
    polar: &PolarIntegrand,
    region: &PolarRegion,
    options: &EvaluationOptions,
) -> std::result::Result<(f64, Option<Warning>), String> {
    let (theta_range, r_range) = region.numeric_bounds()?;
    let f = polar.integrand.compile(&[ANGLE, RADIUS])?;
    let integrand = |theta: f64, r: f64| f.eval(&[theta, r]);
    let fine_degree = options
        .quadrature_degree
        .checked_mul(2)
        .ok_or_else(|| format!("quadrature degree {} is too large", options.quadrature_degree))?;
    let coarse_rule = TensorQuadrature::new(options.quadrature_degree)?;
    let fine_rule = TensorQuadrature::new(fine_degree)?;

    let coarse = coarse_rule.integrate_2d(integrand, theta_range, r_range);
    let fine = fine_rule.integrate_2d(integrand, theta_range, r_range);
    if !fine.is_finite() {
        return Err(format!("quadrature returned {}", fine));
    }
    // a singularity between the nodes shows up as estimates that keep moving
    let scale = fine_rule.integrate_2d(|theta, r| integrand(theta, r).abs(), theta_range, r_range);
    let settled = coarse.is_finite() && (fine - coarse).abs() <= QUADRATURE_AGREEMENT * scale;
    if settled {
        Ok((fine, None))
    } else {
        warn!(
            "quadrature degree {} gives {}, degree {} gives {}",
            coarse_rule.degree(),
            coarse,
            fine_rule.degree(),
            fine
        );
        Ok((fine, Some(Warning::QuadratureDisagreement { coarse, fine })))
    }
}

/// Integrates the polar integrand over `region`.
///
/// Symbolic integration is tried first. If it errors or leaves an
/// unresolved integral, Gauss-Legendre quadrature is used instead and the
/// reason is kept in [`EvaluationTier::NumericFallback`]. Fails only when
/// both tiers fail.
pub fn evaluate(
    polar: &PolarIntegrand,
    region: &PolarRegion,
    options: &EvaluationOptions,
) -> Result<Evaluation> {
    info!("integrating {} over {}", polar.integrand, region.describe());
    let reason = match symbolic_tier(polar, region) {
        Ok((inner, outer)) => {
            info!("symbolic result: {}", outer);
            return Ok(Evaluation {
                value: IntegralValue::Exact(outer),
                tier: EvaluationTier::Symbolic,
                inner: Some(inner),
                warnings: Vec::new(),
            });
        }
        Err(reason) => reason,
    };
    warn!("symbolic integration incomplete, falling back to quadrature: {}", reason);
    match numeric_tier(polar, region, options) {
        Ok((value, warning)) => {
            info!("numeric result: {}", value);
            Ok(Evaluation {
                value: IntegralValue::Numeric(value),
                tier: EvaluationTier::NumericFallback { reason },
                inner: None,
                warnings: warning.into_iter().collect(),
            })
        }
        Err(numeric) => Err(PolarError::Integration(format!(
            "symbolic: {}; numeric: {}",
            reason, numeric
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn polar(input: &str) -> PolarIntegrand {
        PolarIntegrand::from_cartesian(&Expr::parse_expression(input).unwrap())
    }

    #[test]
    fn test_circle_is_exact() {
        let evaluation = evaluate(
            &polar("x**2 + y**2"),
            &PolarRegion::fixed(),
            &EvaluationOptions::default(),
        )
        .unwrap();
        assert_eq!(evaluation.tier, EvaluationTier::Symbolic);
        assert_eq!(evaluation.value, IntegralValue::Exact(Expr::Const(8.0) * Expr::Pi));
        assert_relative_eq!(evaluation.value.to_f64().unwrap(), 8.0 * PI, epsilon = 1e-12);
        assert!(evaluation.inner.is_some());
    }

    #[test]
    fn test_constant_integrand_gives_disc_area() {
        let evaluation = evaluate(&polar("1"), &PolarRegion::fixed(), &EvaluationOptions::default())
            .unwrap();
        assert_eq!(evaluation.tier, EvaluationTier::Symbolic);
        assert_relative_eq!(evaluation.value.to_f64().unwrap(), 4.0 * PI, epsilon = 1e-12);
    }

    #[test]
    fn test_odd_integrand_vanishes() {
        let evaluation = evaluate(&polar("x*y"), &PolarRegion::fixed(), &EvaluationOptions::default())
            .unwrap();
        assert_eq!(evaluation.tier, EvaluationTier::Symbolic);
        assert_relative_eq!(evaluation.value.to_f64().unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_gaussian_falls_back_to_quadrature() {
        let evaluation = evaluate(
            &polar("exp(-(x**2 + y**2))"),
            &PolarRegion::fixed(),
            &EvaluationOptions::default(),
        )
        .unwrap();
        assert!(matches!(evaluation.tier, EvaluationTier::NumericFallback { .. }));
        assert!(evaluation.warnings.is_empty());
        match evaluation.value {
            IntegralValue::Numeric(value) => {
                assert_relative_eq!(value, PI * (1.0 - (-4.0_f64).exp()), epsilon = 1e-8)
            }
            other => panic!("expected numeric value, got {:?}", other),
        }
    }

    #[test]
    fn test_divergent_integral_is_flagged() {
        // 1/(x^2 + y^2) becomes 1/r in polar form, not integrable at r = 0
        let evaluation = evaluate(
            &polar("1/(x**2 + y**2)"),
            &PolarRegion::fixed(),
            &EvaluationOptions::default(),
        )
        .unwrap();
        assert!(matches!(evaluation.tier, EvaluationTier::NumericFallback { .. }));
        assert!(matches!(
            evaluation.warnings.as_slice(),
            [Warning::QuadratureDisagreement { .. }]
        ));
    }

    #[test]
    fn test_integrable_singularity_settles() {
        // 1/sqrt(x^2 + y^2) becomes the constant 1 after the Jacobian
        let evaluation = evaluate(
            &polar("cos(x)/sqrt(x**2 + y**2)"),
            &PolarRegion::fixed(),
            &EvaluationOptions::default(),
        )
        .unwrap();
        assert!(evaluation.warnings.is_empty());
    }

    #[test]
    fn test_both_tiers_fail() {
        let bad_degree = EvaluationOptions { quadrature_degree: 1 };
        let err = evaluate(&polar("exp(-(x**2 + y**2))"), &PolarRegion::fixed(), &bad_degree)
            .unwrap_err();
        assert!(matches!(err, PolarError::Integration(_)));
    }

    #[test]
    fn test_value_coercion() {
        assert!(IntegralValue::Numeric(f64::NAN).to_f64().is_err());
        assert!(IntegralValue::Exact(Expr::var("r")).to_f64().is_err());
        assert_eq!(IntegralValue::Numeric(2.5).to_f64().unwrap(), 2.5);
        assert_eq!(IntegralValue::Exact(Expr::Const(8.0) * Expr::Pi).to_string(), "8*pi");
    }
}
