use crate::symbolic::symbolic_engine::Expr;
use std::collections::HashMap;

pub const RADIUS: &str = "r";
pub const ANGLE: &str = "theta";

/// `f(r*cos(theta), r*sin(theta))` and the Jacobian factor `r`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarIntegrand {
    pub cartesian: Expr,
    pub substituted: Expr,
    pub jacobian: Expr,
    /// substituted * jacobian
    pub integrand: Expr,
}

impl PolarIntegrand {
    /// `x -> r*cos(theta)`, `y -> r*sin(theta)`
    pub fn substitution_rule() -> HashMap<String, Expr> {
        let r = Expr::var(RADIUS);
        let theta = Expr::var(ANGLE);
        let mut rule = HashMap::new();
        rule.insert("x".to_string(), r.clone() * Expr::cos(theta.clone().boxed()));
        rule.insert("y".to_string(), r * Expr::sin(theta.boxed()));
        rule
    }

    pub fn from_cartesian(f: &Expr) -> Self {
        let substituted = f.substitute_variables(&Self::substitution_rule());
        let jacobian = Expr::var(RADIUS);
        let integrand = substituted.clone() * jacobian.clone();
        Self {
            cartesian: f.clone(),
            substituted,
            jacobian,
            integrand,
        }
    }
}

/// Integration region in polar coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PolarRegion {
    pub theta: (Expr, Expr),
    pub r: (Expr, Expr),
}

impl PolarRegion {
    /// The disc of radius 2: theta in [0, 2*pi], r in [0, 2].
    ///
    /// It does not depend on the Cartesian limits typed into the form.
    pub fn fixed() -> Self {
        Self {
            theta: (Expr::Const(0.0), Expr::Const(2.0) * Expr::Pi),
            r: (Expr::Const(0.0), Expr::Const(2.0)),
        }
    }

    /// ((theta_lo, theta_hi), (r_lo, r_hi)) as numbers
    pub fn numeric_bounds(&self) -> Result<((f64, f64), (f64, f64)), String> {
        Ok((
            (self.theta.0.eval_constant()?, self.theta.1.eval_constant()?),
            (self.r.0.eval_constant()?, self.r.1.eval_constant()?),
        ))
    }

    pub fn describe(&self) -> String {
        format!(
            "theta in [{}, {}], r in [{}, {}]",
            self.theta.0, self.theta.1, self.r.0, self.r.1
        )
    }

    pub fn to_latex(&self) -> String {
        format!(
            "\\theta \\in \\left[{}, {}\\right],\\; r \\in \\left[{}, {}\\right]",
            self.theta.0.to_latex(),
            self.theta.1.to_latex(),
            self.r.0.to_latex(),
            self.r.1.to_latex()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_substitution_is_structural() {
        let f = Expr::parse_expression("x**2 + y**2").unwrap();
        let polar = PolarIntegrand::from_cartesian(&f);
        let r = Expr::var("r");
        let theta = Expr::var("theta");
        let expected_substituted = (r.clone() * Expr::cos(theta.clone().boxed()))
            .pow(Expr::Const(2.0))
            + (r.clone() * Expr::sin(theta.boxed())).pow(Expr::Const(2.0));
        assert_eq!(polar.substituted, expected_substituted);
        assert_eq!(polar.integrand, Expr::Mul(expected_substituted.boxed(), r.boxed()));
    }

    #[test]
    fn test_substitution_does_not_chain() {
        // x is replaced by r*cos(theta) and not touched again by the y rule
        let f = Expr::parse_expression("x*y").unwrap();
        let polar = PolarIntegrand::from_cartesian(&f);
        assert!(!polar.integrand.contains_variable("x"));
        assert!(!polar.integrand.contains_variable("y"));
        let g = polar.integrand.lambdify_borrowed_thread_safe(&["r", "theta"]);
        let (r, t) = (1.5_f64, 0.3_f64);
        assert_relative_eq!(g(&[r, t]), r * t.cos() * r * t.sin() * r, epsilon = 1e-12);
    }

    #[test]
    fn test_fixed_region() {
        let region = PolarRegion::fixed();
        let ((t0, t1), (r0, r1)) = region.numeric_bounds().unwrap();
        assert_eq!((t0, r0, r1), (0.0, 0.0, 2.0));
        assert_relative_eq!(t1, 2.0 * PI);
        assert_eq!(region.describe(), "theta in [0, 2*pi], r in [0, 2]");
    }
}
