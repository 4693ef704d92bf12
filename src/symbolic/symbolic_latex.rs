//! LaTeX rendering of symbolic expressions, used for the step-by-step report.
use crate::symbolic::symbolic_engine::Expr;

fn latex_symbol(name: &str) -> String {
    match name {
        "theta" | "phi" | "rho" | "alpha" | "beta" => format!("\\{}", name),
        _ => name.to_string(),
    }
}

fn function(name: &str, arg: &Expr) -> String {
    format!("{}\\left({}\\right)", name, arg.to_latex())
}

impl Expr {
    /// Renders the expression as a LaTeX math string (without `$` delimiters).
    ///
    /// # Examples
    /// ```rust, ignore
    /// let f = Expr::parse_expression("sqrt(4 - y**2)/2").unwrap();
    /// assert_eq!(f.to_latex(), "\\frac{\\sqrt{4 - y^{2}}}{2}");
    /// ```
    pub fn to_latex(&self) -> String {
        match self {
            Expr::Var(name) => latex_symbol(name),
            Expr::Const(val) => val.to_string(),
            Expr::Pi => "\\pi".to_string(),
            Expr::Euler => "e".to_string(),
            Expr::Add(lhs, rhs) => match rhs.as_ref() {
                Expr::Const(val) if *val < 0.0 => format!("{} - {}", lhs.to_latex(), -val),
                _ => format!("{} + {}", lhs.to_latex(), rhs.to_latex()),
            },
            Expr::Sub(lhs, rhs) => format!("{} - {}", lhs.to_latex(), rhs.latex_operand_sum()),
            Expr::Mul(lhs, rhs) => match (lhs.as_ref(), rhs.as_ref()) {
                (Expr::Const(c), rest) if *c == -1.0 => format!("-{}", rest.latex_operand_product()),
                (Expr::Const(_), Expr::Const(_)) => {
                    format!("{} \\cdot {}", lhs.latex_operand_product(), rhs.latex_operand_product())
                }
                _ => format!("{} {}", lhs.latex_operand_product(), rhs.latex_operand_product()),
            },
            Expr::Div(lhs, rhs) => format!("\\frac{{{}}}{{{}}}", lhs.to_latex(), rhs.to_latex()),
            Expr::Pow(base, exp) => match exp.as_ref() {
                Expr::Const(p) if *p == 0.5 => format!("\\sqrt{{{}}}", base.to_latex()),
                _ => format!("{}^{{{}}}", base.latex_operand_power(), exp.to_latex()),
            },
            Expr::Exp(arg) => format!("e^{{{}}}", arg.to_latex()),
            Expr::Ln(arg) => function("\\ln", arg),
            Expr::sin(arg) => function("\\sin", arg),
            Expr::cos(arg) => function("\\cos", arg),
            Expr::tg(arg) => function("\\tan", arg),
            Expr::ctg(arg) => function("\\cot", arg),
            Expr::arcsin(arg) => function("\\arcsin", arg),
            Expr::arccos(arg) => function("\\arccos", arg),
            Expr::arctg(arg) => function("\\arctan", arg),
            Expr::arcctg(arg) => function("\\operatorname{arccot}", arg),
            Expr::Integral(integrand, var, lower, upper) => format!(
                "\\int\\limits_{{{}}}^{{{}}} {} \\, d{}",
                lower.to_latex(),
                upper.to_latex(),
                integrand.latex_operand_product(),
                latex_symbol(var)
            ),
        }
    }

    fn latex_operand_sum(&self) -> String {
        match self {
            Expr::Add(..) | Expr::Sub(..) => format!("\\left({}\\right)", self.to_latex()),
            _ => self.to_latex(),
        }
    }

    fn latex_operand_product(&self) -> String {
        match self {
            Expr::Add(..) | Expr::Sub(..) | Expr::Integral(..) => {
                format!("\\left({}\\right)", self.to_latex())
            }
            Expr::Const(val) if *val < 0.0 => format!("\\left({}\\right)", val),
            _ => self.to_latex(),
        }
    }

    fn latex_operand_power(&self) -> String {
        match self {
            Expr::Var(_) | Expr::Pi | Expr::Euler => self.to_latex(),
            Expr::Const(val) if *val >= 0.0 => self.to_latex(),
            _ => format!("\\left({}\\right)", self.to_latex()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::symbolic::symbolic_engine::Expr;

    fn latex(input: &str) -> String {
        Expr::parse_expression(input).unwrap().to_latex()
    }

    #[test]
    fn test_basic_latex() {
        assert_eq!(latex("x**2 + y**2"), "x^{2} + y^{2}");
        assert_eq!(latex("sqrt(4 - y**2)/2"), "\\frac{\\sqrt{4 - y^{2}}}{2}");
        assert_eq!(latex("-x"), "-x");
        assert_eq!(latex("r*cos(theta)"), "r \\cos\\left(\\theta\\right)");
    }

    #[test]
    fn test_power_of_compound_base() {
        assert_eq!(latex("(r*cos(theta))^2"), "\\left(r \\cos\\left(\\theta\\right)\\right)^{2}");
        assert_eq!(latex("exp(-x)"), "e^{-x}");
    }

    #[test]
    fn test_constants() {
        assert_eq!((Expr::Const(8.0) * Expr::Pi).to_latex(), "8 \\pi");
        assert_eq!(latex("2*3"), "2 \\cdot 3");
    }

    #[test]
    fn test_integral_node() {
        let node = Expr::Integral(
            Expr::var("r").boxed(),
            "theta".to_string(),
            Expr::Const(0.0).boxed(),
            (Expr::Const(2.0) * Expr::Pi).boxed(),
        );
        assert_eq!(node.to_latex(), "\\int\\limits_{0}^{2 \\pi} r \\, d\\theta");
    }
}
