//! # Symbolic Engine Module
//!
//! Core expression tree used by every other part of the crate. Expressions are
//! built by the parser (`parse_expr`), transformed by the polar substitution,
//! simplified (`symbolic_simplify`), integrated (`symbolic_integration`) and
//! finally compiled into floating point closures (`symbolic_lambdify`).
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - symbolic variables like "x", "y", "r", "theta"
//! - **Constants**: `Const(f64)` - numerical constants
//! - **Exact constants**: `Pi`, `Euler` - kept symbolic until evaluation
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, etc. - mathematical functions
//! - **Unresolved integrals**: `Integral` - definite integral the symbolic
//!   integrator could not close
//!
//! ### Key Methods
//! - `substitute_variable()` - replace a variable by an expression
//! - `substitute_variables()` - several replacements at once
//! - `extract_variables()` - free variables of an expression
//! - `has_integral()` - true when an unresolved integral is still present
//!
//! Trigonometric functions keep the mathematical notation (tg, ctg, arctg)
//! used across the symbolic module.

#![allow(non_camel_case_types)]

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::fmt;

/// Symbolic expression tree.
///
/// # Examples
/// ```rust, ignore
/// use RustedPolar::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "theta")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// The exact constant π
    Pi,
    /// The exact constant e
    Euler,
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    sin(Box<Expr>),
    cos(Box<Expr>),
    tg(Box<Expr>),
    ctg(Box<Expr>),
    arcsin(Box<Expr>),
    arccos(Box<Expr>),
    arctg(Box<Expr>),
    arcctg(Box<Expr>),
    /// Unresolved definite integral: integrand, variable, lower, upper
    Integral(Box<Expr>, String, Box<Expr>, Box<Expr>),
}

/// Display produces text the parser accepts again, so a printed expression
/// can be re-parsed into an equal tree (up to redundant brackets). Non-finite
/// constants print as `(1/0)`, `(-1/0)` and `(0/0)`, which parse back into
/// quotients with the same value.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) if val.is_nan() => write!(f, "(0/0)"),
            Expr::Const(val) if val.is_infinite() => {
                if *val > 0.0 {
                    write!(f, "(1/0)")
                } else {
                    write!(f, "(-1/0)")
                }
            }
            Expr::Const(val) => {
                if *val < 0.0 {
                    write!(f, "({})", val)
                } else {
                    write!(f, "{}", val)
                }
            }
            Expr::Pi => write!(f, "pi"),
            Expr::Euler => write!(f, "E"),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "{}*{}", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({}/{})", lhs, rhs),
            Expr::Pow(base, exp) => match exp.as_ref() {
                Expr::Const(p) if *p == 0.5 => write!(f, "sqrt({})", base),
                _ => write!(f, "{}^{}", Self::power_operand(base), Self::power_operand(exp)),
            },
            Expr::Exp(expr) => write!(f, "exp({})", expr),
            Expr::Ln(expr) => write!(f, "ln({})", expr),
            Expr::sin(expr) => write!(f, "sin({})", expr),
            Expr::cos(expr) => write!(f, "cos({})", expr),
            Expr::tg(expr) => write!(f, "tg({})", expr),
            Expr::ctg(expr) => write!(f, "ctg({})", expr),
            Expr::arcsin(expr) => write!(f, "arcsin({})", expr),
            Expr::arccos(expr) => write!(f, "arccos({})", expr),
            Expr::arctg(expr) => write!(f, "arctg({})", expr),
            Expr::arcctg(expr) => write!(f, "arcctg({})", expr),
            Expr::Integral(integrand, var, lower, upper) => {
                write!(f, "Integral({}, ({}, {}, {}))", integrand, var, lower, upper)
            }
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// BASIC FEATURES

    pub fn var(name: &str) -> Expr {
        Expr::Var(name.to_string())
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    pub fn sqrt(self) -> Expr {
        Expr::Pow(self.boxed(), Box::new(Expr::Const(0.5)))
    }

    /// Checks if expression is exactly zero (constant 0.0).
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    /// Rebuilds a node of the same kind around new children. Leaves are
    /// returned unchanged, so `map_children` only ever touches inner nodes.
    pub fn map_children<F>(&self, mut f: F) -> Expr
    where
        F: FnMut(&Expr) -> Expr,
    {
        match self {
            Expr::Var(_) | Expr::Const(_) | Expr::Pi | Expr::Euler => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Mul(lhs, rhs) => Expr::Mul(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Div(lhs, rhs) => Expr::Div(Box::new(f(lhs)), Box::new(f(rhs))),
            Expr::Pow(base, exp) => Expr::Pow(Box::new(f(base)), Box::new(f(exp))),
            Expr::Exp(expr) => Expr::Exp(Box::new(f(expr))),
            Expr::Ln(expr) => Expr::Ln(Box::new(f(expr))),
            Expr::sin(expr) => Expr::sin(Box::new(f(expr))),
            Expr::cos(expr) => Expr::cos(Box::new(f(expr))),
            Expr::tg(expr) => Expr::tg(Box::new(f(expr))),
            Expr::ctg(expr) => Expr::ctg(Box::new(f(expr))),
            Expr::arcsin(expr) => Expr::arcsin(Box::new(f(expr))),
            Expr::arccos(expr) => Expr::arccos(Box::new(f(expr))),
            Expr::arctg(expr) => Expr::arctg(Box::new(f(expr))),
            Expr::arcctg(expr) => Expr::arcctg(Box::new(f(expr))),
            Expr::Integral(integrand, var, lower, upper) => Expr::Integral(
                Box::new(f(integrand)),
                var.clone(),
                Box::new(f(lower)),
                Box::new(f(upper)),
            ),
        }
    }

    /// Direct children of a node, in left-to-right order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Var(_) | Expr::Const(_) | Expr::Pi | Expr::Euler => Vec::new(),
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => vec![lhs, rhs],
            Expr::Exp(expr)
            | Expr::Ln(expr)
            | Expr::sin(expr)
            | Expr::cos(expr)
            | Expr::tg(expr)
            | Expr::ctg(expr)
            | Expr::arcsin(expr)
            | Expr::arccos(expr)
            | Expr::arctg(expr)
            | Expr::arcctg(expr) => vec![expr],
            Expr::Integral(integrand, _, lower, upper) => vec![integrand, lower, upper],
        }
    }

    /// substitute a variable with an expression
    pub fn substitute_variable(&self, var: &str, expr: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => expr.clone(),
            Expr::Integral(integrand, bound, lower, upper) if bound == var => Expr::Integral(
                integrand.clone(),
                bound.clone(),
                Box::new(lower.substitute_variable(var, expr)),
                Box::new(upper.substitute_variable(var, expr)),
            ),
            _ => self.map_children(|child| child.substitute_variable(var, expr)),
        }
    }

    /// Substitutes several variables at once. Replacements are not
    /// re-substituted, so `{x: y, y: x}` swaps the two variables.
    pub fn substitute_variables(&self, substitutions: &HashMap<String, Expr>) -> Expr {
        match self {
            Expr::Var(name) => match substitutions.get(name) {
                Some(replacement) => replacement.clone(),
                None => self.clone(),
            },
            _ => self.map_children(|child| child.substitute_variables(substitutions)),
        }
    }

    /// check if the expression contains a variable
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Integral(integrand, var, lower, upper) => {
                (var != var_name && integrand.contains_variable(var_name))
                    || lower.contains_variable(var_name)
                    || upper.contains_variable(var_name)
            }
            _ => self
                .children()
                .into_iter()
                .any(|child| child.contains_variable(var_name)),
        }
    }

    /// Free variables of the expression in alphabetical order.
    pub fn extract_variables(&self) -> Vec<String> {
        let mut vars = BTreeSet::new();
        self.collect_variables(&mut vars);
        vars.into_iter().collect()
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Var(name) => {
                out.insert(name.clone());
            }
            Expr::Integral(integrand, var, lower, upper) => {
                let mut inner = BTreeSet::new();
                integrand.collect_variables(&mut inner);
                inner.remove(var);
                out.extend(inner);
                lower.collect_variables(out);
                upper.collect_variables(out);
            }
            _ => {
                for child in self.children() {
                    child.collect_variables(out);
                }
            }
        }
    }

    /// true when no free variable is left (constants, pi and e only)
    pub fn is_constant(&self) -> bool {
        self.extract_variables().is_empty()
    }

    /// true when an unresolved `Integral` node is still present
    pub fn has_integral(&self) -> bool {
        match self {
            Expr::Integral(..) => true,
            _ => self.children().into_iter().any(|child| child.has_integral()),
        }
    }

    fn power_operand(expr: &Expr) -> String {
        match expr {
            Expr::Var(_) | Expr::Pi | Expr::Euler => expr.to_string(),
            Expr::Const(val) if *val >= 0.0 => expr.to_string(),
            Expr::Add(..) | Expr::Sub(..) | Expr::Div(..) => expr.to_string(),
            _ => format!("({})", expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_variable() {
        let expr = Expr::var("x") * Expr::var("y");
        let substituted = expr.substitute_variable("x", &Expr::Const(3.0));
        assert_eq!(substituted, Expr::Const(3.0) * Expr::var("y"));
    }

    #[test]
    fn test_substitute_variables_is_simultaneous() {
        let expr = Expr::var("x") - Expr::var("y");
        let mut map = HashMap::new();
        map.insert("x".to_string(), Expr::var("y"));
        map.insert("y".to_string(), Expr::var("x"));
        assert_eq!(
            expr.substitute_variables(&map),
            Expr::var("y") - Expr::var("x")
        );
    }

    #[test]
    fn test_extract_variables_skips_bound_integration_variable() {
        let integral = Expr::Integral(
            Box::new(Expr::var("theta") * Expr::var("r")),
            "theta".to_string(),
            Box::new(Expr::Const(0.0)),
            Box::new(Expr::Const(2.0) * Expr::Pi),
        );
        assert_eq!(integral.extract_variables(), vec!["r".to_string()]);
        assert!(integral.contains_variable("r"));
        assert!(!integral.contains_variable("theta"));
        assert!(integral.has_integral());
    }

    #[test]
    fn test_pi_is_constant() {
        let expr = Expr::Const(8.0) * Expr::Pi;
        assert!(expr.is_constant());
        assert!(!expr.has_integral());
    }

    #[test]
    fn test_display() {
        let expr = Expr::var("x").pow(Expr::Const(2.0)) + Expr::var("y").sqrt();
        assert_eq!(expr.to_string(), "(x^2 + sqrt(y))");
        let neg = -Expr::var("x");
        assert_eq!(neg.to_string(), "(-1)*x");
    }

    #[test]
    fn test_display_of_non_finite_constants_parses() {
        let cases = [f64::INFINITY, f64::NEG_INFINITY, f64::NAN];
        for value in cases {
            let printed = Expr::Const(value).to_string();
            let reparsed = Expr::parse_expression(&printed).unwrap().eval_constant().unwrap();
            if value.is_nan() {
                assert!(reparsed.is_nan(), "{}", printed);
            } else {
                assert_eq!(reparsed, value, "{}", printed);
            }
        }
        let power = Expr::var("x").pow(Expr::Const(f64::INFINITY));
        assert_eq!(power.to_string(), "x^(1/0)");
    }
}
