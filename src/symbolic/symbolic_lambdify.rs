use crate::symbolic::symbolic_engine::Expr;
use std::f64::consts::{E, PI};

impl Expr {
    /// LAMBDIFICATION - Converting Symbolic Expressions to Executable Functions

    /// Compiles the expression into a thread safe closure over `vars`.
    ///
    /// # Panics
    /// when the expression has a free variable missing from `vars` or still
    /// holds an unresolved integral. Use [`Expr::compile`] to get an error instead.
    #[inline(always)]
    pub fn lambdify_borrowed_thread_safe(
        &self,
        vars: &[&str],
    ) -> Box<dyn Fn(&[f64]) -> f64 + Send + Sync> {
        match self.compile(vars) {
            Ok(compiled) => Box::new(compiled.as_closure()),
            Err(message) => panic!("lambdify failed: {}", message),
        }
    }

    /// Evaluates an expression without free variables.
    pub fn eval_constant(&self) -> Result<f64, String> {
        let vars = self.extract_variables();
        if !vars.is_empty() {
            return Err(format!("expression {} depends on {:?}", self, vars));
        }
        Ok(self.compile(&[])?.eval(&[]))
    }
}

/// Expression tree with variables resolved to argument slots.
#[derive(Clone, Debug)]
pub enum Lambda {
    Var(usize),
    Const(f64),
    Add(Box<Lambda>, Box<Lambda>),
    Sub(Box<Lambda>, Box<Lambda>),
    Mul(Box<Lambda>, Box<Lambda>),
    Div(Box<Lambda>, Box<Lambda>),
    Pow(Box<Lambda>, Box<Lambda>),
    Exp(Box<Lambda>),
    Ln(Box<Lambda>),
    Sin(Box<Lambda>),
    Cos(Box<Lambda>),
    Tg(Box<Lambda>),
    Ctg(Box<Lambda>),
    ArcSin(Box<Lambda>),
    ArcCos(Box<Lambda>),
    ArcTg(Box<Lambda>),
    ArcCtg(Box<Lambda>),
}

impl Expr {
    pub fn compile(&self, vars: &[&str]) -> Result<Lambda, String> {
        let unary = |e: &Expr| -> Result<Box<Lambda>, String> { Ok(Box::new(e.compile(vars)?)) };
        let lambda = match self {
            Expr::Var(name) => {
                let idx = vars
                    .iter()
                    .position(|&v| v == name)
                    .ok_or_else(|| format!("variable {} is not among {:?}", name, vars))?;
                Lambda::Var(idx)
            }
            Expr::Const(v) => Lambda::Const(*v),
            Expr::Pi => Lambda::Const(PI),
            Expr::Euler => Lambda::Const(E),
            Expr::Add(a, b) => Lambda::Add(unary(a)?, unary(b)?),
            Expr::Sub(a, b) => Lambda::Sub(unary(a)?, unary(b)?),
            Expr::Mul(a, b) => Lambda::Mul(unary(a)?, unary(b)?),
            Expr::Div(a, b) => Lambda::Div(unary(a)?, unary(b)?),
            Expr::Pow(a, b) => Lambda::Pow(unary(a)?, unary(b)?),
            Expr::Exp(e) => Lambda::Exp(unary(e)?),
            Expr::Ln(e) => Lambda::Ln(unary(e)?),
            Expr::sin(e) => Lambda::Sin(unary(e)?),
            Expr::cos(e) => Lambda::Cos(unary(e)?),
            Expr::tg(e) => Lambda::Tg(unary(e)?),
            Expr::ctg(e) => Lambda::Ctg(unary(e)?),
            Expr::arcsin(e) => Lambda::ArcSin(unary(e)?),
            Expr::arccos(e) => Lambda::ArcCos(unary(e)?),
            Expr::arctg(e) => Lambda::ArcTg(unary(e)?),
            Expr::arcctg(e) => Lambda::ArcCtg(unary(e)?),
            Expr::Integral(..) => {
                return Err(format!("unresolved integral {} cannot be compiled", self));
            }
        };
        Ok(lambda)
    }
}

impl Lambda {
    #[inline(always)]
    pub fn eval(&self, args: &[f64]) -> f64 {
        match self {
            Lambda::Var(i) => args[*i],
            Lambda::Const(v) => *v,
            Lambda::Add(a, b) => a.eval(args) + b.eval(args),
            Lambda::Sub(a, b) => a.eval(args) - b.eval(args),
            Lambda::Mul(a, b) => a.eval(args) * b.eval(args),
            Lambda::Div(a, b) => a.eval(args) / b.eval(args),
            Lambda::Pow(a, b) => pow_real(a.eval(args), b.eval(args)),
            Lambda::Exp(e) => e.eval(args).exp(),
            Lambda::Ln(e) => e.eval(args).ln(),
            Lambda::Sin(e) => e.eval(args).sin(),
            Lambda::Cos(e) => e.eval(args).cos(),
            Lambda::Tg(e) => e.eval(args).tan(),
            Lambda::Ctg(e) => 1.0 / e.eval(args).tan(),
            Lambda::ArcSin(e) => e.eval(args).asin(),
            Lambda::ArcCos(e) => e.eval(args).acos(),
            Lambda::ArcTg(e) => e.eval(args).atan(),
            Lambda::ArcCtg(e) => (PI / 2.0) - e.eval(args).atan(),
        }
    }

    pub fn as_closure(self) -> impl Fn(&[f64]) -> f64 + Send + Sync {
        move |args| self.eval(args)
    }
}

// integer powers go through powi so that (-2)^2 stays real
#[inline(always)]
fn pow_real(base: f64, exponent: f64) -> f64 {
    if exponent.fract() == 0.0 && exponent.abs() <= i32::MAX as f64 {
        base.powi(exponent as i32)
    } else {
        base.powf(exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_polynomial_and_trigonometric() {
        let x = Expr::var("x");
        let expr = x.clone() * x.clone() + x.clone() * Expr::Const(2.0) + Expr::Const(1.0); // x^2 + 2x + 1
        let func = expr.lambdify_borrowed_thread_safe(&["x"]);
        assert_eq!(func(&[3.0]), 16.0);
        let sin = Expr::sin(Box::new(x)).compile(&["x"]).unwrap();
        assert!((sin.eval(&[0.0]) - 0.0).abs() < 1e-10);
        assert!((sin.eval(&[PI / 2.0]) - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_negative_base_integer_power() {
        let expr = Expr::var("x").pow(Expr::Const(2.0));
        let f = expr.lambdify_borrowed_thread_safe(&["x"]);
        assert_eq!(f(&[-2.0]), 4.0);
        let cube_root = Expr::var("x").pow(Expr::Const(1.0 / 3.0));
        assert!(cube_root.lambdify_borrowed_thread_safe(&["x"])(&[-8.0]).is_nan());
    }

    #[test]
    fn test_constants_and_eval_constant() {
        let expr = Expr::Const(8.0) * Expr::Pi;
        assert_relative_eq!(expr.eval_constant().unwrap(), 8.0 * PI);
        assert_relative_eq!(Expr::Euler.eval_constant().unwrap(), E);
        assert!(Expr::var("y").eval_constant().is_err());
    }

    #[test]
    fn test_compile_reports_missing_variable_and_integral() {
        assert!(Expr::var("theta").compile(&["r"]).is_err());
        let integral = Expr::Integral(
            Expr::var("r").boxed(),
            "r".to_string(),
            Expr::Const(0.0).boxed(),
            Expr::Const(1.0).boxed(),
        );
        assert!(integral.compile(&[]).is_err());
    }

    #[test]
    fn test_argument_order_follows_vars() {
        let expr = Expr::var("r") - Expr::var("theta");
        let f = expr.lambdify_borrowed_thread_safe(&["theta", "r"]);
        assert_eq!(f(&[1.0, 5.0]), 4.0);
    }
}
