use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_simplify::{MAX_EXPANDED_POWER, Term, TermSum};
use log::debug;

/// Highest power of `v` integrated by parts against sin, cos or exp.
const MAX_BY_PARTS_DEGREE: u32 = 64;

/// Functions whose repeated antiderivatives stay in closed form.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Harmonic {
    Sin,
    Cos,
    Exp,
}

impl Harmonic {
    fn of(expr: &Expr) -> Option<(Harmonic, &Expr)> {
        match expr {
            Expr::sin(arg) => Some((Harmonic::Sin, arg)),
            Expr::cos(arg) => Some((Harmonic::Cos, arg)),
            Expr::Exp(arg) => Some((Harmonic::Exp, arg)),
            _ => None,
        }
    }

    fn build(self, arg: Expr) -> Expr {
        match self {
            Harmonic::Sin => Expr::sin(arg.boxed()),
            Harmonic::Cos => Expr::cos(arg.boxed()),
            Harmonic::Exp => Expr::Exp(arg.boxed()),
        }
    }

    /// ∫ g(u) du = sign * next(u)
    fn antiderivative(self) -> (Harmonic, f64) {
        match self {
            Harmonic::Sin => (Harmonic::Cos, -1.0),
            Harmonic::Cos => (Harmonic::Sin, 1.0),
            Harmonic::Exp => (Harmonic::Exp, 1.0),
        }
    }
}

/// `slope * var + intercept` with both parts free of `var`
fn linear_parts(arg: &Expr, var: &str) -> Option<(Expr, Expr)> {
    let v = Expr::var(var);
    let mut slope = TermSum::zero();
    let mut intercept = TermSum::zero();
    for term in TermSum::from_expr(arg).into_terms() {
        match term.exponent_of(&v) {
            0 if !term.contains_variable(var) => intercept.add_term(term),
            1 => {
                let rest = term.mul(&Term::atom(v.clone(), -1));
                if rest.contains_variable(var) {
                    return None;
                }
                slope.add_term(rest);
            }
            _ => return None,
        }
    }
    if slope.is_zero() {
        return None;
    }
    Some((slope.to_expr(), intercept.to_expr()))
}

/// exponent `p` when `expr` is `var^p` kept as an atom (e.g. `sqrt(var)`)
fn power_of_var(expr: &Expr, var: &str) -> Option<f64> {
    match expr {
        Expr::Pow(base, exp) => match (base.as_ref(), exp.as_ref()) {
            (Expr::Var(name), Expr::Const(p)) if name == var => Some(*p),
            _ => None,
        },
        _ => None,
    }
}

fn non_negative_integer(p: f64) -> Option<u32> {
    if p >= 0.0 && p.fract() == 0.0 && p <= u32::MAX as f64 {
        Some(p as u32)
    } else {
        None
    }
}

impl Expr {
    /// SYMBOLIC INTEGRATION

    /// Main integration method - integrates with respect to a variable
    /// Returns the indefinite integral (without constant of integration).
    ///
    /// The integrand is expanded into a sum of products first and every term is
    /// integrated by rule:
    /// - `c`, `v^p` (`p != -1`), `1/v`
    /// - `v^n * exp(a*v + b)`, `v^n * sin(a*v + b)`, `v^n * cos(a*v + b)` for integer `n >= 0`
    /// - products of integer powers of `sin` and `cos` of linear arguments
    ///   (linearised with product-to-sum identities), optionally times `v^n`
    /// - `ln(a*v + b)`, `v^p * ln(v)`, `tg`, `ctg` of linear arguments
    /// - `arcsin(v)`, `arccos(v)`, `arctg(v)`, `arcctg(v)`
    ///
    /// Factors free of `v` are pulled out, symbolic ones included.
    pub fn integrate(&self, var: &str) -> Result<Expr, String> {
        let mut result = TermSum::zero();
        for term in self.expand_terms() {
            let integrated = integrate_term(&term, var)?;
            result = result.add(&TermSum::from_expr(&integrated));
        }
        Ok(result.to_expr())
    }

    /// Exact definite integral over `[lower, upper]`.
    ///
    /// Terms without an antiderivative rule are gathered into one unresolved
    /// [`Expr::Integral`] node, so the result is always an expression. Use
    /// [`Expr::has_integral`] to see whether everything was resolved.
    pub fn definite_integral(&self, var: &str, lower: &Expr, upper: &Expr) -> Expr {
        let mut resolved = TermSum::zero();
        let mut unresolved: Vec<Expr> = Vec::new();
        for term in self.expand_terms() {
            match definite_term(&term, var, lower, upper) {
                Ok(value) => resolved = resolved.add(&TermSum::from_expr(&value)),
                Err(reason) => {
                    debug!("term left unresolved: {}", reason);
                    unresolved.push(term.to_expr());
                }
            }
        }
        if let Some(integrand) = unresolved.into_iter().reduce(|a, b| a + b) {
            let node = Expr::Integral(
                integrand.boxed(),
                var.to_string(),
                lower.clone().boxed(),
                upper.clone().boxed(),
            );
            resolved.add_term(Term::atom(node, 1));
        }
        resolved.to_expr()
    }
}

fn definite_term(term: &Term, var: &str, lower: &Expr, upper: &Expr) -> Result<Expr, String> {
    let antiderivative = integrate_term(term, var)?;
    let at = |bound: &Expr| -> Result<Expr, String> {
        let value = antiderivative.substitute_variable(var, bound).simplify();
        if value.is_constant() && !value.has_integral() {
            let number = value.eval_constant()?;
            if !number.is_finite() {
                return Err(format!(
                    "antiderivative {} is not finite at {} = {}",
                    antiderivative, var, bound
                ));
            }
        }
        Ok(value)
    };
    let upper_value = at(upper)?;
    let lower_value = at(lower)?;
    Ok((upper_value - lower_value).simplify())
}

fn integrate_term(term: &Term, var: &str) -> Result<Expr, String> {
    let v = Expr::var(var);
    let mut constant = Term::constant(term.coeff);
    let mut power = 0.0_f64;
    let mut others: Vec<(Expr, i32)> = Vec::new();
    for (atom, exp) in term.factors.values() {
        if !atom.contains_variable(var) {
            constant = constant.mul(&Term::atom(atom.clone(), *exp));
        } else if *atom == v {
            power += *exp as f64;
        } else if let Some(p) = power_of_var(atom, var) {
            power += p * *exp as f64;
        } else {
            others.push((atom.clone(), *exp));
        }
    }
    let body = match others.as_slice() {
        [] => integrate_power_simple(power, var),
        [(factor, 1)] => integrate_with_power(power, factor, var)?,
        _ if others
            .iter()
            .all(|(f, e)| *e > 0 && matches!(f, Expr::sin(_) | Expr::cos(_))) =>
        {
            integrate_trig_product(power, &others, var)?
        }
        _ => return Err(format!("Cannot integrate term: {}", term.to_expr())),
    };
    Ok(constant.to_expr() * body)
}

/// ∫ v^p dv
fn integrate_power_simple(p: f64, var: &str) -> Expr {
    let v = Expr::var(var);
    if p == -1.0 {
        v.ln()
    } else if p == 0.0 {
        v
    } else {
        v.pow(Expr::Const(p + 1.0)) / Expr::Const(p + 1.0)
    }
}

/// ∫ v^p * f dv for a single transcendental factor f
fn integrate_with_power(p: f64, factor: &Expr, var: &str) -> Result<Expr, String> {
    let v = Expr::var(var);
    let fail = || format!("Cannot integrate: {}^{} * {}", var, p, factor);

    if let Some((kind, arg)) = Harmonic::of(factor) {
        let (slope, _) = linear_parts(arg, var).ok_or_else(fail)?;
        let n = non_negative_integer(p)
            .filter(|n| *n <= MAX_BY_PARTS_DEGREE)
            .ok_or_else(fail)?;
        return Ok(integrate_xn_times_harmonic(n, kind, arg, &slope, var));
    }

    match factor {
        Expr::Ln(arg) if **arg == v => {
            if p == -1.0 {
                // ∫ ln(v)/v dv = ln(v)^2 / 2
                Ok(factor.clone().pow(Expr::Const(2.0)) / Expr::Const(2.0))
            } else {
                Ok(integrate_xn_times_ln_x(p, var))
            }
        }
        Expr::Ln(arg) if p == 0.0 => {
            // ∫ ln(u) dv = (u ln(u) - u) / a
            let (slope, _) = linear_parts(arg, var).ok_or_else(fail)?;
            let u = arg.as_ref().clone();
            Ok((u.clone() * factor.clone() - u) / slope)
        }
        Expr::tg(arg) if p == 0.0 => {
            let (slope, _) = linear_parts(arg, var).ok_or_else(fail)?;
            let cos = Expr::cos(arg.clone());
            Ok(-cos.ln() / slope)
        }
        Expr::ctg(arg) if p == 0.0 => {
            let (slope, _) = linear_parts(arg, var).ok_or_else(fail)?;
            let sin = Expr::sin(arg.clone());
            Ok(sin.ln() / slope)
        }
        Expr::arcsin(arg) if p == 0.0 && **arg == v => {
            let root = (Expr::Const(1.0) - v.clone().pow(Expr::Const(2.0))).sqrt();
            Ok(v * factor.clone() + root)
        }
        Expr::arccos(arg) if p == 0.0 && **arg == v => {
            let root = (Expr::Const(1.0) - v.clone().pow(Expr::Const(2.0))).sqrt();
            Ok(v * factor.clone() - root)
        }
        Expr::arctg(arg) if p == 0.0 && **arg == v => {
            let log = (Expr::Const(1.0) + v.clone().pow(Expr::Const(2.0))).ln();
            Ok(v * factor.clone() - log / Expr::Const(2.0))
        }
        Expr::arcctg(arg) if p == 0.0 && **arg == v => {
            let log = (Expr::Const(1.0) + v.clone().pow(Expr::Const(2.0))).ln();
            Ok(v * factor.clone() + log / Expr::Const(2.0))
        }
        _ => Err(fail()),
    }
}

/// Tabular integration by parts:
/// ∫ v^n g(u) dv = Σ_k (-1)^k n!/(n-k)! v^(n-k) G_(k+1)(u) / a^(k+1), u = a*v + b
fn integrate_xn_times_harmonic(n: u32, kind: Harmonic, arg: &Expr, slope: &Expr, var: &str) -> Expr {
    let v = Expr::var(var);
    let mut result = Expr::Const(0.0);
    let mut falling = 1.0;
    let mut current = (kind, 1.0);
    for k in 0..=n {
        let (next, step_sign) = current.0.antiderivative();
        current = (next, current.1 * step_sign);
        let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
        let g = current.0.build(arg.clone());
        let term = Expr::Const(sign * falling * current.1)
            * v.clone().pow(Expr::Const((n - k) as f64))
            * g
            / slope.clone().pow(Expr::Const((k + 1) as f64));
        result = result + term;
        falling *= (n - k) as f64;
    }
    result
}

/// ∫ v^p ln(v) dv = v^(p+1) * (ln(v)/(p+1) - 1/(p+1)^2)
fn integrate_xn_times_ln_x(p: f64, var: &str) -> Expr {
    let v = Expr::var(var);
    let q = p + 1.0;
    v.clone().pow(Expr::Const(q)) * (v.ln() / Expr::Const(q) - Expr::Const(1.0 / (q * q)))
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Trig {
    Sin,
    Cos,
}

/// c * trig(arg); None stands for the constant c
type Harmonic1 = (f64, Option<(Trig, TermSum)>);

fn product_to_sum(c: f64, a: (Trig, &TermSum), b: (Trig, &TermSum)) -> Vec<Harmonic1> {
    let difference = a.1.add(&b.1.scale(-1.0));
    let sum = a.1.add(b.1);
    let half = c / 2.0;
    match (a.0, b.0) {
        (Trig::Sin, Trig::Sin) => vec![
            (half, Some((Trig::Cos, difference))),
            (-half, Some((Trig::Cos, sum))),
        ],
        (Trig::Cos, Trig::Cos) => vec![
            (half, Some((Trig::Cos, difference))),
            (half, Some((Trig::Cos, sum))),
        ],
        (Trig::Sin, Trig::Cos) => vec![
            (half, Some((Trig::Sin, sum))),
            (half, Some((Trig::Sin, difference))),
        ],
        (Trig::Cos, Trig::Sin) => vec![
            (half, Some((Trig::Sin, sum))),
            (-half, Some((Trig::Sin, difference))),
        ],
    }
}

/// ∫ v^n * Π sin/cos(...)^k dv through product-to-sum linearisation
fn integrate_trig_product(p: f64, factors: &[(Expr, i32)], var: &str) -> Result<Expr, String> {
    let total: i64 = factors.iter().map(|(_, exp)| i64::from(*exp)).sum();
    if total > i64::from(MAX_EXPANDED_POWER) {
        return Err(format!(
            "trigonometric product of degree {} is too large to linearise",
            total
        ));
    }
    let mut combos: Vec<Harmonic1> = vec![(1.0, None)];
    for (factor, exp) in factors {
        let (trig, arg) = match factor {
            Expr::sin(arg) => (Trig::Sin, arg),
            Expr::cos(arg) => (Trig::Cos, arg),
            _ => return Err(format!("Cannot linearise {}", factor)),
        };
        if linear_parts(arg, var).is_none() {
            return Err(format!("Cannot linearise {}: argument is not linear in {}", factor, var));
        }
        let arg = TermSum::from_expr(arg);
        for _ in 0..*exp {
            combos = combos
                .into_iter()
                .flat_map(|(c, current)| match current {
                    None => vec![(c, Some((trig, arg.clone())))],
                    Some((t0, a0)) => product_to_sum(c, (t0, &a0), (trig, &arg)),
                })
                .collect();
        }
    }
    let linearised = combos
        .into_iter()
        .map(|(c, harmonic)| match harmonic {
            None => Expr::Const(c),
            Some((Trig::Sin, arg)) => Expr::Const(c) * Expr::sin(arg.to_expr().boxed()),
            Some((Trig::Cos, arg)) => Expr::Const(c) * Expr::cos(arg.to_expr().boxed()),
        })
        .reduce(|a, b| a + b)
        .unwrap_or(Expr::Const(0.0));
    let polynomial = Expr::var(var).pow(Expr::Const(p));
    (polynomial * linearised).integrate(var)
}
