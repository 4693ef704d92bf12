//! Turns a String expression into a symbolic expression.
//!
//! The grammar follows what people type into a calculator field:
//! `x**2 + y^2`, `-sqrt(4 - y**2)`, `exp(-x^2 - y^2)`, `2*pi`.
//!
//! ```text
//!   expr   := term (('+' | '-') term)*
//!   term   := unary (('*' | '/') unary)*
//!   unary  := '-' unary | '+' unary | power
//!   power  := atom (('**' | '^') unary)?
//!   atom   := number | function '(' expr ')' | constant | variable | '(' expr ')'
//! ```
//! Power is right associative and binds tighter than unary minus, so
//! `-x**2` is `-(x**2)` and `2**3**2` is `2**(3**2)`.
//!
//!# Example
//! ```
//! use RustedPolar::symbolic::parse_expr::parse_with_variables;
//! let f = parse_with_variables("x**2 + y**2", &["x", "y"]).unwrap();
//! let func = f.lambdify_borrowed_thread_safe(&["x", "y"]);
//! assert_eq!(func(&[1.0, 2.0]), 5.0);
//! ```
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::utils::{BracketBalance, bracket_balance};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of},
    combinator::{map_res, opt, recognize},
    multi::many0,
    sequence::{delimited, pair, preceded},
};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Variables accepted when no explicit list is given
pub const DEFAULT_VARIABLES: [&str; 4] = ["x", "y", "r", "theta"];

/// Recognised function names. Aliases map onto the same tree node.
pub const FUNCTIONS: [&str; 19] = [
    "sin", "cos", "tan", "tg", "cot", "ctg", "asin", "arcsin", "acos", "arccos", "atan", "arctan",
    "arctg", "acot", "arcctg", "exp", "log", "ln", "sqrt",
];

pub const CONSTANTS: [&str; 2] = ["pi", "E"];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("expression is empty")]
    Empty,
    #[error("unbalanced parentheses")]
    UnbalancedParentheses,
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),
    #[error("unexpected input at position {position}: '{found}'")]
    UnexpectedInput { position: usize, found: String },
}

fn identifier_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[^A-Za-z0-9_.])([A-Za-z_][A-Za-z0-9_]*)")
            .expect("identifier pattern is a valid regex")
    })
}

fn apply_function(name: &str, arg: Expr) -> Option<Expr> {
    let expr = match name {
        "sin" => Expr::sin(arg.boxed()),
        "cos" => Expr::cos(arg.boxed()),
        "tan" | "tg" => Expr::tg(arg.boxed()),
        "cot" | "ctg" => Expr::ctg(arg.boxed()),
        "asin" | "arcsin" => Expr::arcsin(arg.boxed()),
        "acos" | "arccos" => Expr::arccos(arg.boxed()),
        "atan" | "arctan" | "arctg" => Expr::arctg(arg.boxed()),
        "acot" | "arcctg" => Expr::arcctg(arg.boxed()),
        "exp" => Expr::Exp(arg.boxed()),
        "log" | "ln" => Expr::Ln(arg.boxed()),
        "sqrt" => arg.sqrt(),
        _ => return None,
    };
    Some(expr)
}

fn ws<'a, O, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    F: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

/// Parses an unsigned decimal number: `2`, `2.5`, `.5`, `1e-3`
fn parse_number(input: &str) -> IResult<&str, Expr> {
    let mantissa = alt((
        recognize(pair(digit1, opt(pair(char('.'), digit0)))),
        recognize(pair(char('.'), digit1)),
    ));
    let exponent = opt(recognize((one_of("eE"), opt(one_of("+-")), digit1)));
    let mut parser = map_res(recognize(pair(mantissa, exponent)), |s: &str| {
        s.parse::<f64>().map(Expr::Const)
    });
    parser.parse(input)
}

/// Parses an identifier (word characters without spaces)
fn parse_identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ))
    .parse(input)
}

/// function call, named constant or variable
fn parse_named(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = parse_identifier(input)?;
    if FUNCTIONS.contains(&name) {
        let (rest, arg) = delimited(ws(char('(')), parse_sum, ws(char(')'))).parse(rest)?;
        return match apply_function(name, arg) {
            Some(expr) => Ok((rest, expr)),
            None => Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Verify,
            ))),
        };
    }
    let expr = match name {
        "pi" => Expr::Pi,
        "E" => Expr::Euler,
        _ => Expr::Var(name.to_string()),
    };
    Ok((rest, expr))
}

fn parse_atom(input: &str) -> IResult<&str, Expr> {
    ws(alt((
        parse_number,
        parse_named,
        delimited(char('('), parse_sum, char(')')),
    )))
    .parse(input)
}

fn parse_power(input: &str) -> IResult<&str, Expr> {
    let (input, base) = parse_atom(input)?;
    let (input, exponent) =
        opt(preceded(ws(alt((tag("**"), tag("^")))), parse_unary)).parse(input)?;
    match exponent {
        Some(exponent) => Ok((input, base.pow(exponent))),
        None => Ok((input, base)),
    }
}

fn parse_unary(input: &str) -> IResult<&str, Expr> {
    let (rest, sign) = opt(ws(one_of("+-"))).parse(input)?;
    match sign {
        Some('-') => {
            let (rest, operand) = parse_unary(rest)?;
            let negated = match operand {
                Expr::Const(val) => Expr::Const(-val),
                other => -other,
            };
            Ok((rest, negated))
        }
        Some(_) => parse_unary(rest),
        None => parse_power(input),
    }
}

fn parse_product(input: &str) -> IResult<&str, Expr> {
    let (input, first) = parse_unary(input)?;
    // a lone '*' only, '**' belongs to the power rule
    let operator = alt((
        recognize(pair(char('*'), nom::combinator::not(char('*')))),
        tag("/"),
    ));
    let (input, rest) = many0(pair(ws(operator), parse_unary)).parse(input)?;
    let product = rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        "/" => acc / rhs,
        _ => acc * rhs,
    });
    Ok((input, product))
}

fn parse_sum(input: &str) -> IResult<&str, Expr> {
    let (input, first) = parse_product(input)?;
    let (input, rest) = many0(pair(ws(one_of("+-")), parse_product)).parse(input)?;
    let sum = rest.into_iter().fold(first, |acc, (op, rhs)| match op {
        '+' => acc + rhs,
        _ => acc - rhs,
    });
    Ok((input, sum))
}

fn unexpected_at(source: &str, rest: &str) -> ParseError {
    let byte_offset = source.len() - rest.len();
    let found: String = rest.trim().chars().take(16).collect();
    ParseError::UnexpectedInput {
        position: source[..byte_offset].chars().count(),
        found: if found.is_empty() {
            "end of input".to_string()
        } else {
            found
        },
    }
}

/// Parses `input` and checks that every free variable is one of `variables`.
pub fn parse_with_variables(input: &str, variables: &[&str]) -> Result<Expr, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::Empty);
    }
    if bracket_balance(input) != BracketBalance::Balanced {
        return Err(ParseError::UnbalancedParentheses);
    }
    for captures in identifier_regex().captures_iter(input) {
        let name = &captures[1];
        let known = FUNCTIONS.contains(&name)
            || CONSTANTS.contains(&name)
            || variables.contains(&name);
        if !known {
            return Err(ParseError::UnknownIdentifier(name.to_string()));
        }
    }
    match parse_sum(input) {
        Ok((rest, expr)) => {
            if !rest.trim().is_empty() {
                return Err(unexpected_at(input, rest));
            }
            // second check on the built tree
            if let Some(name) = expr
                .extract_variables()
                .into_iter()
                .find(|name| !variables.contains(&name.as_str()))
            {
                return Err(ParseError::UnknownIdentifier(name));
            }
            Ok(expr)
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(unexpected_at(input, e.input)),
        Err(nom::Err::Incomplete(_)) => Err(ParseError::UnexpectedInput {
            position: input.chars().count(),
            found: "end of input".to_string(),
        }),
    }
}

impl Expr {
    /// Parses an expression over the default variable set (`x`, `y`, `r`, `theta`).
    pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
        parse_with_variables(input, &DEFAULT_VARIABLES)
    }
}
