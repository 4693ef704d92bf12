#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedPolar::symbolic::symbolic_engine::Expr;
/// let input = "x**2 + y**2";
/// let parsed_expression = Expr::parse_expression(input).unwrap();
/// println!(" parsed_expression {}", parsed_expression);
/// let parsed_function = parsed_expression.lambdify_borrowed_thread_safe(&["x", "y"]);
/// assert_eq!(parsed_function(&[1.0, 2.0]), 5.0);
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// the expression tree and the operations on it:
/// 1) building expressions with operators
/// 2) substitution of variables by other expressions
/// 3) printing in a form the parser accepts again
///# Example#
/// ```
/// use RustedPolar::symbolic::symbolic_engine::Expr;
/// use std::collections::HashMap;
/// let f = Expr::parse_expression("x*y").unwrap();
/// let mut rule = HashMap::new();
/// rule.insert("x".to_string(), Expr::parse_expression("r*cos(theta)").unwrap());
/// rule.insert("y".to_string(), Expr::parse_expression("r*sin(theta)").unwrap());
/// let polar = f.substitute_variables(&rule);
/// println!("{}", polar);
/// assert_eq!(polar.extract_variables(), vec!["r".to_string(), "theta".to_string()]);
/// ```
/// ________________________________________________________________________________________________________________________________________________
pub mod symbolic_engine;
/// turning symbolic expressions into Rust closures
pub mod symbolic_lambdify;
/// canonical sum-of-products simplification
pub mod symbolic_simplify;
///______________________________________________________________________________________________________________________________________________
/// symbolic (indefinite and definite) integration
/// Example#
/// ```
/// use RustedPolar::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("r^3*cos(theta)^2 + r^3*sin(theta)^2").unwrap();
/// let inner = f.definite_integral("theta", &Expr::Const(0.0), &(Expr::Const(2.0) * Expr::Pi));
/// let outer = inner.definite_integral("r", &Expr::Const(0.0), &Expr::Const(2.0));
/// assert_eq!(outer.to_string(), "8*pi");
/// ```
pub mod symbolic_integration;
/// LaTeX output
pub mod symbolic_latex;
///______________________________________________________________________________________________________________________________________________
/// bracket checks and numeric helpers
/// _____________________________________________________________________________________________________________________________________________
pub mod utils;
