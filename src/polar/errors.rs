use crate::symbolic::parse_expr::ParseError;
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

/// The five text fields of the integral form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    #[strum(to_string = "integrand", serialize = "f")]
    Integrand,
    XLower,
    XUpper,
    YLower,
    YUpper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Axis {
    #[strum(serialize = "x")]
    X,
    #[strum(serialize = "y")]
    Y,
}

#[derive(Error, Debug)]
pub enum PolarError {
    #[error("invalid expression in '{field}': {source}")]
    Parse {
        field: Field,
        #[source]
        source: ParseError,
    },
    #[error("limits cannot be equal: lower and upper {axis} limits are the same")]
    EqualLimits { axis: Axis },
    #[error("integration failed: {0}")]
    Integration(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("export error: {0}")]
    Export(String),
}

pub type Result<T> = std::result::Result<T, PolarError>;

/// Non-fatal problems reported next to a successful result.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// the sample grid could not be evaluated, the plot is missing or partial
    PlotEvaluation(String),
    /// the result could not be turned into a finite number
    ResultCoercion(String),
    /// quadrature estimates at two degrees disagree, the integral may diverge
    QuadratureDisagreement { coarse: f64, fine: f64 },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::PlotEvaluation(msg) => write!(f, "could not evaluate the plot: {}", msg),
            Warning::ResultCoercion(msg) => {
                write!(f, "result shown in symbolic form: {}", msg)
            }
            Warning::QuadratureDisagreement { coarse, fine } => write!(
                f,
                "quadrature estimates {} and {} disagree, the integral may diverge",
                coarse, fine
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_field_names() {
        assert_eq!(Field::XLower.to_string(), "x_lower");
        assert_eq!(Field::from_str("y_upper").unwrap(), Field::YUpper);
        assert_eq!(Field::from_str("f").unwrap(), Field::Integrand);
    }

    #[test]
    fn test_error_messages() {
        let err = PolarError::EqualLimits { axis: Axis::Y };
        assert_eq!(
            err.to_string(),
            "limits cannot be equal: lower and upper y limits are the same"
        );
        let err = PolarError::Parse {
            field: Field::Integrand,
            source: ParseError::Empty,
        };
        assert_eq!(err.to_string(), "invalid expression in 'integrand': expression is empty");
        let warning = Warning::QuadratureDisagreement { coarse: 1.5, fine: 2.5 };
        assert_eq!(
            warning.to_string(),
            "quadrature estimates 1.5 and 2.5 disagree, the integral may diverge"
        );
    }
}
