use crate::polar::errors::{Axis, Field, PolarError, Result};
use crate::symbolic::parse_expr::parse_with_variables;
use crate::symbolic::symbolic_engine::Expr;
use log::debug;

/// Free variables a user may type into the form.
pub const FORM_VARIABLES: [&str; 2] = ["x", "y"];

/// Raw text of the five form fields.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegralForm {
    pub integrand: String,
    pub x_lower: String,
    pub x_upper: String,
    pub y_lower: String,
    pub y_upper: String,
}

impl Default for IntegralForm {
    fn default() -> Self {
        Self::new("x**2 + y**2", "0", "4", "0", "4")
    }
}

impl IntegralForm {
    pub fn new(integrand: &str, x_lower: &str, x_upper: &str, y_lower: &str, y_upper: &str) -> Self {
        Self {
            integrand: integrand.to_string(),
            x_lower: x_lower.to_string(),
            x_upper: x_upper.to_string(),
            y_lower: y_lower.to_string(),
            y_upper: y_upper.to_string(),
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Integrand => &self.integrand,
            Field::XLower => &self.x_lower,
            Field::XUpper => &self.x_upper,
            Field::YLower => &self.y_lower,
            Field::YUpper => &self.y_upper,
        }
    }

    pub fn set_field(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::Integrand => &mut self.integrand,
            Field::XLower => &mut self.x_lower,
            Field::XUpper => &mut self.x_upper,
            Field::YLower => &mut self.y_lower,
            Field::YUpper => &mut self.y_upper,
        };
        *slot = value.to_string();
    }
}

/// The integrand and the four limits as symbolic expressions over `x`, `y`.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIntegral {
    pub integrand: Expr,
    pub x_lower: Expr,
    pub x_upper: Expr,
    pub y_lower: Expr,
    pub y_upper: Expr,
}

fn parse_field(form: &IntegralForm, field: Field) -> Result<Expr> {
    parse_with_variables(form.field(field), &FORM_VARIABLES)
        .map_err(|source| PolarError::Parse { field, source })
}

/// Parses every field. Fields are parsed in form order and the first
/// malformed one is reported.
pub fn build_expressions(form: &IntegralForm) -> Result<ParsedIntegral> {
    let parsed = ParsedIntegral {
        integrand: parse_field(form, Field::Integrand)?,
        x_lower: parse_field(form, Field::XLower)?,
        x_upper: parse_field(form, Field::XUpper)?,
        y_lower: parse_field(form, Field::YLower)?,
        y_upper: parse_field(form, Field::YUpper)?,
    };
    debug!(
        "parsed integrand {} over x in [{}, {}], y in [{}, {}]",
        parsed.integrand, parsed.x_lower, parsed.x_upper, parsed.y_lower, parsed.y_upper
    );
    Ok(parsed)
}

/// Lower and upper limit of the same axis must differ symbolically.
pub fn check_limits(parsed: &ParsedIntegral) -> Result<()> {
    if parsed.x_lower.symbolically_equal(&parsed.x_upper) {
        return Err(PolarError::EqualLimits { axis: Axis::X });
    }
    if parsed.y_lower.symbolically_equal(&parsed.y_upper) {
        return Err(PolarError::EqualLimits { axis: Axis::Y });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::parse_expr::ParseError;

    #[test]
    fn test_default_form() {
        let form = IntegralForm::default();
        assert_eq!(form.integrand, "x**2 + y**2");
        assert_eq!(form.field(Field::XUpper), "4");
        let parsed = build_expressions(&form).unwrap();
        assert_eq!(parsed.x_lower, Expr::Const(0.0));
        assert!(check_limits(&parsed).is_ok());
    }

    #[test]
    fn test_first_malformed_field_is_reported() {
        let mut form = IntegralForm::default();
        form.set_field(Field::YLower, "2 +");
        form.set_field(Field::YUpper, "(");
        match build_expressions(&form) {
            Err(PolarError::Parse { field, .. }) => assert_eq!(field, Field::YLower),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_foreign_variable_rejected() {
        let form = IntegralForm::new("x*z", "0", "1", "0", "1");
        match build_expressions(&form) {
            Err(PolarError::Parse { field, source }) => {
                assert_eq!(field, Field::Integrand);
                assert_eq!(source, ParseError::UnknownIdentifier("z".to_string()));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_equal_limits() {
        let form = IntegralForm::new("x", "1", "1.0", "0", "2");
        let parsed = build_expressions(&form).unwrap();
        assert!(matches!(
            check_limits(&parsed),
            Err(PolarError::EqualLimits { axis: Axis::X })
        ));

        let form = IntegralForm::new("x", "0", "1", "sqrt(4 - x**2)", "sqrt(-x^2 + 4)");
        let parsed = build_expressions(&form).unwrap();
        assert!(matches!(
            check_limits(&parsed),
            Err(PolarError::EqualLimits { axis: Axis::Y })
        ));
    }

    #[test]
    fn test_close_limits_are_distinct() {
        let form = IntegralForm::new("x", "0", "1e-13", "0", "1");
        let parsed = build_expressions(&form).unwrap();
        assert!(check_limits(&parsed).is_ok());

        let form = IntegralForm::new("x", "0", "1", "y", "y + 1e-15");
        let parsed = build_expressions(&form).unwrap();
        assert!(check_limits(&parsed).is_ok());
    }

    #[test]
    fn test_symmetric_limits_are_distinct() {
        let form = IntegralForm::new("1", "-sqrt(4 - y**2)", "sqrt(4 - y**2)", "-2", "2");
        let parsed = build_expressions(&form).unwrap();
        assert!(check_limits(&parsed).is_ok());
    }
}
