use crate::polar::errors::Field;
use crate::polar::expression_builder::IntegralForm;
use crate::polar::pipeline::{ComputeOptions, ComputeReport, compute};
use log::{error, info};
use strum_macros::{Display, EnumIter, EnumString};

/// Ready-made inputs for the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Example {
    /// x^2 + y^2 over the disc of radius 2, exactly 8*pi
    Circle,
    /// exp(-(x^2 + y^2)), no closed form in theta, goes to quadrature
    GaussianBell,
}

impl Example {
    pub fn form(&self) -> IntegralForm {
        match self {
            Example::Circle => {
                IntegralForm::new("x**2 + y**2", "-sqrt(4 - y**2)", "sqrt(4 - y**2)", "-2", "2")
            }
            Example::GaussianBell => {
                IntegralForm::new("exp(-(x**2 + y**2))", "-sqrt(4 - y**2)", "sqrt(4 - y**2)", "-2", "2")
            }
        }
    }
}

impl IntegralForm {
    pub fn circle_example() -> Self {
        Example::Circle.form()
    }
}

/// Outcome of pressing "compute".
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Computed(Box<ComputeReport>),
    /// the one message shown to the user, nothing else is produced
    Failed(String),
}

/// Current field values and options between actions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    pub form: IntegralForm,
    pub options: ComputeOptions,
}

impl FormState {
    pub fn new(form: IntegralForm, options: ComputeOptions) -> Self {
        Self { form, options }
    }

    pub fn load_example(&mut self, example: Example) {
        info!("loading example {}", example);
        self.form = example.form();
    }

    pub fn set_field(&mut self, field: Field, value: &str) {
        self.form.set_field(field, value);
    }

    pub fn submit(&self) -> Submission {
        match compute(&self.form, &self.options) {
            Ok(report) => Submission::Computed(Box::new(report)),
            Err(err) => {
                error!("{}", err);
                Submission::Failed(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polar::evaluator::EvaluationTier;
    use strum::IntoEnumIterator;

    #[test]
    fn test_load_example_prefills_fields() {
        let mut state = FormState::default();
        assert_eq!(state.form, IntegralForm::default());
        state.load_example(Example::Circle);
        assert_eq!(state.form.field(Field::XLower), "-sqrt(4 - y**2)");
        assert_eq!(state.form.field(Field::YUpper), "2");
        assert_eq!(state.form, IntegralForm::circle_example());
    }

    #[test]
    fn test_every_example_computes() {
        for example in Example::iter() {
            let mut state = FormState::default();
            state.load_example(example);
            match state.submit() {
                Submission::Computed(report) => {
                    assert!(report.numeric.is_some());
                    assert!(report.grid.is_some());
                    if example == Example::GaussianBell {
                        assert!(matches!(report.tier, EvaluationTier::NumericFallback { .. }));
                    }
                }
                Submission::Failed(msg) => panic!("{} failed: {}", example, msg),
            }
        }
    }

    #[test]
    fn test_failure_is_a_single_message() {
        let mut state = FormState::default();
        state.set_field(Field::Integrand, "x +* y");
        match state.submit() {
            Submission::Failed(msg) => {
                assert!(msg.starts_with("invalid expression in 'integrand'"));
            }
            other => panic!("expected failure, got {:?}", other),
        }

        state.set_field(Field::Integrand, "x");
        state.set_field(Field::XUpper, "0");
        match state.submit() {
            Submission::Failed(msg) => assert!(msg.starts_with("limits cannot be equal")),
            other => panic!("expected failure, got {:?}", other),
        }
    }
}
