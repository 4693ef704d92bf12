use crate::polar::errors::{Result, Warning};
use crate::polar::evaluator::{
    EvaluationOptions, EvaluationTier, IntegralValue, evaluate,
};
use crate::polar::expression_builder::{IntegralForm, build_expressions, check_limits};
use crate::polar::polar_transform::{PolarIntegrand, PolarRegion};
use crate::polar::sampler::{SampleGrid, SampleOptions, sample_grid};
use log::{info, warn};
use std::time::Instant;
use tabled::{builder::Builder, settings::Style};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ComputeOptions {
    pub sample: SampleOptions,
    pub evaluation: EvaluationOptions,
}

/// One line of the step-by-step explanation.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub title: String,
    pub text: String,
    pub latex: String,
}

impl Step {
    fn new(title: &str, text: String, latex: String) -> Self {
        Self {
            title: title.to_string(),
            text,
            latex,
        }
    }
}

/// Everything a successful compute action produces.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputeReport {
    pub steps: Vec<Step>,
    pub value: IntegralValue,
    /// finite numeric value, if the result could be coerced
    pub numeric: Option<f64>,
    pub tier: EvaluationTier,
    pub grid: Option<SampleGrid>,
    pub warnings: Vec<Warning>,
    pub polar: PolarIntegrand,
    pub region: PolarRegion,
}

impl ComputeReport {
    /// Result as shown to the user: 4 decimals, or the raw form if it is not a number.
    pub fn result_text(&self) -> String {
        match self.numeric {
            Some(value) => format!("{:.4}", value),
            None => self.value.to_string(),
        }
    }

    pub fn summary_table(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(["integrand (polar)".to_string(), self.polar.integrand.to_string()]);
        builder.push_record(["region".to_string(), self.region.describe()]);
        builder.push_record(["result".to_string(), self.value.to_string()]);
        builder.push_record(["numeric value".to_string(), self.result_text()]);
        builder.push_record(["evaluated by".to_string(), self.tier.to_string()]);
        let grid = match &self.grid {
            Some(grid) => format!("{0}x{0}", grid.size()),
            None => "none".to_string(),
        };
        builder.push_record(["plot grid".to_string(), grid]);
        builder.push_record(["warnings".to_string(), self.warnings.len().to_string()]);
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

/// Runs one compute action on the form.
///
/// Parse errors, equal limits and failure of both integration tiers abort.
/// A result that is not a number and a plot that cannot be sampled only add
/// warnings to the report.
pub fn compute(form: &IntegralForm, options: &ComputeOptions) -> Result<ComputeReport> {
    let begin = Instant::now();
    let parsed = build_expressions(form)?;
    check_limits(&parsed)?;

    let polar = PolarIntegrand::from_cartesian(&parsed.integrand);
    let region = PolarRegion::fixed();
    warn!(
        "the region is fixed to {}; the Cartesian limits only shape the plot",
        region.describe()
    );
    let evaluation = evaluate(&polar, &region, &options.evaluation)?;

    let mut warnings = evaluation.warnings;
    let numeric = match evaluation.value.to_f64() {
        Ok(value) => Some(value),
        Err(msg) => {
            warn!("result kept in symbolic form: {}", msg);
            warnings.push(Warning::ResultCoercion(msg));
            None
        }
    };

    let grid_outcome = sample_grid(&parsed.integrand, &parsed, &options.sample);
    warnings.extend(grid_outcome.warnings);

    let rule = PolarIntegrand::substitution_rule();
    let steps = vec![
        Step::new(
            "Original integrand",
            format!("f(x, y) = {}", parsed.integrand),
            format!("f(x, y) = {}", parsed.integrand.to_latex()),
        ),
        Step::new(
            "Substitution",
            format!("x = {}, y = {}, dx dy = r dr dtheta", rule["x"], rule["y"]),
            format!(
                "x = {},\\; y = {},\\; dx\\,dy = r\\,dr\\,d\\theta",
                rule["x"].to_latex(),
                rule["y"].to_latex()
            ),
        ),
        Step::new(
            "Polar form",
            format!("f(r*cos(theta), r*sin(theta)) * r = {}", polar.integrand),
            polar.integrand.to_latex(),
        ),
        Step::new(
            "Region (fixed)",
            format!(
                "{}; the limits entered for x and y are not used here",
                region.describe()
            ),
            region.to_latex(),
        ),
        Step::new(
            "Result",
            format!("{} ({})", evaluation.value, evaluation.tier),
            evaluation.value.to_latex(),
        ),
    ];

    let report = ComputeReport {
        steps,
        value: evaluation.value,
        numeric,
        tier: evaluation.tier,
        grid: grid_outcome.grid,
        warnings,
        polar,
        region,
    };
    info!("\n{}", report.summary_table());
    info!("compute finished in {} ms", begin.elapsed().as_millis());
    Ok(report)
}
