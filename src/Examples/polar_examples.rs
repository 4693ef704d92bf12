// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
use crate::Utils::plots::surface_svg;
use crate::polar::expression_builder::IntegralForm;
use crate::polar::pipeline::ComputeReport;
use crate::polar::session::{Example, FormState, Submission};

fn print_report(report: &ComputeReport) {
    for step in &report.steps {
        println!("{}: {}", step.title, step.text);
        println!("    latex: {}", step.latex);
    }
    println!("result = {}", report.result_text());
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
}

pub fn polar_examples(example: usize) {
    match example {
        0 => {
            // circle of radius 2: x^2 + y^2 integrates to exactly 8*pi
            let mut state = FormState::default();
            state.load_example(Example::Circle);
            match state.submit() {
                Submission::Computed(report) => {
                    print_report(&report);
                    if let Some(grid) = &report.grid {
                        match surface_svg(grid, "f(x, y) = x^2 + y^2") {
                            Ok(svg) => println!("svg plot of {} bytes", svg.len()),
                            Err(e) => println!("plot failed: {}", e),
                        }
                    }
                }
                Submission::Failed(msg) => println!("{}", msg),
            }
        }
        1 => {
            // exp(-(x^2 + y^2)) has no antiderivative in theta, quadrature takes over
            let mut state = FormState::default();
            state.load_example(Example::GaussianBell);
            if let Submission::Computed(report) = state.submit() {
                print_report(&report);
                println!("evaluated by: {}", report.tier);
                println!("exact value pi*(1 - e^-4) = {}", std::f64::consts::PI * (1.0 - (-4.0_f64).exp()));
            }
        }
        2 => {
            // malformed input gives one message and nothing else
            let state = FormState {
                form: IntegralForm::new("x +* y", "0", "1", "0", "1"),
                ..FormState::default()
            };
            match state.submit() {
                Submission::Failed(msg) => println!("error: {}", msg),
                Submission::Computed(_) => println!("unexpected success"),
            }
        }
        _ => {
            println!("example not found");
        }
    }
}
