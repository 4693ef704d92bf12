// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]
use RustedPolar::Examples::polar_examples::polar_examples;
use RustedPolar::Utils::logger::{init_logging, save_grid_to_csv};
use RustedPolar::Utils::pdf_report::PdfReport;
use RustedPolar::Utils::plots::surface_png;
use RustedPolar::Utils::task_parser::{TaskConfig, parse_task_file};
use RustedPolar::polar::errors::Result;
use RustedPolar::polar::session::{Example, FormState, Submission};
use log::error;
use std::env;
use std::path::Path;
use std::process::ExitCode;

fn load_task() -> Result<TaskConfig> {
    match env::args().nth(1) {
        Some(path) => parse_task_file(Path::new(&path)),
        None => {
            let mut state = FormState::default();
            state.load_example(Example::Circle);
            Ok(TaskConfig {
                state,
                ..TaskConfig::default()
            })
        }
    }
}

fn run() -> Result<bool> {
    let task = load_task()?;
    init_logging(&task.logging.loglevel, task.logging.log_to_file)?;
    let report = match task.state.submit() {
        Submission::Computed(report) => report,
        Submission::Failed(msg) => {
            println!("error: {}", msg);
            return Ok(false);
        }
    };
    for step in &report.steps {
        println!("{}: {}", step.title, step.text);
    }
    println!("\nresult = {}", report.result_text());
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }

    if let Some(grid) = &report.grid {
        if let Some(path) = &task.output.plot_png {
            let title = format!("f(x, y) = {}", task.state.form.integrand);
            surface_png(grid, &title, path)?;
        }
        if let Some(path) = &task.output.grid_csv {
            save_grid_to_csv(grid, path)?;
        }
    }
    if let Some(dir) = &task.output.pdf_dir {
        let (path, _) = PdfReport::from_report(&task.state.form, &report).save_unique(dir)?;
        println!("pdf saved to {}", path.display());
    }
    Ok(true)
}

// `example <n>` runs one of the bundled demos instead of a task
fn run_example(number: Option<&String>) -> Result<bool> {
    init_logging("info", false)?;
    let example = number.and_then(|n| n.parse::<usize>().ok()).unwrap_or(0);
    polar_examples(example);
    Ok(true)
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let outcome = match args.get(1).map(String::as_str) {
        Some("example") => run_example(args.get(2)),
        _ => run(),
    };
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
