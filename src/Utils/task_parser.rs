/// parse task document with structure like
/// ```text
/// integrand
///   f: x**2 + y**2
/// limits
///   x_lower: -sqrt(4 - y**2)
///   ...
/// ```
/// i.e. titles followed by `key: value` lines, into a [`TaskConfig`].
/// Values run to the end of the line, so expressions may contain spaces and commas.
/*
 two stages: 1) nom parses the text into HashMap<title, HashMap<key, value>> keeping only
 the structure 2) the map is checked against the known sections and keys and converted
 into typed settings. Missing optional keys take defaults, missing required keys are errors.
*/
use crate::polar::errors::{Field, PolarError, Result};
use crate::polar::evaluator::EvaluationOptions;
use crate::polar::expression_builder::IntegralForm;
use crate::polar::pipeline::ComputeOptions;
use crate::polar::sampler::{BoundaryMode, SampleOptions};
use crate::polar::session::FormState;
use log::{debug, info};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, multispace0, not_line_ending, space0},
    combinator::{map, recognize},
    multi::{many0, many1},
    sequence::{delimited, pair, preceded, separated_pair, terminated},
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

type DocumentMap = HashMap<String, SectionMap>;
type SectionMap = HashMap<String, String>;

const INTEGRAND: &str = "integrand";
const LIMITS: &str = "limits";
const OPTIONS: &str = "options";
const OUTPUT: &str = "output";
const LOGGING: &str = "logging";

/// known sections and their keys
const SCHEMA: [(&str, &[&str]); 5] = [
    (INTEGRAND, &["f"]),
    (LIMITS, &["x_lower", "x_upper", "y_lower", "y_upper"]),
    (OPTIONS, &["grid_size", "boundary", "quadrature_degree"]),
    (OUTPUT, &["pdf_dir", "plot_png", "grid_csv"]),
    (LOGGING, &["loglevel", "log_to_file"]),
];

/// Where the results of a run are written. `None` means "do not write".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutputConfig {
    pub pdf_dir: Option<PathBuf>,
    pub plot_png: Option<PathBuf>,
    pub grid_csv: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub loglevel: String,
    pub log_to_file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            loglevel: "info".to_string(),
            log_to_file: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskConfig {
    pub state: FormState,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Parses a title or key (word characters without spaces)
fn parse_identifier(input: &str) -> IResult<&str, String> {
    let parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    let mut parser = map(parser, String::from);
    parser.parse(input)
}

/// Parses `key: value`, the value is the rest of the line
fn parse_key_value_pair(input: &str) -> IResult<&str, (String, String)> {
    let colon_separator = delimited(space0, tag(":"), space0);
    let value = map(not_line_ending, |s: &str| s.trim().to_string());
    let mut parser = separated_pair(parse_identifier, colon_separator, value);
    parser.parse(input)
}

/// Parses a section with a title and one or more key-value lines
fn parse_section(input: &str) -> IResult<&str, (String, SectionMap)> {
    let (input, title) = preceded(space0, parse_identifier).parse(input)?;
    let (input, _) = multispace0(input)?;
    let mut pairs = many1(terminated(preceded(space0, parse_key_value_pair), multispace0));
    let (input, pairs) = pairs.parse(input)?;
    Ok((input, (title, pairs.into_iter().collect())))
}

/// Filters out comment lines (starting with //, #, %, or ;) and empty lines
fn filter_comments(input: &str) -> String {
    input
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.starts_with("//")
                && !trimmed.starts_with('#')
                && !trimmed.starts_with('%')
                && !trimmed.starts_with(';')
                && !trimmed.is_empty()
        })
        .collect::<Vec<&str>>()
        .join("\n")
}

/// Parses the document structure into nested maps, without checking names
pub fn parse_document(input: &str) -> std::result::Result<DocumentMap, String> {
    let filtered = filter_comments(input);
    let mut parser = many1(delimited(multispace0, parse_section, multispace0));
    match parser.parse(filtered.as_str()) {
        Ok((remaining, sections)) => {
            if !remaining.trim().is_empty() {
                return Err(format!(
                    "Failed to parse entire document. Remaining: '{}'",
                    remaining
                ));
            }
            let mut document = DocumentMap::new();
            for (title, section) in sections {
                if document.insert(title.clone(), section).is_some() {
                    return Err(format!("section '{}' appears twice", title));
                }
            }
            Ok(document)
        }
        Err(e) => Err(format!("Parsing error: {:?}", e)),
    }
}

fn check_schema(document: &DocumentMap) -> Result<()> {
    for (title, section) in document {
        let keys = SCHEMA
            .iter()
            .find(|(name, _)| name == title)
            .map(|(_, keys)| *keys)
            .ok_or_else(|| PolarError::Config(format!("unknown section '{}'", title)))?;
        if let Some(key) = section.keys().find(|k| !keys.contains(&k.as_str())) {
            return Err(PolarError::Config(format!(
                "unknown key '{}' in section '{}'",
                key, title
            )));
        }
    }
    Ok(())
}

fn lookup<'a>(document: &'a DocumentMap, title: &str, key: &str) -> Option<&'a str> {
    document.get(title).and_then(|s| s.get(key)).map(String::as_str)
}

fn required<'a>(document: &'a DocumentMap, title: &str, key: &str) -> Result<&'a str> {
    lookup(document, title, key)
        .ok_or_else(|| PolarError::Config(format!("missing required key '{}.{}'", title, key)))
}

fn optional<T: FromStr>(document: &DocumentMap, title: &str, key: &str, default: T) -> Result<T> {
    match lookup(document, title, key) {
        Some(text) => text.parse::<T>().map_err(|_| {
            PolarError::Config(format!("invalid value '{}' for '{}.{}'", text, title, key))
        }),
        None => Ok(default),
    }
}

fn optional_path(document: &DocumentMap, key: &str) -> Option<PathBuf> {
    lookup(document, OUTPUT, key)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// Parses a task document into the form, options, outputs and logging settings
pub fn parse_task_document(input: &str) -> Result<TaskConfig> {
    let document = parse_document(input).map_err(PolarError::Config)?;
    check_schema(&document)?;
    debug!("task document sections: {:?}", document.keys().collect::<Vec<_>>());

    let form = IntegralForm::new(
        required(&document, INTEGRAND, "f")?,
        required(&document, LIMITS, "x_lower")?,
        required(&document, LIMITS, "x_upper")?,
        required(&document, LIMITS, "y_lower")?,
        required(&document, LIMITS, "y_upper")?,
    );
    let defaults = ComputeOptions::default();
    let options = ComputeOptions {
        sample: SampleOptions {
            grid_size: optional(&document, OPTIONS, "grid_size", defaults.sample.grid_size)?,
            boundary: optional(&document, OPTIONS, "boundary", BoundaryMode::default())?,
        },
        evaluation: EvaluationOptions {
            quadrature_degree: optional(
                &document,
                OPTIONS,
                "quadrature_degree",
                defaults.evaluation.quadrature_degree,
            )?,
        },
    };
    let output = OutputConfig {
        pdf_dir: optional_path(&document, "pdf_dir"),
        plot_png: optional_path(&document, "plot_png"),
        grid_csv: optional_path(&document, "grid_csv"),
    };
    let default_logging = LoggingConfig::default();
    let logging = LoggingConfig {
        loglevel: lookup(&document, LOGGING, "loglevel")
            .map(str::to_string)
            .unwrap_or(default_logging.loglevel),
        log_to_file: optional(&document, LOGGING, "log_to_file", default_logging.log_to_file)?,
    };
    Ok(TaskConfig {
        state: FormState::new(form, options),
        output,
        logging,
    })
}

/// Reads and parses a task document from disk
pub fn parse_task_file(path: &Path) -> Result<TaskConfig> {
    info!("loading task from {}", path.display());
    let content = fs::read_to_string(path)?;
    parse_task_document(&content)
}

/// Writes the configuration back in task document form
pub fn render_task_document(config: &TaskConfig) -> String {
    let form = &config.state.form;
    let options = &config.state.options;
    let mut out = String::new();
    out.push_str(&format!("{}\n  f: {}\n", INTEGRAND, form.field(Field::Integrand)));
    out.push_str(&format!("{}\n", LIMITS));
    for field in [Field::XLower, Field::XUpper, Field::YLower, Field::YUpper] {
        out.push_str(&format!("  {}: {}\n", field, form.field(field)));
    }
    out.push_str(&format!(
        "{}\n  grid_size: {}\n  boundary: {}\n  quadrature_degree: {}\n",
        OPTIONS,
        options.sample.grid_size,
        options.sample.boundary,
        options.evaluation.quadrature_degree
    ));
    let paths = [
        ("pdf_dir", &config.output.pdf_dir),
        ("plot_png", &config.output.plot_png),
        ("grid_csv", &config.output.grid_csv),
    ];
    if paths.iter().any(|(_, p)| p.is_some()) {
        out.push_str(&format!("{}\n", OUTPUT));
        for (key, path) in paths {
            if let Some(path) = path {
                out.push_str(&format!("  {}: {}\n", key, path.display()));
            }
        }
    }
    out.push_str(&format!(
        "{}\n  loglevel: {}\n  log_to_file: {}\n",
        LOGGING, config.logging.loglevel, config.logging.log_to_file
    ));
    out
}
