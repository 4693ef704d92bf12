use crate::polar::errors::{PolarError, Result};
use crate::polar::sampler::SampleGrid;
use chrono::Local;
use csv::Writer;
use log::{LevelFilter, info};
use simplelog::{ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;
use std::path::{Path, PathBuf};

/// `None` means logging is switched off
pub fn level_filter(loglevel: &str) -> Result<Option<LevelFilter>> {
    let filter = match loglevel {
        "off" | "none" => return Ok(None),
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        other => {
            return Err(PolarError::Config(format!(
                "loglevel must be debug, info, warn, error or off, got '{}'",
                other
            )));
        }
    };
    Ok(Some(filter))
}

/// Sets up terminal logging and, if asked, a `log_<date>_<time>.txt` file
/// next to the working directory. Returns the log file path.
/// A second call leaves the first logger in place.
pub fn init_logging(loglevel: &str, log_to_file: bool) -> Result<Option<PathBuf>> {
    let Some(log_option) = level_filter(loglevel)? else {
        return Ok(None);
    };
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        log_option,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    let mut log_path = None;
    if log_to_file {
        let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = PathBuf::from(format!("log_{}.txt", date_and_time));
        loggers.push(WriteLogger::new(log_option, Config::default(), File::create(&name)?));
        log_path = Some(name);
    }
    let _ = CombinedLogger::init(loggers);
    info!("Program started with loglevel: {}", log_option);
    Ok(log_path)
}

/// Writes the sample grid as `x,y,z` rows, row by row.
pub fn save_grid_to_csv(grid: &SampleGrid, filename: &Path) -> Result<()> {
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);
    let csv_error = |e: csv::Error| PolarError::Export(format!("csv: {}", e));
    writer.write_record(["x", "y", "z"]).map_err(csv_error)?;
    for ((x, y), z) in grid.x.iter().zip(grid.y.iter()).zip(grid.z.iter()) {
        writer
            .write_record([x.to_string(), y.to_string(), z.to_string()])
            .map_err(csv_error)?;
    }
    writer.flush()?;
    info!("grid saved to {}", filename.display());
    Ok(())
}
