//! Shared helper functions for CLI commands

use clap::ValueEnum;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::dataset::Dataset;
use crate::core::loader::load_dataset;
use crate::processing::owt::Owt;
use crate::processing::owts::Owts;
use crate::processing::stage::Staged;

/// Output format from the command line, else the configured default
pub fn resolve_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    if let Some(format) = global.format {
        return format;
    }
    match config.default_format.as_deref() {
        Some(name) => OutputFormat::from_str(name, true).unwrap_or_else(|_| {
            warn!(format = name, "unknown default_format in config, using table");
            OutputFormat::Table
        }),
        None => OutputFormat::Table,
    }
}

/// Load a dataset and build its fleet engine with the configured section properties
pub fn load_fleet(path: &Path, config: &Config) -> Result<Owts> {
    let dataset = load_dataset(path)?;
    Ok(dataset.build_fleet(config.section_properties())?)
}

/// Load a dataset and build the engine of one turbine
pub fn load_turbine(path: &Path, title: &str, config: &Config) -> Result<Owt> {
    let dataset: Dataset = load_dataset(path)?;
    let entry = dataset
        .turbine(title)
        .ok_or_else(|| miette::miette!("turbine '{}' not found in {}", title, path.display()))?;
    let source = std::sync::Arc::new(dataset.source());
    Ok(dataset.build_owt(entry, source, config.section_properties())?)
}

/// Rows of a staged table, empty when the table was never produced
pub fn rows<T>(staged: Staged<Option<&[T]>>) -> &[T] {
    staged.into_inner().unwrap_or_default()
}

/// Write content to a file or stdout
pub fn write_output(content: &str, output_path: Option<PathBuf>, quiet: bool) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            writer.flush().into_diagnostic()?;
            if !quiet {
                eprintln!("Table written to: {}", style(path.display()).cyan());
            }
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
