//! Dataset loading
//!
//! Datasets are YAML (`.yaml`, `.yml`) or JSON (`.json`) files. Syntax and
//! schema errors are reported against the file contents, with the offending
//! location labelled and a hint where one is known.

use miette::{Diagnostic, IntoDiagnostic, NamedSource, Result, SourceSpan, WrapErr};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::core::dataset::Dataset;

/// Dataset file that could not be parsed
#[derive(Debug, Error, Diagnostic)]
#[error("invalid dataset: {message}")]
#[diagnostic(code(owtgeo::dataset::syntax))]
pub struct DatasetSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("error here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    /// The underlying parser message
    message: String,
}

impl DatasetSyntaxError {
    /// Create a syntax error at a 1-based line and column
    pub fn at_location(message: impl Into<String>, source: &str, filename: &str, line: usize, column: usize) -> Self {
        let message = message.into();
        let offset = line_col_to_offset(source, line, column);
        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help: generate_help(&message),
            message,
        }
    }

    /// Create a syntax error from a serde_yml error
    pub fn from_yaml_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));
        Self::at_location(err.to_string(), source, filename, line, column)
    }

    /// Create a syntax error from a serde_json error
    pub fn from_json_error(err: &serde_json::Error, source: &str, filename: &str) -> Self {
        Self::at_location(err.to_string(), source, filename, err.line().max(1), err.column().max(1))
    }
}

/// Dataset file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Yaml,
    Json,
}

impl DatasetFormat {
    /// Pick the format from the file extension; anything but `.json` is YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => DatasetFormat::Json,
            _ => DatasetFormat::Yaml,
        }
    }
}

/// Parse dataset text in the given format
pub fn parse_dataset(source: &str, filename: &str, format: DatasetFormat) -> Result<Dataset> {
    let dataset = match format {
        DatasetFormat::Yaml => serde_yml::from_str::<Dataset>(source)
            .map_err(|e| DatasetSyntaxError::from_yaml_error(&e, source, filename))?,
        DatasetFormat::Json => serde_json::from_str::<Dataset>(source)
            .map_err(|e| DatasetSyntaxError::from_json_error(&e, source, filename))?,
    };
    Ok(dataset)
}

/// Load a dataset file
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let source = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read dataset {}", path.display()))?;
    let filename = path.display().to_string();
    let dataset = parse_dataset(&source, &filename, DatasetFormat::from_path(path))?;
    debug!(
        path = %filename,
        materials = dataset.materials.len(),
        building_blocks = dataset.building_blocks.len(),
        turbines = dataset.turbines.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

/// Convert line/column to byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut current_line = 1;
    let mut line_start = 0;

    for (i, ch) in source.char_indices() {
        if current_line == line {
            break;
        }
        if ch == '\n' {
            current_line += 1;
            line_start = i + 1;
        }
    }
    if current_line < line {
        return source.len().saturating_sub(1);
    }

    let line_text = &source[line_start..];
    let line_end = line_text.find('\n').unwrap_or(line_text.len());
    let offset = line_text[..line_end]
        .char_indices()
        .nth(column.saturating_sub(1))
        .map(|(j, _)| line_start + j)
        .unwrap_or(line_start + line_end);
    offset.min(source.len().saturating_sub(1))
}

/// Generate helpful suggestions based on error message
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("tab") {
        return Some("YAML requires spaces for indentation, not tabs. Replace tabs with spaces.".to_string());
    }
    if msg_lower.contains("duplicate key") || msg_lower.contains("duplicate field") {
        return Some("Each key can only appear once. Remove or rename the duplicate key.".to_string());
    }
    if msg_lower.contains("missing field `subassembly_type`") {
        return Some("Every subassembly needs a subassembly_type of TW, TP or MP.".to_string());
    }
    if msg_lower.contains("unknown variant") {
        return Some("subassembly_type must be one of TW, TP or MP.".to_string());
    }
    if msg_lower.contains("missing field `elevation`") {
        return Some("Each turbine location needs its water depth as `elevation` (mLAT).".to_string());
    }
    if msg_lower.contains("missing field") {
        return Some("Check the record against the expected fields; ids and titles are required.".to_string());
    }
    if msg_lower.contains("invalid type") {
        return Some("Numbers must not be quoted; lengths are in mm and masses in kg.".to_string());
    }
    if msg_lower.contains("mapping values are not allowed") {
        return Some("You may be missing a space after ':' or have incorrect indentation.".to_string());
    }

    None
}
