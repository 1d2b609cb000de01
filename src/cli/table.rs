//! Table rendering for CLI output
//!
//! Every derived table is a slice of [`TableRow`]s. This module turns one
//! into text in the selected [`OutputFormat`]:
//! - `table` and `md` are drawn with tabled
//! - `csv` and `tsv` go through the csv writer, so cells are quoted as needed
//! - `json` is the serde representation, keyed by the engineering headers

use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::OutputFormat;
use crate::processing::tables::TableRow;

/// Render `rows` in `format`, always ending with a newline
pub fn render<R: TableRow>(rows: &[R], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(draw(rows, false)),
        OutputFormat::Md => Ok(draw(rows, true)),
        OutputFormat::Csv => delimited(rows, b','),
        OutputFormat::Tsv => delimited(rows, b'\t'),
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(rows).into_diagnostic()?;
            out.push('\n');
            Ok(out)
        }
    }
}

fn draw<R: TableRow>(rows: &[R], markdown: bool) -> String {
    let mut builder = Builder::default();
    builder.push_record(R::headers());
    for row in rows {
        builder.push_record(row.cells());
    }
    let mut table = builder.build();
    if markdown {
        table.with(Style::markdown());
    } else {
        table.with(Style::rounded());
    }
    let mut out = table.to_string();
    out.push('\n');
    out
}

fn delimited<R: TableRow>(rows: &[R], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer.write_record(R::headers()).into_diagnostic()?;
    for row in rows {
        writer.write_record(row.cells()).into_diagnostic()?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| miette::miette!("failed to flush table: {}", e))?;
    String::from_utf8(bytes).into_diagnostic()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::tables::LumpedMassRow;

    fn rows() -> Vec<LumpedMassRow> {
        vec![LumpedMassRow {
            title: "TP_boat_landing".to_string(),
            x: 0.0,
            y: 0.0,
            z: 8.0,
            mass: 10.5,
            description: "landing, east".to_string(),
            subassembly: None,
        }]
    }

    #[test]
    fn test_render_csv_quotes_cells() {
        let out = render(&rows(), OutputFormat::Csv).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Title,X [m],Y [m],Z [mLAT],Mass [t],Description,Subassembly"
        );
        assert_eq!(lines.next().unwrap(), "TP_boat_landing,0,0,8,10.5,\"landing, east\",");
    }

    #[test]
    fn test_render_tsv() {
        let out = render(&rows(), OutputFormat::Tsv).unwrap();
        assert!(out.starts_with("Title\tX [m]"));
        assert!(out.contains("TP_boat_landing\t0\t0\t8\t10.5"));
    }

    #[test]
    fn test_render_markdown_and_table() {
        let md = render(&rows(), OutputFormat::Md).unwrap();
        assert!(md.contains("| Title"));
        assert!(md.contains("TP_boat_landing"));

        let table = render(&rows(), OutputFormat::Table).unwrap();
        assert!(table.contains("Mass [t]"));
        assert!(table.ends_with('\n'));
    }

    #[test]
    fn test_render_json_uses_headers() {
        let out = render(&rows(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["Z [mLAT]"], 8.0);
        assert_eq!(value[0]["Title"], "TP_boat_landing");
    }

    #[test]
    fn test_render_empty_keeps_headers() {
        let out = render::<LumpedMassRow>(&[], OutputFormat::Csv).unwrap();
        assert_eq!(out.lines().count(), 1);
    }
}
