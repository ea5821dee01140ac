pub mod branding;
pub mod report;
pub mod workbook;

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::records::Record;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Xlsx,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "xlsx" | "excel" => Some(Self::Xlsx),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".xlsx") {
        return Some(OutputFormat::Xlsx);
    }
    if lower.ends_with(".csv") {
        return Some(OutputFormat::Csv);
    }
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    None
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to build workbook: {source}")]
    Workbook {
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },

    #[error("failed to write csv: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },

    #[error("failed to serialize records: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write artifact {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl From<csv::Error> for ExportError {
    fn from(source: csv::Error) -> Self {
        ExportError::Csv { source }
    }
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(source: rust_xlsxwriter::XlsxError) -> Self {
        ExportError::Workbook { source }
    }
}

/// Every field of every record, all values quoted. Nothing is rendered for an
/// empty collection.
pub fn render_csv<R: Record>(records: &[R]) -> Result<Vec<u8>, ExportError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(vec![]);
    wtr.write_record(R::FIELDS)?;
    for record in records {
        let row: Vec<String> = R::FIELDS
            .iter()
            .map(|name| {
                record
                    .field(name)
                    .map(|v| v.to_text().into_owned())
                    .unwrap_or_default()
            })
            .collect();
        wtr.write_record(&row)?;
    }
    wtr.into_inner()
        .map_err(|e| ExportError::Csv { source: e.into_error().into() })
}

pub fn render_json<R: Serialize>(records: &[R]) -> Result<Vec<u8>, ExportError> {
    serde_json::to_vec_pretty(records).map_err(|source| ExportError::Serialize { source })
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Writes next to `path` and renames into place, so a failed write never
/// leaves a truncated artifact at `path`.
pub async fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let tmp = partial_path(path);
    let write_err = |source| ExportError::Write {
        path: path.display().to_string(),
        source,
    };
    if let Err(e) = tokio::fs::write(&tmp, bytes).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(write_err(e));
    }
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(write_err(e));
    }
    Ok(())
}
