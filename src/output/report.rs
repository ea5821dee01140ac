use tracing::info;

use super::branding::{self, BrandingSource};
use super::workbook;
use super::ExportError;
use crate::records::Record;

pub const SUMMARY_PLACEHOLDER: &str = "-";
pub const SUMMARY_CAPTION: &str = "Selected filters";

/// One data column of the exported table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReportColumn {
    pub label: &'static str,
    pub field: &'static str,
    pub width: f64,
}

pub const PLAN_COLUMNS: [ReportColumn; 6] = [
    ReportColumn {
        label: "Date",
        field: "date",
        width: 18.0,
    },
    ReportColumn {
        label: "Item",
        field: "item",
        width: 24.0,
    },
    ReportColumn {
        label: "Product",
        field: "product",
        width: 24.0,
    },
    ReportColumn {
        label: "Status",
        field: "status",
        width: 18.0,
    },
    ReportColumn {
        label: "Owner",
        field: "owner",
        width: 22.0,
    },
    ReportColumn {
        label: "Notes",
        field: "notes",
        width: 36.0,
    },
];

pub const PRODUCT_COLUMNS: [ReportColumn; 5] = [
    ReportColumn {
        label: "Item",
        field: "item",
        width: 18.0,
    },
    ReportColumn {
        label: "Description",
        field: "description",
        width: 36.0,
    },
    ReportColumn {
        label: "Category",
        field: "category",
        width: 18.0,
    },
    ReportColumn {
        label: "Support",
        field: "absolute_support",
        width: 14.0,
    },
    ReportColumn {
        label: "Support %",
        field: "relative_support",
        width: 14.0,
    },
];

pub const CLASSIFICATION_COLUMNS: [ReportColumn; 2] = [
    ReportColumn {
        label: "Item",
        field: "item_code",
        width: 24.0,
    },
    ReportColumn {
        label: "Class",
        field: "class",
        width: 10.0,
    },
];

/// Empty and whitespace-only values render as `-`.
pub fn safe_text(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        SUMMARY_PLACEHOLDER
    } else {
        trimmed
    }
}

/// Labeled filter values, in display order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterSummary {
    entries: Vec<(String, String)>,
}

impl FilterSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: &str, value: &str) -> Self {
        self.entries.push((label.to_string(), value.to_string()));
        self
    }

    /// Start date, end date, category, product. Always four rows.
    pub fn for_plan(start: &str, end: &str, category: &str, product: &str) -> Self {
        Self::new()
            .with("Start date", start)
            .with("End date", end)
            .with("Category", category)
            .with("Product", product)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(label, value)| (label.as_str(), safe_text(value)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportOptions {
    pub title: String,
    pub brand_name: String,
    pub sheet_name: String,
    pub file_name: String,
    pub branding: BrandingSource,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "PATCHING PLAN REPORT".to_string(),
            brand_name: "PATCHPLAN".to_string(),
            sheet_name: "Plan".to_string(),
            file_name: "plan.xlsx".to_string(),
            branding: BrandingSource::None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Band {
    Plain,
    Tinted,
}

/// Layout of the exported sheet. Row numbers are 0-based.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub brand_name: String,
    pub sheet_name: String,
    pub summary: Vec<(String, String)>,
    pub columns: Vec<ReportColumn>,
    pub rows: Vec<Vec<String>>,
}

impl ReportDocument {
    pub const CAPTION_ROW: u32 = 3;
    pub const SUMMARY_START_ROW: u32 = 4;

    pub fn build<R: Record>(
        records: &[R],
        summary: &FilterSummary,
        columns: &[ReportColumn],
        options: &ReportOptions,
    ) -> Self {
        let rows = records
            .iter()
            .map(|r| {
                columns
                    .iter()
                    .map(|c| {
                        r.field(c.field)
                            .map(|v| v.to_text().into_owned())
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect();
        Self {
            title: options.title.clone(),
            brand_name: options.brand_name.clone(),
            sheet_name: options.sheet_name.clone(),
            summary: summary
                .rows()
                .map(|(l, v)| (l.to_string(), v.to_string()))
                .collect(),
            columns: columns.to_vec(),
            rows,
        }
    }

    /// One blank row separates the summary from the table.
    pub fn header_row(&self) -> u32 {
        Self::SUMMARY_START_ROW + self.summary.len() as u32 + 1
    }

    pub fn first_data_row(&self) -> u32 {
        self.header_row() + 1
    }

    /// Rows kept above the freeze split.
    pub fn frozen_rows(&self) -> u32 {
        self.header_row() + 1
    }

    pub fn data_row_count(&self) -> usize {
        self.rows.len()
    }

    /// Bordered rows below the header. An empty table keeps one.
    pub fn styled_row_count(&self) -> usize {
        self.rows.len().max(1)
    }

    /// Banding follows absolute sheet row parity: even sheet rows (1-based)
    /// are plain.
    pub fn band(row: u32) -> Band {
        if (row + 1) % 2 == 0 {
            Band::Plain
        } else {
            Band::Tinted
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReportArtifact {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub data_rows: usize,
    /// False when the text fallback replaced the logo.
    pub branded: bool,
}

pub struct ReportExporter {
    client: reqwest::Client,
    options: ReportOptions,
    columns: Vec<ReportColumn>,
}

impl ReportExporter {
    pub fn new(client: reqwest::Client, options: ReportOptions) -> Self {
        Self {
            client,
            options,
            columns: PLAN_COLUMNS.to_vec(),
        }
    }

    pub fn with_columns(mut self, columns: &[ReportColumn]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    pub async fn export<R: Record>(
        &self,
        records: &[R],
        summary: &FilterSummary,
    ) -> Result<ReportArtifact, ExportError> {
        let document = ReportDocument::build(records, summary, &self.columns, &self.options);
        let logo = branding::fetch_logo(&self.client, &self.options.branding).await;
        let rendered = workbook::render(&document, logo.as_deref())?;
        info!(
            rows = document.data_row_count(),
            bytes = rendered.bytes.len(),
            branded = rendered.branded,
            "report rendered"
        );
        Ok(ReportArtifact {
            bytes: rendered.bytes,
            file_name: self.options.file_name.clone(),
            data_rows: document.data_row_count(),
            branded: rendered.branded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{PlanItem, PlanStatus};

    fn plan(i: usize) -> PlanItem {
        PlanItem {
            id: format!("p{i}"),
            date: "2024-01-05".parse().unwrap(),
            item: format!("ITM-{}", 1000 + i),
            product: "Paints Product".to_string(),
            status: PlanStatus::Completed,
            owner: "Rosa Vega".to_string(),
            notes: format!("Batch review {i}"),
            category: "Paints".to_string(),
        }
    }

    fn document(n: usize, summary: &FilterSummary) -> ReportDocument {
        let rows: Vec<PlanItem> = (1..=n).map(plan).collect();
        ReportDocument::build(&rows, summary, &PLAN_COLUMNS, &ReportOptions::default())
    }

    #[test]
    fn safe_text_replaces_blank_values() {
        assert_eq!(safe_text(""), "-");
        assert_eq!(safe_text("   "), "-");
        assert_eq!(safe_text(" Paints "), "Paints");
    }

    #[test]
    fn summary_keeps_declared_order_and_placeholder() {
        let summary = FilterSummary::for_plan("2024-01-01", "2024-01-10", "", "  ");
        let rows: Vec<(&str, &str)> = summary.rows().collect();
        assert_eq!(
            rows,
            vec![
                ("Start date", "2024-01-01"),
                ("End date", "2024-01-10"),
                ("Category", "-"),
                ("Product", "-"),
            ]
        );
    }

    #[test]
    fn data_rows_match_record_count() {
        let summary = FilterSummary::for_plan("2024-01-01", "2024-01-10", "", "");
        for n in [0, 1, 250] {
            let doc = document(n, &summary);
            assert_eq!(doc.data_row_count(), n);
            assert_eq!(doc.styled_row_count(), n.max(1));
        }
    }

    #[test]
    fn header_sits_below_summary_and_freezes() {
        let summary = FilterSummary::for_plan("a", "b", "c", "d");
        let doc = document(3, &summary);
        assert_eq!(doc.header_row(), 9);
        assert_eq!(doc.first_data_row(), 10);
        assert_eq!(doc.frozen_rows(), 10);
    }

    #[test]
    fn cells_follow_column_order() {
        let doc = document(1, &FilterSummary::new());
        assert_eq!(
            doc.rows[0],
            vec![
                "2024-01-05",
                "ITM-1001",
                "Paints Product",
                "Completed",
                "Rosa Vega",
                "Batch review 1"
            ]
        );
    }

    #[test]
    fn bands_alternate_by_sheet_row() {
        assert_eq!(ReportDocument::band(10), Band::Tinted);
        assert_eq!(ReportDocument::band(11), Band::Plain);
        assert_eq!(ReportDocument::band(12), Band::Tinted);
    }

    #[tokio::test]
    async fn export_without_logo_falls_back_to_text() {
        let exporter = ReportExporter::new(reqwest::Client::new(), ReportOptions::default());
        let rows: Vec<PlanItem> = (1..=3).map(plan).collect();
        let summary = FilterSummary::for_plan("2024-01-01", "2024-01-10", "Paints", "");
        let artifact = exporter.export(&rows, &summary).await.unwrap();
        assert!(!artifact.branded);
        assert_eq!(artifact.data_rows, 3);
        assert_eq!(artifact.file_name, "plan.xlsx");
        assert_eq!(&artifact.bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn export_of_empty_collection_is_valid() {
        let exporter = ReportExporter::new(reqwest::Client::new(), ReportOptions::default());
        let rows: Vec<PlanItem> = Vec::new();
        let artifact = exporter
            .export(&rows, &FilterSummary::for_plan("", "", "", ""))
            .await
            .unwrap();
        assert_eq!(artifact.data_rows, 0);
        assert!(!artifact.bytes.is_empty());
    }

    #[tokio::test]
    async fn undecodable_logo_is_not_fatal() {
        let options = ReportOptions {
            branding: BrandingSource::Inline(b"not an image".to_vec()),
            ..ReportOptions::default()
        };
        let exporter = ReportExporter::new(reqwest::Client::new(), options);
        let rows: Vec<PlanItem> = (1..=2).map(plan).collect();
        let artifact = exporter
            .export(&rows, &FilterSummary::for_plan("", "", "", ""))
            .await
            .unwrap();
        assert!(!artifact.branded);
        assert_eq!(artifact.data_rows, 2);
    }
}
