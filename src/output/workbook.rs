use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatBorder, FormatPattern, Image, Workbook, Worksheet,
    XlsxError,
};
use tracing::warn;

use super::report::{Band, ReportDocument, SUMMARY_CAPTION};
use super::ExportError;

const RED: u32 = 0xD50000;
const BLUE: u32 = 0x1F4F8A;
const LIGHT_GRAY: u32 = 0xF5F7FA;
const BORDER_GRAY: u32 = 0xDDDDDD;
const WHITE: u32 = 0xFFFFFF;
const TINT: u32 = 0xF9FBFD;

const LOGO_WIDTH: u32 = 250;
const LOGO_HEIGHT: u32 = 70;

const BRAND_LAST_COL: u16 = 2;
const TITLE_FIRST_COL: u16 = 3;

pub(crate) struct Rendered {
    pub bytes: Vec<u8>,
    pub branded: bool,
}

struct Styles {
    brand: Format,
    title: Format,
    caption: Format,
    summary_label: Format,
    summary_value: Format,
    header: Format,
    plain: Format,
    tinted: Format,
}

impl Styles {
    fn new() -> Self {
        let cell = Format::new()
            .set_border(FormatBorder::Thin)
            .set_border_color(Color::RGB(BORDER_GRAY))
            .set_pattern(FormatPattern::Solid);
        Self {
            brand: Format::new()
                .set_bold()
                .set_font_size(18)
                .set_font_color(Color::RGB(BLUE)),
            title: Format::new()
                .set_bold()
                .set_font_size(14)
                .set_font_color(Color::RGB(BLUE))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            caption: Format::new().set_bold().set_font_color(Color::RGB(BLUE)),
            summary_label: Format::new().set_bold(),
            summary_value: Format::new()
                .set_pattern(FormatPattern::Solid)
                .set_background_color(Color::RGB(LIGHT_GRAY)),
            header: cell
                .clone()
                .set_bold()
                .set_font_color(Color::RGB(WHITE))
                .set_background_color(Color::RGB(RED))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter),
            plain: cell.clone().set_background_color(Color::RGB(WHITE)),
            tinted: cell.set_background_color(Color::RGB(TINT)),
        }
    }

    fn band(&self, band: Band) -> &Format {
        match band {
            Band::Plain => &self.plain,
            Band::Tinted => &self.tinted,
        }
    }
}

/// Serializes `doc` to xlsx bytes. A logo that fails to decode falls back to
/// the brand text.
pub(crate) fn render(doc: &ReportDocument, logo: Option<&[u8]>) -> Result<Rendered, ExportError> {
    let styles = Styles::new();
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(&doc.sheet_name)?;

    for (col, column) in (0u16..).zip(doc.columns.iter()) {
        sheet.set_column_width(col, column.width)?;
    }

    let branded = match logo.map(decode_logo) {
        Some(Ok(image)) => {
            sheet.insert_image(0, 0, &image)?;
            true
        }
        Some(Err(e)) => {
            warn!("logo could not be decoded, using text title: {e}");
            false
        }
        None => false,
    };
    if !branded {
        sheet.merge_range(0, 0, 1, BRAND_LAST_COL, &doc.brand_name, &styles.brand)?;
    }

    let last_col = last_column(doc).max(TITLE_FIRST_COL);
    sheet.merge_range(0, TITLE_FIRST_COL, 1, last_col, &doc.title, &styles.title)?;

    write_summary(sheet, doc, &styles)?;
    write_table(sheet, doc, &styles)?;

    sheet.set_freeze_panes(doc.frozen_rows(), 0)?;

    let bytes = workbook.save_to_buffer()?;
    Ok(Rendered { bytes, branded })
}

fn decode_logo(bytes: &[u8]) -> Result<Image, XlsxError> {
    Ok(Image::new_from_buffer(bytes)?.set_scale_to_size(LOGO_WIDTH, LOGO_HEIGHT, false))
}

fn last_column(doc: &ReportDocument) -> u16 {
    u16::try_from(doc.columns.len().saturating_sub(1)).unwrap_or(u16::MAX)
}

fn write_summary(
    sheet: &mut Worksheet,
    doc: &ReportDocument,
    styles: &Styles,
) -> Result<(), XlsxError> {
    sheet.write_string_with_format(
        ReportDocument::CAPTION_ROW,
        0,
        SUMMARY_CAPTION,
        &styles.caption,
    )?;
    for (row, (label, value)) in (ReportDocument::SUMMARY_START_ROW..).zip(doc.summary.iter()) {
        sheet.write_string_with_format(row, 0, label, &styles.summary_label)?;
        sheet.write_string_with_format(row, 1, value, &styles.summary_value)?;
    }
    Ok(())
}

fn write_table(
    sheet: &mut Worksheet,
    doc: &ReportDocument,
    styles: &Styles,
) -> Result<(), XlsxError> {
    let header_row = doc.header_row();
    for (col, column) in (0u16..).zip(doc.columns.iter()) {
        sheet.write_string_with_format(header_row, col, column.label, &styles.header)?;
    }

    let first = doc.first_data_row();
    for (row, offset) in (first..).zip(0..doc.styled_row_count()) {
        let format = styles.band(ReportDocument::band(row));
        match doc.rows.get(offset) {
            Some(cells) => {
                for (col, value) in (0u16..).zip(cells.iter()) {
                    sheet.write_string_with_format(row, col, value, format)?;
                }
            }
            None => {
                for col in 0..doc.columns.len() as u16 {
                    sheet.write_blank(row, col, format)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::{FilterSummary, ReportOptions, PLAN_COLUMNS};
    use std::io::{Cursor, Read};

    use crate::records::{PlanItem, PlanStatus};

    fn plan_doc(rows: &[PlanItem]) -> ReportDocument {
        ReportDocument::build(
            rows,
            &FilterSummary::for_plan("2024-01-01", "", "", ""),
            &PLAN_COLUMNS,
            &ReportOptions::default(),
        )
    }

    fn empty_doc() -> ReportDocument {
        plan_doc(&[])
    }

    fn plan(i: usize) -> PlanItem {
        PlanItem {
            id: format!("p{i}"),
            date: "2024-01-05".parse().unwrap(),
            item: format!("ITM-{}", 1000 + i),
            product: "Primer".to_string(),
            status: PlanStatus::Pending,
            owner: "Rosa Vega".to_string(),
            notes: String::new(),
            category: "Paints".to_string(),
        }
    }

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name(name)
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn sheet_freezes_merges_and_writes_every_row() {
        let rows: Vec<PlanItem> = (1..=3).map(plan).collect();
        let rendered = render(&plan_doc(&rows), None).unwrap();
        let sheet = part(&rendered.bytes, "xl/worksheets/sheet1.xml");

        assert!(sheet.contains(r#"<pane ySplit="10""#));
        assert!(sheet.contains(r#"state="frozen"/>"#));
        assert!(sheet.contains(r#"<mergeCell ref="A1:C2"/>"#));
        assert!(sheet.contains(r#"<mergeCell ref="D1:F2"/>"#));
        assert!(sheet.contains(r#"<row r="10""#));
        for r in 11..=13 {
            assert!(sheet.contains(&format!(r#"<row r="{r}""#)), "row {r}");
        }
        assert!(!sheet.contains(r#"<row r="14""#));

        let strings = part(&rendered.bytes, "xl/sharedStrings.xml");
        assert!(strings.contains("ITM-1003"));
    }

    #[test]
    fn empty_sheet_keeps_one_blank_row() {
        let rendered = render(&empty_doc(), None).unwrap();
        let sheet = part(&rendered.bytes, "xl/worksheets/sheet1.xml");
        assert!(sheet.contains(r#"<row r="11""#));
        assert!(!sheet.contains(r#"<row r="12""#));
        let strings = part(&rendered.bytes, "xl/sharedStrings.xml");
        assert!(strings.contains("<t>-</t>"));
    }

    #[test]
    fn renders_zip_container_without_logo() {
        let rendered = render(&empty_doc(), None).unwrap();
        assert!(!rendered.branded);
        assert_eq!(&rendered.bytes[..4], b"PK\x03\x04");
    }

    #[test]
    fn bad_logo_bytes_fall_back() {
        let rendered = render(&empty_doc(), Some(&b"not an image"[..])).unwrap();
        assert!(!rendered.branded);
    }

    #[test]
    fn invalid_sheet_name_is_an_export_error() {
        let mut doc = empty_doc();
        doc.sheet_name = "bad[name]".to_string();
        assert!(matches!(render(&doc, None), Err(ExportError::Workbook { .. })));
    }
}
