use crate::cli::args::CliArgs;
use crate::dates;
use crate::output::{self, OutputFormat};
use crate::records::ClassLetter;

use super::View;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(raw) = args.view.as_deref() {
        View::parse(raw).ok_or_else(|| {
            format!("invalid --view '{raw}', expected plan, products, classification or dashboard")
        })?;
    }
    if let Some(raw) = args.start.as_deref() {
        dates::normalize(raw).map_err(|e| format!("invalid --start: {e}"))?;
    }
    if let Some(raw) = args.end.as_deref() {
        dates::normalize(raw).map_err(|e| format!("invalid --end: {e}"))?;
    }
    if args.start.is_some() != args.end.is_some() {
        return Err("--start and --end must be given together".to_string());
    }
    if let Some(raw) = args.letter.as_deref() {
        ClassLetter::parse(raw)
            .ok_or_else(|| format!("invalid --letter '{raw}', expected A, B, C, D or E"))?;
    }
    if args.page_size == Some(0) {
        return Err("invalid page-size, expected positive integer".to_string());
    }
    if args.timeout == Some(0) {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    if let Some(raw) = args.output_format.as_deref() {
        OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid --output-format '{raw}', expected xlsx, csv or json"))?;
    } else if let Some(path) = args.output.as_deref() {
        output::infer_format_from_path(path).ok_or_else(|| {
            format!("cannot infer export format from '{path}', pass --output-format")
        })?;
    }
    Ok(())
}
