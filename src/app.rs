use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::cli::args::CliArgs;
use crate::cli::{validation, View};
use crate::config::{self, ConfigFile};
use crate::dates::{CalendarDate, DateRange};
use crate::logging;
use crate::output::branding::BrandingSource;
use crate::output::report::{
    FilterSummary, ReportColumn, ReportExporter, ReportOptions, CLASSIFICATION_COLUMNS,
    PLAN_COLUMNS, PRODUCT_COLUMNS,
};
use crate::output::{self, ExportError, OutputFormat};
use crate::pagination::Page;
use crate::records::{ClassLetter, Record};
use crate::runner::{self, DashboardSnapshot, Listing, Options, Runner, RunnerError};
use crate::source::{DataSource, Dataset, FileSource};

const FETCH_NOTICE: &str = "Unable to load data, try again.";

fn format_kv_line(label: &str, value: &str) {
    println!(":: {:<10}: {}", label, value);
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Clone, Debug)]
struct RunConfig {
    view: View,
    today: CalendarDate,
    input: Option<PathBuf>,
    range: DateRange,
    category: Option<String>,
    product: Option<String>,
    letter: Option<ClassLetter>,
    search: Option<String>,
    page_size: usize,
    page: i64,
    output: Option<PathBuf>,
    output_format: Option<OutputFormat>,
    branding: BrandingSource,
    brand_name: String,
    report_title: String,
    timeout: u64,
    no_color: bool,
    verbose: u8,
}

impl RunConfig {
    fn options(&self) -> Options {
        Options {
            range: self.range,
            category: self.category.clone(),
            product: self.product.clone(),
            letter: self.letter,
            search: self.search.clone(),
            page_size: self.page_size,
            page_number: self.page,
        }
    }
}

fn build_run_config(
    args: CliArgs,
    cfg: ConfigFile,
    today: CalendarDate,
) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let view = match args.view.or(cfg.view) {
        Some(raw) => View::parse(&raw).ok_or_else(|| format!("invalid view '{raw}'"))?,
        None => View::default(),
    };

    let start = args.start.or(cfg.start);
    let end = args.end.or(cfg.end);
    let range = match (start, end) {
        (Some(start), Some(end)) => {
            DateRange::parse(&start, &end).map_err(|e| format!("invalid date window: {e}"))?
        }
        (None, None) => {
            let days = args
                .days
                .or(cfg.days)
                .unwrap_or(runner::DEFAULT_LOOKBACK_DAYS);
            DateRange::trailing_days(today, days)
        }
        _ => return Err("start and end must be given together".to_string()),
    };
    let letter = match non_empty(args.letter.or(cfg.letter)) {
        Some(raw) => Some(
            ClassLetter::parse(&raw).ok_or_else(|| format!("invalid letter '{raw}'"))?,
        ),
        None => None,
    };

    let page_size = args
        .page_size
        .or(cfg.page_size)
        .unwrap_or(runner::DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err("invalid page_size, expected positive integer".to_string());
    }

    let output = non_empty(args.output.or(cfg.output)).map(|p| config::expand_tilde(&p));
    let output_format = match non_empty(args.output_format.or(cfg.output_format)) {
        Some(raw) => Some(
            OutputFormat::parse(&raw).ok_or_else(|| format!("invalid output format '{raw}'"))?,
        ),
        None => match output.as_ref() {
            Some(path) => {
                let shown = path.to_string_lossy();
                Some(output::infer_format_from_path(&shown).ok_or_else(|| {
                    format!("cannot infer export format from '{shown}', set output_format")
                })?)
            }
            None => None,
        },
    };

    Ok(RunConfig {
        view,
        today,
        input: non_empty(args.input.or(cfg.input)).map(|p| config::expand_tilde(&p)),
        range,
        category: non_empty(args.category.or(cfg.category)),
        product: non_empty(args.product.or(cfg.product)),
        letter,
        search: non_empty(args.search.or(cfg.search)),
        page_size,
        page: args.page.or(cfg.page).unwrap_or(1),
        output,
        output_format,
        branding: args
            .logo
            .or(cfg.logo)
            .map(|raw| BrandingSource::parse(&raw))
            .unwrap_or_default(),
        brand_name: args
            .brand_name
            .or(cfg.brand_name)
            .unwrap_or_else(|| ReportOptions::default().brand_name),
        report_title: args
            .report_title
            .or(cfg.report_title)
            .unwrap_or_else(|| ReportOptions::default().title),
        timeout: args.timeout.or(cfg.timeout).unwrap_or(10),
        no_color,
        verbose: args.verbose,
    })
}

fn spinner(view: View) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_draw_target(ProgressDrawTarget::stderr());
    pb.enable_steady_tick(Duration::from_millis(120));
    if let Ok(style) = ProgressStyle::with_template(":: {spinner} {msg} [{elapsed}]") {
        pb.set_style(style);
    }
    pb.set_message(format!("loading {}", view.label()));
    pb
}

fn print_header(run: &RunConfig) {
    format_kv_line("View", run.view.label());
    format_kv_line("Window", &format!("{} .. {}", run.range.start, run.range.end));
    if let Some(category) = run.category.as_deref() {
        format_kv_line("Category", category);
    }
    if let Some(product) = run.product.as_deref() {
        format_kv_line("Product", product);
    }
    if let Some(letter) = run.letter {
        format_kv_line("Class", letter.as_str());
    }
    if let Some(search) = run.search.as_deref() {
        format_kv_line("Search", search);
    }
    println!();
}

fn cell(value: &str, width: usize) -> String {
    let clipped: String = if value.chars().count() > width {
        value.chars().take(width.saturating_sub(1)).chain(['…']).collect()
    } else {
        value.to_string()
    };
    format!("{clipped:<width$}")
}

fn print_page<R: Record>(page: &Page<'_, R>, columns: &[ReportColumn]) {
    let header = columns
        .iter()
        .map(|c| cell(c.label, c.width as usize))
        .join(" ");
    println!("{}", header.white().bold().on_red());
    for record in page.items {
        let line = columns
            .iter()
            .map(|c| {
                let value = record.field(c.field).map(|v| v.to_text()).unwrap_or_default();
                cell(&value, c.width as usize)
            })
            .join(" ");
        println!("{line}");
    }
    if page.items.is_empty() {
        println!("{}", "no rows".dimmed());
    }
    println!();
    println!(
        ":: {} :: Page {}/{} ::",
        page.showing_label(),
        page.page_number,
        page.page_count
    );
}

const BAR_WIDTH: i128 = 40;

/// Bar length for `value` scaled against `peak`, in `0..=40`.
fn bar_width(value: i64, peak: i64) -> usize {
    let scaled = i128::from(value.max(0)) * BAR_WIDTH / i128::from(peak.max(1));
    scaled.clamp(0, BAR_WIDTH) as usize
}

fn print_dashboard(snapshot: &DashboardSnapshot) {
    let m = &snapshot.metrics;
    format_kv_line("Items", &m.total_items.to_string());
    format_kv_line("Support", &m.total_support.to_string());
    format_kv_line("Class A", &format!("{:.1}%", m.share_a));
    format_kv_line("Class B", &format!("{:.1}%", m.share_b));
    format_kv_line("Alerts", &m.alerts.to_string());
    format_kv_line("Coverage", &format!("{:.1}%", m.coverage));
    println!();

    for alert in &snapshot.alerts {
        let tag = match alert.severity {
            crate::records::Severity::High => "[HIGH]".red().bold(),
            crate::records::Severity::Medium => "[MED]".yellow().bold(),
            crate::records::Severity::Low => "[LOW]".blue(),
        };
        println!("{tag} {}", alert.message);
    }
    println!();

    let peak = snapshot
        .daily_support
        .iter()
        .map(|p| p.support)
        .max()
        .unwrap_or(1)
        .max(1);
    for point in &snapshot.daily_support {
        let bar = bar_width(point.support, peak);
        println!("{} {:>6} {}", point.date, point.support, "#".repeat(bar).green());
    }
    println!();
    println!(
        ":: Top product :: {}",
        snapshot
            .top_products
            .first()
            .map(|p| format!("{} ({})", p.item, p.absolute_support))
            .unwrap_or_else(|| "-".to_string())
    );
    println!(":: Loaded in {}ms ::", snapshot.elapsed.as_millis());
}

struct Export<'a> {
    path: &'a PathBuf,
    format: OutputFormat,
}

impl RunConfig {
    fn export(&self) -> Option<Export<'_>> {
        Some(Export {
            path: self.output.as_ref()?,
            format: self.output_format?,
        })
    }

    fn exporter(
        &self,
        sheet_name: &str,
        columns: &[ReportColumn],
    ) -> Result<ReportExporter, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout))
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        let file_name = self
            .output
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| ReportOptions::default().file_name);
        let options = ReportOptions {
            title: self.report_title.clone(),
            brand_name: self.brand_name.clone(),
            sheet_name: sheet_name.to_string(),
            file_name,
            branding: self.branding.clone(),
        };
        Ok(ReportExporter::new(client, options).with_columns(columns))
    }
}

async fn export_listing<R>(
    run: &RunConfig,
    listing: &Listing<R>,
    summary: FilterSummary,
    sheet_name: &str,
    columns: &[ReportColumn],
) -> Result<(), String>
where
    R: Record + serde::Serialize + Clone,
{
    let Some(export) = run.export() else {
        return Ok(());
    };
    let bytes = match export.format {
        OutputFormat::Xlsx => {
            let artifact = run
                .exporter(sheet_name, columns)?
                .export(&listing.fetched, &summary)
                .await
                .map_err(|e| e.to_string())?;
            if !artifact.branded && run.branding != BrandingSource::None {
                warn!("report written without logo");
            }
            artifact.bytes
        }
        OutputFormat::Csv => output::render_csv(&listing.fetched).map_err(|e| e.to_string())?,
        OutputFormat::Json => output::render_json(&listing.fetched).map_err(|e| e.to_string())?,
    };
    output::write_artifact(export.path, &bytes)
        .await
        .map_err(|e: ExportError| e.to_string())?;
    info!(
        rows = listing.fetched.len(),
        format = export.format.extension(),
        "exported to {}",
        export.path.display()
    );
    println!(
        ":: Exported {} rows to {} ::",
        listing.fetched.len(),
        export.path.display()
    );
    Ok(())
}

fn range_summary(run: &RunConfig) -> FilterSummary {
    FilterSummary::new()
        .with("Start date", &run.range.start.to_string())
        .with("End date", &run.range.end.to_string())
}

async fn run_view(run: &RunConfig, runner: &Runner, pb: &ProgressBar) -> Result<(), RunOutcome> {
    match run.view {
        View::Plan => {
            let listing = runner.run_plan().await?;
            pb.finish_and_clear();
            print_page(&listing.page(), &PLAN_COLUMNS);
            export_listing(run, &listing, runner.plan_summary(), "Plan", &PLAN_COLUMNS).await?;
        }
        View::Products => {
            let listing = runner.run_products().await?;
            pb.finish_and_clear();
            print_page(&listing.page(), &PRODUCT_COLUMNS);
            export_listing(
                run,
                &listing,
                range_summary(run),
                "Products",
                &PRODUCT_COLUMNS,
            )
            .await?;
        }
        View::Classification => {
            let listing = runner.run_classification().await?;
            pb.finish_and_clear();
            print_page(&listing.page(), &CLASSIFICATION_COLUMNS);
            let summary = range_summary(run).with(
                "Class",
                run.letter.map(|l| l.as_str()).unwrap_or_default(),
            );
            export_listing(
                run,
                &listing,
                summary,
                "Classification",
                &CLASSIFICATION_COLUMNS,
            )
            .await?;
        }
        View::Dashboard => {
            let snapshot = runner.run_dashboard().await?;
            pb.finish_and_clear();
            print_dashboard(&snapshot);
            if run.output.is_some() {
                warn!("the dashboard view has no export, ignoring output");
            }
        }
    }
    Ok(())
}

enum RunOutcome {
    Unavailable(String),
    Failed(String),
}

impl From<RunnerError> for RunOutcome {
    fn from(e: RunnerError) -> Self {
        match e {
            RunnerError::Fetch { .. } => RunOutcome::Unavailable(e.to_string()),
            other => RunOutcome::Failed(other.to_string()),
        }
    }
}

impl From<String> for RunOutcome {
    fn from(e: String) -> Self {
        RunOutcome::Failed(e)
    }
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    logging::init(run.verbose);
    if run.no_color {
        colored::control::set_override(false);
    }
    print_header(&run);
    if run.range.is_inverted() {
        warn!(
            "start {} is after end {}, nothing will match",
            run.range.start, run.range.end
        );
    }

    let source: Arc<dyn DataSource> = match run.input.as_ref() {
        Some(path) => Arc::new(FileSource::new(path)),
        None => Arc::new(Dataset::sample(run.today)),
    };
    let runner = Runner::new(source, run.options()).map_err(|e| e.to_string())?;

    let pb = spinner(run.view);
    let outcome = run_view(&run, &runner, &pb).await;
    pb.finish_and_clear();
    match outcome {
        Ok(()) => Ok(()),
        Err(RunOutcome::Unavailable(detail)) => {
            debug!("{detail}");
            eprintln!("{} {FETCH_NOTICE}", "[WRN]".yellow().bold());
            Ok(())
        }
        Err(RunOutcome::Failed(message)) => Err(message),
    }
}

fn init_config(path: Option<String>) -> Result<(), String> {
    let path = match path {
        Some(p) => config::expand_tilde(&p),
        None => config::default_config_path()
            .ok_or_else(|| "cannot locate home directory for config".to_string())?,
    };
    if config::ensure_default_config_file(&path)? {
        println!(":: Wrote default config to {} ::", path.display());
    } else {
        println!(":: Config already exists at {} ::", path.display());
    }
    Ok(())
}

fn load_user_config(path: Option<&str>) -> Result<ConfigFile, String> {
    match path {
        Some(p) => config::load_config(&config::expand_tilde(p), false),
        None => match config::default_config_path() {
            Some(default) => config::load_config(&default, true),
            None => Ok(ConfigFile::default()),
        },
    }
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                print!("{e}");
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    if args.init_config {
        return init_config(args.config.clone());
    }

    let cfg = load_user_config(args.config.as_deref())?;
    let today: CalendarDate = chrono::Local::now().date_naive().into();
    let run = build_run_config(args, cfg, today)?;

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use clap::Parser;

    fn today() -> CalendarDate {
        crate::dates::normalize("2024-06-30").unwrap()
    }

    fn build(argv: &[&str], cfg: ConfigFile) -> Result<RunConfig, String> {
        let mut full = vec!["patchplan"];
        full.extend_from_slice(argv);
        build_run_config(CliArgs::parse_from(full), cfg, today())
    }

    #[test]
    fn defaults_cover_last_ten_days() {
        let run = build(&[], ConfigFile::default()).unwrap();
        assert_eq!(run.view, View::Plan);
        assert_eq!(run.range.start.to_string(), "2024-06-21");
        assert_eq!(run.range.end, today());
        assert_eq!(run.page_size, 10);
        assert_eq!(run.page, 1);
        assert!(run.output.is_none());
        assert_eq!(run.branding, BrandingSource::None);
    }

    #[test]
    fn cli_overrides_config() {
        let cfg = ConfigFile {
            view: Some("products".to_string()),
            page_size: Some(25),
            category: Some("Paints".to_string()),
            ..ConfigFile::default()
        };
        let run = build(&["--view", "classification", "--letter", "b"], cfg).unwrap();
        assert_eq!(run.view, View::Classification);
        assert_eq!(run.page_size, 25);
        assert_eq!(run.category.as_deref(), Some("Paints"));
        assert_eq!(run.letter, Some(ClassLetter::B));
    }

    #[test]
    fn blank_filters_are_inactive() {
        let run = build(&["--category", "  ", "--search", ""], ConfigFile::default()).unwrap();
        assert!(run.category.is_none());
        assert!(run.search.is_none());
    }

    #[test]
    fn explicit_window_and_format_inference() {
        let run = build(
            &["--start", "2024-01-01", "--end", "2024/01/31", "-o", "out/plan.xlsx"],
            ConfigFile::default(),
        )
        .unwrap();
        assert_eq!(run.range.end.to_string(), "2024-01-31");
        assert_eq!(run.output_format, Some(OutputFormat::Xlsx));
    }

    #[test]
    fn config_values_are_checked_too() {
        let cfg = ConfigFile {
            view: Some("charts".to_string()),
            ..ConfigFile::default()
        };
        assert!(build(&[], cfg).is_err());
        let cfg = ConfigFile {
            output: Some("plan.txt".to_string()),
            ..ConfigFile::default()
        };
        assert!(build(&[], cfg).is_err());
    }

    #[test]
    fn bars_scale_without_overflow() {
        assert_eq!(bar_width(50, 100), 20);
        assert_eq!(bar_width(-5, 100), 0);
        assert_eq!(bar_width(i64::MAX, i64::MAX), 40);
        assert_eq!(bar_width(i64::MAX / 2, i64::MAX), 19);
    }

    #[test]
    fn long_cells_are_clipped() {
        assert_eq!(cell("abc", 5), "abc  ");
        assert_eq!(cell("abcdef", 4), "abc…");
    }

    #[tokio::test]
    async fn missing_dataset_is_a_recoverable_notice() {
        let run = build(
            &["--input", "/nonexistent/patchplan/data.json", "--no-color"],
            ConfigFile::default(),
        )
        .unwrap();
        assert!(run_async(run).await.is_ok());
    }

    #[tokio::test]
    async fn plan_export_writes_workbook() {
        let dir = std::env::temp_dir().join(format!("patchplan-app-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let target = dir.join("plan.xlsx");
        let target_arg = target.to_string_lossy().to_string();
        let run = build(&["-o", target_arg.as_str(), "--no-color"], ConfigFile::default()).unwrap();
        run_async(run).await.unwrap();
        let bytes = tokio::fs::read(&target).await.unwrap();
        assert_eq!(&bytes[..2], b"PK");
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
