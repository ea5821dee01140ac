use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "patchplan",
    version,
    about = "filter, page and export patching plan data",
    long_about = "patchplan filters a patching-plan dataset by date window, category, product and free text, prints one page of the result and exports the filtered rows as a styled xlsx report, csv or json.\n\nExamples:\n  patchplan\n  patchplan --view products --search ITM-10 --page 2\n  patchplan --start 2024-01-01 --end 2024-01-31 --category Paints -o plan.xlsx\n  patchplan --input ./dataset.json --view dashboard\n\nTip: Use --init-config to write ~/.patchplan/config.yml and keep invocations short."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "vb",
        visible_alias = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "clr",
        visible_alias = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        short = 'n',
        long = "nc",
        visible_alias = "no-color",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'i',
        long = "in",
        visible_alias = "input",
        value_name = "FILE",
        help_heading = "Input",
        help = "JSON dataset to load (defaults to the built-in sample)."
    )]
    pub input: Option<String>,

    #[arg(
        short = 'C',
        long = "cfg",
        visible_alias = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.patchplan/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "ic",
        visible_alias = "init-config",
        help_heading = "Input",
        help = "Write a default config file if none exists, then exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 'w',
        long = "vw",
        visible_alias = "view",
        value_name = "VIEW",
        help_heading = "View",
        help = "View to run: plan, products, classification or dashboard."
    )]
    pub view: Option<String>,

    #[arg(
        short = 's',
        long = "sd",
        visible_alias = "start",
        value_name = "DATE",
        help_heading = "Filters",
        help = "First day of the window (YYYY-MM-DD)."
    )]
    pub start: Option<String>,

    #[arg(
        short = 'e',
        long = "ed",
        visible_alias = "end",
        value_name = "DATE",
        help_heading = "Filters",
        help = "Last day of the window (YYYY-MM-DD)."
    )]
    pub end: Option<String>,

    #[arg(
        short = 'd',
        long = "dy",
        visible_alias = "days",
        value_name = "N",
        help_heading = "Filters",
        help = "Window length in days back from today when --start/--end are unset."
    )]
    pub days: Option<u64>,

    #[arg(
        short = 'g',
        long = "cat",
        visible_alias = "category",
        value_name = "NAME",
        help_heading = "Filters",
        help = "Only rows in this category (exact match)."
    )]
    pub category: Option<String>,

    #[arg(
        short = 'P',
        long = "pd",
        visible_alias = "product",
        value_name = "NAME",
        help_heading = "Filters",
        help = "Only rows for this product (exact match)."
    )]
    pub product: Option<String>,

    #[arg(
        short = 'l',
        long = "cl",
        visible_alias = "letter",
        value_name = "A-E",
        help_heading = "Filters",
        help = "Only classification rows with this letter."
    )]
    pub letter: Option<String>,

    #[arg(
        short = 'q',
        long = "q",
        visible_alias = "search",
        value_name = "TEXT",
        help_heading = "Filters",
        help = "Case-insensitive text search over the view's search fields."
    )]
    pub search: Option<String>,

    #[arg(
        short = 'z',
        long = "ps",
        visible_alias = "page-size",
        value_name = "N",
        help_heading = "Paging",
        help = "Rows per page."
    )]
    pub page_size: Option<usize>,

    #[arg(
        short = 'p',
        long = "pg",
        visible_alias = "page",
        value_name = "N",
        allow_negative_numbers = true,
        help_heading = "Paging",
        help = "Page to show (clamped into range)."
    )]
    pub page: Option<i64>,

    #[arg(
        short = 'o',
        long = "o",
        visible_alias = "output",
        value_name = "FILE",
        help_heading = "Output",
        help = "Export the filtered rows to FILE."
    )]
    pub output: Option<String>,

    #[arg(
        short = 'F',
        long = "of",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Export format: xlsx, csv or json (inferred from --output when unset)."
    )]
    pub output_format: Option<String>,

    #[arg(
        long = "lg",
        visible_alias = "logo",
        value_name = "URL|FILE",
        help_heading = "Output",
        help = "Logo placed at the top of xlsx reports."
    )]
    pub logo: Option<String>,

    #[arg(
        long = "bn",
        visible_alias = "brand-name",
        value_name = "TEXT",
        help_heading = "Output",
        help = "Text shown when no logo is available."
    )]
    pub brand_name: Option<String>,

    #[arg(
        long = "rt",
        visible_alias = "report-title",
        value_name = "TEXT",
        help_heading = "Output",
        help = "Title of xlsx reports."
    )]
    pub report_title: Option<String>,

    #[arg(
        long = "to",
        visible_alias = "timeout",
        value_name = "SECONDS",
        help_heading = "Output",
        help = "Timeout for fetching a remote logo."
    )]
    pub timeout: Option<u64>,
}
