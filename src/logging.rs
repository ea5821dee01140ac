use colored::*;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Prints `[INF] message field=value` with a colored level tag.
pub struct TagFormatter;

fn tag(level: &Level) -> ColoredString {
    match *level {
        Level::TRACE => "[TRC]".dimmed(),
        Level::DEBUG => "[DBG]".blue(),
        Level::INFO => "[INF]".green().bold(),
        Level::WARN => "[WRN]".yellow().bold(),
        Level::ERROR => "[ERR]".red().bold(),
    }
}

impl<S, N> FormatEvent<S, N> for TagFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> format::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        write!(writer, "{} ", tag(event.metadata().level()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Default directive for a `-v` count. `RUST_LOG` wins when set.
pub fn directive(verbose: u8) -> &'static str {
    match verbose {
        0 => "patchplan=warn",
        1 => "patchplan=info",
        2 => "patchplan=debug",
        _ => "patchplan=trace",
    }
}

/// Installs the stderr subscriber. Safe to call more than once.
pub fn init(verbose: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(TagFormatter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(directive(0), "patchplan=warn");
        assert_eq!(directive(2), "patchplan=debug");
        assert_eq!(directive(9), "patchplan=trace");
    }

    #[test]
    fn tags_are_fixed_width() {
        for level in [Level::INFO, Level::WARN, Level::ERROR] {
            assert_eq!(tag(&level).chars().filter(|c| c.is_ascii_alphabetic()).count(), 3);
        }
    }
}
