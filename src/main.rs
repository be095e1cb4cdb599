//! CLI entry point for the score report tool.
//!
//! Reads subject records from a file or the console, averages them and
//! writes a sorted report to a file or standard output.

use anyhow::Result;
use clap::Parser;
use score_report::config::{CategorySet, Settings};
use score_report::ingest::{Mode, ingest_path, ingest_stdin};
use score_report::output::{Format, write_report};
use score_report::ranking::{SortPolicy, sort_subjects};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "score_report")]
#[command(about = "Aggregates subject scores and prints a sorted report", long_about = None)]
struct Cli {
    /// Input file (default: read from the console)
    #[arg(short = 'f', value_name = "PATH")]
    file_short: Option<String>,

    /// Input file, long form. `-f` wins when both are given
    #[arg(long = "file", value_name = "PATH")]
    file_long: Option<String>,

    /// Output file (default: standard output)
    #[arg(short = 'o', value_name = "PATH")]
    output_short: Option<String>,

    /// Output file, long form. `-o` wins when both are given
    #[arg(long = "output", value_name = "PATH")]
    output_long: Option<String>,

    /// How input lines are interpreted
    #[arg(long, value_enum, default_value_t = Mode::Categorized)]
    mode: Mode,

    /// Report ordering (default: average for categorized, name for flat)
    #[arg(long, value_enum)]
    sort: Option<SortPolicy>,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Comma-separated category allow-list, overrides the settings file
    #[arg(long, value_delimiter = ',')]
    categories: Option<Vec<String>>,

    /// JSON settings file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Picks the short-form value over the long form, treating empty strings as unset.
fn pick(short: Option<&str>, long: Option<&str>) -> Option<PathBuf> {
    short
        .filter(|s| !s.is_empty())
        .or(long.filter(|s| !s.is_empty()))
        .map(PathBuf::from)
}

/// Run options after merging flags, the settings file and defaults.
#[derive(Debug)]
struct Resolved {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    categories: CategorySet,
    policy: SortPolicy,
}

/// Flags win over the settings file, which wins over built-in defaults.
fn resolve(cli: &Cli) -> Result<Resolved> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(categories) = &cli.categories {
        settings.categories = categories.clone();
    }
    debug!(?settings, "Settings resolved");

    let input = pick(cli.file_short.as_deref(), cli.file_long.as_deref()).or_else(|| {
        match cli.mode {
            Mode::Flat => Some(PathBuf::from(&settings.flat_input)),
            Mode::Categorized => None,
        }
    });

    Ok(Resolved {
        input,
        output: pick(cli.output_short.as_deref(), cli.output_long.as_deref()),
        categories: settings.category_set(),
        policy: cli.sort.unwrap_or_else(|| SortPolicy::default_for(cli.mode)),
    })
}

/// Filter read from `env_var`, falling back to `default` when it is unset.
fn env_filter(env_var: &str, default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var(env_var)
        .from_env_lossy()
}

/// Logging setup: colored stderr, plus a JSON rolling log file when
/// `LOG_FILE_PATH` is set. The returned guard must outlive the run.
fn init_logging() -> Option<WorkerGuard> {
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", LevelFilter::INFO));

    let (json_layer, guard) = match std::env::var("LOG_FILE_PATH") {
        Ok(log_file_path) => {
            let log_dir = Path::new(&log_file_path)
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("logs"));
            let log_file_name = Path::new(&log_file_path)
                .file_name()
                .unwrap_or(OsStr::new("score_report.log"));

            let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(non_blocking_file)
                .with_filter(env_filter("RUST_LOG_JSON", LevelFilter::DEBUG));
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    guard
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _log_guard = init_logging();

    let cli = Cli::parse();

    let resolved = resolve(&cli)?;

    let ingested = match &resolved.input {
        Some(path) => ingest_path(path, cli.mode, &resolved.categories)?,
        None => ingest_stdin(cli.mode, &resolved.categories)?,
    };

    let subjects = sort_subjects(ingested.into_subjects(), resolved.policy);

    write_report(&subjects, cli.mode, cli.format, resolved.output.as_deref())?;

    info!(subjects = subjects.len(), "Done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use score_report::config::DEFAULT_FLAT_INPUT;
    use std::io::Write;

    #[test]
    fn test_short_flag_wins() {
        let cli = Cli::parse_from(["score_report", "-f", "a.txt", "--file", "b.txt"]);
        assert_eq!(resolve(&cli).unwrap().input, Some(PathBuf::from("a.txt")));
    }

    #[test]
    fn test_long_flag_alone() {
        let cli = Cli::parse_from(["score_report", "--output", "out.txt"]);
        assert_eq!(resolve(&cli).unwrap().output, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn test_empty_short_flag_is_unset() {
        assert_eq!(
            pick(Some(""), Some("b.txt")),
            Some(PathBuf::from("b.txt"))
        );
        assert_eq!(pick(None, None), None);
    }

    #[test]
    fn test_mode_and_categories_flags() {
        let cli = Cli::parse_from([
            "score_report",
            "--mode",
            "flat",
            "--categories",
            "art,music",
            "--format",
            "csv",
        ]);
        assert_eq!(cli.mode, Mode::Flat);
        assert_eq!(cli.format, Format::Csv);
        assert_eq!(
            cli.categories,
            Some(vec!["art".to_string(), "music".to_string()])
        );
        assert!(cli.sort.is_none());
    }

    #[test]
    fn test_categories_flag_overrides_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"categories": ["chemistry"]}}"#).unwrap();
        let config = file.path().to_str().unwrap();

        let from_file = resolve(&Cli::parse_from(["score_report", "--config", config])).unwrap();
        assert!(from_file.categories.contains("chemistry"));
        assert!(!from_file.categories.contains("math"));

        let cli = Cli::parse_from(["score_report", "--config", config, "--categories", "art"]);
        let resolved = resolve(&cli).unwrap();
        assert!(resolved.categories.contains("art"));
        assert!(!resolved.categories.contains("chemistry"));
    }

    #[test]
    fn test_default_categories_without_flags() {
        let resolved = resolve(&Cli::parse_from(["score_report"])).unwrap();
        assert_eq!(resolved.categories, CategorySet::default());
        assert_eq!(resolved.input, None);
        assert_eq!(resolved.output, None);
        assert_eq!(resolved.policy, SortPolicy::Average);
    }

    #[test]
    fn test_flat_mode_defaults_to_flat_input() {
        let resolved = resolve(&Cli::parse_from(["score_report", "--mode", "flat"])).unwrap();
        assert_eq!(resolved.input, Some(PathBuf::from(DEFAULT_FLAT_INPUT)));
        assert_eq!(resolved.policy, SortPolicy::Name);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"flat_input": "marks.txt"}}"#).unwrap();
        let cli = Cli::parse_from([
            "score_report",
            "--mode",
            "flat",
            "--config",
            file.path().to_str().unwrap(),
        ]);
        assert_eq!(resolve(&cli).unwrap().input, Some(PathBuf::from("marks.txt")));

        let cli = Cli::parse_from(["score_report", "--mode", "flat", "--file", "in.txt"]);
        assert_eq!(resolve(&cli).unwrap().input, Some(PathBuf::from("in.txt")));
    }

    #[test]
    fn test_sort_flag_overrides_mode_default() {
        let cli = Cli::parse_from(["score_report", "--sort", "name"]);
        assert_eq!(cli.mode, Mode::Categorized);
        assert_eq!(resolve(&cli).unwrap().policy, SortPolicy::Name);
    }

    #[test]
    fn test_missing_settings_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("settings.json");
        let cli = Cli::parse_from(["score_report", "--config", missing.to_str().unwrap()]);
        assert!(resolve(&cli).is_err());
    }

    #[test]
    fn test_env_filter_default_and_override() {
        let unset = env_filter("SCORE_REPORT_TEST_UNSET_FILTER", LevelFilter::INFO);
        assert_eq!(unset.max_level_hint(), Some(LevelFilter::INFO));

        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("SCORE_REPORT_TEST_DEBUG_FILTER", "debug") };
        let raised = env_filter("SCORE_REPORT_TEST_DEBUG_FILTER", LevelFilter::INFO);
        assert_eq!(raised.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
