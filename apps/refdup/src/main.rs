//! refdup - duplicate cite-key checker
//!
//! Reads BibTeX files and reports entries whose cite key already appeared
//! earlier in the same file.

mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use refdup_core::{DuplicateDetector, RefdupConfig, ReportFormat};

#[derive(Parser, Debug)]
#[command(name = "refdup", version, about = "Find repeated cite keys in BibTeX files")]
struct Cli {
    /// BibTeX files to check
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Report format (defaults to the configured format)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Exit with status 1 when any duplicates are found
    #[arg(long)]
    fail_on_duplicates: bool,

    /// Config file to use instead of ~/.refdup/config.toml and .refdup.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Text,
    Json,
    Keys,
    Bibtex,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
            FormatArg::Keys => ReportFormat::Keys,
            FormatArg::Bibtex => ReportFormat::Bibtex,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(true) => ExitCode::from(1),
        Ok(false) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(2)
        }
    }
}

/// Check every file; returns whether the run should fail on duplicates
fn run(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let config = load_config(cli.config.as_deref())?;
    let format = cli.format.map(ReportFormat::from).unwrap_or(config.report.format);
    let fail_on_duplicates = cli.fail_on_duplicates || config.report.fail_on_duplicates;

    let detector = DuplicateDetector::new(config.detector);
    let mut found_any = false;

    for path in &cli.files {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        let result = detector
            .analyze(&text)
            .map_err(|e| format!("{}: {}", path.display(), e))?;

        tracing::debug!(
            "{}: {} entries, {} duplicates",
            path.display(),
            result.entry_count,
            result.duplicates.len()
        );
        found_any |= result.has_duplicates();

        print!("{}", report::render(format, path, &result)?);
    }

    Ok(fail_on_duplicates && found_any)
}

fn load_config(explicit: Option<&Path>) -> Result<RefdupConfig, Box<dyn std::error::Error>> {
    let config = match explicit {
        Some(path) => RefdupConfig::load_from_file(path)
            .map_err(|e| format!("{}: {}", path.display(), e))?,
        None => {
            let cwd = std::env::current_dir().ok();
            RefdupConfig::load_standard(cwd.as_deref())?
        }
    };
    Ok(config)
}
