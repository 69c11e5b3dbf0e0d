// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info, warn};
use std::io::Write;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use docxlate::app_config::{Config, LogLevel};
use docxlate::app_controller::Controller;
use docxlate::providers;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// docxlate - bilingual document translator
///
/// Reads a .docx document, translates every paragraph and writes a new
/// document with the original text on the left and the translation on the
/// right.
#[derive(Parser, Debug)]
#[command(name = "docxlate")]
#[command(version)]
#[command(about = "Translate a .docx document into a side-by-side bilingual table")]
#[command(long_about = "docxlate reads a .docx document, translates each paragraph and writes
a two-column document with the original on the left and the translation on the right.

EXAMPLES:
    docxlate --doc report.docx                      # Translate into English with Google
    docxlate --doc report.docx -c docxlate.json     # Use a configuration file
    docxlate --doc report.docx --log-level debug    # Show every pipeline step

CONFIGURATION:
    No configuration file is read unless --config is given. Without one the
    target language is 'en' and the output is written to document-output.docx
    in the working directory.")]
struct CommandLineOptions {
    /// Source document to translate
    #[arg(long, value_name = "PATH")]
    doc: PathBuf,

    /// Configuration file path (JSON)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger, verbosity is controlled through log::set_max_level
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Label and ANSI color for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("ERROR", "\x1B[1;31m"),
            Level::Warn => ("WARN ", "\x1B[1;33m"),
            Level::Info => ("INFO ", "\x1B[1;32m"),
            Level::Debug => ("DEBUG", "\x1B[1;36m"),
            Level::Trace => ("TRACE", "\x1B[1;35m"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (label, color) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, label, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    // Usage errors exit with clap's own status before anything else runs
    let options = CommandLineOptions::parse();

    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(options).await {
        error!("Error {}", e);
        std::process::exit(1);
    }
}

async fn run(options: CommandLineOptions) -> Result<()> {
    let config = match &options.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let level = options.log_level.map(LogLevel::from).unwrap_or(config.log_level);
    log::set_max_level(level.to_level_filter());

    let controller = Controller::with_config(config);

    // The document is opened before any client is built, so a bad path
    // fails without touching the network
    let source = controller.open(&options.doc)?;
    let provider = providers::create_provider(&controller.config().translation)?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling translation");
            interrupt.cancel();
        }
    });

    let summary = controller.process(source, provider, &cancel).await?;
    info!(
        "Wrote {} rows to {}",
        summary.paragraphs,
        summary.output_path.display()
    );

    Ok(())
}
