//! Binary entry point for `usa-guide`.
//!
//! This module provides the command-line interface for usa-guide with options
//! for configuration file paths, logging verbosity, and trace export. It loads
//! configuration, initializes logging, and starts the service.

use clap::Parser;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use tracing_appender::rolling::{Builder, Rotation};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};
use usa_guide::base::{config::Config, types::Void};

/// Rolled log files kept in `LOG_DIR`.
const MAX_LOG_FILES: usize = 3;

/// usa-guide – answers about living in the USA, powered by Vertex AI Gemini.
///
/// Configuration can come from `config.toml` or environment variables
/// (`GOOGLE_CLOUD_PROJECT`, `VERTEX_LOCATION`, `GEMINI_MODEL`, `PORT`, `LOG_DIR`, ...).
/// Without a project or credentials the service still runs, answering from
/// static reference data.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// By default, the service will look for a config file at `.hidden/config.toml`
    /// in the current directory.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Export spans over OTLP/HTTP (endpoint from `OTEL_EXPORTER_OTLP_ENDPOINT`).
    #[arg(long)]
    otlp: bool,
}

/// Main entry point for the usa-guide binary.
///
/// Loads configuration, sets up logging based on verbosity, and starts the service.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref())?;

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stdout = tracing_subscriber::fmt::layer()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    // Prepare the rolling file layer.

    let (file, _file_guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;

            let appender = Builder::new()
                .rotation(Rotation::DAILY)
                .filename_prefix("app")
                .filename_suffix("log")
                .max_log_files(MAX_LOG_FILES)
                .build(dir)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let layer = tracing_subscriber::fmt::layer().with_ansi(false).with_target(true).with_writer(writer);

            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // Prepare the otlp layer.

    let otel = if args.otlp {
        let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
        let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("usa-guide");

        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).with(file).init();

    usa_guide::start(config).await
}
