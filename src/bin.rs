//! `incident-response-bot` executable.
//!
//! Parses the two CLI flags, wires stdout and OTLP tracing, then hands the
//! loaded configuration to the library.

use clap::Parser;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};
use incident_response_bot::base::{config::Config, types::Void};

/// Answers security-operations commands in Webex with data from Secure
/// Endpoint, Umbrella and Spamhaus.
///
/// Credentials are read from environment variables such as
/// `WEBEX_TEAMS_ACCESS_TOKEN` or `SPAMHAUS_USER`, which override any value in
/// the optional TOML file.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// TOML file holding integration credentials and endpoint overrides.
    ///
    /// Without it, `.hidden/config.toml` under the working directory is used
    /// when present; otherwise only the environment is consulted.
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
    /// Log more detail; `-v` adds debug output, `-vv` adds per-request traces.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Console output, one line per span open and close.

    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Spans are also exported over OTLP/HTTP.

    let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
    let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("incident-response-bot");
    let otel = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).init();

    let config = Config::load(args.config.as_deref())?;

    incident_response_bot::start(config).await
}
