//! Logging setup and the per-request root span.
//!
//! Every request runs inside a root span that carries the service name and,
//! once the session has been resolved, the id of the signed-in user. Events
//! logged while handling the request inherit both fields.

use std::str::FromStr;
use std::sync::OnceLock;

use actix_web::{
    Error,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
};
use tracing::Span;
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SERVICE_NAME: &str = "quill";
const DEFAULT_FILTER: &str = "info,quill_server=debug,quill_infra=debug";

static SERVICE_NAME: OnceLock<String> = OnceLock::new();

/// Output format of the log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-oriented output for development.
    Pretty,
    /// One line per event.
    Compact,
    /// One JSON object per event, including the enclosing request span.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Telemetry configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub format: LogFormat,
    /// Stamped on every request span.
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Load configuration from `LOG_FORMAT` and `SERVICE_NAME`.
    ///
    /// An unrecognised format falls back to pretty output.
    pub fn from_env() -> Self {
        let format = match std::env::var("LOG_FORMAT") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                eprintln!("{e}, using pretty logs");
                LogFormat::Pretty
            }),
            Err(_) => LogFormat::Pretty,
        };

        Self {
            format,
            service_name: std::env::var("SERVICE_NAME")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
        }
    }
}

/// Initialize the global tracing subscriber.
pub fn init_telemetry(config: &TelemetryConfig) {
    let _ = SERVICE_NAME.set(config.service_name.clone());

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
        LogFormat::Compact => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .init(),
    }

    tracing::info!(
        service = service_name(),
        format = ?config.format,
        "Telemetry initialized"
    );
}

/// Service name set by [`init_telemetry`], or the default.
pub fn service_name() -> &'static str {
    SERVICE_NAME.get().map_or(DEFAULT_SERVICE_NAME, String::as_str)
}

/// Root span for every request handled by the server.
pub struct QuillRootSpan;

impl RootSpanBuilder for QuillRootSpan {
    fn on_request_start(request: &ServiceRequest) -> Span {
        tracing_actix_web::root_span!(
            request,
            service = service_name(),
            user_id = tracing::field::Empty
        )
    }

    fn on_request_end<B: MessageBody>(span: Span, outcome: &Result<ServiceResponse<B>, Error>) {
        DefaultRootSpanBuilder::on_request_end(span, outcome);
    }
}
