//! Logging and telemetry config

use std::time::Duration;

use clap::Args;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable lines.
    Compact,

    /// One JSON object per event.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Requests slower than this are logged at `warn`
    #[arg(long, env = "SLOW_REQUEST_THRESHOLD_MS", default_value_t = 1_000)]
    pub slow_request_threshold_ms: u64,
}

/// OpenTelemetry trace export settings. Export is off unless `OTEL_ENABLED` is set.
#[derive(Debug, Args)]
pub struct TelemetryConfig {
    #[arg(long = "otel-enabled", env = "OTEL_ENABLED", default_value_t = false)]
    pub enabled: bool,

    /// Continue traces from incoming `traceparent` headers
    #[arg(
        long = "otel-parent-propagation",
        env = "OTEL_PARENT_PROPAGATION_ENABLED",
        default_value_t = false
    )]
    pub parent_propagation: bool,

    /// OTLP gRPC collector endpoint
    #[arg(
        long = "otel-endpoint",
        env = "OTEL_EXPORTER_OTLP_ENDPOINT",
        default_value = "http://localhost:4317"
    )]
    pub endpoint: String,

    #[arg(
        long = "otel-timeout-seconds",
        env = "OTEL_EXPORTER_OTLP_TIMEOUT_SECONDS",
        default_value_t = 3
    )]
    pub export_timeout_seconds: u64,

    #[arg(long = "otel-service-name", env = "OTEL_SERVICE_NAME", default_value = "rigforge-json")]
    pub service_name: String,

    #[arg(
        long = "otel-service-version",
        env = "OTEL_SERVICE_VERSION",
        default_value = env!("CARGO_PKG_VERSION")
    )]
    pub service_version: String,

    #[arg(
        long = "otel-environment",
        env = "OTEL_DEPLOYMENT_ENVIRONMENT",
        default_value = "development"
    )]
    pub environment: String,

    /// Fraction of root traces to sample, clamped to [0.0, 1.0]
    #[arg(long = "otel-sample-ratio", env = "OTEL_TRACE_SAMPLE_RATIO", default_value_t = 1.0)]
    pub sample_ratio: f64,
}

impl TelemetryConfig {
    #[must_use]
    pub fn export_timeout(&self) -> Duration {
        Duration::from_secs(self.export_timeout_seconds)
    }

    /// Parent propagation only applies while export is on.
    #[must_use]
    pub fn propagates_parent(&self) -> bool {
        self.enabled && self.parent_propagation
    }
}
