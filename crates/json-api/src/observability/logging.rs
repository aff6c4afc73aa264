//! Logging subscriber initialisation.

use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

use crate::config::{ServerConfig, telemetry::LogFormat};

use super::ObservabilityError;

/// Crates whose chatter is capped at `warn` unless `RUST_LOG` says otherwise.
const QUIET_TARGETS: [&str; 6] = ["h2", "hyper", "tonic", "opentelemetry", "sqlx", "tower"];

pub(super) fn init_subscriber(
    config: &ServerConfig,
    tracer_provider: Option<&SdkTracerProvider>,
) -> Result<(), ObservabilityError> {
    let otel_layer = tracer_provider.map(|provider| {
        let tracer = provider.tracer(config.telemetry.service_name.clone());

        tracing_opentelemetry::layer().with_tracer(tracer)
    });

    let fmt_layer = match config.logging.log_format {
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(otel_layer)
        .with(fmt_layer)
        .with(env_filter(&config.logging.log_level))
        .try_init()?;

    Ok(())
}

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(log_level)))
}

fn directives(log_level: &str) -> String {
    QUIET_TARGETS
        .iter()
        .fold(log_level.to_string(), |acc, target| format!("{acc},{target}=warn"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_keep_level_and_quiet_dependencies() {
        let directives = directives("debug");

        assert!(directives.starts_with("debug,"), "base level comes first: {directives}");
        assert!(directives.contains("sqlx=warn"), "sqlx should be quieted: {directives}");
        assert!(directives.contains("hyper=warn"), "hyper should be quieted: {directives}");
    }

    #[test]
    fn directives_parse_as_env_filter() {
        assert!(
            EnvFilter::try_new(directives("info")).is_ok(),
            "generated directives must be a valid filter"
        );
    }
}
