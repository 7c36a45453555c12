use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install the global tracing subscriber described by the logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "vetrina_transient_hit_total",
            Unit::Count,
            "Total number of transient cache hits."
        );
        describe_counter!(
            "vetrina_transient_miss_total",
            Unit::Count,
            "Total number of transient cache misses, labeled by reason."
        );
        describe_counter!(
            "vetrina_transient_store_total",
            Unit::Count,
            "Total number of entries written to the transient cache."
        );
        describe_counter!(
            "vetrina_transient_purge_total",
            Unit::Count,
            "Total number of transient entries removed by flushes."
        );
        describe_counter!(
            "vetrina_flush_event_total",
            Unit::Count,
            "Total number of flush events consumed."
        );
        describe_counter!(
            "vetrina_recent_query_total",
            Unit::Count,
            "Total number of recent-item queries issued to the content store."
        );
        describe_counter!(
            "vetrina_recent_query_failure_total",
            Unit::Count,
            "Total number of failed recent-item queries."
        );
        describe_histogram!(
            "vetrina_flush_consume_duration_seconds",
            Unit::Seconds,
            "Flush consumption latency in seconds."
        );
    });
}
