use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

pub const METRIC_SESSION_REFRESH: &str = "contentdesk_session_refresh_total";
pub const METRIC_SESSION_EXPIRED: &str = "contentdesk_session_expired_total";
pub const METRIC_AUTOSAVE: &str = "contentdesk_autosave_total";
pub const METRIC_UPLOAD: &str = "contentdesk_upload_total";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Logs go to stderr so command output on stdout stays machine readable.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
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
            METRIC_SESSION_REFRESH,
            Unit::Count,
            "Credential refresh attempts, labelled by result."
        );
        describe_counter!(
            METRIC_SESSION_EXPIRED,
            Unit::Count,
            "Times the session-expired hook fired."
        );
        describe_counter!(
            METRIC_AUTOSAVE,
            Unit::Count,
            "Draft autosave outcomes, labelled by result (saved, skipped, failed)."
        );
        describe_counter!(
            METRIC_UPLOAD,
            Unit::Count,
            "Media uploads, labelled by content type and result."
        );
    });
}
