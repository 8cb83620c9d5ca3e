use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
pub const ORDERS_PLACED_TOTAL: &str = "orders_placed_total";
pub const PAYMENT_NOTIFICATIONS_TOTAL: &str = "payment_notifications_total";

const DEFAULT_FILTER: &str = "market_api=debug,tower_http=info,axum=info";

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Installs the global subscriber: JSON lines in production, compact text otherwise.
pub fn init(json: bool) -> anyhow::Result<()> {
    describe_metrics();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = if json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed()
    } else {
        fmt::layer().compact().with_target(true).boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install tracing subscriber: {err}"))
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            HTTP_REQUESTS_TOTAL,
            Unit::Count,
            "Total number of HTTP requests by handler, method and status class."
        );
        describe_histogram!(
            HTTP_REQUEST_DURATION_SECONDS,
            Unit::Seconds,
            "HTTP request latency in seconds."
        );
        describe_counter!(
            ORDERS_PLACED_TOTAL,
            Unit::Count,
            "Total number of successfully placed orders."
        );
        describe_counter!(
            PAYMENT_NOTIFICATIONS_TOTAL,
            Unit::Count,
            "Payment provider notifications by outcome."
        );
    });
}
