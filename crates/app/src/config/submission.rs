//! Order Endpoint Config

use std::time::Duration;

use clap::Args;
use jiff::tz::TimeZone;
use tracing::warn;

use crate::submission::RetryPolicy;

/// Wire format expected by the order endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum EndpointKind {
    /// Formspree form endpoint; named fields plus a message body.
    #[default]
    Formspree,

    /// Google Apps Script web app; flat camelCase JSON.
    AppsScript,
}

/// Order endpoint settings.
#[derive(Debug, Clone, Args)]
pub struct SubmissionConfig {
    /// URL orders are POSTed to; orders are only backed up locally when unset
    #[arg(long, env = "ORDER_ENDPOINT_URL", global = true)]
    pub order_endpoint_url: Option<String>,

    /// Endpoint wire format (formspree, apps-script)
    #[arg(
        long,
        env = "ORDER_ENDPOINT_KIND",
        value_enum,
        default_value_t = EndpointKind::Formspree,
        global = true
    )]
    pub order_endpoint_kind: EndpointKind,

    /// Notification address copied on Formspree submissions
    #[arg(long, env = "ORDER_NOTIFY_CC", global = true)]
    pub order_notify_cc: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(
        long,
        env = "ORDER_SUBMIT_TIMEOUT_SECONDS",
        default_value_t = 10_u64,
        global = true
    )]
    pub order_submit_timeout_seconds: u64,

    /// Attempts per order, including the first.
    #[arg(
        long,
        env = "ORDER_SUBMIT_MAX_ATTEMPTS",
        default_value_t = 3_u32,
        global = true
    )]
    pub order_submit_max_attempts: u32,

    /// Backoff before the first retry, doubled for each further retry.
    #[arg(
        long,
        env = "ORDER_SUBMIT_BACKOFF_MS",
        default_value_t = 500_u64,
        global = true
    )]
    pub order_submit_backoff_ms: u64,

    /// Time zone used for the order date and time fields.
    #[arg(
        long,
        env = "ORDER_TIMEZONE",
        default_value = "Europe/London",
        global = true
    )]
    pub order_timezone: String,
}

impl SubmissionConfig {
    /// Configured endpoint URL, if any.
    pub fn endpoint(&self) -> Option<&str> {
        self.order_endpoint_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.order_submit_timeout_seconds)
    }

    /// Retry policy for transient failures.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.order_submit_max_attempts.max(1),
            initial_backoff: Duration::from_millis(self.order_submit_backoff_ms),
        }
    }

    /// Order time zone, falling back to UTC when the name is unknown.
    pub fn time_zone(&self) -> TimeZone {
        TimeZone::get(&self.order_timezone).unwrap_or_else(|error| {
            warn!(
                time_zone = %self.order_timezone,
                %error,
                "unknown order time zone, using UTC"
            );

            TimeZone::UTC
        })
    }
}
