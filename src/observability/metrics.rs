//! Simple metrics module for the conference scraper
//!
//! Records counters and histograms through the `metrics` facade using
//! Prometheus naming conventions. Without an installed recorder every call is
//! a no-op, which keeps library code and tests free of setup.

use crate::constants::PUSHGATEWAY_ENV;
use crate::types::FailureKind;
use std::fmt;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Enum representing all metric names used in the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    LandingPagesProcessed,
    LandingPagesFailed,
    TalkUrlsDiscovered,
    TalksComplete,
    TalksEmpty,
    FetchDuration,
    RunDuration,
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::LandingPagesProcessed => "conference_landing_pages_total",
            MetricName::LandingPagesFailed => "conference_landing_pages_failed_total",
            MetricName::TalkUrlsDiscovered => "conference_talk_urls_discovered_total",
            MetricName::TalksComplete => "conference_talks_complete_total",
            MetricName::TalksEmpty => "conference_talks_empty_total",
            MetricName::FetchDuration => "conference_fetch_duration_seconds",
            MetricName::RunDuration => "conference_run_duration_seconds",
        }
    }
}

struct MetricsState {
    handle: metrics_exporter_prometheus::PrometheusHandle,
    pushgateway_url: Option<String>,
}

static METRICS_HANDLE: OnceLock<MetricsState> = OnceLock::new();

/// Install the Prometheus recorder. Push gateway support is enabled when
/// `CONFERENCE_PUSHGATEWAY_URL` is set.
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;

    let pushgateway_url = std::env::var(PUSHGATEWAY_ENV).ok();
    if pushgateway_url.is_some() {
        info!("Metrics system initialized with push gateway support");
    } else {
        info!("Metrics system initialized (no push gateway)");
    }

    METRICS_HANDLE
        .set(MetricsState { handle, pushgateway_url })
        .map_err(|_| "metrics already initialized")?;
    Ok(())
}

/// Push the full snapshot once, typically at the end of a run.
pub async fn push_all(job: &str) {
    let Some(state) = METRICS_HANDLE.get() else { return };
    let Some(url) = state.pushgateway_url.as_deref() else { return };

    let push_url = format!("{}/metrics/job/{}", url.trim_end_matches('/'), job);
    let result = reqwest::Client::new()
        .post(&push_url)
        .header("Content-Type", "text/plain; version=0.0.4")
        .body(state.handle.render())
        .send()
        .await;

    match result {
        Ok(resp) if resp.status().is_success() => info!("Pushed metrics to {}", push_url),
        Ok(resp) => warn!("Push gateway responded with status {}", resp.status()),
        Err(e) => warn!("Failed to push metrics: {}", e),
    }
}

pub fn fetch_duration(secs: f64) {
    ::metrics::histogram!(MetricName::FetchDuration.as_str()).record(secs);
}

pub fn run_duration(secs: f64) {
    ::metrics::histogram!(MetricName::RunDuration.as_str()).record(secs);
}

pub mod landing {
    use super::MetricName;

    pub fn processed(discovered: usize) {
        ::metrics::counter!(MetricName::LandingPagesProcessed.as_str()).increment(1);
        ::metrics::counter!(MetricName::TalkUrlsDiscovered.as_str()).increment(discovered as u64);
    }

    pub fn failed() {
        ::metrics::counter!(MetricName::LandingPagesFailed.as_str()).increment(1);
    }
}

pub mod talks {
    use super::{FailureKind, MetricName};

    pub fn complete() {
        ::metrics::counter!(MetricName::TalksComplete.as_str()).increment(1);
    }

    pub fn empty(kind: FailureKind) {
        ::metrics::counter!(MetricName::TalksEmpty.as_str(), "kind" => kind.as_str()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prometheus_style() {
        for name in [
            MetricName::LandingPagesProcessed,
            MetricName::LandingPagesFailed,
            MetricName::TalkUrlsDiscovered,
            MetricName::TalksComplete,
            MetricName::TalksEmpty,
            MetricName::FetchDuration,
            MetricName::RunDuration,
        ] {
            let s = name.as_str();
            assert!(s.starts_with("conference_"));
            assert!(s.ends_with("_total") || s.ends_with("_seconds"));
            assert_eq!(name.to_string(), s);
        }
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        landing::processed(3);
        talks::empty(FailureKind::Structure);
        fetch_duration(0.25);
    }
}
