use super::normalize::normalize_record;
use super::pool::{run_bounded, Slot};
use crate::apis::{LandingPageCrawler, TalkExtractor};
use crate::apis::landing::landing_page_urls;
use crate::app::ports::{FailureSink, HttpClientPort};
use crate::config::Config;
use crate::error::Result;
use crate::observability::metrics;
use crate::observability::CollectingFailureSink;
use crate::types::{FailureKind, FailureReport, TalkRecord, TalkUrl};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Drives enumeration and extraction over the whole year range.
pub struct PipelineOrchestrator {
    config: Config,
    landing: Arc<LandingPageCrawler>,
    extractor: Arc<TalkExtractor>,
    failures: Arc<CollectingFailureSink>,
}

impl PipelineOrchestrator {
    pub fn new(config: Config, http: Arc<dyn HttpClientPort>) -> Result<Self> {
        config.validate()?;
        let failures = Arc::new(CollectingFailureSink::new());
        let sink: Arc<dyn FailureSink> = failures.clone();
        let landing = Arc::new(LandingPageCrawler::new(http.clone(), sink.clone(), &config.host)?);
        let extractor = Arc::new(TalkExtractor::new(http, sink));
        Ok(Self { config, landing, extractor, failures })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Every talk URL reachable from the configured landing pages, landing
    /// pages in chronological order and talks in document order.
    pub async fn enumerate(&self, cancel: &CancellationToken) -> Vec<TalkUrl> {
        let landing_urls = landing_page_urls(&self.config.host, self.config.years());
        info!("Enumerating {} landing pages", landing_urls.len());
        self.enumerate_from(landing_urls, cancel).await
    }

    pub async fn enumerate_from(
        &self,
        landing_urls: Vec<String>,
        cancel: &CancellationToken,
    ) -> Vec<TalkUrl> {
        let crawler = Arc::clone(&self.landing);
        let token = cancel.clone();
        let slots = run_bounded(
            landing_urls.clone(),
            self.config.concurrency,
            cancel.clone(),
            move |_, url: String| {
                let crawler = Arc::clone(&crawler);
                let token = token.clone();
                async move { crawler.talk_urls(&url, &token).await }
            },
        )
        .await;

        let mut urls = Vec::new();
        for (landing_url, slot) in landing_urls.iter().zip(slots) {
            match slot {
                Slot::Done(found) => urls.extend(found),
                Slot::Panicked(message) => {
                    metrics::landing::failed();
                    self.report_panic(landing_url, &message);
                }
                Slot::Skipped => {}
            }
        }
        info!("Discovered {} talk URLs", urls.len());
        urls
    }

    /// One record per URL, in input order. Slots the pool never reached
    /// (cancellation) or whose task panicked come back as empty records so the
    /// length always matches. Returns the records and the skipped count.
    pub async fn extract_all(
        &self,
        urls: Vec<TalkUrl>,
        cancel: &CancellationToken,
    ) -> (Vec<TalkRecord>, usize) {
        let total = urls.len();
        let extractor = Arc::clone(&self.extractor);
        let sink: Arc<dyn FailureSink> = self.failures.clone();
        let token = cancel.clone();
        let done = Arc::new(AtomicUsize::new(0));
        let progress_every = self.config.progress_every.max(1);

        let work = move |_: usize, url: TalkUrl| {
            let extractor = Arc::clone(&extractor);
            let sink = Arc::clone(&sink);
            let token = token.clone();
            let done = Arc::clone(&done);
            async move {
                let record = extractor.extract(&url, &token).await;
                let record = match normalize_record(record) {
                    Ok(record) => record,
                    Err(e) => {
                        metrics::talks::empty(e.kind());
                        sink.report(FailureReport::new(url.as_str(), e.kind(), e.to_string()));
                        TalkRecord::Empty
                    }
                };
                if record.is_complete() {
                    metrics::talks::complete();
                }

                let n = done.fetch_add(1, Ordering::SeqCst) + 1;
                if n % progress_every == 0 || n == total {
                    info!("Processed {}/{} talks", n, total);
                }
                record
            }
        };
        let slots = run_bounded(urls.clone(), self.config.concurrency, cancel.clone(), work).await;

        let mut skipped = 0;
        let mut records = Vec::with_capacity(total);
        for (url, slot) in urls.iter().zip(slots) {
            let record = match slot {
                Slot::Done(record) => record,
                Slot::Panicked(message) => {
                    metrics::talks::empty(FailureKind::Structure);
                    self.report_panic(url.as_str(), &message);
                    TalkRecord::Empty
                }
                Slot::Skipped => {
                    skipped += 1;
                    TalkRecord::Empty
                }
            };
            records.push(record);
        }
        if skipped > 0 {
            warn!("{} talks were skipped after cancellation", skipped);
        }
        (records, skipped)
    }

    /// Enumerate, extract, normalize. Always returns one record per
    /// discovered URL.
    pub async fn run(&self, cancel: &CancellationToken) -> PipelineResult {
        let started = Instant::now();
        info!(
            "🚀 Starting run for {}..={} with concurrency {}",
            self.config.start_year, self.config.end_year, self.config.concurrency
        );

        let urls = self.enumerate(cancel).await;
        let (records, unprocessed) = self.extract_all(urls, cancel).await;
        let elapsed = started.elapsed();
        metrics::run_duration(elapsed.as_secs_f64());

        let summary = RunSummary::new(&records, unprocessed, self.failures.snapshot(), elapsed);
        summary.log();
        PipelineResult { records, summary }
    }

    pub fn failures(&self) -> Vec<FailureReport> {
        self.failures.snapshot()
    }

    /// A page whose task panicked is reported like a page with unexpected
    /// markup.
    fn report_panic(&self, url: &str, message: &str) {
        self.failures.report(FailureReport::new(
            url,
            FailureKind::Structure,
            format!("processing panicked: {message}"),
        ));
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total: usize,
    pub complete: usize,
    pub empty: usize,
    pub unprocessed: usize,
    pub failures: Vec<FailureReport>,
    pub elapsed: Duration,
}

impl RunSummary {
    fn new(
        records: &[TalkRecord],
        unprocessed: usize,
        failures: Vec<FailureReport>,
        elapsed: Duration,
    ) -> Self {
        let complete = records.iter().filter(|r| r.is_complete()).count();
        Self {
            total: records.len(),
            complete,
            empty: records.len() - complete,
            unprocessed,
            failures,
            elapsed,
        }
    }

    pub fn failures_by_kind(&self) -> HashMap<FailureKind, usize> {
        let mut counts = HashMap::new();
        for failure in &self.failures {
            *counts.entry(failure.kind).or_insert(0) += 1;
        }
        counts
    }

    fn log(&self) {
        info!(
            "🎉 Run finished in {:.1}s: {} talks, {} complete, {} empty",
            self.elapsed.as_secs_f64(),
            self.total,
            self.complete,
            self.empty
        );
        if !self.failures.is_empty() {
            let by_kind = self.failures_by_kind();
            warn!(
                fetch = by_kind.get(&FailureKind::Fetch).copied().unwrap_or(0),
                structure = by_kind.get(&FailureKind::Structure).copied().unwrap_or(0),
                encoding = by_kind.get(&FailureKind::Encoding).copied().unwrap_or(0),
                "{} pages failed",
                self.failures.len()
            );
        }
    }
}

/// The finished result set, immutable from here on.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub records: Vec<TalkRecord>,
    pub summary: RunSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Talk;

    #[test]
    fn test_summary_counts_records_and_failure_kinds() {
        let talk = Talk {
            title: "Faith".into(),
            speaker: "Elder Example".into(),
            calling: String::new(),
            conference: "April 2005".into(),
            url: "https://example.org/t".into(),
            talk: "Body\n\n".into(),
            footnotes: String::new(),
        };
        let records = vec![TalkRecord::Complete(talk), TalkRecord::Empty, TalkRecord::Empty];
        let failures = vec![
            FailureReport::new("b", FailureKind::Structure, "missing title"),
            FailureReport::new("c", FailureKind::Structure, "processing panicked: boom"),
            FailureReport::new("landing", FailureKind::Fetch, "503"),
        ];

        let summary = RunSummary::new(&records, 0, failures, Duration::from_secs(1));

        assert_eq!((summary.total, summary.complete, summary.empty), (3, 1, 2));
        let by_kind = summary.failures_by_kind();
        assert_eq!(by_kind[&FailureKind::Structure], 2);
        assert_eq!(by_kind[&FailureKind::Fetch], 1);
        assert!(!by_kind.contains_key(&FailureKind::Encoding));
    }
}
