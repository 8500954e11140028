use crate::app::ports::{FailureSink, HttpClientPort};
use crate::constants::{
    LANDING_CONTAINER, MONTH_CODES, SESSION_BLOCK_TAG, TALK_PATH_PATTERN,
};
use crate::error::{Result, ScraperError};
use crate::infra::http_client::fetch_html;
use crate::observability::metrics;
use crate::parser::markers;
use crate::parser::Document;
use crate::types::{FailureReport, TalkUrl};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use url::Url;

static TALK_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(TALK_PATH_PATTERN).expect("talk path pattern is valid"));

/// One landing page per year and half-year, oldest first.
pub fn landing_page_urls(host: &str, years: RangeInclusive<i32>) -> Vec<String> {
    let host = host.trim_end_matches('/');
    years
        .flat_map(|year| {
            MONTH_CODES
                .iter()
                .map(move |month| format!("{host}/general-conference/{year}/{month}?lang=eng"))
        })
        .collect()
}

pub fn is_talk_path(href: &str) -> bool {
    TALK_PATH.is_match(href)
}

/// Talk links in session order, then link order within each session.
/// Duplicates are kept.
pub fn discover_talk_urls(doc: &Document, page_url: &str, host: &Url) -> Result<Vec<TalkUrl>> {
    let container = doc
        .find_first(&markers::LANDING_CONTAINER)
        .ok_or_else(|| ScraperError::structure(page_url, LANDING_CONTAINER))?;

    let sessions = container.child_elements(Some(SESSION_BLOCK_TAG));
    if sessions.is_empty() {
        return Err(ScraperError::structure(
            page_url,
            format!("{LANDING_CONTAINER} > {SESSION_BLOCK_TAG}"),
        ));
    }
    debug!("Found {} session blocks", sessions.len());

    let mut urls = Vec::new();
    for session in &sessions {
        for link in session.find_all(&markers::LINK) {
            let Some(href) = link.attr("href") else { continue };
            if !is_talk_path(href) {
                continue;
            }
            match host.join(href) {
                Ok(absolute) => urls.push(TalkUrl::new(absolute.to_string())),
                Err(e) => debug!("Skipping unresolvable link {}: {}", href, e),
            }
        }
    }
    Ok(urls)
}

/// Fetches landing pages and lists the talks they link to. A landing page that
/// cannot be fetched or parsed yields no URLs and a failure report.
pub struct LandingPageCrawler {
    http: Arc<dyn HttpClientPort>,
    failures: Arc<dyn FailureSink>,
    host: Url,
}

impl LandingPageCrawler {
    pub fn new(
        http: Arc<dyn HttpClientPort>,
        failures: Arc<dyn FailureSink>,
        host: &str,
    ) -> Result<Self> {
        let host = Url::parse(host)
            .map_err(|e| ScraperError::Config(format!("Invalid host '{}': {}", host, e)))?;
        Ok(Self { http, failures, host })
    }

    pub async fn try_talk_urls(
        &self,
        landing_url: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<TalkUrl>> {
        if cancel.is_cancelled() {
            return Err(ScraperError::Cancelled);
        }
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ScraperError::Cancelled),
            body = fetch_html(self.http.as_ref(), landing_url) => body?,
        };
        let doc = Document::parse(&body);
        discover_talk_urls(&doc, landing_url, &self.host)
    }

    #[instrument(skip(self, cancel))]
    pub async fn talk_urls(&self, landing_url: &str, cancel: &CancellationToken) -> Vec<TalkUrl> {
        match self.try_talk_urls(landing_url, cancel).await {
            Ok(urls) => {
                info!("Discovered {} talks", urls.len());
                metrics::landing::processed(urls.len());
                urls
            }
            Err(ScraperError::Cancelled) => Vec::new(),
            Err(e) => {
                metrics::landing::failed();
                self.failures
                    .report(FailureReport::new(landing_url, e.kind(), e.to_string()));
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_urls_are_year_major() {
        let urls = landing_page_urls("https://host.example/", 1971..=1972);
        assert_eq!(
            urls,
            vec![
                "https://host.example/general-conference/1971/04?lang=eng",
                "https://host.example/general-conference/1971/10?lang=eng",
                "https://host.example/general-conference/1972/04?lang=eng",
                "https://host.example/general-conference/1972/10?lang=eng",
            ]
        );
    }

    #[test]
    fn test_empty_year_range_gives_no_urls() {
        assert!(landing_page_urls("https://host.example", 2000..=1999).is_empty());
    }

    #[test]
    fn test_talk_path_matcher() {
        assert!(is_talk_path("/general-conference/2005/04/some-talk?lang=eng"));
        assert!(is_talk_path("/study/general-conference/2017/10/x?lang=eng"));
        assert!(!is_talk_path("/general-conference/2005/04/some-talk"));
        assert!(!is_talk_path("/general-conference/2005/05/x?lang=eng"));
        assert!(!is_talk_path("/general-conference/05/04/x?lang=eng"));
        assert!(!is_talk_path("https://elsewhere/general-conference/2005/04/x?lang=eng"));
        assert!(!is_talk_path("/general-conference/2005/04/x?lang=spa"));
    }

    #[test]
    fn test_talk_path_must_end_with_language_marker() {
        assert!(!is_talk_path("/general-conference/2005/04/x?lang=english"));
        assert!(!is_talk_path("/general-conference/2005/04/x?lang=eng&x=1"));
        assert!(!is_talk_path("/general-conference/2005/04/x?lang=eng#p3"));
        assert!(is_talk_path("/general-conference/2005/04/x?lang=eng"));
    }

    #[test]
    fn test_missing_container_is_structure_error() {
        let doc =
            Document::parse(r#"<div class="section-wrapper"><div><a href="/x">x</a></div></div>"#);
        let host = Url::parse("https://host.example").unwrap();
        let err = discover_talk_urls(&doc, "https://host.example/landing", &host).unwrap_err();
        assert!(matches!(err, ScraperError::Structure { .. }));
    }

    #[test]
    fn test_nested_divs_are_not_sessions() {
        let doc = Document::parse(
            r#"<div class="section-wrapper lumen-layout lumen-layout--landing-3">
                 <div>
                   <div><a href="/general-conference/2001/04/a?lang=eng">a</a></div>
                   <a href="/general-conference/2001/04/b?lang=eng">b</a>
                 </div>
               </div>"#,
        );
        let host = Url::parse("https://host.example").unwrap();
        let urls = discover_talk_urls(&doc, "landing", &host).unwrap();
        // Both links sit inside the single session block.
        assert_eq!(urls.len(), 2);
        assert_eq!(
            urls[0].as_str(),
            "https://host.example/general-conference/2001/04/a?lang=eng"
        );
    }
}
