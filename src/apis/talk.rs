//! Talk page extraction.
//!
//! The talk pages changed template several times. Rather than classifying a
//! page up front, every field carries its own ordered chain of candidate
//! markers and the first candidate that yields a value wins, so a page that
//! mixes eras still resolves.

use crate::app::ports::{FailureSink, HttpClientPort};
use crate::constants::{FOOTNOTES_HEADER, FOOTNOTE_ID_MARKER, PARAGRAPH_SEPARATOR};
use crate::error::{Result, ScraperError};
use crate::infra::http_client::fetch_html;
use crate::observability::metrics;
use crate::parser::markers;
use crate::parser::{Document, Node};
use crate::types::{FailureReport, Talk, TalkRecord, TalkUrl};
use once_cell::sync::Lazy;
use scraper::Selector;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

/// One step of a fallback chain: locate `marker`, then pull the value out of
/// the matched node. `None` from either half moves on to the next candidate.
pub struct Candidate {
    pub marker: &'static Lazy<Selector>,
    pub marker_name: &'static str,
    pub extract: for<'a> fn(Node<'a>) -> Option<String>,
}

pub struct FieldChain {
    pub field: &'static str,
    pub candidates: &'static [Candidate],
}

impl FieldChain {
    pub fn resolve(&self, doc: &Document) -> Option<String> {
        self.candidates
            .iter()
            .find_map(|c| doc.find_first(c.marker).and_then(c.extract))
    }

    fn resolve_required(&self, doc: &Document, url: &str) -> Result<String> {
        self.resolve(doc)
            .ok_or_else(|| ScraperError::structure(url, self.tried()))
    }

    /// Markers in priority order, for error messages.
    fn tried(&self) -> String {
        let names: Vec<&str> = self.candidates.iter().map(|c| c.marker_name).collect();
        format!("{} ({})", self.field, names.join(" | "))
    }
}

fn node_text(node: Node<'_>) -> Option<String> {
    node.trimmed_text()
}

fn byline_paragraph(node: Node<'_>, index: usize) -> Option<String> {
    node.find_all(&markers::PARAGRAPH)
        .get(index)
        .and_then(|p| p.trimmed_text())
}

fn byline_speaker(node: Node<'_>) -> Option<String> {
    byline_paragraph(node, 0)
}

/// Older bylines sometimes list only the speaker; the calling is then blank
/// rather than missing.
fn byline_calling(node: Node<'_>) -> Option<String> {
    Some(byline_paragraph(node, 1).unwrap_or_default())
}

pub static TITLE: FieldChain = FieldChain {
    field: "title",
    candidates: &[
        Candidate {
            marker: &markers::TITLE_PRIMARY,
            marker_name: crate::constants::TITLE_PRIMARY,
            extract: node_text,
        },
        Candidate {
            marker: &markers::TITLE_LEGACY,
            marker_name: crate::constants::TITLE_LEGACY,
            extract: node_text,
        },
    ],
};

pub static CONFERENCE: FieldChain = FieldChain {
    field: "conference",
    candidates: &[
        Candidate {
            marker: &markers::CONFERENCE_PRIMARY,
            marker_name: crate::constants::CONFERENCE_PRIMARY,
            extract: node_text,
        },
        Candidate {
            marker: &markers::CONFERENCE_LEGACY,
            marker_name: crate::constants::CONFERENCE_LEGACY,
            extract: node_text,
        },
    ],
};

pub static CALLING: FieldChain = FieldChain {
    field: "calling",
    candidates: &[
        Candidate {
            marker: &markers::CALLING_PRIMARY,
            marker_name: crate::constants::CALLING_PRIMARY,
            extract: node_text,
        },
        Candidate {
            marker: &markers::BYLINE_LEGACY,
            marker_name: crate::constants::BYLINE_LEGACY,
            extract: byline_calling,
        },
    ],
};

pub static SPEAKER: FieldChain = FieldChain {
    field: "speaker",
    candidates: &[
        Candidate {
            marker: &markers::SPEAKER_PRIMARY,
            marker_name: crate::constants::SPEAKER_PRIMARY,
            extract: node_text,
        },
        Candidate {
            marker: &markers::BYLINE_LEGACY,
            marker_name: crate::constants::BYLINE_LEGACY,
            extract: byline_speaker,
        },
    ],
};

/// Every body paragraph followed by a blank line, trailing separator included.
pub fn extract_content(doc: &Document, url: &str) -> Result<String> {
    let body = doc
        .find_first(&markers::BODY_BLOCK)
        .ok_or_else(|| ScraperError::structure(url, crate::constants::BODY_BLOCK))?;

    let content: String = body
        .find_all(&markers::PARAGRAPH)
        .iter()
        .map(|p| p.text() + PARAGRAPH_SEPARATOR)
        .collect();

    if content.trim().is_empty() {
        return Err(ScraperError::structure(url, "div.body-block p"));
    }
    Ok(content)
}

/// Numbered footnote block built from paragraphs whose id carries the
/// footnote marker. Numbering starts at 1 and counts matched paragraphs only.
pub fn extract_footnotes(doc: &Document) -> String {
    let lines: Vec<String> = doc
        .find_all(&markers::FOOTNOTE_CANDIDATE)
        .into_iter()
        .filter(|p| p.attr("id").is_some_and(|id| id.contains(FOOTNOTE_ID_MARKER)))
        .enumerate()
        .map(|(i, p)| format!("{}. {}\n", i + 1, p.text().trim()))
        .collect();

    if lines.is_empty() {
        return String::new();
    }
    let mut block = String::from(FOOTNOTES_HEADER);
    block.extend(lines);
    block
}

/// Parse `html` and resolve every field. Any required field that resolves to
/// nothing fails the whole talk.
pub fn extract_talk(html: &str, url: &str) -> Result<Talk> {
    let doc = Document::parse(html);

    let talk = Talk {
        title: TITLE.resolve_required(&doc, url)?,
        speaker: SPEAKER.resolve_required(&doc, url)?,
        calling: CALLING.resolve_required(&doc, url)?,
        conference: CONFERENCE.resolve_required(&doc, url)?,
        url: url.to_string(),
        talk: extract_content(&doc, url)?,
        footnotes: extract_footnotes(&doc),
    };

    match talk.missing_required() {
        Some(field) => Err(ScraperError::structure(url, field)),
        None => Ok(talk),
    }
}

/// Fetches and extracts single talks. Never fails outward: every error turns
/// into [`TalkRecord::Empty`] plus a report to the failure sink.
pub struct TalkExtractor {
    http: Arc<dyn HttpClientPort>,
    failures: Arc<dyn FailureSink>,
}

impl TalkExtractor {
    pub fn new(http: Arc<dyn HttpClientPort>, failures: Arc<dyn FailureSink>) -> Self {
        Self { http, failures }
    }

    /// Fetch boundary is the only cancellation point; parsing always runs to
    /// completion once the body is in hand.
    pub async fn try_extract(&self, url: &TalkUrl, cancel: &CancellationToken) -> Result<Talk> {
        if cancel.is_cancelled() {
            return Err(ScraperError::Cancelled);
        }
        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ScraperError::Cancelled),
            body = fetch_html(self.http.as_ref(), url.as_str()) => body?,
        };
        extract_talk(&body, url.as_str())
    }

    #[instrument(skip(self, cancel), fields(url = %url))]
    pub async fn extract(&self, url: &TalkUrl, cancel: &CancellationToken) -> TalkRecord {
        match self.try_extract(url, cancel).await {
            Ok(talk) => TalkRecord::Complete(talk),
            Err(ScraperError::Cancelled) => {
                debug!("Skipped talk after cancellation");
                TalkRecord::Empty
            }
            Err(e) => {
                metrics::talks::empty(e.kind());
                self.failures
                    .report(FailureReport::new(url.as_str(), e.kind(), e.to_string()));
                TalkRecord::Empty
            }
        }
    }
}
