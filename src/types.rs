use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute URL of a single talk page. Used both as work item and record key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TalkUrl(String);

impl TalkUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TalkUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TalkUrl {
    fn from(url: &str) -> Self {
        Self::new(url)
    }
}

/// Every field of a successfully extracted talk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Talk {
    pub title: String,
    pub speaker: String,
    /// Blank for legacy bylines that only carry the speaker's name.
    pub calling: String,
    /// Session label, e.g. "October 2007".
    pub conference: String,
    pub url: String,
    pub talk: String,
    /// Empty when the page carries no footnote paragraphs.
    pub footnotes: String,
}

impl Talk {
    /// Fields that must be non-empty for the talk to count as complete.
    pub fn missing_required(&self) -> Option<&'static str> {
        [
            ("title", &self.title),
            ("speaker", &self.speaker),
            ("conference", &self.conference),
            ("url", &self.url),
            ("talk", &self.talk),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// One output row. Extraction is all-or-nothing, so a record is either a
/// fully populated talk or the empty sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TalkRecord {
    Complete(Talk),
    #[default]
    Empty,
}

impl TalkRecord {
    pub fn is_complete(&self) -> bool {
        matches!(self, TalkRecord::Complete(_))
    }

    pub fn as_talk(&self) -> Option<&Talk> {
        match self {
            TalkRecord::Complete(talk) => Some(talk),
            TalkRecord::Empty => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Fetch,
    Structure,
    Encoding,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Fetch => "fetch",
            FailureKind::Structure => "structure",
            FailureKind::Encoding => "encoding",
        }
    }
}

/// Side-channel record emitted whenever a page yields nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    pub url: String,
    pub kind: FailureKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl FailureReport {
    pub fn new(url: impl Into<String>, kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind,
            message: message.into(),
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Talk {
        Talk {
            title: "Faith".into(),
            speaker: "Elder Example".into(),
            calling: String::new(),
            conference: "April 2005".into(),
            url: "https://example.org/t".into(),
            talk: "Body\n\n".into(),
            footnotes: String::new(),
        }
    }

    #[test]
    fn test_blank_calling_and_footnotes_are_allowed() {
        assert_eq!(sample().missing_required(), None);
    }

    #[test]
    fn test_whitespace_title_is_missing() {
        let mut talk = sample();
        talk.title = "  \n".into();
        assert_eq!(talk.missing_required(), Some("title"));
    }

    #[test]
    fn test_default_record_is_empty() {
        assert_eq!(TalkRecord::default(), TalkRecord::Empty);
        assert!(TalkRecord::Complete(sample()).is_complete());
    }
}
