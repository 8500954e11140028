use crate::error::{Result, ScraperError};
use crate::types::{Talk, TalkRecord};
use unicode_normalization::UnicodeNormalization;

/// Canonical decomposition (NFD), then horizontal tabs removed. Newlines are
/// kept. The second decomposition pass restores canonical mark order when a
/// removed tab sat between two combining marks, which keeps this idempotent.
pub fn normalize_text(text: &str) -> String {
    text.nfd().filter(|c| *c != '\t').nfd().collect()
}

pub fn normalize_talk(talk: Talk) -> Result<Talk> {
    let normalized = Talk {
        title: normalize_text(&talk.title),
        speaker: normalize_text(&talk.speaker),
        calling: normalize_text(&talk.calling),
        conference: normalize_text(&talk.conference),
        url: normalize_text(&talk.url),
        talk: normalize_text(&talk.talk),
        footnotes: normalize_text(&talk.footnotes),
    };

    match normalized.missing_required() {
        Some(field) => Err(ScraperError::encoding(
            &talk.url,
            format!("{field} is empty after normalization"),
        )),
        None => Ok(normalized),
    }
}

/// Empty records pass through untouched.
pub fn normalize_record(record: TalkRecord) -> Result<TalkRecord> {
    match record {
        TalkRecord::Complete(talk) => normalize_talk(talk).map(TalkRecord::Complete),
        TalkRecord::Empty => Ok(TalkRecord::Empty),
    }
}
