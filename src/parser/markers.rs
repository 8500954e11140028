//! Compiled selectors for every marker the scrapers look for.

use crate::constants;
use once_cell::sync::Lazy;
use scraper::Selector;

fn compile(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("invalid selector {selector:?}: {e:?}"))
}

pub static LANDING_CONTAINER: Lazy<Selector> = Lazy::new(|| compile(constants::LANDING_CONTAINER));
pub static LINK: Lazy<Selector> = Lazy::new(|| compile(constants::LINK));

pub static TITLE_PRIMARY: Lazy<Selector> = Lazy::new(|| compile(constants::TITLE_PRIMARY));
pub static TITLE_LEGACY: Lazy<Selector> = Lazy::new(|| compile(constants::TITLE_LEGACY));
pub static CONFERENCE_PRIMARY: Lazy<Selector> =
    Lazy::new(|| compile(constants::CONFERENCE_PRIMARY));
pub static CONFERENCE_LEGACY: Lazy<Selector> = Lazy::new(|| compile(constants::CONFERENCE_LEGACY));
pub static CALLING_PRIMARY: Lazy<Selector> = Lazy::new(|| compile(constants::CALLING_PRIMARY));
pub static SPEAKER_PRIMARY: Lazy<Selector> = Lazy::new(|| compile(constants::SPEAKER_PRIMARY));
pub static BYLINE_LEGACY: Lazy<Selector> = Lazy::new(|| compile(constants::BYLINE_LEGACY));

pub static BODY_BLOCK: Lazy<Selector> = Lazy::new(|| compile(constants::BODY_BLOCK));
pub static PARAGRAPH: Lazy<Selector> = Lazy::new(|| compile(constants::PARAGRAPH));
pub static FOOTNOTE_CANDIDATE: Lazy<Selector> =
    Lazy::new(|| compile(constants::FOOTNOTE_CANDIDATE));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_markers_compile() {
        for marker in [
            &LANDING_CONTAINER,
            &LINK,
            &TITLE_PRIMARY,
            &TITLE_LEGACY,
            &CONFERENCE_PRIMARY,
            &CONFERENCE_LEGACY,
            &CALLING_PRIMARY,
            &SPEAKER_PRIMARY,
            &BYLINE_LEGACY,
            &BODY_BLOCK,
            &PARAGRAPH,
            &FOOTNOTE_CANDIDATE,
        ] {
            Lazy::force(marker);
        }
    }
}
