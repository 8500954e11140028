//! Site and markup constants. Selectors that target hashed CSS-module class
//! names match on the stable prefix only, since the suffix changes per deploy.

pub const DEFAULT_HOST: &str = "https://www.churchofjesuschrist.org";

/// First year with published talks.
pub const FIRST_YEAR: i32 = 1971;

/// April and October sessions.
pub const MONTH_CODES: [&str; 2] = ["04", "10"];

/// Talk links end with the English language marker.
pub const TALK_PATH_PATTERN: &str = r"^(/study)?/general-conference/\d{4}/(04|10)/.*\?lang=eng$";

// Landing page
pub const LANDING_CONTAINER: &str = "div.section-wrapper.lumen-layout.lumen-layout--landing-3";
pub const SESSION_BLOCK_TAG: &str = "div";
pub const LINK: &str = "a[href]";

// Talk page, modern layout
pub const TITLE_PRIMARY: &str = "h1#title1";
pub const CONFERENCE_PRIMARY: &str = "[class*=\"itemTitle\"] p";
pub const CALLING_PRIMARY: &str = "p.author-role";
pub const SPEAKER_PRIMARY: &str = "p.author-name";

// Talk page, legacy layout
pub const TITLE_LEGACY: &str = "a[class*=\"toTopLink\"] div";
pub const CONFERENCE_LEGACY: &str = "div.conference-title p";
pub const BYLINE_LEGACY: &str = "div.byline";

// Shared by both layouts
pub const BODY_BLOCK: &str = "div.body-block";
pub const PARAGRAPH: &str = "p";
pub const FOOTNOTE_CANDIDATE: &str = "p[id]";
pub const FOOTNOTE_ID_MARKER: &str = "note";
pub const FOOTNOTES_HEADER: &str = "FOOTNOTES:\n";
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Output column order.
pub const CSV_HEADERS: [&str; 7] = [
    "title",
    "speaker",
    "calling",
    "conference",
    "url",
    "talk",
    "footnotes",
];

pub const DEFAULT_OUTPUT_PATH: &str = "conference_talks.csv";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PROGRESS_EVERY: usize = 100;

pub const PUSHGATEWAY_ENV: &str = "CONFERENCE_PUSHGATEWAY_URL";
