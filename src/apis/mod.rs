pub mod landing;
pub mod talk;

pub use landing::LandingPageCrawler;
pub use talk::TalkExtractor;
