#![allow(dead_code)]

use async_trait::async_trait;
use conference_scraper::app::ports::{HttpClientPort, HttpGetResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const HOST: &str = "https://fake.example";

pub const LANDING_2007_10: &str = include_str!("../fixtures/landing_2007_10.html");
pub const LANDING_E2E: &str = include_str!("../fixtures/landing_e2e.html");
pub const TALK_MODERN: &str = include_str!("../fixtures/talk_modern.html");
pub const TALK_LEGACY: &str = include_str!("../fixtures/talk_legacy.html");
pub const TALK_MALFORMED: &str = include_str!("../fixtures/talk_malformed.html");

pub fn url(path: &str) -> String {
    format!("{HOST}{path}")
}

/// In-memory site: unknown URLs answer 404.
#[derive(Default)]
pub struct FakeSite {
    pages: HashMap<String, (u16, Vec<u8>)>,
    delays: HashMap<String, Duration>,
    panics: HashSet<String>,
    requests: Mutex<Vec<String>>,
    hits: AtomicUsize,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: impl Into<String>, html: &str) -> Self {
        self.pages.insert(url.into(), (200, html.as_bytes().to_vec()));
        self
    }

    pub fn raw(mut self, url: impl Into<String>, status: u16, bytes: Vec<u8>) -> Self {
        self.pages.insert(url.into(), (status, bytes));
        self
    }

    pub fn delay(mut self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.insert(url.into(), delay);
        self
    }

    /// Requests for `url` panic inside the client.
    pub fn panic_on(mut self, url: impl Into<String>) -> Self {
        self.panics.insert(url.into());
        self
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpClientPort for FakeSite {
    async fn get(&self, url: &str) -> Result<HttpGetResult, String> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(url.to_string());
        if self.panics.contains(url) {
            panic!("client blew up on {url}");
        }
        if let Some(delay) = self.delays.get(url) {
            tokio::time::sleep(*delay).await;
        }
        let (status, bytes) = self
            .pages
            .get(url)
            .cloned()
            .unwrap_or((404, b"not found".to_vec()));
        Ok(HttpGetResult {
            status,
            bytes,
            content_type: "text/html; charset=utf-8".to_string(),
        })
    }
}
