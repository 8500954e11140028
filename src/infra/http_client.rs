use crate::app::ports::{HttpClientPort, HttpGetResult};
use crate::error::{Result, ScraperError};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

pub struct ReqwestHttp {
    client: reqwest::Client,
}

impl ReqwestHttp {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClientPort for ReqwestHttp {
    async fn get(&self, url: &str) -> std::result::Result<HttpGetResult, String> {
        let resp = self.client.get(url).send().await.map_err(|e| e.to_string())?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = resp.bytes().await.map_err(|e| e.to_string())?.to_vec();
        Ok(HttpGetResult { status, bytes, content_type })
    }
}

/// GET `url` and decode the body as UTF-8 HTML.
pub async fn fetch_html(http: &dyn HttpClientPort, url: &str) -> Result<String> {
    let started = std::time::Instant::now();
    let resp = http.get(url).await.map_err(|e| ScraperError::fetch(url, e))?;
    crate::observability::metrics::fetch_duration(started.elapsed().as_secs_f64());

    if !resp.is_success() {
        return Err(ScraperError::fetch(
            url,
            format!("request failed with status: {}", resp.status),
        ));
    }

    String::from_utf8(resp.bytes).map_err(|e| ScraperError::encoding(url, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FailureKind;

    struct Canned(HttpGetResult);

    #[async_trait]
    impl HttpClientPort for Canned {
        async fn get(&self, _url: &str) -> std::result::Result<HttpGetResult, String> {
            Ok(self.0.clone())
        }
    }

    fn canned(status: u16, bytes: Vec<u8>) -> Canned {
        Canned(HttpGetResult {
            status,
            bytes,
            content_type: "text/html".into(),
        })
    }

    #[tokio::test]
    async fn test_non_success_status_is_fetch_error() {
        let err = fetch_html(&canned(404, b"nope".to_vec()), "https://x/y")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Fetch);
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_encoding_error() {
        let err = fetch_html(&canned(200, vec![0xff, 0xfe, 0x00]), "https://x/y")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::Encoding);
    }

    #[tokio::test]
    async fn test_success_decodes_body() {
        let body = fetch_html(&canned(200, "<p>é</p>".as_bytes().to_vec()), "https://x/y")
            .await
            .unwrap();
        assert_eq!(body, "<p>é</p>");
    }
}
