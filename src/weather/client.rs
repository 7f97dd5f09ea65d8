use async_trait::async_trait;
use reqwest::{header::CACHE_CONTROL, Client, StatusCode, Url};

/// Status and body of one upstream GET
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Outbound HTTP seam for the AccuWeather calls
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    async fn fetch(&self, url: Url) -> Result<UpstreamResponse, reqwest::Error>;
}

#[async_trait]
impl UpstreamClient for Client {
    async fn fetch(&self, url: Url) -> Result<UpstreamResponse, reqwest::Error> {
        let response = self.get(url).header(CACHE_CONTROL, "no-store").send().await?;

        let status = response.status();
        tracing::debug!(status = %status, "Received AccuWeather response");

        let body = response.text().await?;
        Ok(UpstreamResponse { status, body })
    }
}
