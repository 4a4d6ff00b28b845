use super::LaunchSource;
use crate::error::FetchError;
use crate::feed::page_offset;
use crate::model::{FeedConfig, LaunchPage, LaunchQuery, LaunchRecord};
use anyhow::{Context, Result};
use bytes::Bytes;
use reqwest::Url;
use tracing::debug;

/// HTTP client for the public SpaceX launches API.
#[derive(Debug, Clone)]
pub struct SpacexClient {
    http: reqwest::Client,
    query_url: Url,
    page_size: u32,
}

impl SpacexClient {
    pub fn new(cfg: &FeedConfig) -> Result<Self> {
        let query_url = Url::parse(&cfg.api_url)
            .with_context(|| format!("invalid API url: {}", cfg.api_url))?;

        let mut builder = reqwest::Client::builder().user_agent(cfg.user_agent.clone());
        // No timeout unless asked for; a hung request keeps the spinner up.
        if let Some(timeout) = cfg.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("build http client")?;

        Ok(Self {
            http,
            query_url,
            page_size: cfg.page_size,
        })
    }

    pub fn query_url(&self) -> &Url {
        &self.query_url
    }
}

impl LaunchSource for SpacexClient {
    async fn fetch_page(&self, search: &str, page: u32) -> Result<Vec<LaunchRecord>, FetchError> {
        let offset = page_offset(page, self.page_size);
        let body = LaunchQuery::new(search, self.page_size, offset);
        debug!(search, page, offset, "querying launches");

        let resp = self
            .http
            .post(self.query_url.clone())
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(FetchError::status(status, &text));
        }

        let text = resp.text().await?;
        let page_body: LaunchPage = serde_json::from_str(&text)?;
        debug!(page, count = page_body.docs.len(), "launch page received");
        Ok(page_body.docs)
    }

    async fn fetch_patch(&self, url: &str) -> Result<Bytes, FetchError> {
        debug!(url, "fetching mission patch");
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::status(status, ""));
        }
        Ok(resp.bytes().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn cfg(url: &str) -> FeedConfig {
        FeedConfig {
            api_url: url.into(),
            page_size: 10,
            debounce: Duration::from_millis(300),
            request_timeout: Some(Duration::from_secs(5)),
            user_agent: "spacex-launches/test".into(),
        }
    }

    #[test]
    fn rejects_invalid_url() {
        assert!(SpacexClient::new(&cfg("not a url")).is_err());
    }

    #[test]
    fn keeps_query_url() {
        let client = SpacexClient::new(&cfg("https://api.spacexdata.com/v4/launches/query")).unwrap();
        assert_eq!(client.query_url().path(), "/v4/launches/query");
    }
}
