//! `reqwest` implementation of the remote discount service contract

use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use tracing::debug;
use url::Url;

use super::config::RemoteConfig;
use super::remote_api::{
    DiscountApi, INSERT_PATH, LONG_POLL_PATH, SHORT_POLL_PATH, parse_insert_body,
    parse_long_poll_body, parse_short_poll_body,
};
use super::sync_error::RemoteError;
use crate::domain::Product;

/// Configuration for HTTP client behavior
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub base_url: String,
    /// `None` leaves requests unbounded, which long polls rely on
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

impl HttpClientConfig {
    pub fn from_remote_config(remote: &RemoteConfig) -> Self {
        Self {
            base_url: remote.base_url.clone(),
            timeout: remote.request_timeout(),
            user_agent: remote.user_agent.clone(),
        }
    }
}

#[derive(Clone)]
pub struct HttpDiscountApi {
    client: Client,
    long_poll_url: Url,
    short_poll_url: Url,
    insert_url: Url,
}

impl HttpDiscountApi {
    pub fn from_remote_config(remote: &RemoteConfig) -> Result<Self> {
        Self::with_config(HttpClientConfig::from_remote_config(remote))
    }

    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new().user_agent(&config.user_agent).gzip(true);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        // A trailing slash keeps any path prefix of the base URL when joining.
        let base = if config.base_url.ends_with('/') {
            config.base_url.clone()
        } else {
            format!("{}/", config.base_url)
        };
        let base = Url::parse(&base).map_err(|e| anyhow!("Invalid base URL '{}': {}", config.base_url, e))?;

        Ok(Self {
            client,
            long_poll_url: base.join(LONG_POLL_PATH)?,
            short_poll_url: base.join(SHORT_POLL_PATH)?,
            insert_url: base.join(INSERT_PATH)?,
        })
    }

    async fn get_text(&self, url: &Url) -> Result<(u16, String), RemoteError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RemoteError::transport(url.as_str(), &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::transport(url.as_str(), &e))?;
        Ok((status.as_u16(), body))
    }
}

#[async_trait]
impl DiscountApi for HttpDiscountApi {
    async fn long_poll(&self) -> Result<u64, RemoteError> {
        let (_, body) = self.get_text(&self.long_poll_url).await?;
        parse_long_poll_body(self.long_poll_url.as_str(), &body)
    }

    async fn short_poll(&self) -> Result<Vec<Product>, RemoteError> {
        let (status, body) = self.get_text(&self.short_poll_url).await?;
        parse_short_poll_body(self.short_poll_url.as_str(), status, &body)
    }

    async fn insert(&self, product: &Product) -> Result<Product, RemoteError> {
        let url = &self.insert_url;
        debug!("POST {} code={}", url, product.code);
        let response = self
            .client
            .post(url.clone())
            .json(product)
            .send()
            .await
            .map_err(|e| RemoteError::transport(url.as_str(), &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| RemoteError::transport(url.as_str(), &e))?;
        Ok(parse_insert_body(&body, product))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> HttpClientConfig {
        HttpClientConfig::from_remote_config(&RemoteConfig {
            base_url: base_url.to_string(),
            ..RemoteConfig::default()
        })
    }

    #[test]
    fn test_endpoint_urls() {
        let api = HttpDiscountApi::with_config(config("http://localhost:8080")).unwrap();
        assert_eq!(api.long_poll_url.as_str(), "http://localhost:8080/poll/long");
        assert_eq!(api.short_poll_url.as_str(), "http://localhost:8080/poll/short");
        assert_eq!(api.insert_url.as_str(), "http://localhost:8080/insert");
    }

    #[test]
    fn test_base_path_prefix_is_kept() {
        let api = HttpDiscountApi::with_config(config("http://host/api")).unwrap();
        assert_eq!(api.short_poll_url.as_str(), "http://host/api/poll/short");
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(HttpDiscountApi::with_config(config("::nope::")).is_err());
    }
}
