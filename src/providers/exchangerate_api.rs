use super::util::RetryPolicy;
use crate::core::{CurrencyCode, RateTable, RateTableProvider};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use tracing::{debug, error, instrument};

const USER_AGENT: &str = concat!("fxconv/", env!("CARGO_PKG_VERSION"));

/// Rate tables from an exchangerate-api style endpoint:
/// `GET {base_url}/latest/{CODE}` returning `{"rates": {...}}`.
pub struct ExchangeRateApiProvider {
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl ExchangeRateApiProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_retry(base_url, RetryPolicy::none())
    }

    pub fn with_retry(base_url: &str, retry: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry,
        })
    }

    async fn fetch_once(&self, url: &str, base: &CurrencyCode) -> Result<RateTable> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for base: {} URL: {}", e, base, url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for base: {}",
                response.status(),
                base
            ));
        }

        let text = response
            .text()
            .await
            .context("Failed to get response text")?;

        match serde_json::from_str::<RateTable>(&text) {
            Ok(table) => Ok(table),
            Err(e) => {
                error!(
                    error = ?e,
                    response = %text,
                    "Failed to parse rate table response"
                );
                Err(anyhow!("Failed to parse JSON response for {}: {}", base, e))
            }
        }
    }
}

#[async_trait]
impl RateTableProvider for ExchangeRateApiProvider {
    #[instrument(
        name = "RateTableFetch",
        skip(self),
        fields(base = %base)
    )]
    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<RateTable> {
        let url = format!("{}/latest/{}", self.base_url, base);
        debug!("Requesting rate table from {}", url);

        let table = self.retry.run(|| self.fetch_once(&url, base)).await?;
        debug!(base = ?table.base, date = ?table.date, "Received rate table");
        Ok(table)
    }
}
