use crate::domain::model::{CatalogEntry, RateTable};
use crate::domain::ports::{CatalogFetcher, ConfigProvider, RateFetcher};
use crate::utils::error::{Feed, Result, SyncError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

fn build_client(timeout: Duration) -> Result<Client> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// 發送 GET 並檢查狀態碼；逾時與其他傳輸錯誤一樣處理
async fn get_ok(client: &Client, endpoint: &str, feed: Feed) -> Result<Response> {
    tracing::debug!("Making API request to: {}", endpoint);
    let response = client
        .get(endpoint)
        .send()
        .await
        .map_err(|e| SyncError::upstream(feed, format!("request failed: {}", e)))?;

    tracing::debug!("API response status: {}", response.status());
    if !response.status().is_success() {
        return Err(SyncError::upstream(
            feed,
            format!("API returned status {}", response.status().as_u16()),
        ));
    }
    Ok(response)
}

#[derive(Debug, Clone)]
pub struct HttpCatalogFetcher {
    client: Client,
    endpoint: String,
}

impl HttpCatalogFetcher {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(config.countries_endpoint(), config.request_timeout())
    }
}

#[async_trait]
impl CatalogFetcher for HttpCatalogFetcher {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>> {
        let response = get_ok(&self.client, &self.endpoint, Feed::Catalog).await?;
        response
            .json::<Vec<CatalogEntry>>()
            .await
            .map_err(|e| SyncError::upstream(Feed::Catalog, format!("failed to parse countries JSON: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct RatesPayload {
    result: String,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

#[derive(Debug, Clone)]
pub struct HttpRateFetcher {
    client: Client,
    endpoint: String,
}

impl HttpRateFetcher {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Result<Self> {
        Self::new(config.rates_endpoint(), config.request_timeout())
    }
}

#[async_trait]
impl RateFetcher for HttpRateFetcher {
    async fn fetch_rates(&self) -> Result<RateTable> {
        let response = get_ok(&self.client, &self.endpoint, Feed::Rates).await?;
        let payload: RatesPayload = response.json().await.map_err(|e| {
            SyncError::upstream(Feed::Rates, format!("failed to parse exchange rate JSON: {}", e))
        })?;

        // HTTP 200 但 result 不是 success 也算失敗
        if payload.result != "success" {
            return Err(SyncError::upstream(
                Feed::Rates,
                format!("API returned unsuccessful result '{}'", payload.result),
            ));
        }
        Ok(RateTable::new(payload.rates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_catalog_decodes_entries() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/v2/all");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {
                        "name": "Ghana",
                        "capital": "Accra",
                        "region": "Africa",
                        "population": 31072940,
                        "flag": "https://flagcdn.com/gh.svg",
                        "currencies": [{"code": "GHS", "name": "Ghanaian cedi", "symbol": "₵"}],
                        "independent": true
                    },
                    {"name": "Bouvet Island", "region": "Antarctic", "population": 0, "flag": ""}
                ]));
        });

        let fetcher = HttpCatalogFetcher::new(server.url("/v2/all"), DEFAULT_TIMEOUT).unwrap();
        let entries = fetcher.fetch_catalog().await.unwrap();

        api_mock.assert();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].primary_currency_code(), Some("GHS"));
        assert!(entries[1].currencies.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_catalog_non_success_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v2/all");
            then.status(503);
        });

        let fetcher = HttpCatalogFetcher::new(server.url("/v2/all"), DEFAULT_TIMEOUT).unwrap();
        let err = fetcher.fetch_catalog().await.unwrap_err();

        assert!(matches!(
            err,
            SyncError::UpstreamFetchError { feed: Feed::Catalog, .. }
        ));
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_fetch_catalog_bad_json() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v2/all");
            then.status(200).body("<html>maintenance</html>");
        });

        let fetcher = HttpCatalogFetcher::new(server.url("/v2/all"), DEFAULT_TIMEOUT).unwrap();
        let err = fetcher.fetch_catalog().await.unwrap_err();
        assert!(err.to_string().contains("failed to parse countries JSON"));
    }

    #[tokio::test]
    async fn test_fetch_rates_success() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v6/latest/USD");
            then.status(200).json_body(serde_json::json!({
                "result": "success",
                "base_code": "USD",
                "rates": {"USD": 1.0, "NGN": 1600.25, "EUR": 0.92}
            }));
        });

        let fetcher = HttpRateFetcher::new(server.url("/v6/latest/USD"), DEFAULT_TIMEOUT).unwrap();
        let rates = fetcher.fetch_rates().await.unwrap();

        assert_eq!(rates.len(), 3);
        assert_eq!(rates.get("NGN"), Some(1600.25));
    }

    #[tokio::test]
    async fn test_fetch_rates_unsuccessful_result() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v6/latest/USD");
            then.status(200).json_body(serde_json::json!({
                "result": "error",
                "error-type": "quota-reached"
            }));
        });

        let fetcher = HttpRateFetcher::new(server.url("/v6/latest/USD"), DEFAULT_TIMEOUT).unwrap();
        let err = fetcher.fetch_rates().await.unwrap_err();

        assert!(matches!(err, SyncError::UpstreamFetchError { feed: Feed::Rates, .. }));
        assert!(err.to_string().contains("'error'"));
    }

    #[tokio::test]
    async fn test_fetch_rates_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(serde_json::json!({"result": "success", "rates": {}}));
        });

        let fetcher = HttpRateFetcher::new(server.url("/slow"), Duration::from_millis(50)).unwrap();
        let err = fetcher.fetch_rates().await.unwrap_err();
        assert!(matches!(err, SyncError::UpstreamFetchError { feed: Feed::Rates, .. }));
    }
}
