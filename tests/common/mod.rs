#![allow(dead_code)]

use country_sync::adapters::{
    HttpCatalogFetcher, HttpRateFetcher, PngSummaryGenerator, SqliteCountryStore,
};
use country_sync::core::reconcile::{FixedMultiplier, Reconciler};
use country_sync::domain::ports::CountryStore;
use country_sync::RefreshPipeline;
use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const COUNTRIES_PATH: &str = "/v2/all";
pub const RATES_PATH: &str = "/v6/latest/USD";

pub fn countries_payload() -> Value {
    json!([
        {
            "name": "Nigeria",
            "capital": "Abuja",
            "region": "Africa",
            "population": 206139589,
            "flag": "https://flagcdn.com/ng.svg",
            "currencies": [{"code": "NGN", "name": "Nigerian naira", "symbol": "₦"}],
            "independent": true
        },
        {
            "name": "Wakanda",
            "capital": "Birnin Zana",
            "region": "Africa",
            "population": 1000000,
            "flag": "",
            "currencies": [{"code": "WKD", "name": "Wakandan dollar"}]
        },
        {
            "name": "Ruritania",
            "region": "Europe",
            "population": 750000,
            "flag": "https://flags.example/ru.svg",
            "currencies": [{"code": "RUR", "name": "Ruritanian crown"}]
        },
        {
            "name": "Antarctica",
            "region": "Polar",
            "population": 1000,
            "flag": "https://flagcdn.com/aq.svg"
        }
    ])
}

pub fn rates_payload() -> Value {
    json!({
        "result": "success",
        "base_code": "USD",
        "rates": {"USD": 1.0, "NGN": 1600.0, "WKD": 2.0}
    })
}

pub fn mock_countries<'a>(server: &'a MockServer, body: Value) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(GET).path(COUNTRIES_PATH);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(body);
    })
}

pub fn mock_rates<'a>(server: &'a MockServer, body: Value) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(GET).path(RATES_PATH);
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(body);
    })
}

/// 以固定乘數 1000 組裝管道，估算值可預期
pub fn build_pipeline(
    server: &MockServer,
    store: Arc<dyn CountryStore>,
    image_path: &Path,
) -> RefreshPipeline {
    let timeout = Duration::from_secs(5);
    RefreshPipeline::new(
        HttpCatalogFetcher::new(server.url(COUNTRIES_PATH), timeout).unwrap(),
        HttpRateFetcher::new(server.url(RATES_PATH), timeout).unwrap(),
        store.clone(),
        PngSummaryGenerator::new(store, image_path),
    )
    .with_reconciler(Reconciler::new(FixedMultiplier(1000.0)))
}

pub fn memory_store() -> Arc<dyn CountryStore> {
    Arc::new(SqliteCountryStore::open_in_memory().unwrap())
}
