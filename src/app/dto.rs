use crate::domain::model::{PersistedRow, RefreshReport};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

fn format_time(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CountryResponse {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capital: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub population: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_gdp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag_url: Option<String>,
    pub last_refreshed_at: String,
}

impl From<PersistedRow> for CountryResponse {
    fn from(row: PersistedRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            capital: row.capital,
            region: row.region,
            population: row.population,
            currency_code: row.currency_code,
            exchange_rate: row.exchange_rate,
            estimated_gdp: row.estimated_gdp,
            flag_url: row.flag_url,
            last_refreshed_at: format_time(row.last_refreshed_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub message: String,
    pub total_fetched: usize,
    pub persisted: usize,
    pub failed: usize,
    pub summary_generated: bool,
}

impl From<&RefreshReport> for RefreshResponse {
    fn from(report: &RefreshReport) -> Self {
        Self {
            message: "Countries refreshed successfully".to_string(),
            total_fetched: report.total_fetched,
            persisted: report.persisted(),
            failed: report.failed(),
            summary_generated: report.summary_generated,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub total_countries: u64,
    /// `"Never"` until the first successful upsert.
    pub last_refreshed_at: String,
}

impl StatusResponse {
    pub fn new(total_countries: u64, last_refreshed_at: Option<DateTime<Utc>>) -> Self {
        Self {
            total_countries,
            last_refreshed_at: last_refreshed_at
                .map(format_time)
                .unwrap_or_else(|| "Never".to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}
