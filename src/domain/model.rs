use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyDescriptor {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// 國家目錄來源回傳的單筆國家資料，未知欄位直接忽略
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub capital: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    pub population: u64,
    #[serde(default)]
    pub flag: String,
    #[serde(default)]
    pub currencies: Vec<CurrencyDescriptor>,
}

impl CatalogEntry {
    /// 第一個有代碼的貨幣；空代碼視同沒有貨幣
    pub fn primary_currency_code(&self) -> Option<&str> {
        self.currencies
            .first()
            .and_then(|c| c.code.as_deref())
            .filter(|code| !code.is_empty())
    }
}

/// 貨幣代碼 → 對基準貨幣的匯率
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable(HashMap<String, f64>);

impl RateTable {
    pub fn new(rates: HashMap<String, f64>) -> Self {
        Self(rates)
    }

    pub fn get(&self, code: &str) -> Option<f64> {
        self.0.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Result of merging one catalog entry with the rate table.
///
/// `exchange_rate` is set only when `currency_code` is set and found with a
/// positive rate. `estimated_gdp` follows the rate, except for countries with
/// no currency at all, where it is fixed at zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledRecord {
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: u64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: String,
}

/// 資料庫中的國家資料列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersistedRow {
    pub id: i64,
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub population: u64,
    pub currency_code: Option<String>,
    pub exchange_rate: Option<f64>,
    pub estimated_gdp: Option<f64>,
    pub flag_url: Option<String>,
    pub last_refreshed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AbortReason {
    #[error("country catalog fetch failed: {0}")]
    FetchCatalogFailed(String),
    #[error("exchange rate fetch failed: {0}")]
    FetchRatesFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemStatus {
    Persisted,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemOutcome {
    pub name: String,
    pub status: ItemStatus,
}

impl ItemOutcome {
    pub fn is_persisted(&self) -> bool {
        matches!(self.status, ItemStatus::Persisted)
    }
}

/// 一次完整刷新的逐筆結果
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshReport {
    pub total_fetched: usize,
    pub items: Vec<ItemOutcome>,
    pub summary_generated: bool,
}

impl RefreshReport {
    pub fn persisted(&self) -> usize {
        self.items.iter().filter(|i| i.is_persisted()).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.persisted()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter().filter(|i| !i.is_persisted())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    Completed(RefreshReport),
    Aborted(AbortReason),
}

impl RefreshOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RefreshOutcome::Completed(_))
    }
}
