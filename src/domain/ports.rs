use crate::domain::model::{CatalogEntry, PersistedRow, RateTable, ReconciledRecord};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

#[async_trait]
pub trait CatalogFetcher: Send + Sync {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>>;
}

#[async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch_rates(&self) -> Result<RateTable>;
}

/// 以國家名稱為鍵的持久化介面
#[async_trait]
pub trait CountryStore: Send + Sync {
    /// Inserts or replaces the row for `record.name`, stamping the refresh time.
    async fn upsert(&self, record: &ReconciledRecord) -> Result<()>;
    async fn find_by_name(&self, name: &str) -> Result<Option<PersistedRow>>;
    /// Returns [`crate::SyncError::NotFoundError`] when no row matches.
    async fn delete_by_name(&self, name: &str) -> Result<()>;
    async fn list_all(&self) -> Result<Vec<PersistedRow>>;
    async fn count(&self) -> Result<u64>;
    async fn last_refreshed_at(&self) -> Result<Option<DateTime<Utc>>>;
}

#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    /// 產生摘要圖檔並回傳路徑
    async fn generate(&self) -> Result<PathBuf>;
}

pub trait ConfigProvider: Send + Sync {
    fn countries_endpoint(&self) -> &str;
    fn rates_endpoint(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn database_path(&self) -> &str;
    fn summary_image_path(&self) -> &str;
}
