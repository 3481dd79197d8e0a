use crate::adapters::{HttpCatalogFetcher, HttpRateFetcher, PngSummaryGenerator, SqliteCountryStore};
use crate::config::ServiceConfig;
use crate::core::refresh::RefreshPipeline;
use crate::domain::ports::{ConfigProvider, CountryStore};
use crate::utils::error::Result;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CountryStore>,
    pub pipeline: Arc<RefreshPipeline>,
    pub summary_path: PathBuf,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CountryStore>,
        pipeline: RefreshPipeline,
        summary_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            pipeline: Arc::new(pipeline),
            summary_path: summary_path.into(),
        }
    }

    /// 依配置開啟資料庫並組裝完整的刷新管道
    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let store: Arc<dyn CountryStore> =
            Arc::new(SqliteCountryStore::open(config.database_path())?);
        let pipeline = build_pipeline(config, store.clone())?;
        Ok(Self::new(store, pipeline, config.summary_image_path()))
    }
}

pub fn build_pipeline(
    config: &ServiceConfig,
    store: Arc<dyn CountryStore>,
) -> Result<RefreshPipeline> {
    let summary = PngSummaryGenerator::new(store.clone(), config.summary_image_path())
        .with_top_n(config.summary.top_n);

    Ok(RefreshPipeline::new(
        HttpCatalogFetcher::from_config(config)?,
        HttpRateFetcher::from_config(config)?,
        store,
        summary,
    ))
}
