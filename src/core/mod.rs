pub mod reconcile;
pub mod refresh;

pub use crate::domain::model::{CatalogEntry, RateTable, ReconciledRecord, RefreshOutcome};
pub use crate::domain::ports::{
    CatalogFetcher, ConfigProvider, CountryStore, RateFetcher, SummaryGenerator,
};
pub use crate::utils::error::Result;
