pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::ServiceConfig;

pub use crate::core::reconcile::Reconciler;
pub use crate::core::refresh::RefreshPipeline;
pub use domain::model::{AbortReason, RefreshOutcome, RefreshReport};
pub use utils::error::{Result, SyncError};
