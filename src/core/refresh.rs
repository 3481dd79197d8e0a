use crate::core::reconcile::Reconciler;
use crate::domain::model::{AbortReason, ItemOutcome, ItemStatus, RefreshOutcome, RefreshReport};
use crate::domain::ports::{CatalogFetcher, CountryStore, RateFetcher, SummaryGenerator};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Drives one refresh cycle: fetch catalog, fetch rates, reconcile and
/// upsert every country, then regenerate the summary artifact.
///
/// Only an upstream fetch failure aborts a cycle. Per-country upsert
/// failures and summary failures are recorded in the report.
pub struct RefreshPipeline {
    catalog: Box<dyn CatalogFetcher>,
    rates: Box<dyn RateFetcher>,
    store: Arc<dyn CountryStore>,
    summary: Box<dyn SummaryGenerator>,
    reconciler: Reconciler,
    // 同一時間只跑一個刷新週期
    lease: Mutex<()>,
}

impl RefreshPipeline {
    pub fn new(
        catalog: impl CatalogFetcher + 'static,
        rates: impl RateFetcher + 'static,
        store: Arc<dyn CountryStore>,
        summary: impl SummaryGenerator + 'static,
    ) -> Self {
        Self {
            catalog: Box::new(catalog),
            rates: Box::new(rates),
            store,
            summary: Box::new(summary),
            reconciler: Reconciler::default(),
            lease: Mutex::new(()),
        }
    }

    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    /// Runs one cycle on its own task. Dropping the handle does not stop it.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<RefreshOutcome> {
        let pipeline = Arc::clone(self);
        tokio::spawn(async move { pipeline.run().await })
    }

    pub async fn run(&self) -> RefreshOutcome {
        let _lease = self.lease.lock().await;
        let started = Instant::now();
        tracing::info!("🔄 Starting country refresh");

        let catalog = match self.catalog.fetch_catalog().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("❌ Error fetching countries: {}", e);
                return RefreshOutcome::Aborted(AbortReason::FetchCatalogFailed(e.to_string()));
            }
        };
        tracing::info!("Fetched {} countries", catalog.len());

        let rates = match self.rates.fetch_rates().await {
            Ok(rates) => rates,
            Err(e) => {
                tracing::error!("❌ Error fetching exchange rates: {}", e);
                return RefreshOutcome::Aborted(AbortReason::FetchRatesFailed(e.to_string()));
            }
        };
        if rates.is_empty() {
            tracing::warn!("Exchange rate feed returned no rates");
        } else {
            tracing::info!("Fetched exchange rates for {} currencies", rates.len());
        }

        let mut items = Vec::with_capacity(catalog.len());
        for entry in &catalog {
            let record = self.reconciler.reconcile(entry, &rates);
            let status = match self.store.upsert(&record).await {
                Ok(()) => ItemStatus::Persisted,
                Err(e) => {
                    tracing::warn!("Failed to upsert country {}: {}", record.name, e);
                    ItemStatus::Failed(e.to_string())
                }
            };
            items.push(ItemOutcome {
                name: record.name,
                status,
            });
        }

        let summary_generated = match self.summary.generate().await {
            Ok(path) => {
                tracing::debug!("Summary image written to {}", path.display());
                true
            }
            Err(e) => {
                tracing::warn!("Failed to generate summary image: {}", e);
                false
            }
        };

        let report = RefreshReport {
            total_fetched: catalog.len(),
            items,
            summary_generated,
        };
        tracing::info!(
            "✅ Refresh completed: {} persisted, {} failed in {:?}",
            report.persisted(),
            report.failed(),
            started.elapsed()
        );

        RefreshOutcome::Completed(report)
    }
}
