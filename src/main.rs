use clap::Parser;
use country_sync::app::{app_router, AppState};
use country_sync::utils::{logger, validation::Validate};
use country_sync::{CliConfig, RefreshOutcome, SyncError};

fn exit_with(e: &SyncError) -> ! {
    tracing::error!("❌ {} (Severity: {:?})", e, e.severity());
    eprintln!("❌ {}", e.user_friendly_message());
    std::process::exit(e.exit_code().max(1));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.load_service_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_logger(&config.logging.format, cli.verbose);
    tracing::info!("🚀 Starting country-sync");
    if cli.verbose {
        tracing::debug!("Service config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => exit_with(&e),
    };
    tracing::info!("✓ Database ready at {}", config.storage.database_path);

    if cli.refresh_on_start {
        match state.pipeline.run().await {
            RefreshOutcome::Completed(report) => tracing::info!(
                "Initial refresh: {} of {} countries persisted",
                report.persisted(),
                report.total_fetched
            ),
            RefreshOutcome::Aborted(reason) => {
                tracing::warn!("Initial refresh aborted: {}", reason)
            }
        }
    }

    let app = app_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    tracing::info!("Listening on http://{}", config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
