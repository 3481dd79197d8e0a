use clap::Parser;
use country_sync::adapters::SqliteCountryStore;
use country_sync::app::state::build_pipeline;
use country_sync::domain::model::ItemStatus;
use country_sync::domain::ports::{ConfigProvider, CountryStore};
use country_sync::utils::{logger, validation::Validate};
use country_sync::{RefreshOutcome, ServiceConfig};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "refresh")]
#[command(about = "Run a single country refresh cycle and exit")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Exit with a non-zero code when any country fails to persist
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ServiceConfig::from_file(path)?,
        None => ServiceConfig::default(),
    };
    logger::init_logger(&config.logging.format, args.verbose);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let store: Arc<dyn CountryStore> = Arc::new(SqliteCountryStore::open(config.database_path())?);
    let pipeline = build_pipeline(&config, store)?;

    match pipeline.run().await {
        RefreshOutcome::Completed(report) => {
            for item in report.failures() {
                if let ItemStatus::Failed(reason) = &item.status {
                    eprintln!("⚠️  {}: {}", item.name, reason);
                }
            }
            println!(
                "✅ Refreshed {} countries ({} persisted, {} failed)",
                report.total_fetched,
                report.persisted(),
                report.failed()
            );
            if !report.summary_generated {
                println!("⚠️  Summary image was not generated");
            }
            if args.strict && report.failed() > 0 {
                std::process::exit(4);
            }
        }
        RefreshOutcome::Aborted(reason) => {
            tracing::error!("❌ Refresh aborted: {}", reason);
            eprintln!("❌ External data source unavailable: {}", reason);
            std::process::exit(2);
        }
    }

    Ok(())
}
