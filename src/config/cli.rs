use crate::config::toml_config::ServiceConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "country-sync")]
#[command(about = "Country catalog service enriched with exchange rates")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override server port from config
    #[arg(long)]
    pub port: Option<u16>,

    /// Override database path from config
    #[arg(long)]
    pub database_path: Option<String>,

    /// Run one refresh cycle before serving requests
    #[arg(long)]
    pub refresh_on_start: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 載入 TOML（若有指定）並套用命令列覆蓋
    pub fn load_service_config(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };

        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(path) = &self.database_path {
            config.storage.database_path = path.clone();
        }
        Ok(config)
    }
}
