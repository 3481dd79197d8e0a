use crate::core::ConfigProvider;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_COUNTRIES_ENDPOINT: &str =
    "https://restcountries.com/v2/all?fields=name,capital,region,population,flag,currencies";
pub const DEFAULT_RATES_ENDPOINT: &str = "https://open.er-api.com/v6/latest/USD";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub sources: SourcesConfig,
    pub storage: StorageConfig,
    pub summary: SummaryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub countries_endpoint: String,
    pub rates_endpoint: String,
    pub timeout_seconds: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            countries_endpoint: DEFAULT_COUNTRIES_ENDPOINT.to_string(),
            rates_endpoint: DEFAULT_RATES_ENDPOINT.to_string(),
            timeout_seconds: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: "countries.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    pub image_path: String,
    pub top_n: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            image_path: crate::adapters::summary::DEFAULT_IMAGE_PATH.to_string(),
            top_n: crate::adapters::summary::DEFAULT_TOP_N,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: "compact".to_string(),
        }
    }
}

impl ServiceConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATABASE_PATH})；未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ConfigProvider for ServiceConfig {
    fn countries_endpoint(&self) -> &str {
        &self.sources.countries_endpoint
    }

    fn rates_endpoint(&self) -> &str {
        &self.sources.rates_endpoint
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.sources.timeout_seconds)
    }

    fn database_path(&self) -> &str {
        &self.storage.database_path
    }

    fn summary_image_path(&self) -> &str {
        &self.summary.image_path
    }
}

impl Validate for ServiceConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("sources.countries_endpoint", &self.sources.countries_endpoint)?;
        validation::validate_url("sources.rates_endpoint", &self.sources.rates_endpoint)?;
        validation::validate_positive_number("sources.timeout_seconds", self.sources.timeout_seconds, 1)?;
        validation::validate_path("storage.database_path", &self.storage.database_path)?;
        validation::validate_path("summary.image_path", &self.summary.image_path)?;
        validation::validate_range(
            "summary.top_n",
            self.summary.top_n as u64,
            1,
            crate::adapters::summary::MAX_TOP_N as u64,
        )?;
        validation::validate_one_of("logging.format", &self.logging.format, &["compact", "json"])?;
        Ok(())
    }
}
