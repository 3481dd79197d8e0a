use thiserror::Error;

/// 上游資料來源種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    Catalog,
    Rates,
}

impl std::fmt::Display for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Feed::Catalog => write!(f, "country catalog"),
            Feed::Rates => write!(f, "exchange rates"),
        }
    }
}

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Upstream {feed} fetch failed: {message}")]
    UpstreamFetchError { feed: Feed, message: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Country not found: {name}")]
    NotFoundError { name: String },

    #[error("Store unavailable: {message}")]
    StoreUnavailable { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SyncError {
    pub fn upstream(feed: Feed, message: impl Into<String>) -> Self {
        SyncError::UpstreamFetchError {
            feed,
            message: message.into(),
        }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        SyncError::NotFoundError { name: name.into() }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SyncError::NotFoundError { .. } => ErrorSeverity::Low,
            SyncError::UpstreamFetchError { .. } | SyncError::ApiError(_) => ErrorSeverity::Medium,
            SyncError::ConfigError { .. }
            | SyncError::ConfigValidationError { .. }
            | SyncError::InvalidConfigValueError { .. }
            | SyncError::ImageError(_) => ErrorSeverity::High,
            SyncError::DatabaseError(_)
            | SyncError::IoError(_)
            | SyncError::StoreUnavailable { .. } => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            SyncError::UpstreamFetchError { feed, .. } => {
                format!("The {} source is unavailable, try again later", feed)
            }
            SyncError::ApiError(_) => "Could not reach an upstream data source".to_string(),
            SyncError::NotFoundError { name } => format!("No country named '{}'", name),
            SyncError::ConfigError { .. }
            | SyncError::ConfigValidationError { .. }
            | SyncError::InvalidConfigValueError { .. } => {
                format!("Configuration problem: {}", self)
            }
            _ => format!("Internal error: {}", self),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
