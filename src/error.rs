use thiserror::Error;

/// Errors surfaced by the harvester
#[derive(Error, Debug)]
pub enum HarvestError {
    #[error("Browser command failed: {0}")]
    Browser(#[from] fantoccini::error::CmdError),

    #[error("WebDriver session error: {0}")]
    WebDriver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Request handler timed out after {0} seconds")]
    Timeout(u64),
}

pub type Result<T> = std::result::Result<T, HarvestError>;
