use thiserror::Error;

#[derive(Error, Debug)]
pub enum XhsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("No cookie configured and no active login session")]
    MissingCookie,

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("{0}")]
    Other(String),
}

impl From<chromiumoxide::error::CdpError> for XhsError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        XhsError::Browser(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, XhsError>;
