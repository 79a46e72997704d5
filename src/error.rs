use arrow::error::ArrowError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Malformed dataset metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("Dataset {dataset_id} metadata has no `{field}`")]
    MissingField {
        dataset_id: String,
        field: &'static str,
    },

    #[error("Export body is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("Export body is empty")]
    EmptyExport,

    #[error("CSV error: {0}")]
    Csv(#[from] ArrowError),

    #[error("Unknown column `{0}`")]
    UnknownColumn(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl FetchError {
    pub(crate) fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
