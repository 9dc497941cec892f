use thiserror::Error;

#[derive(Error, Debug)]
pub enum ListError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid header row: {0}")]
    InvalidHeader(String),

    #[error(
        "Line number {line} had {fields} fields but each record must have {expected} fields \
         (separated by tabs) to match the header row"
    )]
    MalformedRecord {
        line: usize,
        fields: usize,
        expected: usize,
    },

    #[error("Verification of records {first}-{last} failed: {reason}")]
    BatchAborted {
        first: u64,
        last: u64,
        reason: String,
    },

    #[error("Malformed verification response: {0}")]
    MalformedResponse(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ListError>;
