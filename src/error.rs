use thiserror::Error;

/// Validation and persistence failures surfaced by the ledger store.
///
/// Everything recoverable (rate fetches, malformed data files) is absorbed
/// at the rate-cache / store boundary; only direct input validation and
/// write failures reach the caller.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("No {kind} named '{name}'")]
    RecordNotFound { kind: &'static str, name: String },

    #[error("Failed to write {file}")]
    Persistence {
        file: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while fetching or decoding an exchange-rate payload. Never
/// propagated past the rate cache — it falls back to the last known table.
#[derive(Debug, Error)]
pub enum RateFetchError {
    #[error("Rate request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse rate response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate response carried no usable rates")]
    MissingRates,
}
