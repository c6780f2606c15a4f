//! Error types for Hawkes Prep

use thiserror::Error;

/// Errors that can occur while generating, converting or persisting a dataset
#[derive(Debug, Error)]
pub enum PrepError {
    #[error("Malformed record for customer '{customer}': {reason}")]
    MalformedRecord { customer: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PrepError {
    pub(crate) fn malformed(customer: &str, reason: impl Into<String>) -> Self {
        PrepError::MalformedRecord {
            customer: customer.to_string(),
            reason: reason.into(),
        }
    }

    /// True for record-level failures (as opposed to I/O or configuration)
    pub fn is_malformed_record(&self) -> bool {
        matches!(self, PrepError::MalformedRecord { .. })
    }
}
