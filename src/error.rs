//! Typed errors for record decoding.
//!
//! Transport and I/O failures travel as `anyhow::Error`; the variants here
//! describe why a single record was rejected, so the grouper can count and
//! log drops by reason without failing the whole fetch.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("unknown dataset type code {0}")]
    DatasetType(i64),

    #[error("unknown run metric code {0}")]
    RunMetric(i64),

    #[error("query_times is not a JSON array of numbers: {0}")]
    QueryTimes(String),
}

impl DecodeError {
    /// Short machine-readable reason for logs and drop counters.
    pub fn reason(&self) -> &'static str {
        match self {
            DecodeError::DatasetType(_) => "invalid_type",
            DecodeError::RunMetric(_) => "invalid_metric",
            DecodeError::QueryTimes(_) => "invalid_query_times",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code() {
        assert_eq!(
            DecodeError::DatasetType(7).to_string(),
            "unknown dataset type code 7"
        );
        assert_eq!(DecodeError::RunMetric(0).reason(), "invalid_metric");
    }
}
