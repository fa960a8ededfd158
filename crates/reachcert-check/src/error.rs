//! Error types for certificate checking
//!
//! Only configuration, I/O and format problems are errors. Failed
//! recomputation and soundness violations are reported as a
//! [`crate::Verdict::Rejected`] instead.

use reachcert_partition::PartitionError;
use thiserror::Error;

/// Result type for checking operations
pub type Result<T> = std::result::Result<T, CheckError>;

/// Errors raised before or around a check
#[derive(Error, Debug)]
pub enum CheckError {
    /// Checker configuration is invalid
    #[error("Invalid checker configuration: {0}")]
    Config(String),

    /// Partitioning the certificate failed
    #[error("Partitioning failed: {0}")]
    Partition(#[from] PartitionError),

    /// Reading or writing a layout failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding or decoding a payload failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A persisted layout has the wrong magic or version
    #[error("Invalid layout format: {0}")]
    Format(String),

    /// The certificate refers to states it does not contain
    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    /// Exploration produced more states than allowed
    #[error("Exploration exceeded the limit of {limit} states")]
    ExplorationLimit {
        /// Configured state limit
        limit: usize,
    },

    /// The analysis failed while building a certificate
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

impl CheckError {
    /// Check if the error stems from caller-supplied parameters
    pub fn is_configuration_error(&self) -> bool {
        match self {
            CheckError::Config(_) => true,
            CheckError::Partition(err) => err.is_configuration_error(),
            _ => false,
        }
    }
}

impl From<bincode::error::EncodeError> for CheckError {
    fn from(err: bincode::error::EncodeError) -> Self {
        CheckError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for CheckError {
    fn from(err: bincode::error::DecodeError) -> Self {
        CheckError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for CheckError {
    fn from(err: serde_json::Error) -> Self {
        CheckError::Serialization(err.to_string())
    }
}

/// Failure of the transfer relation or the coverage test
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// Successor computation failed
    #[error("transfer relation failed: {0}")]
    Transfer(String),

    /// Coverage test failed
    #[error("coverage test failed: {0}")]
    Coverage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CheckError::Config("threads must be at least 1".into());
        assert_eq!(
            err.to_string(),
            "Invalid checker configuration: threads must be at least 1"
        );

        let err = CheckError::ExplorationLimit { limit: 10 };
        assert_eq!(err.to_string(), "Exploration exceeded the limit of 10 states");

        let err = AnalysisError::Transfer("division by zero".into());
        assert_eq!(err.to_string(), "transfer relation failed: division by zero");
    }

    #[test]
    fn test_configuration_errors() {
        assert!(CheckError::Config(String::new()).is_configuration_error());
        assert!(CheckError::from(PartitionError::InvalidBalance(0.0)).is_configuration_error());
        assert!(!CheckError::from(PartitionError::EmptyGraph).is_configuration_error());
        assert!(!CheckError::Format("bad magic".into()).is_configuration_error());
    }
}
