//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The CRI file could not be decoded
    #[error("CRI error: {0}")]
    Cri(#[from] coveron_runtime::CriError),

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// The header does not belong to the expected instrumentation
    #[error("Header mismatch: {message}")]
    Mismatch {
        /// Error message
        message: String,
    },

    /// Report generation error
    #[error("Report generation failed: {message}")]
    ReportGeneration {
        /// Error message
        message: String,
    },
}

impl CliError {
    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a header mismatch error
    #[must_use]
    pub fn mismatch(message: impl Into<String>) -> Self {
        Self::Mismatch {
            message: message.into(),
        }
    }

    /// Create a report generation error
    #[must_use]
    pub fn report_generation(message: impl Into<String>) -> Self {
        Self::ReportGeneration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_error() {
        let err = CliError::invalid_argument("bad hash");
        assert!(err.to_string().contains("Invalid argument"));
        assert!(err.to_string().contains("bad hash"));
    }

    #[test]
    fn test_mismatch_error() {
        let err = CliError::mismatch("random differs");
        assert!(err.to_string().contains("Header mismatch"));
    }

    #[test]
    fn test_report_generation_error() {
        let err = CliError::report_generation("json failed");
        assert!(err.to_string().contains("Report"));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cli_err: CliError = io_err.into();
        assert!(cli_err.to_string().contains("I/O"));
    }

    #[test]
    fn test_cri_error_from() {
        let cri_err = coveron_runtime::CriError::invalid_header("bad magic");
        let cli_err: CliError = cri_err.into();
        assert!(cli_err.to_string().starts_with("CRI error"));
        assert!(cli_err.to_string().contains("bad magic"));
    }
}
