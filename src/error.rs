//! # Centralized Error Handling
//!
//! Unified error types for the entire crate using `thiserror`. Every failure
//! that aborts a run is one of these variants; `main` is the only place that
//! turns them into a process exit code.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for ldblock operations
#[derive(Error, Debug)]
pub enum LdBlockError {
    /// I/O errors (file missing, permission denied, read/write failures)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed genotype source (bad .bed header, size mismatch)
    #[error("Genotype data error: {message}")]
    Genotype { message: String },

    /// Parse errors in text inputs (.bim)
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Structural inconsistency between collaborators (row/marker count mismatch, page size mismatch)
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Algorithm errors (no admissible split candidate)
    #[error("Algorithm error: {message}")]
    Algorithm { message: String },

    /// Split index outside `0..size-1`
    #[error("invalid split index {index} for correlation matrix of size {size}")]
    InvalidSplit { index: usize, size: usize },

    /// Configuration errors (invalid CLI arguments)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// File not found errors
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// No marker survived filtering
    #[error("no SNPs retained after filtering")]
    NoMarkers,

    /// Splitting finished without a single break point
    #[error("unable to find any break points with current settings")]
    NoBreakPoints,
}

/// Type alias for Results using LdBlockError
pub type Result<T> = std::result::Result<T, LdBlockError>;

impl LdBlockError {
    /// Create a genotype source error
    pub fn genotype(message: impl Into<String>) -> Self {
        Self::Genotype {
            message: message.into(),
        }
    }

    /// Create an invalid data error
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create an algorithm error
    pub fn algorithm(message: impl Into<String>) -> Self {
        Self::Algorithm {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LdBlockError::parse(3, "not enough values");
        assert_eq!(err.to_string(), "Parse error at line 3: not enough values");

        let err = LdBlockError::InvalidSplit { index: 9, size: 4 };
        assert!(err.to_string().contains("invalid split index 9"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: LdBlockError = io.into();
        assert!(matches!(err, LdBlockError::Io(_)));
    }
}
