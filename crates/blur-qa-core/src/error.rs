//! Error types for the scoring functions.

use thiserror::Error;

/// Result type alias for core scoring operations.
pub type Result<T> = std::result::Result<T, QaError>;

/// Failures raised by the scoring functions.
///
/// Every variant describes a problem with the caller's input, never an
/// internal fault, so batch drivers can skip the offending image and move on.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QaError {
    /// Image is empty, has zero area, or has an unsupported channel layout.
    #[error("invalid input image: {reason}")]
    InvalidInput {
        /// What is wrong with the image.
        reason: String,
    },

    /// A contrast method name that is not implemented.
    #[error("unsupported contrast method '{method}' (available: linear)")]
    UnsupportedMethod {
        /// The rejected method name.
        method: String,
    },

    /// A numeric parameter outside its valid domain.
    #[error("invalid parameter: {parameter} = {value}")]
    InvalidParameter {
        /// Parameter name.
        parameter: &'static str,
        /// Offending value, formatted.
        value: String,
    },
}

impl QaError {
    /// Create an invalid input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Create an invalid parameter error.
    pub fn invalid_parameter(parameter: &'static str, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = QaError::invalid_input("zero area (0x10)");
        assert_eq!(err.to_string(), "invalid input image: zero area (0x10)");

        let err = QaError::UnsupportedMethod {
            method: "log".to_string(),
        };
        assert!(err.to_string().contains("'log'"));

        let err = QaError::invalid_parameter("lower_percentile", 120.0);
        assert_eq!(err.to_string(), "invalid parameter: lower_percentile = 120");
    }
}
