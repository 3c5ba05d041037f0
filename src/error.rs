//! Typed errors that cross the tool boundary.
//!
//! Application plumbing uses [`anyhow`]; the errors here exist so the
//! transports can tell a caller mistake from an upstream failure. The HTTP
//! server downcasts an `anyhow::Error` to these types to pick a status code.

use thiserror::Error;

/// Errors raised by tool operations themselves.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The caller passed a missing, empty, or ill-typed argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The concept name is well-formed but not in the catalog.
    #[error("Unknown concept '{name}'. Valid concepts: {}", valid.join(", "))]
    UnknownConcept { name: String, valid: Vec<String> },

    /// A named item (tool, section, example kind) does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl ToolError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Errors raised while downloading the specification text.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("specification fetch timed out after {secs}s: {url}")]
    Timeout { url: String, secs: u64 },

    #[error("specification fetch failed with HTTP {status}: {url}")]
    Status { url: String, status: u16 },

    #[error("specification fetch failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_concept_lists_valid_names() {
        let err = ToolError::UnknownConcept {
            name: "Widget".to_string(),
            valid: vec!["Product".to_string(), "Vendor".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("Unknown concept 'Widget'"));
        assert!(msg.contains("Product, Vendor"));
    }

    #[test]
    fn test_status_error_message() {
        let err = FetchError::Status {
            url: "https://example.com/spec.md".to_string(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "specification fetch failed with HTTP 404: https://example.com/spec.md"
        );
    }
}
