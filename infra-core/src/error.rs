//! Error types for infra-core.

use thiserror::Error;

/// Errors that can occur while reading terraform outputs.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The named output is not declared by the module
    #[error("output not found: {0}")]
    OutputNotFound(String),

    /// The output exists but has a different shape than requested
    #[error("output {name} is not a {expected}")]
    OutputType {
        /// Output name
        name: String,
        /// Shape the caller asked for ("string", "list", "map")
        expected: &'static str,
    },

    /// `terraform output -json` produced something that is not JSON
    #[error("invalid output json: {0}")]
    OutputParse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CoreError::OutputNotFound("vpc_id".into());
        assert_eq!(err.to_string(), "output not found: vpc_id");

        let err = CoreError::OutputType {
            name: "cluster_info".into(),
            expected: "map",
        };
        assert_eq!(err.to_string(), "output cluster_info is not a map");
    }

    #[test]
    fn parse_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(err.to_string().starts_with("invalid output json"));
    }
}
