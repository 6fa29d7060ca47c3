pub mod bio;
pub mod cli;
pub mod core;
pub mod utils;

pub use crate::bio::{Fragment, FragmentRecord};
pub use crate::core::{
    config::Config,
    pipeline::{run_pipeline, AssembledSequence, BatchResult, Pipeline, PipelineWarning},
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FragGroupError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed input in record {record} ({name}): {reason}")]
    MalformedInput {
        record: usize,
        name: String,
        reason: String,
    },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<csv::Error> for FragGroupError {
    fn from(err: csv::Error) -> Self {
        match err.into_kind() {
            csv::ErrorKind::Io(e) => FragGroupError::Io(e),
            other => FragGroupError::Parse(format!("{:?}", other)),
        }
    }
}

impl From<serde_json::Error> for FragGroupError {
    fn from(err: serde_json::Error) -> Self {
        FragGroupError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FragGroupError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_error_display() {
        let malformed = FragGroupError::MalformedInput {
            record: 3,
            name: "frag_c".to_string(),
            reason: "invalid character 'X' at position 5".to_string(),
        };
        assert_eq!(
            format!("{}", malformed),
            "Malformed input in record 3 (frag_c): invalid character 'X' at position 5"
        );

        let config_error = FragGroupError::Configuration("damping must be in (0, 1)".to_string());
        assert_eq!(
            format!("{}", config_error),
            "Invalid configuration: damping must be in (0, 1)"
        );

        let io_error = FragGroupError::Io(io::Error::new(io::ErrorKind::NotFound, "missing.csv"));
        assert!(format!("{}", io_error).contains("IO error"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: FragGroupError = io_err.into();

        match err {
            FragGroupError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::PermissionDenied),
            _ => panic!("Expected Io error variant"),
        }
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let parse_result: std::result::Result<serde_json::Value, serde_json::Error> =
            serde_json::from_str("{invalid json}");
        let err: FragGroupError = parse_result.unwrap_err().into();

        assert!(matches!(err, FragGroupError::Serialization(_)));
    }
}
