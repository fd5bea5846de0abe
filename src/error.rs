/// Engine-level errors
///
/// Loader failures are carried through [`EngineError::Source`] without any
/// wrapping or retry; the caller decides fallback policy.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Data source error: {0}")]
    Source(#[from] anyhow::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_wraps_anyhow() {
        let err: EngineError = anyhow::anyhow!("connection refused").into();
        assert!(matches!(err, EngineError::Source(_)));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_invalid_config_message() {
        let err = EngineError::InvalidConfig("batch_size must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: batch_size must be at least 1"
        );
    }
}
