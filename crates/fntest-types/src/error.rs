use thiserror::Error;

/// Errors produced converting between typed values and unstructured objects.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),
}

/// Convenience alias for type conversion results.
pub type TypeResult<T> = Result<T, TypeError>;
