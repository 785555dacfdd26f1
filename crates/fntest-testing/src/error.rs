use thiserror::Error;

use fntest_types::TypeError;

#[derive(Debug, Error)]
pub enum TestError {
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("type error: {0}")]
    Types(#[from] TypeError),

    #[error("resource has no name annotation: {gvk}/{name}")]
    MissingNameAnnotation { gvk: String, name: String },

    #[error("secret {name:?} is not a connection secret, got type {secret_type:?}")]
    NotConnectionSecret { name: String, secret_type: String },

    #[error("parent resource of the connection secret is not (yet) observed: {0}")]
    ParentNotObserved(String),

    #[error("could not get resource from response: {0}")]
    ResourceNotFound(String),

    #[error("invalid base64 in secret data key {key:?}: {reason}")]
    InvalidBase64 { key: String, reason: String },

    #[error("cannot unmarshal document at index {index}: {source}")]
    Document {
        index: usize,
        #[source]
        source: Box<TestError>,
    },

    #[error("cannot unmarshal file at index {index}: {source}")]
    File {
        index: usize,
        #[source]
        source: Box<TestError>,
    },
}

pub type TestResult<T> = Result<T, TestError>;
