//! Reading fixtures from YAML and JSON documents.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::{TestError, TestResult};

/// Decode a single YAML document.
pub fn from_yaml<T: DeserializeOwned>(raw: &[u8]) -> TestResult<T> {
    Ok(serde_yaml::from_slice(raw)?)
}

/// Decode a single JSON document.
pub fn from_json<T: DeserializeOwned>(raw: &[u8]) -> TestResult<T> {
    Ok(serde_json::from_slice(raw)?)
}

/// Decode every document of a multi-document YAML stream.
///
/// Empty documents (for example a trailing `---`) are skipped.
pub fn objects_from_yaml<T: DeserializeOwned>(raw: &[u8]) -> TestResult<Vec<T>> {
    let mut out = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_slice(raw).enumerate() {
        let wrap = |e: serde_yaml::Error| TestError::Document {
            index,
            source: Box::new(e.into()),
        };
        let value = serde_yaml::Value::deserialize(document).map_err(wrap)?;
        if value.is_null() {
            continue;
        }
        out.push(serde_yaml::from_value(value).map_err(wrap)?);
    }
    Ok(out)
}
