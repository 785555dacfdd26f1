//! Conversion of protocol messages into the plain JSON form compared by the
//! harness, and typed access to a response's desired state.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use fntest_types::{as_object, FunctionResult, Resource, RunFunctionResponse, Struct};

use crate::error::{TestError, TestResult};

/// Results as `{Message, Severity}` records.
pub fn results_to_values(results: &[FunctionResult]) -> Vec<Value> {
    results
        .iter()
        .map(|r| {
            json!({
                "Message": r.message,
                "Severity": r.severity.to_string(),
            })
        })
        .collect()
}

/// The manifest of a resource, normalized for comparison.
pub fn resource_to_object(resource: Option<&Resource>) -> Option<Value> {
    resource.map(|r| Value::Object(normalize_manifest(&r.resource)))
}

/// Manifests keyed by resource name, normalized for comparison.
pub fn resources_to_objects(resources: &BTreeMap<String, Resource>) -> BTreeMap<String, Value> {
    resources
        .iter()
        .map(|(name, r)| (name.clone(), Value::Object(normalize_manifest(&r.resource))))
        .collect()
}

/// Drop `metadata.annotations` when empty, then `metadata` when empty.
///
/// Fixtures lose their name annotation when read, which commonly leaves
/// both fields empty.
fn normalize_manifest(manifest: &Struct) -> Struct {
    let mut out = manifest.clone();
    let metadata_empty = match out.get_mut("metadata") {
        Some(Value::Object(metadata)) => {
            if matches!(metadata.get("annotations"), Some(Value::Object(a)) if a.is_empty()) {
                metadata.remove("annotations");
            }
            metadata.is_empty()
        }
        _ => false,
    };
    if metadata_empty {
        out.remove("metadata");
    }
    out
}

/// Decode the desired composite of a response into `T`.
pub fn desired_composite_as<T: DeserializeOwned>(res: &RunFunctionResponse) -> TestResult<T> {
    let composite = res
        .desired
        .composite
        .as_ref()
        .ok_or_else(|| TestError::ResourceNotFound("composite".into()))?;
    Ok(as_object(&composite.resource)?)
}

/// Decode the desired resource `name` of a response into `T`.
pub fn desired_resource_as<T: DeserializeOwned>(
    res: &RunFunctionResponse,
    name: &str,
) -> TestResult<T> {
    let resource = res
        .desired
        .resources
        .get(name)
        .ok_or_else(|| TestError::ResourceNotFound(name.into()))?;
    Ok(as_object(&resource.resource)?)
}
