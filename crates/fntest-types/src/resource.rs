//! Conversions between typed values and unstructured [`Struct`]s.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{TypeError, TypeResult};
use crate::message::Struct;

/// Serialize `value` into an unstructured object.
///
/// Fails if the value does not serialize to a JSON object.
pub fn as_struct<T: Serialize + ?Sized>(value: &T) -> TypeResult<Struct> {
    let value = serde_json::to_value(value).map_err(|e| TypeError::Serialization(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(TypeError::NotAnObject(value_kind(&other).into())),
    }
}

/// Deserialize a typed value from an unstructured object.
pub fn as_object<T: DeserializeOwned>(s: &Struct) -> TypeResult<T> {
    serde_json::from_value(Value::Object(s.clone()))
        .map_err(|e| TypeError::Deserialization(e.to_string()))
}

/// Short name of a JSON value's type, for error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Bucket {
        api_version: String,
        kind: String,
        spec: BucketSpec,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct BucketSpec {
        region: String,
    }

    fn bucket() -> Bucket {
        Bucket {
            api_version: "s3.example.org/v1".into(),
            kind: "Bucket".into(),
            spec: BucketSpec {
                region: "eu-central-1".into(),
            },
        }
    }

    #[test]
    fn typed_value_to_struct() {
        let s = as_struct(&bucket()).unwrap();
        assert_eq!(s.get("apiVersion"), Some(&json!("s3.example.org/v1")));
        assert_eq!(s.get("spec"), Some(&json!({"region": "eu-central-1"})));
    }

    #[test]
    fn struct_to_typed_value() {
        let s = as_struct(&bucket()).unwrap();
        let back: Bucket = as_object(&s).unwrap();
        assert_eq!(back, bucket());
    }

    #[test]
    fn non_object_is_rejected() {
        assert_eq!(
            as_struct(&vec![1, 2]),
            Err(TypeError::NotAnObject("array".into()))
        );
        assert_eq!(as_struct("x"), Err(TypeError::NotAnObject("string".into())));
    }

    #[test]
    fn missing_fields_fail_deserialization() {
        let s = as_struct(&json!({"kind": "Bucket"})).unwrap();
        assert!(matches!(
            as_object::<Bucket>(&s),
            Err(TypeError::Deserialization(_))
        ));
    }
}
