use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An untyped JSON object. Manifests, function input and context travel in
/// this form.
pub type Struct = Map<String, Value>;

/// A request to run a composition function.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFunctionRequest {
    pub meta: RequestMeta,
    /// The state of the composite and composed resources as observed by the
    /// orchestrator.
    pub observed: State,
    /// The desired state accumulated by earlier functions in the pipeline.
    pub desired: State,
    /// Optional function-specific input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Struct>,
    /// Context passed along the pipeline.
    #[serde(default)]
    pub context: Struct,
    /// Extra resources the function asked for, keyed by request name.
    #[serde(default)]
    pub extra_resources: BTreeMap<String, Resources>,
}

/// The result of running a composition function.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunFunctionResponse {
    pub meta: ResponseMeta,
    pub desired: State,
    #[serde(default)]
    pub results: Vec<FunctionResult>,
    #[serde(default)]
    pub context: Struct,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    pub tag: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<u64>,
}

/// Composite resource plus composed resources keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<Resource>,
    #[serde(default)]
    pub resources: BTreeMap<String, Resource>,
}

/// A single resource: its manifest plus connection details and readiness.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub resource: Struct,
    #[serde(default)]
    pub connection_details: BTreeMap<String, Vec<u8>>,
    #[serde(default)]
    pub ready: Ready,
}

impl Resource {
    /// Wrap a manifest with no connection details and unspecified readiness.
    pub fn new(resource: Struct) -> Self {
        Self {
            resource,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default)]
    pub items: Vec<Resource>,
}

/// Readiness of a desired resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ready {
    #[default]
    #[serde(rename = "READY_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "READY_TRUE")]
    True,
    #[serde(rename = "READY_FALSE")]
    False,
}

impl fmt::Display for Ready {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unspecified => "READY_UNSPECIFIED",
            Self::True => "READY_TRUE",
            Self::False => "READY_FALSE",
        };
        f.write_str(s)
    }
}

/// Severity of a function result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[default]
    #[serde(rename = "SEVERITY_UNSPECIFIED")]
    Unspecified,
    /// The function failed; the orchestrator stops the pipeline.
    #[serde(rename = "SEVERITY_FATAL")]
    Fatal,
    #[serde(rename = "SEVERITY_WARNING")]
    Warning,
    #[serde(rename = "SEVERITY_NORMAL")]
    Normal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unspecified => "SEVERITY_UNSPECIFIED",
            Self::Fatal => "SEVERITY_FATAL",
            Self::Warning => "SEVERITY_WARNING",
            Self::Normal => "SEVERITY_NORMAL",
        };
        f.write_str(s)
    }
}

/// A message a function reports alongside its desired state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionResult {
    pub severity: Severity,
    pub message: String,
}

impl FunctionResult {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn normal(message: impl Into<String>) -> Self {
        Self::new(Severity::Normal, message)
    }
}
