use serde::{Deserialize, Serialize};

use fntest_types::ANNOTATION_KEY_COMPOSITION_RESOURCE_NAME;

use crate::ANNOTATION_KEY_RESOURCE_NAME;

/// Configuration for a function test.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Tag sent in the request meta and expected back in the response meta.
    pub request_tag: String,
    /// Annotation naming a resource in multi-document fixtures. Stripped
    /// from the manifest once read.
    pub name_annotation: String,
    /// Annotation consulted when `name_annotation` is absent. Left in place.
    pub fallback_name_annotation: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            request_tag: "rust-test".into(),
            name_annotation: ANNOTATION_KEY_RESOURCE_NAME.into(),
            fallback_name_annotation: ANNOTATION_KEY_COMPOSITION_RESOURCE_NAME.into(),
        }
    }
}

impl HarnessConfig {
    pub fn with_request_tag(mut self, tag: impl Into<String>) -> Self {
        self.request_tag = tag.into();
        self
    }

    pub fn with_name_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.name_annotation = annotation.into();
        self
    }
}
