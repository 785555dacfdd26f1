//! Options that populate the request passed to the function.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use fntest_merge::merge_objects;
use fntest_types::{
    as_struct, value_kind, GroupVersionKind, Object, Resource, Resources, Struct, TypeResult,
    CONNECTION_SECRET_TYPE, KEY_ENVIRONMENT,
};

use crate::config::HarnessConfig;
use crate::error::{TestError, TestResult};
use crate::modifier::{resource_with, ResourceModifier};
use crate::run::{FunctionTest, TestFunctionOpt};
use crate::yaml::{from_json, from_yaml, objects_from_yaml};

// ---- Context ----

/// Set the context field `key` to `value`.
pub fn with_context_value(key: impl Into<String>, value: impl Serialize) -> TestFunctionOpt {
    let key = key.into();
    let value = serde_json::to_value(value);
    Box::new(move |tc| {
        tc.req.context.insert(key, value?);
        Ok(())
    })
}

/// Set the context field `key` to a value read from a YAML document.
pub fn with_context_value_yaml(key: impl Into<String>, raw_yaml: impl AsRef<[u8]>) -> TestFunctionOpt {
    let key = key.into();
    let raw = raw_yaml.as_ref().to_vec();
    Box::new(move |tc| {
        let value: Value = from_yaml(&raw)?;
        tc.req.context.insert(key, value);
        Ok(())
    })
}

/// Set the context field `key` to a value read from a JSON document.
pub fn with_context_value_json(key: impl Into<String>, raw_json: impl AsRef<[u8]>) -> TestFunctionOpt {
    let key = key.into();
    let raw = raw_json.as_ref().to_vec();
    Box::new(move |tc| {
        let value: Value = from_json(&raw)?;
        tc.req.context.insert(key, value);
        Ok(())
    })
}

// ---- Input ----

/// Set the function input.
pub fn with_input<T: Serialize + ?Sized>(input: &T) -> TestFunctionOpt {
    let input: TypeResult<Struct> = as_struct(input);
    Box::new(move |tc| {
        tc.req.input = Some(input?);
        Ok(())
    })
}

/// Same as [`with_input`] but reads the input from a YAML document.
pub fn with_input_yaml(raw_yaml: impl AsRef<[u8]>) -> TestFunctionOpt {
    let raw = raw_yaml.as_ref().to_vec();
    Box::new(move |tc| {
        let input: Object = from_yaml(&raw)?;
        tc.req.input = Some(input.into_content());
        Ok(())
    })
}

/// Same as [`with_input`] but reads the input from a JSON document.
pub fn with_input_json(raw_json: impl AsRef<[u8]>) -> TestFunctionOpt {
    let raw = raw_json.as_ref().to_vec();
    Box::new(move |tc| {
        let input: Object = from_json(&raw)?;
        tc.req.input = Some(input.into_content());
        Ok(())
    })
}

// ---- Observed resources ----

/// Add `o` to the observed resources under `name`.
pub fn with_observed_resource_object<T: Serialize + ?Sized>(
    name: impl Into<String>,
    o: &T,
) -> TestFunctionOpt {
    let name = name.into();
    let manifest: TypeResult<Struct> = as_struct(o);
    Box::new(move |tc| {
        tc.req
            .observed
            .resources
            .insert(name, Resource::new(manifest?));
        Ok(())
    })
}

/// Read an object from a single YAML document and add it to the observed
/// resources under `name`.
pub fn with_observed_resource_yaml(name: impl Into<String>, raw_yaml: impl AsRef<[u8]>) -> TestFunctionOpt {
    let name = name.into();
    let raw = raw_yaml.as_ref().to_vec();
    Box::new(move |tc| {
        let o: Object = from_yaml(&raw)?;
        tc.req
            .observed
            .resources
            .insert(name, Resource::new(o.into_content()));
        Ok(())
    })
}

/// Read an object from a JSON document and add it to the observed resources
/// under `name`.
pub fn with_observed_resource_json(name: impl Into<String>, raw_json: impl AsRef<[u8]>) -> TestFunctionOpt {
    let name = name.into();
    let raw = raw_json.as_ref().to_vec();
    Box::new(move |tc| {
        let o: Object = from_json(&raw)?;
        tc.req
            .observed
            .resources
            .insert(name, Resource::new(o.into_content()));
        Ok(())
    })
}

/// Read all objects from a multi-document YAML and add them to the observed
/// resources.
///
/// Each object is keyed by its name annotation (see
/// [`get_test_resource_name`]); the test annotation is stripped.
pub fn with_observed_resources_yaml(raw_yaml: impl AsRef<[u8]>) -> TestFunctionOpt {
    let raw = raw_yaml.as_ref().to_vec();
    Box::new(move |tc| {
        for (name, o) in named_objects(&raw, &tc.config)? {
            debug!(name = %name, kind = o.kind(), "observed resource");
            tc.req
                .observed
                .resources
                .insert(name, Resource::new(o.into_content()));
        }
        Ok(())
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionSecret {
    #[serde(default)]
    metadata: SecretMetadata,
    #[serde(default, rename = "type")]
    secret_type: String,
    data: Option<BTreeMap<String, String>>,
    string_data: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
struct SecretMetadata {
    #[serde(default)]
    name: String,
    #[serde(default)]
    annotations: BTreeMap<String, String>,
}

impl ConnectionSecret {
    /// `data` values are base64 encoded; `stringData` is only used when
    /// `data` is absent.
    fn connection_details(&self) -> TestResult<BTreeMap<String, Vec<u8>>> {
        match (&self.data, &self.string_data) {
            (Some(data), _) => data
                .iter()
                .map(|(k, v)| {
                    STANDARD
                        .decode(v.trim())
                        .map(|bytes| (k.clone(), bytes))
                        .map_err(|e| TestError::InvalidBase64 {
                            key: k.clone(),
                            reason: e.to_string(),
                        })
                })
                .collect(),
            (None, Some(string_data)) => Ok(string_data
                .iter()
                .map(|(k, v)| (k.clone(), v.as_bytes().to_vec()))
                .collect()),
            (None, None) => Ok(BTreeMap::new()),
        }
    }
}

/// Read connection secrets from a multi-document YAML and attach their data
/// as connection details of the observed resources they belong to.
///
/// Every secret must be of type `connection.crossplane.io/v1alpha1`, carry
/// the test name annotation, and belong to an already observed resource.
pub fn with_observed_connection_secrets(raw_yaml: impl AsRef<[u8]>) -> TestFunctionOpt {
    let raw = raw_yaml.as_ref().to_vec();
    Box::new(move |tc| {
        let secrets: Vec<ConnectionSecret> = objects_from_yaml(&raw)?;
        for secret in secrets {
            if secret.secret_type != CONNECTION_SECRET_TYPE {
                return Err(TestError::NotConnectionSecret {
                    name: secret.metadata.name,
                    secret_type: secret.secret_type,
                });
            }
            let key = match secret.metadata.annotations.get(&tc.config.name_annotation) {
                Some(key) if !key.is_empty() => key.clone(),
                _ => {
                    return Err(TestError::MissingNameAnnotation {
                        gvk: GroupVersionKind::new("", "v1", "Secret").to_string(),
                        name: secret.metadata.name,
                    })
                }
            };
            let details = secret.connection_details()?;
            let parent = tc
                .req
                .observed
                .resources
                .get_mut(&key)
                .ok_or_else(|| TestError::ParentNotObserved(key.clone()))?;
            debug!(name = %key, keys = details.len(), "observed connection details");
            parent.connection_details = details;
        }
        Ok(())
    })
}

/// Set the observed composite to `o`.
pub fn with_observed_composite_object<T: Serialize + ?Sized>(
    o: &T,
    mods: Vec<ResourceModifier>,
) -> TestFunctionOpt {
    let manifest: TypeResult<Struct> = as_struct(o);
    Box::new(move |tc| {
        tc.req.observed.composite = Some(resource_with(manifest?, &mods)?);
        Ok(())
    })
}

/// Read an object from a single YAML document and set it as the observed
/// composite.
pub fn with_observed_composite_yaml(
    raw_yaml: impl AsRef<[u8]>,
    mods: Vec<ResourceModifier>,
) -> TestFunctionOpt {
    let raw = raw_yaml.as_ref().to_vec();
    Box::new(move |tc| {
        let o: Object = from_yaml(&raw)?;
        tc.req.observed.composite = Some(resource_with(o.into_content(), &mods)?);
        Ok(())
    })
}

/// Read an object from a JSON document and set it as the observed composite.
pub fn with_observed_composite_json(
    raw_json: impl AsRef<[u8]>,
    mods: Vec<ResourceModifier>,
) -> TestFunctionOpt {
    let raw = raw_json.as_ref().to_vec();
    Box::new(move |tc| {
        let o: Object = from_json(&raw)?;
        tc.req.observed.composite = Some(resource_with(o.into_content(), &mods)?);
        Ok(())
    })
}

// ---- Desired state from earlier pipeline steps ----

/// Read an object from a single YAML document and pass it as the desired
/// composite produced by earlier functions.
pub fn with_desired_composite_yaml(
    raw_yaml: impl AsRef<[u8]>,
    mods: Vec<ResourceModifier>,
) -> TestFunctionOpt {
    let raw = raw_yaml.as_ref().to_vec();
    Box::new(move |tc| {
        let o: Object = from_yaml(&raw)?;
        tc.req.desired.composite = Some(resource_with(o.into_content(), &mods)?);
        Ok(())
    })
}

/// Read all objects from a multi-document YAML and pass them as desired
/// resources produced by earlier functions, keyed by name annotation.
pub fn with_desired_resources_yaml(
    raw_yaml: impl AsRef<[u8]>,
    mods: Vec<ResourceModifier>,
) -> TestFunctionOpt {
    let raw = raw_yaml.as_ref().to_vec();
    Box::new(move |tc| {
        for (name, o) in named_objects(&raw, &tc.config)? {
            let res = resource_with(o.into_content(), &mods)?;
            tc.req.desired.resources.insert(name, res);
        }
        Ok(())
    })
}

/// Read all objects from a multi-document YAML and pass them as the extra
/// resources satisfying the request `key`.
pub fn with_extra_resources_yaml(key: impl Into<String>, raw_yaml: impl AsRef<[u8]>) -> TestFunctionOpt {
    let key = key.into();
    let raw = raw_yaml.as_ref().to_vec();
    Box::new(move |tc| {
        let objects: Vec<Object> = objects_from_yaml(&raw)?;
        let items = objects
            .into_iter()
            .map(|o| Resource::new(o.into_content()))
            .collect();
        tc.req.extra_resources.insert(key, Resources { items });
        Ok(())
    })
}

// ---- Environment ----

fn environment_gvk() -> GroupVersionKind {
    GroupVersionKind::new("internal.crossplane.io", "v1alpha1", "Environment")
}

/// Merge the `data` of each EnvironmentConfig, in order, onto `env`.
/// Configs without object `data` are skipped.
fn merge_environment_configs(env: Struct, configs: &[Object]) -> Struct {
    configs.iter().fold(env, |env, config| match config.content().get("data") {
        Some(Value::Object(data)) => merge_objects(&env, data),
        Some(other) => {
            warn!(
                config = config.name(),
                data = value_kind(other),
                "skipping EnvironmentConfig with non-object data"
            );
            env
        }
        None => {
            debug!(config = config.name(), "skipping EnvironmentConfig without data");
            env
        }
    })
}

fn set_environment(tc: &mut FunctionTest, env: Struct) {
    let mut env = Object::from_struct(env);
    env.set_group_version_kind(&environment_gvk());
    tc.req
        .context
        .insert(KEY_ENVIRONMENT.into(), Value::Object(env.into_content()));
}

/// Build an environment from the EnvironmentConfigs of a multi-document YAML
/// and pass it in the request context.
///
/// Later configs take precedence; nested objects are merged.
pub fn with_environment_from_configs_yaml(raw_yaml: impl AsRef<[u8]>) -> TestFunctionOpt {
    let raw = raw_yaml.as_ref().to_vec();
    Box::new(move |tc| {
        let configs: Vec<Object> = objects_from_yaml(&raw)?;
        let env = merge_environment_configs(Struct::new(), &configs);
        set_environment(tc, env);
        Ok(())
    })
}

/// Same as [`with_environment_from_configs_yaml`] for several YAML files,
/// merged in the order given.
pub fn with_environment_from_configs_yaml_multiple<I, B>(raw_yamls: I) -> TestFunctionOpt
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let raws: Vec<Vec<u8>> = raw_yamls.into_iter().map(|r| r.as_ref().to_vec()).collect();
    Box::new(move |tc| {
        let mut env = Struct::new();
        for (index, raw) in raws.iter().enumerate() {
            let configs: Vec<Object> = objects_from_yaml(raw).map_err(|e| TestError::File {
                index,
                source: Box::new(e),
            })?;
            env = merge_environment_configs(env, &configs);
        }
        set_environment(tc, env);
        Ok(())
    })
}

// ---- Naming ----

/// The name under which `o` is stored: its test name annotation, falling
/// back to the composition resource name annotation. Empty if neither is
/// set.
pub fn get_test_resource_name(o: &Object, config: &HarnessConfig) -> String {
    o.annotation(&config.name_annotation)
        .or_else(|| o.annotation(&config.fallback_name_annotation))
        .unwrap_or_default()
        .to_string()
}

/// Read all objects of a multi-document YAML paired with their name. The
/// test name annotation is removed from each object.
pub(crate) fn named_objects(raw: &[u8], config: &HarnessConfig) -> TestResult<Vec<(String, Object)>> {
    objects_from_yaml::<Object>(raw)?
        .into_iter()
        .map(|mut o| {
            let name = get_test_resource_name(&o, config);
            if name.is_empty() {
                return Err(TestError::MissingNameAnnotation {
                    gvk: o.group_version_kind().to_string(),
                    name: o.name().to_string(),
                });
            }
            o.remove_annotation(&config.name_annotation);
            Ok((name, o))
        })
        .collect()
}
