//! Modifiers applied to a [`Resource`] after it is built from a fixture.

use std::collections::BTreeMap;

use serde::Serialize;

use fntest_merge::merge_objects;
use fntest_types::{as_struct, remove_nested_field, Ready, Resource, Struct, TypeResult};

use crate::error::TestResult;
use crate::yaml::from_yaml;

/// Modifies a [`Resource`]. Applied once per resource an option builds, so
/// it may run several times.
pub type ResourceModifier = Box<dyn Fn(&mut Resource) -> TestResult<()> + Send + Sync>;

/// Set the readiness of the resource.
pub fn with_ready(ready: Ready) -> ResourceModifier {
    Box::new(move |res| {
        res.ready = ready;
        Ok(())
    })
}

/// Set the connection details of the resource.
pub fn with_connection_details(details: BTreeMap<String, Vec<u8>>) -> ResourceModifier {
    Box::new(move |res| {
        res.connection_details = details.clone();
        Ok(())
    })
}

/// Remove `apiVersion` and `kind` from the manifest.
pub fn without_api_version_and_kind() -> ResourceModifier {
    Box::new(|res| {
        res.resource.remove("apiVersion");
        res.resource.remove("kind");
        Ok(())
    })
}

/// Merge the YAML document `override_yaml` over the manifest.
pub fn with_manifest_override(override_yaml: impl AsRef<[u8]>) -> ResourceModifier {
    let raw = override_yaml.as_ref().to_vec();
    Box::new(move |res| {
        let overlay: Struct = from_yaml(&raw)?;
        overwrite_manifest(res, &overlay);
        Ok(())
    })
}

/// Merge a serializable object over the manifest.
pub fn with_manifest_override_object<T: Serialize + ?Sized>(overlay: &T) -> ResourceModifier {
    let overlay: TypeResult<Struct> = as_struct(overlay);
    Box::new(move |res| {
        let overlay = overlay.clone()?;
        overwrite_manifest(res, &overlay);
        Ok(())
    })
}

/// Remove the field at `path` from the manifest.
pub fn delete_nested_field_path(path: &[&str]) -> ResourceModifier {
    let path: Vec<String> = path.iter().map(|s| s.to_string()).collect();
    Box::new(move |res| {
        let fields: Vec<&str> = path.iter().map(String::as_str).collect();
        remove_nested_field(&mut res.resource, &fields);
        Ok(())
    })
}

fn overwrite_manifest(res: &mut Resource, overlay: &Struct) {
    res.resource = merge_objects(&res.resource, overlay);
}

pub(crate) fn apply_modifiers(res: &mut Resource, mods: &[ResourceModifier]) -> TestResult<()> {
    mods.iter().try_for_each(|m| m(res))
}

/// Build a resource from a manifest and apply `mods` to it.
pub(crate) fn resource_with(manifest: Struct, mods: &[ResourceModifier]) -> TestResult<Resource> {
    let mut res = Resource::new(manifest);
    apply_modifiers(&mut res, mods)?;
    Ok(res)
}
