//! Options that describe the response the function should produce.

use serde::Serialize;
use tracing::debug;

use fntest_merge::merge_objects;
use fntest_types::{as_struct, FunctionError, FunctionResult, Object, Struct, TypeResult};

use crate::args::named_objects;
use crate::modifier::{resource_with, ResourceModifier};
use crate::run::TestFunctionOpt;
use crate::yaml::{from_json, from_yaml};

// ---- Desired composite ----

/// Expect `o` as the desired composite.
pub fn expect_desired_composite_object<T: Serialize + ?Sized>(
    o: &T,
    mods: Vec<ResourceModifier>,
) -> TestFunctionOpt {
    let manifest: TypeResult<Struct> = as_struct(o);
    Box::new(move |tc| {
        tc.expected.desired.composite = Some(resource_with(manifest?, &mods)?);
        Ok(())
    })
}

/// Expect the object of a single YAML document as the desired composite.
pub fn expect_desired_composite_yaml(
    raw_yaml: impl AsRef<[u8]>,
    mods: Vec<ResourceModifier>,
) -> TestFunctionOpt {
    let raw = raw_yaml.as_ref().to_vec();
    Box::new(move |tc| {
        let o: Object = from_yaml(&raw)?;
        tc.expected.desired.composite = Some(resource_with(o.into_content(), &mods)?);
        Ok(())
    })
}

/// Expect the object of a JSON document as the desired composite.
pub fn expect_desired_composite_json(
    raw_json: impl AsRef<[u8]>,
    mods: Vec<ResourceModifier>,
) -> TestFunctionOpt {
    let raw = raw_json.as_ref().to_vec();
    Box::new(move |tc| {
        let o: Object = from_json(&raw)?;
        tc.expected.desired.composite = Some(resource_with(o.into_content(), &mods)?);
        Ok(())
    })
}

// ---- Desired resources ----

/// Expect `o` as the desired resource `name`.
pub fn expect_desired_resource_object<T: Serialize + ?Sized>(
    name: impl Into<String>,
    o: &T,
    mods: Vec<ResourceModifier>,
) -> TestFunctionOpt {
    let name = name.into();
    let manifest: TypeResult<Struct> = as_struct(o);
    Box::new(move |tc| {
        let res = resource_with(manifest?, &mods)?;
        tc.expected.desired.resources.insert(name, res);
        Ok(())
    })
}

/// Expect the object of a single YAML document as the desired resource
/// `name`.
pub fn expect_desired_resource_yaml(
    name: impl Into<String>,
    raw_yaml: impl AsRef<[u8]>,
    mods: Vec<ResourceModifier>,
) -> TestFunctionOpt {
    let name = name.into();
    let raw = raw_yaml.as_ref().to_vec();
    Box::new(move |tc| {
        let o: Object = from_yaml(&raw)?;
        let res = resource_with(o.into_content(), &mods)?;
        tc.expected.desired.resources.insert(name, res);
        Ok(())
    })
}

/// Expect the object of a JSON document as the desired resource `name`.
pub fn expect_desired_resource_json(
    name: impl Into<String>,
    raw_json: impl AsRef<[u8]>,
    mods: Vec<ResourceModifier>,
) -> TestFunctionOpt {
    let name = name.into();
    let raw = raw_json.as_ref().to_vec();
    Box::new(move |tc| {
        let o: Object = from_json(&raw)?;
        let res = resource_with(o.into_content(), &mods)?;
        tc.expected.desired.resources.insert(name, res);
        Ok(())
    })
}

/// Expect every object of a multi-document YAML as a desired resource,
/// keyed by its name annotation. `mods` apply to each of them.
pub fn expect_desired_resources_yaml(
    raw_yaml: impl AsRef<[u8]>,
    mods: Vec<ResourceModifier>,
) -> TestFunctionOpt {
    let raw = raw_yaml.as_ref().to_vec();
    Box::new(move |tc| {
        for (name, o) in named_objects(&raw, &tc.config)? {
            let res = resource_with(o.into_content(), &mods)?;
            tc.expected.desired.resources.insert(name, res);
        }
        Ok(())
    })
}

/// Merge the objects of a multi-document YAML over desired resources that
/// are already expected.
///
/// Objects naming a resource that is not expected are ignored. Readiness and
/// connection details of the existing expectation are kept.
pub fn expect_desired_resources_yaml_override(raw_yaml: impl AsRef<[u8]>) -> TestFunctionOpt {
    let raw = raw_yaml.as_ref().to_vec();
    Box::new(move |tc| {
        if tc.expected.desired.resources.is_empty() {
            return Ok(());
        }
        for (name, o) in named_objects(&raw, &tc.config)? {
            let Some(existing) = tc.expected.desired.resources.get_mut(&name) else {
                debug!(name = %name, "override names no expected resource");
                continue;
            };
            existing.resource = merge_objects(&existing.resource, o.content());
        }
        Ok(())
    })
}

/// Stop expecting the desired resources `names`. Unknown names are ignored.
pub fn ignore_desired_resources(names: &[&str]) -> TestFunctionOpt {
    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    Box::new(move |tc| {
        for name in &names {
            tc.expected.desired.resources.remove(name);
        }
        Ok(())
    })
}

// ---- Results and errors ----

/// Expect exactly `results`, in order.
pub fn expect_results(results: Vec<FunctionResult>) -> TestFunctionOpt {
    Box::new(move |tc| {
        tc.expected.results = results;
        Ok(())
    })
}

/// Expect the function to fail with `err`.
pub fn expect_error(err: FunctionError) -> TestFunctionOpt {
    Box::new(move |tc| {
        tc.expected_err = Some(err);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TestError, TestResult};
    use crate::modifier::{with_connection_details, with_manifest_override, with_ready};
    use crate::run::FunctionTest;
    use fntest_types::{Ready, Resource};
    use serde_json::{json, Value};
    use std::collections::BTreeMap;

    fn apply(opts: Vec<TestFunctionOpt>) -> TestResult<FunctionTest> {
        let mut tc = FunctionTest::new();
        tc.apply(opts)?;
        Ok(tc)
    }

    fn manifest(res: &Resource) -> Value {
        Value::Object(res.resource.clone())
    }

    const DESIRED: &str = r#"
apiVersion: s3.example.org/v1
kind: Bucket
metadata:
  annotations:
    fn.test/resource-name: bucket
spec:
  forProvider:
    region: eu
    acl: private
---
apiVersion: iam.example.org/v1
kind: Role
metadata:
  annotations:
    fn.test/resource-name: role
spec:
  forProvider:
    path: /
"#;

    #[test]
    fn composite_from_all_sources() {
        let want = json!({"apiVersion": "example.org/v1", "kind": "XR"});
        for opt in [
            expect_desired_composite_object(&want, vec![]),
            expect_desired_composite_yaml("apiVersion: example.org/v1\nkind: XR\n", vec![]),
            expect_desired_composite_json(want.to_string(), vec![]),
        ] {
            let tc = apply(vec![opt]).unwrap();
            let composite = tc.expected_response().desired.composite.as_ref().unwrap();
            assert_eq!(manifest(composite), want);
        }
    }

    #[test]
    fn composite_modifiers_apply() {
        let tc = apply(vec![expect_desired_composite_yaml(
            "kind: XR\nstatus: {ready: false}\n",
            vec![with_ready(Ready::True), with_manifest_override("status: {ready: true}")],
        )])
        .unwrap();
        let composite = tc.expected_response().desired.composite.as_ref().unwrap();
        assert_eq!(composite.ready, Ready::True);
        assert_eq!(manifest(composite)["status"]["ready"], json!(true));
    }

    #[test]
    fn single_resources_by_name() {
        let tc = apply(vec![
            expect_desired_resource_object("a", &json!({"kind": "A"}), vec![]),
            expect_desired_resource_yaml("b", "kind: B", vec![with_ready(Ready::False)]),
            expect_desired_resource_json("c", r#"{"kind": "C"}"#, vec![]),
        ])
        .unwrap();
        let resources = &tc.expected_response().desired.resources;
        assert_eq!(resources.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(resources["b"].ready, Ready::False);
        assert_eq!(manifest(&resources["c"]), json!({"kind": "C"}));
    }

    #[test]
    fn resource_object_must_be_an_object() {
        let err = apply(vec![expect_desired_resource_object("a", "text", vec![])]).unwrap_err();
        assert!(matches!(err, TestError::Types(_)));
    }

    #[test]
    fn resources_keyed_by_annotation() {
        let tc = apply(vec![expect_desired_resources_yaml(
            DESIRED,
            vec![with_ready(Ready::True)],
        )])
        .unwrap();
        let resources = &tc.expected_response().desired.resources;
        assert_eq!(resources.len(), 2);
        assert!(resources.values().all(|r| r.ready == Ready::True));
        assert_eq!(
            manifest(&resources["bucket"])["metadata"],
            json!({"annotations": {}})
        );
    }

    #[test]
    fn override_merges_into_expected_resources() {
        let details = BTreeMap::from([("user".to_string(), b"admin".to_vec())]);
        let tc = apply(vec![
            expect_desired_resources_yaml(
                DESIRED,
                vec![
                    with_ready(Ready::True),
                    with_connection_details(details.clone()),
                ],
            ),
            expect_desired_resources_yaml_override(
                r#"
metadata:
  annotations:
    fn.test/resource-name: bucket
spec:
  forProvider:
    region: us
---
kind: Cache
metadata:
  annotations:
    fn.test/resource-name: cache
"#,
            ),
        ])
        .unwrap();

        let resources = &tc.expected_response().desired.resources;
        assert_eq!(resources.len(), 2);
        assert!(!resources.contains_key("cache"));

        let bucket = &resources["bucket"];
        assert_eq!(
            manifest(bucket)["spec"]["forProvider"],
            json!({"region": "us", "acl": "private"})
        );
        assert_eq!(manifest(bucket)["kind"], json!("Bucket"));
        assert_eq!(bucket.ready, Ready::True);
        assert_eq!(bucket.connection_details, details);

        assert_eq!(manifest(&resources["role"])["spec"]["forProvider"]["path"], json!("/"));
    }

    #[test]
    fn override_without_expectation_is_noop() {
        let tc = apply(vec![expect_desired_resources_yaml_override(
            "not: [valid, fixture, because, unnamed]",
        )])
        .unwrap();
        assert!(tc.expected_response().desired.resources.is_empty());
    }

    #[test]
    fn override_requires_name_annotation() {
        let err = apply(vec![
            expect_desired_resources_yaml(DESIRED, vec![]),
            expect_desired_resources_yaml_override("kind: Bucket\n"),
        ])
        .unwrap_err();
        assert!(matches!(err, TestError::MissingNameAnnotation { .. }));
    }

    #[test]
    fn ignore_resources() {
        let tc = apply(vec![
            expect_desired_resources_yaml(DESIRED, vec![]),
            ignore_desired_resources(&["role", "missing"]),
        ])
        .unwrap();
        let resources = &tc.expected_response().desired.resources;
        assert_eq!(resources.keys().collect::<Vec<_>>(), vec!["bucket"]);
    }

    #[test]
    fn results_and_error() {
        let tc = apply(vec![
            expect_results(vec![FunctionResult::warning("slow"), FunctionResult::normal("ok")]),
            expect_error(FunctionError::new("boom")),
        ])
        .unwrap();
        assert_eq!(tc.expected_response().results.len(), 2);
        assert_eq!(tc.expected_response().results[0].message, "slow");
        assert_eq!(tc.expected_error(), Some(&FunctionError::new("boom")));
    }

    #[test]
    fn later_results_replace_earlier() {
        let tc = apply(vec![
            expect_results(vec![FunctionResult::fatal("first")]),
            expect_results(vec![]),
        ])
        .unwrap();
        assert!(tc.expected_response().results.is_empty());
    }
}
