//! Comparison of an actual function response against the expected one.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use fntest_diff::{diff_values, render_diff, ValueDiff};
use fntest_types::{FunctionError, Ready, RunFunctionResponse};

use crate::convert::{resource_to_object, resources_to_objects, results_to_values};

/// One part of the response that differs from the expectation.
#[derive(Clone, Debug)]
pub struct Mismatch {
    /// Which part of the response differs.
    pub field: &'static str,
    /// `-want +got` line diff.
    pub diff: String,
    /// Field-level changes from want to got.
    pub changes: ValueDiff,
    /// Extra lines appended to the report.
    pub details: Vec<String>,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: -want +got", self.field)?;
        write!(f, "{}", self.diff)?;
        if !self.changes.is_empty() {
            writeln!(f, "changed fields:")?;
            for change in &self.changes.changes {
                writeln!(f, "  {change}")?;
            }
        }
        for line in &self.details {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Compare the desired composite, desired resources, readiness, results and
/// error of a response with the expectation.
pub fn compare_response(
    expected: &RunFunctionResponse,
    expected_err: Option<&FunctionError>,
    actual: &RunFunctionResponse,
    actual_err: Option<&FunctionError>,
) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    mismatches.extend(mismatch(
        "res.Desired.Composite",
        &resource_to_object(expected.desired.composite.as_ref()),
        &resource_to_object(actual.desired.composite.as_ref()),
    ));

    mismatches.extend(mismatch(
        "res.Desired.Resources",
        &resources_to_objects(&expected.desired.resources),
        &resources_to_objects(&actual.desired.resources),
    ));

    // Readiness is only checked where the expectation states it.
    let want_ready: BTreeMap<&str, Ready> = expected
        .desired
        .resources
        .iter()
        .filter(|(_, r)| r.ready != Ready::Unspecified)
        .map(|(name, r)| (name.as_str(), r.ready))
        .collect();
    let got_ready: BTreeMap<&str, Ready> = want_ready
        .keys()
        .map(|name| {
            let ready = actual
                .desired
                .resources
                .get(*name)
                .map(|r| r.ready)
                .unwrap_or_default();
            (*name, ready)
        })
        .collect();
    mismatches.extend(mismatch("res.Desired.Ready", &want_ready, &got_ready));

    if let Some(mut m) = mismatch(
        "Results",
        &results_to_values(&expected.results),
        &results_to_values(&actual.results),
    ) {
        m.details = actual
            .results
            .iter()
            .enumerate()
            .map(|(i, r)| format!("Result {i}: {}: {}", r.severity, r.message))
            .collect();
        mismatches.push(m);
    }

    mismatches.extend(mismatch("Error", &expected_err, &actual_err));

    mismatches
}

fn mismatch<T: Serialize + ?Sized>(field: &'static str, want: &T, got: &T) -> Option<Mismatch> {
    let diff = render_diff(want, got)?;
    let changes = diff_values(&to_value(want), &to_value(got));
    Some(Mismatch {
        field,
        diff,
        changes,
        details: Vec::new(),
    })
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
