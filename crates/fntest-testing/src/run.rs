//! Building a test case from options and running the function under test.

use fntest_types::{
    FunctionError, FunctionRunner, RequestMeta, ResponseMeta, RunFunctionRequest,
    RunFunctionResponse,
};
use tracing::debug;

use crate::compare::{compare_response, Mismatch};
use crate::config::HarnessConfig;
use crate::error::TestResult;

/// An option that populates the request or the expected response.
pub type TestFunctionOpt = Box<dyn FnOnce(&mut FunctionTest) -> TestResult<()> + Send>;

/// A single function test: the request to send and the outcome to expect.
#[derive(Clone, Debug)]
pub struct FunctionTest {
    pub(crate) config: HarnessConfig,
    pub(crate) req: RunFunctionRequest,
    pub(crate) expected: RunFunctionResponse,
    pub(crate) expected_err: Option<FunctionError>,
}

impl Default for FunctionTest {
    fn default() -> Self {
        Self::with_config(HarnessConfig::default())
    }
}

impl FunctionTest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an empty test case. Request and expected response carry the
    /// configured tag.
    pub fn with_config(config: HarnessConfig) -> Self {
        let req = RunFunctionRequest {
            meta: RequestMeta {
                tag: config.request_tag.clone(),
            },
            ..Default::default()
        };
        let expected = RunFunctionResponse {
            meta: ResponseMeta {
                tag: config.request_tag.clone(),
                ttl_seconds: None,
            },
            ..Default::default()
        };
        Self {
            config,
            req,
            expected,
            expected_err: None,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn request(&self) -> &RunFunctionRequest {
        &self.req
    }

    pub fn expected_response(&self) -> &RunFunctionResponse {
        &self.expected
    }

    pub fn expected_error(&self) -> Option<&FunctionError> {
        self.expected_err.as_ref()
    }

    /// Apply options in order. Stops at the first failing option.
    pub fn apply(&mut self, opts: impl IntoIterator<Item = TestFunctionOpt>) -> TestResult<()> {
        for (i, opt) in opts.into_iter().enumerate() {
            opt(self)?;
            debug!(option = i, "applied test option");
        }
        Ok(())
    }

    /// Run the function once and compare its output with the expectation.
    pub async fn run<R: FunctionRunner + ?Sized>(&self, runner: &R) -> Outcome {
        let (response, error) = self.generate_response(runner).await;
        let mismatches = compare_response(
            &self.expected,
            self.expected_err.as_ref(),
            &response,
            error.as_ref(),
        );
        debug!(mismatches = mismatches.len(), "compared function response");
        Outcome {
            response,
            error,
            mismatches,
        }
    }

    async fn generate_response<R: FunctionRunner + ?Sized>(
        &self,
        runner: &R,
    ) -> (RunFunctionResponse, Option<FunctionError>) {
        debug!(
            tag = %self.req.meta.tag,
            observed = self.req.observed.resources.len(),
            "running function"
        );
        match runner.run_function(self.req.clone()).await {
            Ok(response) => (response, None),
            Err(err) => {
                debug!(error = %err, "function returned an error");
                (RunFunctionResponse::default(), Some(err))
            }
        }
    }
}

/// What a function run produced and how it differed from the expectation.
#[derive(Clone, Debug)]
pub struct Outcome {
    pub response: RunFunctionResponse,
    pub error: Option<FunctionError>,
    pub mismatches: Vec<Mismatch>,
}

impl Outcome {
    /// Returns `true` if the response matched the expectation.
    pub fn is_success(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// All mismatches, one block each.
    pub fn report(&self) -> String {
        self.mismatches
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Run `runner` with the given options and panic with a diff of every
/// mismatch between expected and actual output.
pub async fn test_function<R: FunctionRunner + ?Sized>(runner: &R, opts: Vec<TestFunctionOpt>) {
    test_function_with_config(runner, HarnessConfig::default(), opts).await
}

/// Same as [`test_function`] with a custom configuration.
pub async fn test_function_with_config<R: FunctionRunner + ?Sized>(
    runner: &R,
    config: HarnessConfig,
    opts: Vec<TestFunctionOpt>,
) {
    let mut tc = FunctionTest::with_config(config);
    if let Err(e) = tc.apply(opts) {
        panic!("cannot apply test options: {e}");
    }
    let outcome = tc.run(runner).await;
    if !outcome.is_success() {
        panic!("function output does not match expectation:\n{}", outcome.report());
    }
}

/// Run `runner` with the given options and return its response without
/// comparing it. Panics if an option fails or the function returns an error.
pub async fn test_function_get_result<R: FunctionRunner + ?Sized>(
    runner: &R,
    opts: Vec<TestFunctionOpt>,
) -> RunFunctionResponse {
    test_function_get_result_with_config(runner, HarnessConfig::default(), opts).await
}

/// Same as [`test_function_get_result`] with a custom configuration.
pub async fn test_function_get_result_with_config<R: FunctionRunner + ?Sized>(
    runner: &R,
    config: HarnessConfig,
    opts: Vec<TestFunctionOpt>,
) -> RunFunctionResponse {
    let mut tc = FunctionTest::with_config(config);
    if let Err(e) = tc.apply(opts) {
        panic!("cannot generate response: {e}");
    }
    match tc.generate_response(runner).await {
        (response, None) => response,
        (_, Some(err)) => panic!("cannot generate response: {err}"),
    }
}


#[cfg(test)]
mod tests {
    use super::testutil::*;
    use super::*;
    use crate::args::*;
    use crate::expect::*;
    use crate::modifier::*;
    use fntest_types::{FunctionResult, Ready};

    const XR: &[u8] = br#"
apiVersion: example.org/v1
kind: XStorage
metadata:
  name: storage
spec:
  regions: [eu, us]
"#;

    const BUCKETS: &[u8] = br#"
apiVersion: s3.example.org/v1
kind: Bucket
metadata:
  annotations:
    fn.test/resource-name: bucket-eu
spec:
  forProvider:
    region: eu
---
apiVersion: s3.example.org/v1
kind: Bucket
metadata:
  annotations:
    fn.test/resource-name: bucket-us
spec:
  forProvider:
    region: us
"#;

    fn expected_buckets() -> Vec<TestFunctionOpt> {
        vec![
            expect_desired_composite_yaml(XR, vec![]),
            expect_desired_resources_yaml(BUCKETS, vec![with_ready(Ready::True)]),
            expect_results(vec![FunctionResult::normal("created 2 buckets")]),
        ]
    }

    #[test]
    fn new_test_case_is_empty() {
        let tc = FunctionTest::new();
        assert_eq!(tc.request().meta.tag, "rust-test");
        assert_eq!(tc.expected_response().meta.tag, "rust-test");
        assert!(tc.request().observed.resources.is_empty());
        assert!(tc.request().context.is_empty());
        assert!(tc.expected_response().desired.resources.is_empty());
        assert!(tc.expected_error().is_none());
    }

    #[test]
    fn custom_tag_flows_to_request() {
        let tc = FunctionTest::with_config(HarnessConfig::default().with_request_tag("ci"));
        assert_eq!(tc.request().meta.tag, "ci");
    }

    #[tokio::test]
    async fn matching_output_succeeds() {
        init_tracing();
        let mut opts = vec![with_observed_composite_yaml(XR, vec![])];
        opts.extend(expected_buckets());
        test_function(&BucketPerRegion, opts).await;
    }

    #[tokio::test]
    async fn mismatching_resource_is_reported() {
        let mut tc = FunctionTest::new();
        tc.apply(vec![
            with_observed_composite_yaml(XR, vec![]),
            expect_desired_composite_yaml(XR, vec![]),
            expect_desired_resources_yaml(
                BUCKETS,
                vec![with_manifest_override(b"spec: {forProvider: {region: ap}}".to_vec())],
            ),
            expect_results(vec![FunctionResult::normal("created 2 buckets")]),
        ])
        .unwrap();

        let outcome = tc.run(&BucketPerRegion).await;
        assert!(!outcome.is_success());
        assert_eq!(outcome.mismatches.len(), 1);
        assert_eq!(outcome.mismatches[0].field, "res.Desired.Resources");
        assert!(outcome.report().contains("\"region\": \"ap\""));
    }

    #[tokio::test]
    async fn missing_results_are_reported_with_actual_listing() {
        let mut tc = FunctionTest::new();
        let mut opts = vec![with_observed_composite_yaml(XR, vec![])];
        opts.extend(expected_buckets());
        opts.push(expect_results(vec![]));
        tc.apply(opts).unwrap();

        let outcome = tc.run(&BucketPerRegion).await;
        assert_eq!(outcome.mismatches.len(), 1);
        let mismatch = &outcome.mismatches[0];
        assert_eq!(mismatch.field, "Results");
        assert_eq!(
            mismatch.details,
            vec!["Result 0: SEVERITY_NORMAL: created 2 buckets".to_string()]
        );
    }

    #[tokio::test]
    async fn expected_error_matches() {
        test_function(
            &Failing("boom"),
            vec![expect_error(FunctionError::new("boom"))],
        )
        .await;
    }

    #[tokio::test]
    async fn unexpected_error_is_reported() {
        let tc = FunctionTest::new();
        let outcome = tc.run(&Failing("boom")).await;
        assert_eq!(outcome.error, Some(FunctionError::new("boom")));
        assert_eq!(outcome.mismatches.len(), 1);
        assert_eq!(outcome.mismatches[0].field, "Error");
    }

    #[tokio::test]
    #[should_panic(expected = "res.Desired.Composite")]
    async fn test_function_panics_on_mismatch() {
        test_function(&BucketPerRegion, vec![with_observed_composite_yaml(XR, vec![])]).await;
    }

    #[tokio::test]
    #[should_panic(expected = "cannot apply test options")]
    async fn test_function_panics_on_bad_option() {
        test_function(&Echo, vec![with_input_yaml(b"- not an object".to_vec())]).await;
    }

    #[tokio::test]
    async fn get_result_returns_raw_response() {
        let res = test_function_get_result(
            &BucketPerRegion,
            vec![with_observed_composite_yaml(XR, vec![])],
        )
        .await;
        assert_eq!(res.desired.resources.len(), 2);
        assert!(res.desired.resources.contains_key("bucket-eu"));
        assert_eq!(res.meta.tag, "rust-test");
    }

    #[tokio::test]
    #[should_panic(expected = "cannot generate response: boom")]
    async fn get_result_panics_on_function_error() {
        test_function_get_result(&Failing("boom"), vec![]).await;
    }

    #[tokio::test]
    #[should_panic(expected = "cannot generate response")]
    async fn get_result_panics_on_bad_option() {
        test_function_get_result(&Echo, vec![with_input_yaml(b"- not an object".to_vec())]).await;
    }

    #[tokio::test]
    async fn get_result_with_custom_name_annotation() {
        let config = HarnessConfig::default()
            .with_request_tag("ci")
            .with_name_annotation("example.org/name");
        let res = test_function_get_result_with_config(
            &Echo,
            config,
            vec![with_desired_resources_yaml(
                "kind: Bucket\nmetadata:\n  annotations:\n    example.org/name: bucket\n",
                vec![],
            )],
        )
        .await;
        assert_eq!(res.meta.tag, "ci");
        assert!(res.desired.resources.contains_key("bucket"));
    }

    #[tokio::test]
    async fn shared_runner_works_through_arc() {
        let runner: std::sync::Arc<dyn FunctionRunner> = std::sync::Arc::new(Echo);
        let res = test_function_get_result(
            &runner,
            vec![with_context_value("k", serde_json::json!("v"))],
        )
        .await;
        assert_eq!(res.context.get("k"), Some(&serde_json::json!("v")));
    }
}
