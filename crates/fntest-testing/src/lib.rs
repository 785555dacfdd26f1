//! Test harness for composition functions.
//!
//! A test declares the request a function receives and the response it
//! should produce through small composable options, runs the function
//! in-process, and diffs actual against expected output.
//!
//! ```ignore
//! test_function(&MyFunction, vec![
//!     with_observed_composite_yaml(include_bytes!("testdata/xr.yaml"), vec![]),
//!     expect_desired_resources_yaml(include_bytes!("testdata/desired.yaml"), vec![]),
//! ])
//! .await;
//! ```

pub mod args;
pub mod compare;
pub mod config;
pub mod convert;
pub mod error;
pub mod expect;
pub mod modifier;
pub mod run;
pub mod yaml;

pub use args::*;
pub use compare::{compare_response, Mismatch};
pub use config::HarnessConfig;
pub use convert::{desired_composite_as, desired_resource_as};
pub use error::{TestError, TestResult};
pub use expect::*;
pub use modifier::*;
pub use run::{
    test_function, test_function_get_result, test_function_get_result_with_config,
    test_function_with_config, FunctionTest, Outcome, TestFunctionOpt,
};

// Re-export the types test authors need alongside the options.
pub use fntest_types::{
    FunctionError, FunctionResult, FunctionRunner, Ready, Resource, RunFunctionRequest,
    RunFunctionResponse, Severity,
};

/// Annotation naming a resource in test fixtures.
pub const ANNOTATION_KEY_RESOURCE_NAME: &str = "fn.test/resource-name";
