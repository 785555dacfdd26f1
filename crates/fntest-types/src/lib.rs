//! Foundation types for testing composition functions.
//!
//! This crate models the messages a composition function exchanges with the
//! orchestrator, the unstructured object representation used to build and
//! compare manifests, and the [`FunctionRunner`] seam through which a
//! function is invoked in-process.
//!
//! # Key Types
//!
//! - [`RunFunctionRequest`] / [`RunFunctionResponse`] -- One function invocation
//! - [`State`] / [`Resource`] -- Observed or desired composite and composed resources
//! - [`Object`] -- Unstructured manifest with metadata accessors
//! - [`FunctionRunner`] -- Async trait implemented by the function under test

pub mod error;
pub mod message;
pub mod object;
pub mod resource;
pub mod runner;

pub use error::{TypeError, TypeResult};
pub use message::{
    FunctionResult, Ready, RequestMeta, Resource, Resources, ResponseMeta, RunFunctionRequest,
    RunFunctionResponse, Severity, State, Struct,
};
pub use object::{remove_nested_field, GroupVersionKind, Object};
pub use resource::{as_object, as_struct, value_kind};
pub use runner::{FunctionError, FunctionRunner};

/// Context key under which the orchestrator passes the environment.
pub const KEY_ENVIRONMENT: &str = "apiextensions.crossplane.io/environment";

/// Annotation carrying a composed resource's name within its composition.
pub const ANNOTATION_KEY_COMPOSITION_RESOURCE_NAME: &str =
    "crossplane.io/composition-resource-name";

/// Secret type of connection secrets written for composed resources.
pub const CONNECTION_SECRET_TYPE: &str = "connection.crossplane.io/v1alpha1";
