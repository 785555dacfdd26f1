//! The seam through which the function under test is invoked.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::{RunFunctionRequest, RunFunctionResponse};

/// Error returned by a function run.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct FunctionError {
    pub message: String,
}

impl FunctionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A composition function that can be run in-process.
#[async_trait]
pub trait FunctionRunner: Send + Sync {
    async fn run_function(
        &self,
        req: RunFunctionRequest,
    ) -> Result<RunFunctionResponse, FunctionError>;
}

#[async_trait]
impl<F: FunctionRunner + ?Sized> FunctionRunner for Arc<F> {
    async fn run_function(
        &self,
        req: RunFunctionRequest,
    ) -> Result<RunFunctionResponse, FunctionError> {
        (**self).run_function(req).await
    }
}

#[async_trait]
impl<F: FunctionRunner + ?Sized> FunctionRunner for Box<F> {
    async fn run_function(
        &self,
        req: RunFunctionRequest,
    ) -> Result<RunFunctionResponse, FunctionError> {
        (**self).run_function(req).await
    }
}
