//! The seam between the endpoint wrappers and whatever actually moves bytes.
//!
//! [`EnvironmentApi`](crate::EnvironmentApi) only ever builds a
//! [`RequestDescriptor`] and hands it to a [`RequestExecutor`]; the executor
//! owns transport, auth and error normalization.

use crate::error::ApiResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request payload, tagged with how it goes on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    Json(Value),
    Form(Value),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Path relative to the executor's base URL, already percent-encoded.
    pub url: String,
    pub method: Method,
    pub params: Option<Value>,
    pub data: Option<Body>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            params: None,
            data: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::Delete, url)
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_json(mut self, data: Value) -> Self {
        self.data = Some(Body::Json(data));
        self
    }

    pub fn with_form(mut self, data: Value) -> Self {
        self.data = Some(Body::Form(data));
        self
    }
}

#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Performs the request and yields the decoded JSON response.
    async fn execute(&self, request: RequestDescriptor) -> ApiResult<Value>;

    /// Performs the request and yields the raw response body.
    async fn download(&self, request: RequestDescriptor) -> ApiResult<Vec<u8>>;
}

#[async_trait]
impl<T: RequestExecutor + ?Sized> RequestExecutor for &T {
    async fn execute(&self, request: RequestDescriptor) -> ApiResult<Value> {
        (**self).execute(request).await
    }

    async fn download(&self, request: RequestDescriptor) -> ApiResult<Vec<u8>> {
        (**self).download(request).await
    }
}

#[async_trait]
impl<T: RequestExecutor + ?Sized> RequestExecutor for Arc<T> {
    async fn execute(&self, request: RequestDescriptor) -> ApiResult<Value> {
        (**self).execute(request).await
    }

    async fn download(&self, request: RequestDescriptor) -> ApiResult<Vec<u8>> {
        (**self).download(request).await
    }
}
