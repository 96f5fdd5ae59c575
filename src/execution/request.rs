//! Transport-independent request model.
//!
//! Resource operations describe a call as an [`ApiRequest`]; the execution
//! core turns it into a [`TransportRequest`](super::transport::TransportRequest).

use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;

use crate::error::{ApiError, ErrorContext, Result};
use crate::types::UploadFile;

/// One API call before defaults, encoding and interceptors are applied.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, ids already percent-encoded.
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Per-call headers; highest precedence.
    pub headers: Vec<(String, String)>,
    /// Scalar body fields. `None` for calls without a body.
    pub fields: Option<Map<String, Value>>,
    /// Files to upload; non-empty switches the body to multipart.
    pub files: Vec<UploadFile>,
    /// Extra body fields merged over `fields`.
    pub extra_body: Map<String, Value>,
    pub timeout: Option<Duration>,
    /// Binary content call: `Accept: application/binary`, streamed response.
    pub binary: bool,
    pub context: ErrorContext,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, context: ErrorContext) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            fields: None,
            files: Vec::new(),
            extra_body: Map::new(),
            timeout: None,
            binary: false,
            context,
        }
    }

    pub fn get(path: impl Into<String>, context: ErrorContext) -> Self {
        Self::new(Method::GET, path, context)
    }

    pub fn post(path: impl Into<String>, context: ErrorContext) -> Self {
        Self::new(Method::POST, path, context)
    }

    pub fn delete(path: impl Into<String>, context: ErrorContext) -> Self {
        Self::new(Method::DELETE, path, context)
    }

    /// Serialize `params` into the scalar body fields.
    ///
    /// `params` must serialize to a JSON object.
    pub fn json<P: Serialize>(mut self, params: &P) -> Result<Self> {
        let value = serde_json::to_value(params)
            .map_err(|e| ApiError::invalid_request(self.context.clone(), e.to_string()))?;
        match value {
            Value::Object(map) => {
                self.fields = Some(map);
                Ok(self)
            }
            other => Err(ApiError::invalid_request(
                self.context.clone(),
                format!("request body must be a JSON object, got {other}"),
            )),
        }
    }

    pub fn files(mut self, files: Vec<UploadFile>) -> Self {
        self.files = files;
        self
    }

    pub fn query_pairs(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub fn binary(mut self) -> Self {
        self.binary = true;
        self
    }

    /// Scalar fields with `extra_body` merged over them, or `None` when the
    /// call carries no body at all.
    pub fn merged_fields(&self) -> Option<Map<String, Value>> {
        if self.fields.is_none() && self.extra_body.is_empty() {
            return None;
        }
        let mut merged = self.fields.clone().unwrap_or_default();
        for (key, value) in &self.extra_body {
            merged.insert(key.clone(), value.clone());
        }
        Some(merged)
    }
}

/// Reject an empty identifier before anything is sent.
pub fn require_id(operation: &'static str, param: &'static str, value: &str) -> Result<()> {
    if value.is_empty() {
        Err(ApiError::invalid_argument(operation, param))
    } else {
        Ok(())
    }
}
