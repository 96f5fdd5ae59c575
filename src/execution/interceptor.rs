//! HTTP Interceptor interfaces
//!
//! Interceptors observe and tweak outgoing requests, observe responses and are
//! notified of errors. Both facades run the same interceptor chain, in
//! registration order. The hooks are best-effort and should avoid expensive
//! work.

use reqwest::header::HeaderMap;

use super::transport::TransportRequest;
use crate::error::{ApiError, Result};

/// Context passed to interceptors describing the request.
#[derive(Clone, Debug)]
pub struct RequestContext {
    /// Client-generated id, unique per call.
    pub request_id: String,
    pub operation: &'static str,
    pub resource: Option<String>,
    pub method: String,
    pub url: String,
    /// Binary content call with a streamed response.
    pub stream: bool,
}

/// HTTP interceptor trait
pub trait HttpInterceptor: Send + Sync {
    /// Called before sending a request. Interceptors may add headers or
    /// otherwise modify the request; an error short-circuits the call.
    fn on_before_send(&self, _ctx: &RequestContext, _request: &mut TransportRequest) -> Result<()> {
        Ok(())
    }

    /// Called when response headers arrive, for every status.
    fn on_response(&self, _ctx: &RequestContext, _status: u16, _headers: &HeaderMap) {}

    /// Called when the call fails after it was prepared.
    fn on_error(&self, _ctx: &RequestContext, _error: &ApiError) {}
}

/// A simple logging interceptor backed by `tracing` (no sensitive data).
#[derive(Clone, Debug, Default)]
pub struct LoggingInterceptor;

impl HttpInterceptor for LoggingInterceptor {
    fn on_before_send(&self, ctx: &RequestContext, request: &mut TransportRequest) -> Result<()> {
        tracing::debug!(
            target: "skills_client::http",
            request_id = %ctx.request_id,
            operation = ctx.operation,
            method = %ctx.method,
            url = %ctx.url,
            stream = ctx.stream,
            body_len = request.body.len(),
            "sending request"
        );
        Ok(())
    }

    fn on_response(&self, ctx: &RequestContext, status: u16, _headers: &HeaderMap) {
        tracing::debug!(
            target: "skills_client::http",
            request_id = %ctx.request_id,
            operation = ctx.operation,
            status,
            "response received"
        );
    }

    fn on_error(&self, ctx: &RequestContext, error: &ApiError) {
        tracing::debug!(
            target: "skills_client::http",
            request_id = %ctx.request_id,
            operation = ctx.operation,
            url = %ctx.url,
            err = %error,
            "request error"
        );
    }
}
