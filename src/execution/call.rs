//! Deferred calls.
//!
//! A resource operation returns a [`PendingCall`] describing one request.
//! Nothing is sent until the caller picks a projection: awaiting it (async),
//! `send()`, `raw()`, `streaming()` or `project()`. Per-call options can be
//! layered on first.

use serde::Serialize;
use std::marker::PhantomData;
use std::time::Duration;

use super::request::ApiRequest;
use crate::error::{ApiError, Result};
use crate::utils::cancel::CancelHandle;

/// Fallback record returned for a 404 when the client acknowledges missing
/// resources on delete.
pub(crate) struct MissingFallback<T> {
    pub id: String,
    pub make: fn(&str) -> T,
}

/// One request waiting for a projection.
///
/// `C` is the facade (`Client` or `BlockingClient`), `T` the parsed model.
/// Validation failures are kept and surfaced when the call is executed, so
/// no transport call happens for an invalid request.
#[must_use = "calls do nothing until sent"]
pub struct PendingCall<C, T> {
    pub(crate) client: C,
    pub(crate) request: Result<ApiRequest>,
    pub(crate) cancel: Option<CancelHandle>,
    pub(crate) on_missing: Option<MissingFallback<T>>,
    _model: PhantomData<fn() -> T>,
}

impl<C, T> PendingCall<C, T> {
    pub(crate) fn new(client: C, request: Result<ApiRequest>) -> Self {
        Self {
            client,
            request,
            cancel: None,
            on_missing: None,
            _model: PhantomData,
        }
    }

    pub(crate) fn or_missing(mut self, id: &str, make: fn(&str) -> T) -> Self {
        self.on_missing = Some(MissingFallback {
            id: id.to_string(),
            make,
        });
        self
    }

    pub(crate) fn into_parts(
        self,
    ) -> (
        C,
        Result<ApiRequest>,
        Option<CancelHandle>,
        Option<MissingFallback<T>>,
    ) {
        (self.client, self.request, self.cancel, self.on_missing)
    }

    fn map_request(mut self, f: impl FnOnce(&mut ApiRequest) -> Result<()>) -> Self {
        if let Ok(request) = &mut self.request {
            if let Err(err) = f(request) {
                self.request = Err(err);
            }
        }
        self
    }

    /// Add a header to this call only; overrides client defaults.
    pub fn header(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.map_request(|r| {
            r.headers.push((name, value));
            Ok(())
        })
    }

    /// Append a query parameter to this call only.
    pub fn query(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.map_request(|r| {
            r.query.push((name, value));
            Ok(())
        })
    }

    /// Add a body field to this call only; overrides typed fields of the same
    /// name. Fields become text parts on multipart uploads.
    pub fn extra_body(self, name: impl Into<String>, value: impl Serialize) -> Self {
        let name = name.into();
        let value = serde_json::to_value(value);
        self.map_request(|r| {
            let value = value.map_err(|e| ApiError::invalid_request(r.context.clone(), e.to_string()))?;
            r.extra_body.insert(name, value);
            Ok(())
        })
    }

    /// Override the client timeout for this call.
    pub fn timeout(self, timeout: Duration) -> Self {
        self.map_request(|r| {
            r.timeout = Some(timeout);
            Ok(())
        })
    }

    /// Abort the call (and any streamed body it yields) through `handle`.
    pub fn with_cancel(mut self, handle: CancelHandle) -> Self {
        self.cancel = Some(handle);
        self
    }

    /// The request this call will send, or the validation error it carries.
    pub fn request(&self) -> std::result::Result<&ApiRequest, &ApiError> {
        self.request.as_ref()
    }
}
