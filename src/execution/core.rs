//! Execution core shared by the async and blocking facades.
//!
//! Everything that does not depend on how bytes move lives here: URL and
//! header assembly, multipart detection, body encoding, the interceptor
//! chain, status classification and decoding. The facades only add the
//! transport call and body reading.

use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use super::interceptor::{HttpInterceptor, RequestContext};
use super::multipart::MultipartBody;
use super::request::ApiRequest;
use super::transport::{RequestBody, TransportRequest};
use crate::defaults;
use crate::error::{ApiError, ErrorContext, Result, classify_http_error};
use crate::types::{ClientConfig, MissingOnDelete};
use crate::utils::url::join_url;

/// A request ready for the transport, with the context interceptors saw.
#[derive(Debug)]
pub struct PreparedRequest {
    pub ctx: RequestContext,
    pub request: TransportRequest,
}

pub struct ClientCore {
    config: ClientConfig,
    default_headers: HeaderMap,
    interceptors: Vec<Arc<dyn HttpInterceptor>>,
}

impl std::fmt::Debug for ClientCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCore")
            .field("base_url", &self.config.base_url)
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

impl ClientCore {
    /// Validate configured headers once so calls cannot fail on them later.
    pub fn new(config: ClientConfig, interceptors: Vec<Arc<dyn HttpInterceptor>>) -> Result<Self> {
        let context = ErrorContext::new("client.build");
        let mut default_headers = HeaderMap::new();
        if let Some(user_agent) = &config.user_agent {
            let value = HeaderValue::from_str(user_agent).map_err(|e| {
                ApiError::invalid_request(context.clone(), format!("Invalid user agent: {e}"))
            })?;
            default_headers.insert(USER_AGENT, value);
        }
        for (name, value) in &config.headers {
            let (name, value) = parse_header(&context, name, value)?;
            default_headers.insert(name, value);
        }
        reqwest::Url::parse(&config.base_url).map_err(|e| {
            ApiError::invalid_request(context, format!("invalid base URL '{}': {e}", config.base_url))
        })?;

        Ok(Self {
            config,
            default_headers,
            interceptors,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn acknowledges_missing(&self) -> bool {
        self.config.missing_on_delete == MissingOnDelete::Acknowledge
    }

    /// Build the transport request and run `on_before_send` hooks.
    ///
    /// Header precedence, lowest first: `Accept`, configured headers,
    /// content type, per-call headers. Binary calls always ask for
    /// `application/binary`.
    pub fn prepare(&self, request: ApiRequest) -> Result<PreparedRequest> {
        let context = request.context.clone();

        let mut url = reqwest::Url::parse(&join_url(&self.config.base_url, &request.path))
            .map_err(|e| ApiError::invalid_request(context.clone(), format!("invalid URL: {e}")))?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(defaults::http::ACCEPT_JSON));
        headers.extend(self.default_headers.clone());
        if request.binary {
            headers.insert(ACCEPT, HeaderValue::from_static(defaults::http::ACCEPT_BINARY));
        }

        let fields = request.merged_fields();
        let body = if !request.files.is_empty() {
            RequestBody::Multipart(MultipartBody::new(&fields.unwrap_or_default(), request.files))
        } else if let Some(fields) = fields {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            let encoded = serde_json::to_vec(&Value::Object(fields))
                .map_err(|e| ApiError::invalid_request(context.clone(), e.to_string()))?;
            RequestBody::Json(Bytes::from(encoded))
        } else {
            RequestBody::Empty
        };

        for (name, value) in &request.headers {
            let (name, value) = parse_header(&context, name, value)?;
            headers.insert(name, value);
        }

        let ctx = RequestContext {
            request_id: uuid::Uuid::new_v4().to_string(),
            operation: context.operation,
            resource: context.resource.clone(),
            method: request.method.to_string(),
            url: url.to_string(),
            stream: request.binary,
        };
        let mut outgoing = TransportRequest {
            method: request.method,
            url: url.into(),
            headers,
            body,
            timeout: request.timeout.or(self.config.timeout),
        };

        for interceptor in &self.interceptors {
            if let Err(err) = interceptor.on_before_send(&ctx, &mut outgoing) {
                return Err(self.fail(&ctx, err));
            }
        }

        Ok(PreparedRequest {
            ctx,
            request: outgoing,
        })
    }

    /// Run `on_response` hooks.
    pub fn observe(&self, ctx: &RequestContext, status: u16, headers: &HeaderMap) {
        for interceptor in &self.interceptors {
            interceptor.on_response(ctx, status, headers);
        }
    }

    /// Run `on_error` hooks and hand the error back.
    pub fn fail(&self, ctx: &RequestContext, err: ApiError) -> ApiError {
        for interceptor in &self.interceptors {
            interceptor.on_error(ctx, &err);
        }
        err
    }

    pub fn classify(
        &self,
        context: ErrorContext,
        status: u16,
        headers: &HeaderMap,
        body: &[u8],
    ) -> ApiError {
        classify_http_error(
            context,
            status,
            headers,
            &String::from_utf8_lossy(body),
            self.config.error_body_sample,
        )
    }

    pub fn decode<T: DeserializeOwned>(&self, context: &ErrorContext, body: &[u8]) -> Result<T> {
        decode_json(context, body)
    }
}

pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

pub(crate) fn decode_json<T: DeserializeOwned>(context: &ErrorContext, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| ApiError::decode(context.clone(), e.to_string()))
}

fn parse_header(context: &ErrorContext, name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
        ApiError::invalid_request(context.clone(), format!("Invalid header name '{name}': {e}"))
    })?;
    let header_value = HeaderValue::from_str(value).map_err(|e| {
        ApiError::invalid_request(context.clone(), format!("Invalid header value for '{name}': {e}"))
    })?;
    Ok((header_name, header_value))
}
