//! Bundled reqwest collaborators.
//!
//! Thin adapters from [`TransportRequest`] to `reqwest::Client` and
//! `reqwest::blocking::Client`. Multipart parts become a reqwest form, which
//! sets the boundary header. They add a bearer token when one is
//! configured and the request does not already carry `Authorization`.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use super::transport::{
    BlockingBody, BlockingHttpTransport, ByteStream, HttpTransport, RequestBody, TransportRequest,
    TransportResponse,
};
use crate::defaults;
use crate::error::TransportError;

fn apply_bearer(headers: &mut HeaderMap, api_key: Option<&SecretString>) -> Result<(), TransportError> {
    let Some(key) = api_key else {
        return Ok(());
    };
    if headers.contains_key(AUTHORIZATION) {
        return Ok(());
    }
    let mut value = HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))
        .map_err(|e| TransportError::new(format!("Invalid API key format: {e}")))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);
    Ok(())
}

/// Async collaborator over `reqwest::Client`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    api_key: Option<SecretString>,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl ReqwestTransport {
    /// Build a client with the default connect timeout.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(defaults::http::CONNECT_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client))
    }

    /// Reuse an existing `reqwest::Client` (proxies, custom TLS, pooling).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse<ByteStream>, TransportError> {
        let mut headers = request.headers;
        apply_bearer(&mut headers, self.api_key.as_ref())?;

        let mut builder = self.client.request(request.method, &request.url);
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder.body(bytes),
            RequestBody::Multipart(parts) => builder.multipart(parts.into_form()?),
        };
        builder = builder.headers(headers);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body: ByteStream = Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(TransportError::from)),
        );
        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}

/// Blocking collaborator over `reqwest::blocking::Client`.
///
/// Must not be created or dropped inside an async runtime.
#[derive(Clone)]
pub struct BlockingReqwestTransport {
    client: reqwest::blocking::Client,
    api_key: Option<SecretString>,
}

impl std::fmt::Debug for BlockingReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingReqwestTransport")
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl BlockingReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(defaults::http::CONNECT_TIMEOUT)
            // Per-request timeouts come from the call; no client-wide cap.
            .timeout(None::<std::time::Duration>)
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self {
            client,
            api_key: None,
        }
    }

    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }
}

impl BlockingHttpTransport for BlockingReqwestTransport {
    fn send(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse<BlockingBody>, TransportError> {
        let mut headers = request.headers;
        apply_bearer(&mut headers, self.api_key.as_ref())?;

        let mut builder = self.client.request(request.method, &request.url);
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(bytes) => builder.body(bytes.to_vec()),
            RequestBody::Multipart(parts) => builder.multipart(parts.into_blocking_form()?),
        };
        builder = builder.headers(headers);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        Ok(TransportResponse {
            status,
            headers,
            body: Box::new(response),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_is_added_unless_authorization_present() {
        let key = SecretString::from("sk-test".to_string());

        let mut headers = HeaderMap::new();
        apply_bearer(&mut headers, Some(&key)).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer sk-test");
        assert!(headers[AUTHORIZATION].is_sensitive());

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        apply_bearer(&mut headers, Some(&key)).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Basic abc");

        let mut headers = HeaderMap::new();
        apply_bearer(&mut headers, None).unwrap();
        assert!(headers.is_empty());
    }

    #[test]
    fn debug_does_not_leak_key() {
        let transport = ReqwestTransport::with_client(reqwest::Client::new())
            .with_api_key(SecretString::from("sk-secret".to_string()));
        let rendered = format!("{transport:?}");
        assert!(!rendered.contains("sk-secret"));
    }
}
