//! HTTP transport abstraction.
//!
//! The client never talks to the network itself: it hands a fully built
//! [`TransportRequest`] to an injectable collaborator and reads back a status,
//! headers and a body. TLS, pooling, authentication and retries all belong to
//! the collaborator.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use reqwest::Method;
use reqwest::header::HeaderMap;
use std::io::Read;
use std::pin::Pin;
use std::time::Duration;

use super::multipart::MultipartBody;
use crate::error::TransportError;

/// Lazily produced response body of the async transport.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Response body of the blocking transport.
pub type BlockingBody = Box<dyn Read + Send>;

/// Body of an outgoing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    #[default]
    Empty,
    /// Encoded JSON; `Content-Type` is already set.
    Json(Bytes),
    /// Form parts; the transport encodes them and sets the boundary.
    Multipart(MultipartBody),
}

impl RequestBody {
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Json(bytes) => bytes.len(),
            Self::Multipart(parts) => parts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Json(bytes) => bytes.is_empty(),
            Self::Multipart(parts) => parts.is_empty(),
        }
    }

    pub fn is_multipart(&self) -> bool {
        matches!(self, Self::Multipart(_))
    }

    /// JSON bytes, if this is a JSON body.
    pub fn as_json(&self) -> Option<&Bytes> {
        match self {
            Self::Json(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_multipart(&self) -> Option<&MultipartBody> {
        match self {
            Self::Multipart(parts) => Some(parts),
            _ => None,
        }
    }
}

/// Transport-level request data: URL, headers and JSON are already encoded.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    /// Absolute URL with the query string applied.
    pub url: String,
    pub headers: HeaderMap,
    pub body: RequestBody,
    pub timeout: Option<Duration>,
}

/// Transport-level response data.
pub struct TransportResponse<B> {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: B,
}

impl<B> std::fmt::Debug for TransportResponse<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Async HTTP collaborator.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse<ByteStream>, TransportError>;
}

/// Blocking HTTP collaborator; `send` runs on the calling thread.
pub trait BlockingHttpTransport: Send + Sync {
    fn send(
        &self,
        request: TransportRequest,
    ) -> Result<TransportResponse<BlockingBody>, TransportError>;
}

/// Wrap an in-memory body as a `ByteStream` of one chunk.
pub fn once_stream(body: impl Into<Bytes>) -> ByteStream {
    let body = body.into();
    if body.is_empty() {
        Box::pin(futures::stream::empty())
    } else {
        Box::pin(futures::stream::once(async move { Ok(body) }))
    }
}

/// Drain a `ByteStream` into memory.
pub(crate) async fn collect_stream(mut body: ByteStream) -> Result<Bytes, TransportError> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = body.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf.freeze())
}

/// Drain a blocking body into memory.
pub(crate) fn collect_blocking(mut body: BlockingBody) -> Result<Bytes, TransportError> {
    let mut buf = Vec::new();
    body.read_to_end(&mut buf)?;
    Ok(Bytes::from(buf))
}
