//! Response projections.
//!
//! Every call can be observed three ways: decoded into its model, as the raw
//! status/headers/bytes, or as a lazily read body. Non-2xx statuses are
//! errors in all three.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use std::io::{Read, Write};

use crate::defaults;
use crate::error::{ApiError, ErrorContext, Result};
use crate::execution::core::decode_json;
use crate::execution::transport::{BlockingBody, ByteStream};
use crate::utils::cancel::{CancelHandle, run_cancellable};

/// Which projection a call should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Parsed,
    Raw,
    Streamed,
}

/// Exactly one projection of a response.
#[derive(Debug)]
pub enum Envelope<T, B> {
    Parsed(T),
    Raw(RawResponse),
    Streamed(StreamedResponse<B>),
}

impl<T, B> Envelope<T, B> {
    pub fn projection(&self) -> Projection {
        match self {
            Self::Parsed(_) => Projection::Parsed,
            Self::Raw(_) => Projection::Raw,
            Self::Streamed(_) => Projection::Streamed,
        }
    }

    pub fn into_parsed(self) -> Option<T> {
        match self {
            Self::Parsed(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_raw(self) -> Option<RawResponse> {
        match self {
            Self::Raw(raw) => Some(raw),
            _ => None,
        }
    }

    pub fn into_streamed(self) -> Option<StreamedResponse<B>> {
        match self {
            Self::Streamed(streamed) => Some(streamed),
            _ => None,
        }
    }
}

/// Undecoded response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: u16,
    headers: HeaderMap,
    body: Bytes,
    context: ErrorContext,
}

impl RawResponse {
    pub(crate) fn new(status: u16, headers: HeaderMap, body: Bytes, context: ErrorContext) -> Self {
        Self {
            status,
            headers,
            body,
            context,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Header value as text; `None` when absent or not visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn into_body(self) -> Bytes {
        self.body
    }

    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.to_vec())
            .map_err(|e| ApiError::decode(self.context.clone(), e.to_string()))
    }

    /// Decode the body on demand.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        decode_json(&self.context, &self.body)
    }
}

/// Response whose body is read lazily, chunk by chunk.
///
/// `B` is [`ByteStream`] for the async facade and [`BlockingBody`] for the
/// blocking one.
pub struct StreamedResponse<B> {
    status: u16,
    headers: HeaderMap,
    body: B,
    context: ErrorContext,
    cancel: Option<CancelHandle>,
    done: bool,
}

impl<B> std::fmt::Debug for StreamedResponse<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamedResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl<B> StreamedResponse<B> {
    pub(crate) fn new(
        status: u16,
        headers: HeaderMap,
        body: B,
        context: ErrorContext,
        cancel: Option<CancelHandle>,
    ) -> Self {
        Self {
            status,
            headers,
            body,
            context,
            cancel,
            done: false,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_length(&self) -> Option<u64> {
        self.header("content-length").and_then(|v| v.parse().ok())
    }

    /// The underlying body, bypassing cancellation and error context.
    pub fn into_body(self) -> B {
        self.body
    }
}

impl StreamedResponse<ByteStream> {
    /// Pull the next chunk as delivered by the transport.
    ///
    /// After an error or cancellation the body is finished.
    pub async fn next_chunk(&mut self) -> Option<Result<Bytes>> {
        if self.done {
            return None;
        }
        match run_cancellable(self.cancel.as_ref(), self.body.next()).await {
            None => {
                self.done = true;
                Some(Err(ApiError::cancelled(self.context.clone())))
            }
            Some(None) => {
                self.done = true;
                None
            }
            Some(Some(Ok(chunk))) => Some(Ok(chunk)),
            Some(Some(Err(err))) => {
                self.done = true;
                Some(Err(ApiError::transport(self.context.clone(), err)))
            }
        }
    }

    /// Re-chunk the body so no yielded chunk exceeds `max` bytes.
    pub fn chunks(self, max: usize) -> impl Stream<Item = Result<Bytes>> + Send {
        let max = max.max(1);
        async_stream::stream! {
            let mut this = self;
            while let Some(next) = this.next_chunk().await {
                match next {
                    Ok(mut chunk) => {
                        while !chunk.is_empty() {
                            let take = max.min(chunk.len());
                            yield Ok(chunk.split_to(take));
                        }
                    }
                    Err(err) => {
                        yield Err(err);
                        break;
                    }
                }
            }
        }
    }

    /// The body as a stream of transport-sized chunks.
    pub fn into_stream(self) -> impl Stream<Item = Result<Bytes>> + Send {
        futures::stream::unfold(self, |mut this| async move {
            this.next_chunk().await.map(|chunk| (chunk, this))
        })
    }
}

impl StreamedResponse<BlockingBody> {
    /// Read at most `max` bytes, capped at 64 KiB per call; `Ok(None)` at
    /// end of body.
    pub fn read_chunk(&mut self, max: usize) -> Result<Option<Bytes>> {
        if self.done {
            return Ok(None);
        }
        if self.cancel.as_ref().is_some_and(CancelHandle::is_cancelled) {
            self.done = true;
            return Err(ApiError::cancelled(self.context.clone()));
        }
        let mut buf = vec![0u8; max.clamp(1, defaults::streaming::MAX_READ_CHUNK)];
        loop {
            match self.body.read(&mut buf) {
                Ok(0) => {
                    self.done = true;
                    return Ok(None);
                }
                Ok(n) => {
                    buf.truncate(n);
                    return Ok(Some(Bytes::from(buf)));
                }
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    self.done = true;
                    return Err(ApiError::transport(self.context.clone(), err.into()));
                }
            }
        }
    }

    /// Iterate the body in chunks of at most `max` bytes.
    pub fn chunks(self, max: usize) -> BlockingChunks {
        BlockingChunks { inner: self, max }
    }

    /// Copy the remaining body into `writer`.
    pub fn write_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> std::io::Result<u64> {
        std::io::copy(self, writer)
    }
}

impl Read for StreamedResponse<BlockingBody> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.cancel.as_ref().is_some_and(CancelHandle::is_cancelled) {
            self.done = true;
            return Err(std::io::Error::other(ApiError::cancelled(self.context.clone())));
        }
        if self.done {
            return Ok(0);
        }
        self.body.read(buf)
    }
}

/// Iterator returned by [`StreamedResponse::chunks`] on the blocking facade.
pub struct BlockingChunks {
    inner: StreamedResponse<BlockingBody>,
    max: usize,
}

impl Iterator for BlockingChunks {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.read_chunk(self.max).transpose()
    }
}
