//! Blocking facade.
//!
//! Same resources and semantics as [`Client`](crate::Client); every call runs
//! to completion on the calling thread through a [`BlockingHttpTransport`].
//!
//! ```rust,ignore
//! let client = ClientBuilder::new().api_key("sk-...").build_blocking()?;
//! for skill in client.skills().list(ListParams::new().limit(20)) {
//!     println!("{}", skill?.name);
//! }
//! ```

use bytes::Bytes;
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::builder::ClientBuilder;
use crate::error::{ApiError, ErrorContext, Result};
use crate::execution::call::PendingCall;
use crate::execution::core::{ClientCore, PreparedRequest, is_success};
use crate::execution::interceptor::RequestContext;
use crate::execution::request::ApiRequest;
use crate::execution::transport::{
    BlockingBody, BlockingHttpTransport, TransportResponse, collect_blocking,
};
use crate::pagination::list::page_request;
use crate::pagination::{CursorItem, CursorPage, ListCall, PageIter, PagesIter};
use crate::resources::{ContentCall, Skills};
use crate::response::{Envelope, Projection, RawResponse, StreamedResponse};
use crate::types::{ClientConfig, ListParams};
use crate::utils::cancel::CancelHandle;

struct BlockingInner {
    core: ClientCore,
    transport: Arc<dyn BlockingHttpTransport>,
}

/// Blocking Skills API client. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct BlockingClient {
    inner: Arc<BlockingInner>,
}

impl std::fmt::Debug for BlockingClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingClient")
            .field("core", &self.inner.core)
            .finish()
    }
}

impl BlockingClient {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build_blocking()
    }

    pub fn from_env() -> Result<Self> {
        ClientBuilder::from_env().build_blocking()
    }

    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn BlockingHttpTransport>,
    ) -> Result<Self> {
        ClientBuilder::new()
            .config(config)
            .with_blocking_transport(transport)
            .build_blocking()
    }

    pub(crate) fn from_parts(core: ClientCore, transport: Arc<dyn BlockingHttpTransport>) -> Self {
        Self {
            inner: Arc::new(BlockingInner { core, transport }),
        }
    }

    pub fn core(&self) -> &ClientCore {
        &self.inner.core
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.core.config()
    }

    pub fn skills(&self) -> Skills<BlockingClient> {
        Skills::new(self.clone())
    }

    fn dispatch(
        &self,
        request: ApiRequest,
        cancel: Option<&CancelHandle>,
    ) -> Result<(RequestContext, TransportResponse<BlockingBody>)> {
        let context = request.context.clone();
        if cancel.is_some_and(CancelHandle::is_cancelled) {
            return Err(ApiError::cancelled(context));
        }
        let core = self.core();
        let PreparedRequest { ctx, request } = core.prepare(request)?;

        let response = self
            .inner
            .transport
            .send(request)
            .map_err(|err| core.fail(&ctx, ApiError::transport(context.clone(), err)))?;
        core.observe(&ctx, response.status, &response.headers);
        if is_success(response.status) {
            return Ok((ctx, response));
        }

        let TransportResponse {
            status,
            headers,
            body,
        } = response;
        let body = collect_blocking(body).unwrap_or_default();
        Err(core.fail(&ctx, core.classify(context, status, &headers, &body)))
    }

    fn read_body(
        &self,
        ctx: &RequestContext,
        context: &ErrorContext,
        body: BlockingBody,
        cancel: Option<&CancelHandle>,
    ) -> Result<Bytes> {
        if cancel.is_some_and(CancelHandle::is_cancelled) {
            return Err(self.core().fail(ctx, ApiError::cancelled(context.clone())));
        }
        collect_blocking(body)
            .map_err(|err| self.core().fail(ctx, ApiError::transport(context.clone(), err)))
    }

    fn run_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        cancel: Option<&CancelHandle>,
    ) -> Result<T> {
        let context = request.context.clone();
        let (ctx, response) = self.dispatch(request, cancel)?;
        let body = self.read_body(&ctx, &context, response.body, cancel)?;
        self.core()
            .decode(&context, &body)
            .map_err(|err| self.core().fail(&ctx, err))
    }

    fn run_raw(&self, request: ApiRequest, cancel: Option<&CancelHandle>) -> Result<RawResponse> {
        let context = request.context.clone();
        let (ctx, response) = self.dispatch(request, cancel)?;
        let body = self.read_body(&ctx, &context, response.body, cancel)?;
        Ok(RawResponse::new(response.status, response.headers, body, context))
    }

    fn run_streamed(
        &self,
        request: ApiRequest,
        cancel: Option<CancelHandle>,
    ) -> Result<StreamedResponse<BlockingBody>> {
        let context = request.context.clone();
        let (_, response) = self.dispatch(request, cancel.as_ref())?;
        Ok(StreamedResponse::new(
            response.status,
            response.headers,
            response.body,
            context,
            cancel,
        ))
    }

    pub(crate) fn fetch_page<T: DeserializeOwned>(
        &self,
        template: &ApiRequest,
        params: &ListParams,
        cancel: Option<&CancelHandle>,
    ) -> Result<CursorPage<T>> {
        self.run_json(page_request(template, params), cancel)
    }
}

impl<T> PendingCall<BlockingClient, T> {
    pub fn raw(self) -> Result<RawResponse> {
        let (client, request, cancel, _) = self.into_parts();
        client.run_raw(request?, cancel.as_ref())
    }

    pub fn streaming(self) -> Result<StreamedResponse<BlockingBody>> {
        let (client, request, cancel, _) = self.into_parts();
        client.run_streamed(request?, cancel)
    }
}

impl<T: DeserializeOwned> PendingCall<BlockingClient, T> {
    /// Send the call and decode the response.
    pub fn send(self) -> Result<T> {
        let (client, request, cancel, on_missing) = self.into_parts();
        let result = client.run_json::<T>(request?, cancel.as_ref());
        match (result, on_missing) {
            (Err(err), Some(fallback)) if err.is_not_found() && client.core().acknowledges_missing() => {
                tracing::debug!(
                    target: "skills_client::http",
                    id = %fallback.id,
                    err = %err,
                    "delete target missing; acknowledging"
                );
                Ok((fallback.make)(&fallback.id))
            }
            (result, _) => result,
        }
    }

    pub fn project(self, projection: Projection) -> Result<Envelope<T, BlockingBody>> {
        match projection {
            Projection::Parsed => self.send().map(Envelope::Parsed),
            Projection::Raw => self.raw().map(Envelope::Raw),
            Projection::Streamed => self.streaming().map(Envelope::Streamed),
        }
    }
}

impl<T> ListCall<BlockingClient, T>
where
    T: CursorItem + DeserializeOwned,
{
    pub fn first_page(self) -> Result<CursorPage<T>> {
        self.into_first_call().send()
    }

    pub fn raw(self) -> Result<RawResponse> {
        self.into_first_call().raw()
    }

    pub fn streaming(self) -> Result<StreamedResponse<BlockingBody>> {
        self.into_first_call().streaming()
    }

    /// Whole pages in cursor order.
    pub fn pages(self) -> PagesIter<T> {
        PagesIter::new(self)
    }

    /// Every remaining item; stops at the first error.
    pub fn collect_all(self) -> Result<Vec<T>> {
        self.into_iter().collect()
    }
}

impl<T> IntoIterator for ListCall<BlockingClient, T>
where
    T: CursorItem + DeserializeOwned,
{
    type Item = Result<T>;
    type IntoIter = PageIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        PageIter::new(self)
    }
}

impl ContentCall<BlockingClient> {
    pub fn send(self) -> Result<StreamedResponse<BlockingBody>> {
        self.inner.streaming()
    }
}
