//! Async facade.
//!
//! ```rust,ignore
//! let client = Client::builder().api_key("sk-...").build()?;
//! let skill = client.skills().retrieve("skl_1").await?;
//!
//! let mut versions = client.skills().versions().list("skl_1", ListParams::new()).pager();
//! while let Some(version) = versions.next().await {
//!     println!("{}", version?.version);
//! }
//! ```
//!
//! The facade suspends only while waiting on the transport and while pulling
//! body chunks. It never spawns tasks.

use bytes::Bytes;
use futures::Stream;
use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use std::future::IntoFuture;
use std::sync::Arc;

use crate::builder::ClientBuilder;
use crate::error::{ApiError, ErrorContext, Result};
use crate::execution::call::PendingCall;
use crate::execution::core::{ClientCore, PreparedRequest, is_success};
use crate::execution::interceptor::RequestContext;
use crate::execution::request::ApiRequest;
use crate::execution::transport::{ByteStream, HttpTransport, TransportResponse, collect_stream};
use crate::pagination::list::page_request;
use crate::pagination::pager::page_stream;
use crate::pagination::{CursorItem, CursorPage, ListCall, Pager};
use crate::resources::{ContentCall, Skills};
use crate::response::{Envelope, Projection, RawResponse, StreamedResponse};
use crate::types::{ClientConfig, ListParams};
use crate::utils::cancel::{CancelHandle, run_cancellable};

struct ClientInner {
    core: ClientCore,
    transport: Arc<dyn HttpTransport>,
}

/// Async Skills API client. Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").field("core", &self.inner.core).finish()
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Client with default configuration and the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build()
    }

    /// Client configured from `SKILLS_*` environment variables.
    pub fn from_env() -> Result<Self> {
        ClientBuilder::from_env().build()
    }

    /// Client over a custom transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Result<Self> {
        ClientBuilder::new()
            .config(config)
            .with_transport(transport)
            .build()
    }

    pub(crate) fn from_parts(core: ClientCore, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            inner: Arc::new(ClientInner { core, transport }),
        }
    }

    pub fn core(&self) -> &ClientCore {
        &self.inner.core
    }

    pub fn config(&self) -> &ClientConfig {
        self.inner.core.config()
    }

    pub fn skills(&self) -> Skills<Client> {
        Skills::new(self.clone())
    }

    /// Send one request; non-2xx statuses become errors.
    async fn dispatch(
        &self,
        request: ApiRequest,
        cancel: Option<&CancelHandle>,
    ) -> Result<(RequestContext, TransportResponse<ByteStream>)> {
        let context = request.context.clone();
        if cancel.is_some_and(CancelHandle::is_cancelled) {
            return Err(ApiError::cancelled(context));
        }
        let core = self.core();
        let PreparedRequest { ctx, request } = core.prepare(request)?;

        let response = match run_cancellable(cancel, self.inner.transport.send(request)).await {
            None => return Err(core.fail(&ctx, ApiError::cancelled(context))),
            Some(Err(err)) => return Err(core.fail(&ctx, ApiError::transport(context, err))),
            Some(Ok(response)) => response,
        };
        core.observe(&ctx, response.status, &response.headers);
        if is_success(response.status) {
            return Ok((ctx, response));
        }

        let TransportResponse {
            status,
            headers,
            body,
        } = response;
        let body = run_cancellable(cancel, collect_stream(body))
            .await
            .and_then(|read| read.ok())
            .unwrap_or_default();
        Err(core.fail(&ctx, core.classify(context, status, &headers, &body)))
    }

    async fn read_body(
        &self,
        ctx: &RequestContext,
        context: &ErrorContext,
        body: ByteStream,
        cancel: Option<&CancelHandle>,
    ) -> Result<Bytes> {
        match run_cancellable(cancel, collect_stream(body)).await {
            None => Err(self.core().fail(ctx, ApiError::cancelled(context.clone()))),
            Some(Err(err)) => Err(self.core().fail(ctx, ApiError::transport(context.clone(), err))),
            Some(Ok(bytes)) => Ok(bytes),
        }
    }

    async fn run_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        cancel: Option<&CancelHandle>,
    ) -> Result<T> {
        let context = request.context.clone();
        let (ctx, response) = self.dispatch(request, cancel).await?;
        let body = self.read_body(&ctx, &context, response.body, cancel).await?;
        self.core()
            .decode(&context, &body)
            .map_err(|err| self.core().fail(&ctx, err))
    }

    async fn run_raw(&self, request: ApiRequest, cancel: Option<&CancelHandle>) -> Result<RawResponse> {
        let context = request.context.clone();
        let (ctx, response) = self.dispatch(request, cancel).await?;
        let body = self.read_body(&ctx, &context, response.body, cancel).await?;
        Ok(RawResponse::new(response.status, response.headers, body, context))
    }

    async fn run_streamed(
        &self,
        request: ApiRequest,
        cancel: Option<CancelHandle>,
    ) -> Result<StreamedResponse<ByteStream>> {
        let context = request.context.clone();
        let (_, response) = self.dispatch(request, cancel.as_ref()).await?;
        Ok(StreamedResponse::new(
            response.status,
            response.headers,
            response.body,
            context,
            cancel,
        ))
    }

    pub(crate) async fn fetch_page<T: DeserializeOwned>(
        &self,
        template: &ApiRequest,
        params: &ListParams,
        cancel: Option<&CancelHandle>,
    ) -> Result<CursorPage<T>> {
        self.run_json(page_request(template, params), cancel).await
    }
}

impl<T> PendingCall<Client, T> {
    /// Undecoded status, headers and body.
    pub async fn raw(self) -> Result<RawResponse> {
        let (client, request, cancel, _) = self.into_parts();
        client.run_raw(request?, cancel.as_ref()).await
    }

    /// Status and headers now, body on demand.
    pub async fn streaming(self) -> Result<StreamedResponse<ByteStream>> {
        let (client, request, cancel, _) = self.into_parts();
        client.run_streamed(request?, cancel).await
    }
}

impl<T> PendingCall<Client, T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Send the call and decode the response.
    pub async fn send(self) -> Result<T> {
        let (client, request, cancel, on_missing) = self.into_parts();
        let result = client.run_json::<T>(request?, cancel.as_ref()).await;
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

    pub async fn project(self, projection: Projection) -> Result<Envelope<T, ByteStream>> {
        match projection {
            Projection::Parsed => self.send().await.map(Envelope::Parsed),
            Projection::Raw => self.raw().await.map(Envelope::Raw),
            Projection::Streamed => self.streaming().await.map(Envelope::Streamed),
        }
    }
}

impl<T> IntoFuture for PendingCall<Client, T>
where
    T: DeserializeOwned + Send + 'static,
{
    type Output = Result<T>;
    type IntoFuture = BoxFuture<'static, Result<T>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}

impl<T> ListCall<Client, T>
where
    T: CursorItem + DeserializeOwned + Send + 'static,
{
    pub async fn first_page(self) -> Result<CursorPage<T>> {
        self.into_first_call().send().await
    }

    /// First page, undecoded.
    pub async fn raw(self) -> Result<RawResponse> {
        self.into_first_call().raw().await
    }

    pub async fn streaming(self) -> Result<StreamedResponse<ByteStream>> {
        self.into_first_call().streaming().await
    }

    /// Item sequence across pages.
    pub fn pager(self) -> Pager<T> {
        Pager::new(self)
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + Send {
        self.pager().into_stream()
    }

    /// Whole pages in cursor order.
    pub fn pages(self) -> impl Stream<Item = Result<CursorPage<T>>> + Send {
        page_stream(self)
    }

    /// Every remaining item; stops at the first error.
    pub async fn collect_all(self) -> Result<Vec<T>> {
        self.pager().collect_all().await
    }
}

impl ContentCall<Client> {
    pub async fn send(self) -> Result<StreamedResponse<ByteStream>> {
        self.inner.streaming().await
    }
}

impl IntoFuture for ContentCall<Client> {
    type Output = Result<StreamedResponse<ByteStream>>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.send())
    }
}
