//! Lazy page sequences.
//!
//! [`Pager`] (async) and [`PageIter`] (blocking) yield items across pages,
//! fetching the next page only when the buffered one is drained. Both walk
//! the same [`PageState`] machine:
//!
//! - pages are fetched one at a time, strictly in cursor order;
//! - a failed fetch yields its error once, then the sequence is exhausted;
//! - a triggered cancel handle yields `Cancelled` once, then nothing.

use futures::Stream;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;

use super::cursor::{CursorItem, CursorPage};
use super::list::ListCall;
use crate::blocking::BlockingClient;
use crate::client::Client;
use crate::error::{ApiError, ErrorContext, Result};
use crate::execution::request::ApiRequest;
use crate::types::ListParams;
use crate::utils::cancel::CancelHandle;

pub(crate) enum Step<T> {
    Item(T),
    Fetch(ListParams),
    Done,
}

/// Buffered page, next request and exhaustion flag.
pub(crate) struct PageState<T> {
    buffer: VecDeque<T>,
    next: Option<ListParams>,
    exhausted: bool,
    pages: usize,
}

impl<T: CursorItem> PageState<T> {
    pub(crate) fn new(first: ListParams) -> Self {
        Self {
            buffer: VecDeque::new(),
            next: Some(first),
            exhausted: false,
            pages: 0,
        }
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub(crate) fn step(&mut self) -> Step<T> {
        if self.exhausted {
            return Step::Done;
        }
        if let Some(item) = self.buffer.pop_front() {
            return Step::Item(item);
        }
        match self.next.take() {
            Some(params) => Step::Fetch(params),
            None => {
                self.exhausted = true;
                Step::Done
            }
        }
    }

    pub(crate) fn absorb(&mut self, page: CursorPage<T>, sent: &ListParams) {
        self.pages += 1;
        self.next = page.next_page_params(sent);
        tracing::debug!(
            target: "skills_client::pagination",
            page = self.pages,
            items = page.data.len(),
            has_more = page.has_more,
            "page fetched"
        );
        self.buffer.extend(page.data);
    }

    pub(crate) fn finish(&mut self) {
        self.exhausted = true;
        self.next = None;
        self.buffer.clear();
    }
}

struct Traversal {
    template: Option<ApiRequest>,
    pending_error: Option<ApiError>,
    cancel: Option<CancelHandle>,
}

impl Traversal {
    fn new(request: Result<ApiRequest>, cancel: Option<CancelHandle>) -> Self {
        match request {
            Ok(template) => Self {
                template: Some(template),
                pending_error: None,
                cancel,
            },
            Err(err) => Self {
                template: None,
                pending_error: Some(err),
                cancel,
            },
        }
    }

    fn cancelled(&self) -> Option<ApiError> {
        if !self.cancel.as_ref().is_some_and(CancelHandle::is_cancelled) {
            return None;
        }
        let context = self
            .template
            .as_ref()
            .map(|t| t.context.clone())
            .unwrap_or_else(|| ErrorContext::new("list"));
        Some(ApiError::cancelled(context))
    }
}

/// Async item sequence over a list call.
pub struct Pager<T> {
    client: Client,
    traversal: Traversal,
    state: PageState<T>,
}

impl<T> Pager<T>
where
    T: CursorItem + DeserializeOwned + Send + 'static,
{
    pub(crate) fn new(call: ListCall<Client, T>) -> Self {
        Self {
            client: call.client,
            traversal: Traversal::new(call.request, call.cancel),
            state: PageState::new(call.params),
        }
    }

    /// Next item, fetching the following page when the buffer is drained.
    pub async fn next(&mut self) -> Option<Result<T>> {
        if let Some(err) = self.traversal.pending_error.take() {
            self.state.finish();
            return Some(Err(err));
        }
        loop {
            if self.state.is_exhausted() {
                return None;
            }
            if let Some(err) = self.traversal.cancelled() {
                self.state.finish();
                return Some(Err(err));
            }
            match self.state.step() {
                Step::Item(item) => return Some(Ok(item)),
                Step::Done => return None,
                Step::Fetch(params) => {
                    let template = self.traversal.template.as_ref()?;
                    let fetched = self
                        .client
                        .fetch_page::<T>(template, &params, self.traversal.cancel.as_ref())
                        .await;
                    match fetched {
                        Ok(page) => self.state.absorb(page, &params),
                        Err(err) => {
                            self.state.finish();
                            return Some(Err(err));
                        }
                    }
                }
            }
        }
    }

    /// Collect the remaining items, stopping at the first error.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await {
            items.push(item?);
        }
        Ok(items)
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<T>> + Send {
        futures::stream::unfold(self, |mut pager| async move {
            pager.next().await.map(|item| (item, pager))
        })
    }
}

/// Blocking item iterator over a list call.
pub struct PageIter<T> {
    client: BlockingClient,
    traversal: Traversal,
    state: PageState<T>,
}

impl<T> PageIter<T>
where
    T: CursorItem + DeserializeOwned,
{
    pub(crate) fn new(call: ListCall<BlockingClient, T>) -> Self {
        Self {
            client: call.client,
            traversal: Traversal::new(call.request, call.cancel),
            state: PageState::new(call.params),
        }
    }
}

impl<T> Iterator for PageIter<T>
where
    T: CursorItem + DeserializeOwned,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.traversal.pending_error.take() {
            self.state.finish();
            return Some(Err(err));
        }
        loop {
            if self.state.is_exhausted() {
                return None;
            }
            if let Some(err) = self.traversal.cancelled() {
                self.state.finish();
                return Some(Err(err));
            }
            match self.state.step() {
                Step::Item(item) => return Some(Ok(item)),
                Step::Done => return None,
                Step::Fetch(params) => {
                    let template = self.traversal.template.as_ref()?;
                    let fetched = self.client.fetch_page::<T>(
                        template,
                        &params,
                        self.traversal.cancel.as_ref(),
                    );
                    match fetched {
                        Ok(page) => self.state.absorb(page, &params),
                        Err(err) => {
                            self.state.finish();
                            return Some(Err(err));
                        }
                    }
                }
            }
        }
    }
}

/// Blocking iterator over whole pages.
pub struct PagesIter<T> {
    client: BlockingClient,
    traversal: Traversal,
    next: Option<ListParams>,
    _item: std::marker::PhantomData<fn() -> T>,
}

impl<T> PagesIter<T> {
    pub(crate) fn new(call: ListCall<BlockingClient, T>) -> Self {
        Self {
            client: call.client,
            traversal: Traversal::new(call.request, call.cancel),
            next: Some(call.params),
            _item: std::marker::PhantomData,
        }
    }
}

impl<T> Iterator for PagesIter<T>
where
    T: CursorItem + DeserializeOwned,
{
    type Item = Result<CursorPage<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.traversal.pending_error.take() {
            self.next = None;
            return Some(Err(err));
        }
        let params = self.next.take()?;
        if let Some(err) = self.traversal.cancelled() {
            return Some(Err(err));
        }
        let template = self.traversal.template.as_ref()?;
        match self
            .client
            .fetch_page::<T>(template, &params, self.traversal.cancel.as_ref())
        {
            Ok(page) => {
                self.next = page.next_page_params(&params);
                Some(Ok(page))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

/// Async stream over whole pages.
pub(crate) fn page_stream<T>(
    call: ListCall<Client, T>,
) -> impl Stream<Item = Result<CursorPage<T>>> + Send
where
    T: CursorItem + DeserializeOwned + Send + 'static,
{
    let client = call.client;
    let mut traversal = Traversal::new(call.request, call.cancel);
    let first = call.params;
    async_stream::stream! {
        if let Some(err) = traversal.pending_error.take() {
            yield Err(err);
        } else if let Some(template) = traversal.template.clone() {
            let mut next = Some(first);
            while let Some(params) = next.take() {
                if let Some(err) = traversal.cancelled() {
                    yield Err(err);
                    break;
                }
                match client.fetch_page::<T>(&template, &params, traversal.cancel.as_ref()).await {
                    Ok(page) => {
                        next = page.next_page_params(&params);
                        yield Ok(page);
                    }
                    Err(err) => {
                        yield Err(err);
                        break;
                    }
                }
            }
        }
    }
}
