//! Deferred list calls.

use std::marker::PhantomData;
use std::time::Duration;

use super::cursor::CursorPage;
use crate::error::Result;
use crate::execution::call::PendingCall;
use crate::execution::request::ApiRequest;
use crate::types::ListParams;
use crate::utils::cancel::CancelHandle;

/// A list operation waiting to be consumed.
///
/// Consume it item by item (`pager()` / `into_stream()` on the async facade,
/// `into_iter()` on the blocking one), page by page (`pages()`), or fetch
/// only the first page (`first_page()`, `raw()`, `streaming()`). Per-call
/// headers, query parameters and timeouts apply to every page.
#[must_use = "list calls do nothing until consumed"]
pub struct ListCall<C, T> {
    pub(crate) client: C,
    pub(crate) request: Result<ApiRequest>,
    pub(crate) params: ListParams,
    pub(crate) cancel: Option<CancelHandle>,
    _item: PhantomData<fn() -> T>,
}

impl<C, T> ListCall<C, T> {
    pub(crate) fn new(client: C, request: Result<ApiRequest>, params: ListParams) -> Self {
        Self {
            client,
            request,
            params,
            cancel: None,
            _item: PhantomData,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Ok(request) = &mut self.request {
            request.headers.push((name.into(), value.into()));
        }
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Ok(request) = &mut self.request {
            request.query.push((name.into(), value.into()));
        }
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        if let Ok(request) = &mut self.request {
            request.timeout = Some(timeout);
        }
        self
    }

    /// Abort the traversal through `handle`.
    pub fn with_cancel(mut self, handle: CancelHandle) -> Self {
        self.cancel = Some(handle);
        self
    }

    pub fn params(&self) -> &ListParams {
        &self.params
    }

    /// The first page as a plain call.
    pub fn into_first_call(self) -> PendingCall<C, CursorPage<T>> {
        let request = self
            .request
            .map(|template| page_request(&template, &self.params));
        let call = PendingCall::new(self.client, request);
        match self.cancel {
            Some(handle) => call.with_cancel(handle),
            None => call,
        }
    }
}

/// Concrete request for one page: list parameters first, then per-call
/// query parameters.
pub(crate) fn page_request(template: &ApiRequest, params: &ListParams) -> ApiRequest {
    let mut request = template.clone();
    let mut query = params.to_query();
    query.append(&mut request.query);
    request.query = query;
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorContext;

    #[test]
    fn page_request_puts_list_params_first() {
        let template = ApiRequest::get("/skills", ErrorContext::new("skills.list"))
            .query_pairs(vec![("beta".into(), "1".into())]);
        let request = page_request(&template, &ListParams::new().after("skl_2").limit(1));
        assert_eq!(
            request.query,
            vec![
                ("after".to_string(), "skl_2".to_string()),
                ("limit".to_string(), "1".to_string()),
                ("beta".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn options_apply_to_template() {
        let call: ListCall<(), ()> = ListCall::new(
            (),
            Ok(ApiRequest::get("/skills", ErrorContext::new("skills.list"))),
            ListParams::new().limit(5),
        )
        .header("x-a", "1")
        .timeout(Duration::from_secs(2));

        let first = call.into_first_call();
        let request = first.request().unwrap();
        assert_eq!(request.headers.len(), 1);
        assert_eq!(request.timeout, Some(Duration::from_secs(2)));
        assert_eq!(request.query, vec![("limit".to_string(), "5".to_string())]);
    }
}
