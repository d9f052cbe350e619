//! Pagination over list endpoints.
//!
//! A [`Pager`] fetches pages one after another and hands each one, typed as a
//! [`Page`], to a visitor. The page type decides how the next request is
//! derived:
//!
//! - [`SinglePage`]: the response is complete, there is never a next page.
//! - [`MarkerPage`]: page counter in the `page` query parameter, total in the
//!   `Pagination-Pages` response header.
//! - [`IdMarkerPage`]: the last item's identifier becomes the `marker`
//!   parameter, but only when the request carried a `limit`.
//! - [`LinkedPage`]: the body carries the next URL, possibly after an
//!   envelope has been lifted by [`LinkedExtract::normalize`].
//!
//! Iteration stops when the visitor returns `false`, when a page is empty or
//! when a page has no next reference.

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::debug;
use url::Url;

use crate::client::{RequestOpts, ServiceClient};
use crate::error::{Error, Result};
use crate::query::{query_param, replace_query_param};

/// Response header carrying the total number of pages.
pub const PAGINATION_PAGES_HEADER: &str = "Pagination-Pages";

/// One fetched page: the request URL, the response headers and the decoded body.
#[derive(Debug, Clone)]
pub struct PageResult {
    /// URL the page was fetched from
    pub url: Url,
    /// Response headers
    pub headers: HeaderMap,
    /// Decoded JSON body
    pub body: Value,
}

impl PageResult {
    /// Construct a page result.
    #[must_use]
    pub const fn new(url: Url, headers: HeaderMap, body: Value) -> Self {
        Self { url, headers, body }
    }
}

/// Decodes the list items of a page body.
pub trait Extract {
    /// Item type
    type Item: DeserializeOwned;

    /// Decode the items held by `body`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeError`] when the body does not have the expected shape.
    fn extract(body: &Value) -> Result<Vec<Self::Item>>;
}

/// Extractors for APIs paginated by item identifier.
pub trait MarkerExtract: Extract {
    /// Identifier of an item, used as the next `marker`.
    fn marker(item: &Self::Item) -> String;
}

/// Extractors for APIs that return the next URL in the body.
pub trait LinkedExtract: Extract {
    /// Body key holding the next URL, read after [`LinkedExtract::normalize`].
    const NEXT_KEY: &'static str = "next";

    /// Reshape the raw body before anything else reads it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeError`] if the envelope is malformed.
    fn normalize(body: Value) -> Result<Value> {
        Ok(body)
    }
}

/// A single page of list results.
pub trait Page: Sized {
    /// Item type
    type Item;

    /// Build the page from a fetched result.
    ///
    /// # Errors
    ///
    /// Returns an error if the body cannot be prepared for extraction.
    fn from_result(result: PageResult) -> Result<Self>;

    /// The fetched result this page wraps.
    fn result(&self) -> &PageResult;

    /// Decode the items on this page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeError`] on an unexpected body shape.
    fn items(&self) -> Result<Vec<Self::Item>>;

    /// Whether the page holds no items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecodeError`] on an unexpected body shape.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.items()?.is_empty())
    }

    /// URL of the next page, or `None` when this is the last one.
    ///
    /// # Errors
    ///
    /// Returns an error if the next reference cannot be derived.
    fn next_reference(&self) -> Result<Option<Url>>;
}

/// A page that is always the last.
#[derive(Debug, Clone)]
pub struct SinglePage<E> {
    result: PageResult,
    _extract: PhantomData<fn() -> E>,
}

impl<E: Extract> Page for SinglePage<E> {
    type Item = E::Item;

    fn from_result(result: PageResult) -> Result<Self> {
        Ok(Self {
            result,
            _extract: PhantomData,
        })
    }

    fn result(&self) -> &PageResult {
        &self.result
    }

    fn items(&self) -> Result<Vec<E::Item>> {
        E::extract(&self.result.body)
    }

    fn next_reference(&self) -> Result<Option<Url>> {
        Ok(None)
    }
}

/// A page numbered through the `page` query parameter.
#[derive(Debug, Clone)]
pub struct MarkerPage<E> {
    result: PageResult,
    _extract: PhantomData<fn() -> E>,
}

impl<E> MarkerPage<E> {
    /// Page number of this page, `1` when the request did not name one.
    #[must_use]
    pub fn current_page(&self) -> i64 {
        query_param(&self.result.url, "page")
            .and_then(|page| page.parse().ok())
            .unwrap_or(1)
    }

    /// Total number of pages announced by the server, `-1` when unknown.
    #[must_use]
    pub fn total_pages(&self) -> i64 {
        self.result
            .headers
            .get(PAGINATION_PAGES_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(-1)
    }
}

impl<E: Extract> Page for MarkerPage<E> {
    type Item = E::Item;

    fn from_result(result: PageResult) -> Result<Self> {
        Ok(Self {
            result,
            _extract: PhantomData,
        })
    }

    fn result(&self) -> &PageResult {
        &self.result
    }

    fn items(&self) -> Result<Vec<E::Item>> {
        E::extract(&self.result.body)
    }

    fn next_reference(&self) -> Result<Option<Url>> {
        let current = self.current_page();
        if current >= self.total_pages() {
            return Ok(None);
        }
        let next = (current + 1).to_string();
        Ok(Some(replace_query_param(&self.result.url, "page", &next)))
    }
}

/// A page continued by passing the last item's identifier as `marker`.
#[derive(Debug, Clone)]
pub struct IdMarkerPage<E> {
    result: PageResult,
    _extract: PhantomData<fn() -> E>,
}

impl<E: MarkerExtract> Page for IdMarkerPage<E> {
    type Item = E::Item;

    fn from_result(result: PageResult) -> Result<Self> {
        Ok(Self {
            result,
            _extract: PhantomData,
        })
    }

    fn result(&self) -> &PageResult {
        &self.result
    }

    fn items(&self) -> Result<Vec<E::Item>> {
        E::extract(&self.result.body)
    }

    fn next_reference(&self) -> Result<Option<Url>> {
        if query_param(&self.result.url, "limit").is_none() {
            return Ok(None);
        }
        let items = self.items()?;
        Ok(items
            .last()
            .map(|last| replace_query_param(&self.result.url, "marker", &E::marker(last))))
    }
}

/// A page whose body names the next URL.
#[derive(Debug, Clone)]
pub struct LinkedPage<E> {
    result: PageResult,
    _extract: PhantomData<fn() -> E>,
}

impl<E: LinkedExtract> Page for LinkedPage<E> {
    type Item = E::Item;

    fn from_result(result: PageResult) -> Result<Self> {
        let body = E::normalize(result.body)?;
        Ok(Self {
            result: PageResult { body, ..result },
            _extract: PhantomData,
        })
    }

    fn result(&self) -> &PageResult {
        &self.result
    }

    fn items(&self) -> Result<Vec<E::Item>> {
        E::extract(&self.result.body)
    }

    fn next_reference(&self) -> Result<Option<Url>> {
        let Some(next) = self
            .result
            .body
            .get(E::NEXT_KEY)
            .and_then(Value::as_str)
            .filter(|next| !next.is_empty())
        else {
            return Ok(None);
        };
        self.result
            .url
            .join(next)
            .map(Some)
            .map_err(|err| Error::InvalidEndpoint(format!("Invalid next link `{next}`: {err}")))
    }
}

/// Walks a paginated list endpoint.
#[derive(Debug, Clone)]
pub struct Pager<P> {
    client: ServiceClient,
    start: Url,
    headers: HeaderMap,
    _page: PhantomData<fn() -> P>,
}

impl<P: Page> Pager<P> {
    /// Create a pager starting at `start`, which already carries the list query.
    #[must_use]
    pub fn new(client: &ServiceClient, start: Url) -> Self {
        Self {
            client: client.clone(),
            start,
            headers: HeaderMap::new(),
            _page: PhantomData,
        }
    }

    /// Send `headers` with every page request.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// URL of the first page.
    #[must_use]
    pub const fn start_url(&self) -> &Url {
        &self.start
    }

    async fn fetch(&self, url: Url) -> Result<P> {
        let opts = RequestOpts::new(&[StatusCode::OK]).with_headers(self.headers.clone());
        let response = self.client.request(Method::GET, url, opts).await?;
        let body: Value = response.json()?;
        P::from_result(PageResult::new(response.url, response.headers, body))
    }

    /// Visit pages in order until `visit` returns `false`, a page is empty or
    /// there is no next page.
    ///
    /// # Errors
    ///
    /// Returns the first fetch, decode or visitor error; pages already
    /// visited stay visited.
    pub async fn each_page<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(P) -> Result<bool>,
    {
        let mut next = Some(self.start.clone());
        let mut fetched = 0usize;

        while let Some(url) = next.take() {
            let page = self.fetch(url).await?;
            fetched += 1;

            let empty = page.is_empty()?;
            let following = page.next_reference()?;
            debug!(
                page = fetched,
                empty,
                next = following.as_ref().map(Url::as_str),
                "fetched page"
            );

            if !visit(page)? || empty {
                break;
            }
            next = following;
        }

        Ok(())
    }

    /// Collect every page.
    ///
    /// # Errors
    ///
    /// See [`Pager::each_page`].
    pub async fn all_pages(&self) -> Result<Vec<P>> {
        let mut pages = Vec::new();
        self.each_page(|page| {
            pages.push(page);
            Ok(true)
        })
        .await?;
        Ok(pages)
    }

    /// Collect the items of every page, in order.
    ///
    /// # Errors
    ///
    /// See [`Pager::each_page`].
    pub async fn all_items(&self) -> Result<Vec<P::Item>> {
        let mut items = Vec::new();
        self.each_page(|page| {
            items.extend(page.items()?);
            Ok(true)
        })
        .await?;
        Ok(items)
    }
}

/// Decode a body that is a bare JSON array.
///
/// # Errors
///
/// Returns [`Error::DecodeError`] if the body is not an array of `T`.
pub fn extract_array<T: DeserializeOwned>(body: &Value) -> Result<Vec<T>> {
    Vec::<T>::deserialize(body).map_err(|err| Error::DecodeError(err.to_string()))
}

/// Decode the value stored under `key` in an object body.
///
/// # Errors
///
/// Returns [`Error::DecodeError`] if the key is absent or the value is not a `T`.
pub fn extract_field<T: DeserializeOwned>(body: &Value, key: &str) -> Result<T> {
    let value = body
        .get(key)
        .ok_or_else(|| Error::DecodeError(format!("missing key `{key}` in response")))?;
    T::deserialize(value).map_err(|err| Error::DecodeError(format!("`{key}`: {err}")))
}

/// Decode the value at a JSON pointer such as `/data/item`.
///
/// # Errors
///
/// Returns [`Error::DecodeError`] if nothing is stored there or the value is not a `T`.
pub fn extract_pointer<T: DeserializeOwned>(body: &Value, pointer: &str) -> Result<T> {
    let value = body
        .pointer(pointer)
        .ok_or_else(|| Error::DecodeError(format!("missing `{pointer}` in response")))?;
    T::deserialize(value).map_err(|err| Error::DecodeError(format!("`{pointer}`: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ServiceClientBuilder;
    use crate::query::url_with_query;
    use crate::types::SapccService;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param as query_matcher};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Thing {
        id: String,
    }

    #[derive(Debug)]
    struct Things;

    impl Extract for Things {
        type Item = Thing;

        fn extract(body: &Value) -> Result<Vec<Thing>> {
            extract_array(body)
        }
    }

    impl MarkerExtract for Things {
        fn marker(item: &Thing) -> String {
            item.id.clone()
        }
    }

    #[derive(Debug)]
    struct EnvelopedThings;

    impl Extract for EnvelopedThings {
        type Item = Thing;

        fn extract(body: &Value) -> Result<Vec<Thing>> {
            extract_field(body, "items")
        }
    }

    impl LinkedExtract for EnvelopedThings {
        fn normalize(mut body: Value) -> Result<Value> {
            let data = body
                .get_mut("data")
                .map(Value::take)
                .ok_or_else(|| Error::DecodeError("missing `data`".to_string()))?;
            Ok(json!({
                "items": data.get("items").cloned().unwrap_or(Value::Null),
                "next": data.get("nextLink").cloned().unwrap_or(Value::Null),
            }))
        }
    }

    fn client(server: &MockServer) -> ServiceClient {
        ServiceClientBuilder::new(SapccService::Arc, server.uri(), Duration::from_secs(5))
            .unwrap()
            .build()
            .unwrap()
    }

    fn result(url: &str, pages: Option<&str>, body: Value) -> PageResult {
        let mut headers = HeaderMap::new();
        if let Some(pages) = pages {
            headers.insert(PAGINATION_PAGES_HEADER, pages.parse().unwrap());
        }
        PageResult::new(Url::parse(url).unwrap(), headers, body)
    }

    #[test]
    fn marker_page_without_header_has_no_next() {
        let page = MarkerPage::<Things>::from_result(result(
            "http://arc.example.com/agents",
            None,
            json!([{"id": "a"}]),
        ))
        .unwrap();
        assert_eq!(page.current_page(), 1);
        assert_eq!(page.total_pages(), -1);
        assert_eq!(page.next_reference().unwrap(), None);
    }

    #[test]
    fn marker_page_advances_page_parameter() {
        let page = MarkerPage::<Things>::from_result(result(
            "http://arc.example.com/agents?page=2&per_page=1",
            Some("3"),
            json!([{"id": "a"}]),
        ))
        .unwrap();
        let next = page.next_reference().unwrap().unwrap();
        assert_eq!(query_param(&next, "page").as_deref(), Some("3"));
        assert_eq!(query_param(&next, "per_page").as_deref(), Some("1"));

        let last = MarkerPage::<Things>::from_result(result(
            "http://arc.example.com/agents?page=3",
            Some("3"),
            json!([{"id": "a"}]),
        ))
        .unwrap();
        assert_eq!(last.next_reference().unwrap(), None);
    }

    #[test]
    fn marker_page_ignores_unparsable_header() {
        let page = MarkerPage::<Things>::from_result(result(
            "http://arc.example.com/agents",
            Some("many"),
            json!([]),
        ))
        .unwrap();
        assert_eq!(page.total_pages(), -1);
        assert!(page.is_empty().unwrap());
    }

    #[test]
    fn id_marker_page_requires_limit() {
        let without_limit = IdMarkerPage::<Things>::from_result(result(
            "http://neutron.example.com/v2.0/things",
            None,
            json!([{"id": "a"}, {"id": "b"}]),
        ))
        .unwrap();
        assert_eq!(without_limit.next_reference().unwrap(), None);

        let with_limit = IdMarkerPage::<Things>::from_result(result(
            "http://neutron.example.com/v2.0/things?limit=2&marker=x",
            None,
            json!([{"id": "a"}, {"id": "b"}]),
        ))
        .unwrap();
        let next = with_limit.next_reference().unwrap().unwrap();
        assert_eq!(query_param(&next, "marker").as_deref(), Some("b"));
        assert_eq!(query_param(&next, "limit").as_deref(), Some("2"));
    }

    #[test]
    fn linked_page_reads_normalized_next() {
        let page = LinkedPage::<EnvelopedThings>::from_result(result(
            "http://metis.example.com/v1/identity/project",
            None,
            json!({"data": {"items": [{"id": "p1"}], "nextLink": "/v1/identity/project?cursor=abc"}}),
        ))
        .unwrap();
        assert_eq!(page.items().unwrap(), vec![Thing { id: "p1".into() }]);
        let next = page.next_reference().unwrap().unwrap();
        assert_eq!(
            next.as_str(),
            "http://metis.example.com/v1/identity/project?cursor=abc"
        );
    }

    #[test]
    fn single_page_never_continues() {
        let page = SinglePage::<Things>::from_result(result(
            "http://billing.example.com/masterdata/projects",
            Some("9"),
            json!([{"id": "a"}]),
        ))
        .unwrap();
        assert_eq!(page.next_reference().unwrap(), None);
        assert_eq!(page.items().unwrap().len(), 1);
    }

    #[test]
    fn extract_helpers_report_missing_keys() {
        let body = json!({"data": {"item": {"id": "z"}}});
        let thing: Thing = extract_pointer(&body, "/data/item").unwrap();
        assert_eq!(thing.id, "z");

        let err = extract_field::<Thing>(&body, "item").unwrap_err();
        assert!(matches!(err, Error::DecodeError(_)));
        let err = extract_pointer::<Thing>(&body, "/data/items").unwrap_err();
        assert!(matches!(err, Error::DecodeError(_)));
    }

    #[tokio::test]
    async fn marker_pager_visits_announced_pages() {
        let server = MockServer::start().await;
        for page in 1..=3 {
            Mock::given(method("GET"))
                .and(path("/agents"))
                .and(query_matcher("page", page.to_string()))
                .respond_with(
                    ResponseTemplate::new(200)
                        .insert_header(PAGINATION_PAGES_HEADER, "3")
                        .set_body_json(json!([{"id": format!("agent-{page}")}])),
                )
                .expect(2)
                .mount(&server)
                .await;
        }

        let client = client(&server);
        let start = url_with_query(
            client.endpoint("agents").unwrap(),
            &[("page", "1".to_string()), ("per_page", "1".to_string())],
        );
        let pager = Pager::<MarkerPage<Things>>::new(&client, start);

        let mut visited = 0;
        pager
            .each_page(|_| {
                visited += 1;
                Ok(true)
            })
            .await
            .unwrap();
        assert_eq!(visited, 3);

        let ids: Vec<String> = pager
            .all_items()
            .await
            .unwrap()
            .into_iter()
            .map(|thing| thing.id)
            .collect();
        assert_eq!(ids, vec!["agent-1", "agent-2", "agent-3"]);
    }

    #[tokio::test]
    async fn marker_pager_without_header_visits_one_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "j1"}])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let pager = Pager::<MarkerPage<Things>>::new(&client, client.endpoint("jobs").unwrap());
        let pages = pager.all_pages().await.unwrap();
        assert_eq!(pages.len(), 1);
    }

    #[tokio::test]
    async fn visitor_can_stop_early() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/agents"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(PAGINATION_PAGES_HEADER, "5")
                    .set_body_json(json!([{"id": "a"}])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let pager = Pager::<MarkerPage<Things>>::new(&client, client.endpoint("agents").unwrap());
        let mut visited = 0;
        pager
            .each_page(|_| {
                visited += 1;
                Ok(false)
            })
            .await
            .unwrap();
        assert_eq!(visited, 1);
    }

    #[tokio::test]
    async fn visitor_error_aborts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/agents"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header(PAGINATION_PAGES_HEADER, "5")
                    .set_body_json(json!([{"id": "a"}])),
            )
            .mount(&server)
            .await;

        let client = client(&server);
        let pager = Pager::<MarkerPage<Things>>::new(&client, client.endpoint("agents").unwrap());
        let err = pager
            .each_page(|_| Err(Error::InvalidInput("stop".to_string())))
            .await
            .unwrap_err();
        assert_eq!(err, Error::InvalidInput("stop".to_string()));
    }

    #[tokio::test]
    async fn linked_pager_follows_chain_and_stops_on_empty_page() {
        let server = MockServer::start().await;
        let base = server.uri();
        Mock::given(method("GET"))
            .and(path("/v1/items"))
            .and(query_matcher("cursor", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"items": [], "nextLink": format!("{base}/v1/items?cursor=3")}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/items"))
            .and(query_matcher("cursor", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"items": [{"id": "b"}], "nextLink": "/v1/items?cursor=2"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/items"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"items": [{"id": "a"}], "nextLink": "/v1/items?cursor=1"}
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let pager = Pager::<LinkedPage<EnvelopedThings>>::new(&client, client.endpoint("v1/items").unwrap());

        let pages = pager.all_pages().await.unwrap();
        assert_eq!(pages.len(), 3);
        let items = pager.all_items().await.unwrap();
        assert_eq!(
            items,
            vec![Thing { id: "a".into() }, Thing { id: "b".into() }]
        );
    }

    #[tokio::test]
    async fn failed_page_fetch_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/agents"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client(&server);
        let pager = Pager::<MarkerPage<Things>>::new(&client, client.endpoint("agents").unwrap());
        let err = pager.all_pages().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }
}
