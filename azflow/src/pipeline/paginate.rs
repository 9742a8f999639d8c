//! Paginated fetch stage: a listing endpoint turned into a stream.

use super::or_done::send_or_done;
use super::stream::{channel, ItemStream};
use crate::context::RunContext;
use crate::errors::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

/// One page of listing results plus the cursor to the next page.
///
/// Decodes both the Graph envelope (`@odata.nextLink`) and the Resource
/// Manager envelope (`nextLink`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Page<T> {
    /// Items in server order.
    #[serde(rename = "value", default = "Vec::new")]
    pub items: Vec<T>,
    /// Continuation cursor; absent or empty on the last page.
    #[serde(rename = "@odata.nextLink", alias = "nextLink", default)]
    pub next_link: Option<String>,
}

impl<T> Page<T> {
    /// Creates a page.
    #[must_use]
    pub fn new(items: Vec<T>, next_link: Option<String>) -> Self {
        Self { items, next_link }
    }

    /// Creates the final page of a listing.
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, None)
    }

    /// Returns the cursor to follow, treating `""` as absent.
    #[must_use]
    pub fn cursor(&self) -> Option<&str> {
        self.next_link.as_deref().filter(|link| !link.is_empty())
    }
}

/// A listing endpoint that can be read page by page.
///
/// `next_page` receives the cursor from the previous page verbatim; the
/// cursor already encodes the original query, so implementations must not
/// re-apply filters to it.
#[async_trait]
pub trait PageSource<T>: Send + Sync + 'static {
    /// Fetches the first page using the caller's query parameters.
    async fn first_page(&self) -> Result<Page<T>>;

    /// Fetches the page behind `cursor`.
    async fn next_page(&self, cursor: &str) -> Result<Page<T>>;
}

/// Streams every item of a listing, following cursors in order.
///
/// Each item is emitted as `Ok`. The first failed page is emitted as a
/// single `Err` and ends the stream; no later cursor is followed. The run
/// token is checked at every page boundary and raced against the in-flight
/// request, which is dropped (and so aborted) on cancellation.
pub fn paginate<T, S>(ctx: &RunContext, stage: &str, source: S) -> ItemStream<T>
where
    T: Send + 'static,
    S: PageSource<T>,
{
    let (tx, rx) = channel();
    let token = ctx.token().clone();

    ctx.spawn(stage, async move {
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;
        let mut items = 0usize;

        loop {
            let request = async {
                match cursor.as_deref() {
                    None => source.first_page().await,
                    Some(link) => source.next_page(link).await,
                }
            };

            let page = tokio::select! {
                biased;
                () = token.cancelled() => {
                    debug!(pages, items, "listing cancelled");
                    return;
                }
                page = request => page,
            };

            match page {
                Ok(page) => {
                    pages += 1;
                    let next = page.cursor().map(str::to_string);
                    for item in page.items {
                        if !send_or_done(&tx, Ok(item), &token).await {
                            debug!(pages, items, "listing stopped by consumer");
                            return;
                        }
                        items += 1;
                    }
                    match next {
                        Some(link) => cursor = Some(link),
                        None => break,
                    }
                }
                Err(e) => {
                    warn!(error = %e, pages, items, "unable to fetch page, ending listing");
                    send_or_done(&tx, Err(e.shared()), &token).await;
                    return;
                }
            }
        }

        debug!(pages, items, "finished listing");
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AzflowError;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;
    use std::sync::Arc;
    use std::time::Duration;

    /// Serves scripted pages and records every cursor requested.
    #[derive(Clone, Default)]
    struct ScriptedSource {
        pages: Arc<Mutex<VecDeque<Result<Page<u32>>>>>,
        calls: Arc<Mutex<Vec<Option<String>>>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<Page<u32>>>) -> Self {
            Self {
                pages: Arc::new(Mutex::new(pages.into())),
                calls: Arc::default(),
            }
        }

        fn calls(&self) -> Vec<Option<String>> {
            self.calls.lock().clone()
        }

        fn pop(&self) -> Result<Page<u32>> {
            self.pages
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(AzflowError::Structural("no more pages".into())))
        }
    }

    #[async_trait]
    impl PageSource<u32> for ScriptedSource {
        async fn first_page(&self) -> Result<Page<u32>> {
            self.calls.lock().push(None);
            self.pop()
        }

        async fn next_page(&self, cursor: &str) -> Result<Page<u32>> {
            self.calls.lock().push(Some(cursor.to_string()));
            self.pop()
        }
    }

    async fn collect(mut rx: ItemStream<u32>) -> (Vec<u32>, Vec<String>) {
        let (mut items, mut errors) = (Vec::new(), Vec::new());
        while let Some(item) = rx.recv().await {
            match item {
                Ok(v) => items.push(v),
                Err(e) => errors.push(e.to_string()),
            }
        }
        (items, errors)
    }

    fn api_error() -> AzflowError {
        AzflowError::Api {
            status: 503,
            code: "ServiceUnavailable".into(),
            message: "try later".into(),
        }
    }

    #[tokio::test]
    async fn test_assembles_pages_in_cursor_order() {
        let source = ScriptedSource::new(vec![
            Ok(Page::new(vec![1, 2], Some("c1".into()))),
            Ok(Page::new(vec![3], Some("c2".into()))),
            Ok(Page::last(vec![4, 5])),
        ]);
        let ctx = RunContext::new();

        let (items, errors) = collect(paginate(&ctx, "numbers", source.clone())).await;

        assert_eq!(items, vec![1, 2, 3, 4, 5]);
        assert!(errors.is_empty());
        assert_eq!(source.calls(), vec![None, Some("c1".into()), Some("c2".into())]);
    }

    #[tokio::test]
    async fn test_fail_stop_on_page_error() {
        let source = ScriptedSource::new(vec![
            Ok(Page::new(vec![1, 2], Some("c1".into()))),
            Err(api_error()),
            Ok(Page::last(vec![9])),
        ]);
        let ctx = RunContext::new();

        let (items, errors) = collect(paginate(&ctx, "numbers", source.clone())).await;

        assert_eq!(items, vec![1, 2]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("ServiceUnavailable"));
        assert_eq!(source.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_error_on_first_page() {
        let source = ScriptedSource::new(vec![Err(api_error())]);
        let ctx = RunContext::new();

        let (items, errors) = collect(paginate(&ctx, "numbers", source)).await;
        assert!(items.is_empty());
        assert_eq!(errors.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_cursor_ends_listing() {
        let source = ScriptedSource::new(vec![Ok(Page::new(vec![1], Some(String::new())))]);
        let ctx = RunContext::new();

        let (items, _) = collect(paginate(&ctx, "numbers", source.clone())).await;
        assert_eq!(items, vec![1]);
        assert_eq!(source.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_request() {
        struct Hanging;

        #[async_trait]
        impl PageSource<u32> for Hanging {
            async fn first_page(&self) -> Result<Page<u32>> {
                futures::future::pending().await
            }

            async fn next_page(&self, _cursor: &str) -> Result<Page<u32>> {
                futures::future::pending().await
            }
        }

        let ctx = RunContext::new();
        let rx = paginate(&ctx, "hanging", Hanging);
        tokio::time::sleep(Duration::from_millis(10)).await;
        ctx.cancel("test");

        let (items, errors) = tokio::time::timeout(Duration::from_secs(1), collect(rx))
            .await
            .expect("stream should close after cancel");
        assert!(items.is_empty());
        assert!(errors.is_empty());
        tokio::time::timeout(Duration::from_secs(1), ctx.join())
            .await
            .expect("stage should exit");
    }

    #[test]
    fn test_page_decodes_both_envelopes() {
        let graph: Page<u32> =
            serde_json::from_str(r#"{"value":[1,2],"@odata.nextLink":"https://graph/next"}"#).unwrap();
        assert_eq!(graph.cursor(), Some("https://graph/next"));

        let arm: Page<u32> = serde_json::from_str(r#"{"value":[3],"nextLink":"https://arm/next"}"#).unwrap();
        assert_eq!(arm.cursor(), Some("https://arm/next"));

        let last: Page<u32> = serde_json::from_str(r#"{"value":[]}"#).unwrap();
        assert_eq!(last, Page::last(Vec::new()));
    }

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct NoDefault {
        id: String,
    }

    fn decode_page<T: serde::de::DeserializeOwned>(body: &str) -> Page<T> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_page_of_items_without_default() {
        let page: Page<NoDefault> = decode_page(r#"{"value":[{"id":"a"}]}"#);
        assert_eq!(page.items, vec![NoDefault { id: "a".into() }]);

        let empty: Page<NoDefault> = decode_page(r#"{"nextLink":""}"#);
        assert!(empty.items.is_empty());
        assert_eq!(empty.cursor(), None);
    }
}
