//! Pagination walker.
//!
//! Collections arrive in pages linked by `Links["Page.Next"]`. The walker follows the
//! chain until it ends and returns either every item in server order or the first
//! classified error. Partial results are never returned.
//!
//! There is no cycle detection: a server that links a page back to an earlier one
//! keeps the walker fetching.

use serde_json::Value;
use tracing::debug;

use crate::engine::Engine;
use crate::error::Result;

/// Where the walk stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    /// Another page is waiting at the given path.
    HasMore(String),
    /// The last page has been read.
    Done,
}

/// Walks a paged collection.
#[derive(Debug)]
pub struct PageWalker<'a> {
    engine: &'a Engine,
    state: PageState,
    pages: usize,
}

impl<'a> PageWalker<'a> {
    /// Start a walk at `initial_path`.
    #[must_use]
    pub fn new(engine: &'a Engine, initial_path: impl Into<String>) -> Self {
        Self {
            engine,
            state: PageState::HasMore(initial_path.into()),
            pages: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &PageState {
        &self.state
    }

    /// Number of pages fetched so far.
    #[must_use]
    pub const fn pages(&self) -> usize {
        self.pages
    }

    /// Fetch the next page and advance. Returns `None` once the walk is done.
    ///
    /// # Errors
    ///
    /// Returns the classified error of the failed fetch; the state is left unchanged.
    pub async fn step(&mut self) -> Result<Option<Vec<Value>>> {
        let PageState::HasMore(path) = &self.state else {
            return Ok(None);
        };

        let page = self.engine.get_page(path).await?;
        self.pages += 1;
        debug!(path = %path, page = self.pages, items = page.items.len(), "Fetched page");

        self.state = match page.next_page() {
            Some(next) => PageState::HasMore(next.to_string()),
            None => PageState::Done,
        };

        Ok(Some(page.items))
    }

    /// Walk to the end, decoding each item with `decode`.
    ///
    /// # Errors
    ///
    /// Any fetch or decode failure aborts the walk and discards what was gathered.
    pub async fn collect<T, F>(mut self, decode: F) -> Result<Vec<T>>
    where
        F: Fn(Value) -> Result<T>,
    {
        let mut items = Vec::new();

        while let Some(page) = self.step().await? {
            items.reserve(page.len());
            for item in page {
                items.push(decode(item)?);
            }
        }

        debug!(pages = self.pages, items = items.len(), "Walk complete");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{MockTransport, RawResponse};
    use crate::Error;
    use mockall::Sequence;
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    fn page(items: Value, next: Option<&str>) -> RawResponse {
        let mut links = json!({ "Self": "/api/accounts" });
        if let Some(next) = next {
            links["Page.Next"] = json!(next);
        }
        RawResponse::new(
            StatusCode::OK,
            json!({ "Items": items, "Links": links }).to_string(),
        )
    }

    fn expect_page(
        mock: &mut MockTransport,
        seq: &mut Sequence,
        at: &'static str,
        response: RawResponse,
    ) {
        mock.expect_issue()
            .withf(move |_, path, _| path == at)
            .times(1)
            .in_sequence(seq)
            .return_once(move |_, _, _| response);
    }

    fn names(value: Value) -> Result<String> {
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    #[tokio::test]
    async fn empty_collection() {
        let mut mock = MockTransport::new();
        let mut seq = Sequence::new();
        expect_page(&mut mock, &mut seq, "accounts", page(json!([]), None));

        let engine = Engine::new(Arc::new(mock));
        let items = PageWalker::new(&engine, "accounts").collect(names).await.unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn single_page() {
        let mut mock = MockTransport::new();
        let mut seq = Sequence::new();
        expect_page(&mut mock, &mut seq, "accounts", page(json!(["A", "B"]), Some("")));

        let engine = Engine::new(Arc::new(mock));
        let items = PageWalker::new(&engine, "accounts").collect(names).await.unwrap();
        assert_eq!(items, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn two_pages_keep_order() {
        let mut mock = MockTransport::new();
        let mut seq = Sequence::new();
        expect_page(&mut mock, &mut seq, "accounts", page(json!(["A", "B"]), Some("/p2")));
        expect_page(&mut mock, &mut seq, "/p2", page(json!(["C"]), None));

        let engine = Engine::new(Arc::new(mock));
        let items = PageWalker::new(&engine, "accounts").collect(names).await.unwrap();
        assert_eq!(items, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn many_pages_no_drops_or_duplicates() {
        let mut mock = MockTransport::new();
        let mut seq = Sequence::new();
        expect_page(&mut mock, &mut seq, "machines", page(json!(["1", "2"]), Some("/p2")));
        expect_page(&mut mock, &mut seq, "/p2", page(json!(["3"]), Some("/p3")));
        expect_page(&mut mock, &mut seq, "/p3", page(json!([]), Some("/p4")));
        expect_page(&mut mock, &mut seq, "/p4", page(json!(["4", "5"]), None));

        let engine = Engine::new(Arc::new(mock));
        let items = PageWalker::new(&engine, "machines").collect(names).await.unwrap();
        assert_eq!(items, vec!["1", "2", "3", "4", "5"]);
    }

    #[tokio::test]
    async fn mid_walk_failure_discards_accumulated_items() {
        let mut mock = MockTransport::new();
        let mut seq = Sequence::new();
        expect_page(&mut mock, &mut seq, "accounts", page(json!(["A", "B"]), Some("/p2")));
        expect_page(
            &mut mock,
            &mut seq,
            "/p2",
            RawResponse::new(StatusCode::INTERNAL_SERVER_ERROR, ""),
        );

        let engine = Engine::new(Arc::new(mock));
        let err = PageWalker::new(&engine, "accounts")
            .collect(names)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::UnexpectedStatus {
                actual: 500,
                expected: 200,
                path: "/p2".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn decode_failure_aborts_walk() {
        let mut mock = MockTransport::new();
        let mut seq = Sequence::new();
        expect_page(&mut mock, &mut seq, "accounts", page(json!(["A", 7]), None));

        let engine = Engine::new(Arc::new(mock));
        let err = PageWalker::new(&engine, "accounts")
            .collect(|value| {
                value
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| Error::unknown_variant("Name", value.to_string()))
            })
            .await
            .unwrap_err();
        assert_eq!(err, Error::unknown_variant("Name", "7"));
    }

    #[tokio::test]
    async fn step_reports_state() {
        let mut mock = MockTransport::new();
        let mut seq = Sequence::new();
        expect_page(&mut mock, &mut seq, "accounts", page(json!(["A"]), Some("/p2")));
        expect_page(&mut mock, &mut seq, "/p2", page(json!(["B"]), None));

        let engine = Engine::new(Arc::new(mock));
        let mut walker = PageWalker::new(&engine, "accounts");
        assert_eq!(walker.state(), &PageState::HasMore("accounts".to_string()));

        assert_eq!(walker.step().await.unwrap(), Some(vec![json!("A")]));
        assert_eq!(walker.state(), &PageState::HasMore("/p2".to_string()));

        assert_eq!(walker.step().await.unwrap(), Some(vec![json!("B")]));
        assert_eq!(walker.state(), &PageState::Done);
        assert_eq!(walker.pages(), 2);

        assert_eq!(walker.step().await.unwrap(), None);
    }
}
