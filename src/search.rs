//! Full-document text search over the lazily built page text index
//!
//! The index itself lives in the page store: each page's text runs are
//! extracted through the decoder at most once per document, the first time
//! the page is rendered or searched. Matching is a case-insensitive
//! substring test against each run; pages come back in ascending index
//! order and runs in their original extraction order.

use std::sync::{Arc, Mutex, PoisonError};

use log::{debug, warn};

use crate::decoder::Document;
use crate::render::{PageStore, TextItem};

/// A search request, kept alongside its lowercase form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchQuery {
    raw: String,
    normalized: String,
}

impl SearchQuery {
    /// Parse user input into a query. Empty or whitespace-only input is
    /// not a query; it signals "clear highlights".
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim().is_empty() {
            return None;
        }
        Some(Self {
            raw: raw.to_string(),
            normalized: raw.to_lowercase(),
        })
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// A page containing at least one matching run, with the matching runs in
/// extraction order
#[derive(Clone, Debug, PartialEq)]
pub struct PageMatch {
    pub page_index: usize,
    pub items: Vec<TextItem>,
}

/// Case-insensitive substring test for one run
#[must_use]
pub fn item_matches(item: &TextItem, normalized: &str) -> bool {
    item.text.to_lowercase().contains(normalized)
}

/// Space-joined text of a whole page, for page-level substring probes
#[must_use]
pub fn page_text(items: &[TextItem]) -> String {
    items
        .iter()
        .map(|item| item.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scan every page for the query, filling missing text indexes on demand.
///
/// Pages whose extraction fails are logged and skipped (unsearchable);
/// no match anywhere yields an empty result, not an error.
pub fn search_document(
    document: &dyn Document,
    store: &Mutex<PageStore>,
    query: &SearchQuery,
) -> Vec<PageMatch> {
    let mut results = Vec::new();

    for page in 0..document.page_count() {
        let Some(items) = ensure_text_items(document, store, page) else {
            continue;
        };

        let matched: Vec<TextItem> = items
            .iter()
            .filter(|item| item_matches(item, query.normalized()))
            .cloned()
            .collect();

        if !matched.is_empty() {
            results.push(PageMatch {
                page_index: page,
                items: matched,
            });
        }
    }

    debug!(
        "search for {:?} matched {} page(s)",
        query.raw(),
        results.len()
    );
    results
}

/// Text runs for a page, extracting and caching them if absent
fn ensure_text_items(
    document: &dyn Document,
    store: &Mutex<PageStore>,
    page: usize,
) -> Option<Arc<Vec<TextItem>>> {
    if let Some(items) = store
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .text_items(page)
    {
        return Some(items);
    }

    match document.extract_text(page) {
        Ok(items) => {
            let mut store = store.lock().unwrap_or_else(PoisonError::into_inner);
            let generation = store.generation();
            store.store_text_items(generation, page, items)
        }
        Err(error) => {
            warn!("text extraction failed for page {page}: {error}");
            None
        }
    }
}
