//! Highlight overlay management
//!
//! The overlay manager turns search results into raster-space rectangles
//! and pushes them onto whatever overlay surface the embedding supplies.
//! Redraw is always clear-then-redraw, never an incremental append, so a
//! re-search or scale change can never leave stale rectangles behind.

use log::{debug, warn};

use crate::decoder::Document;
use crate::render::{HighlightRect, project_run};
use crate::search::PageMatch;

/// Per-page overlay layer supplied by the embedding application.
///
/// Backed by whatever the target environment draws with: a canvas layer,
/// a retained scene graph, a terminal grid.
pub trait OverlaySurface {
    /// Append a highlight rectangle to a page's overlay layer
    fn add_rect(&mut self, page_index: usize, rect: HighlightRect);

    /// Remove every rectangle from a page's overlay layer
    fn clear_page(&mut self, page_index: usize);
}

/// Clear the overlay layer of every page
pub fn clear_highlights(surface: &mut dyn OverlaySurface, page_count: usize) {
    for page in 0..page_count {
        surface.clear_page(page);
    }
}

/// Materialize highlight rectangles for the given matches at `scale`.
///
/// Clears every page first, then projects each matched run through the
/// coordinate transform against its page's scaled viewport. Pages whose
/// geometry cannot be obtained are skipped with a warning. Returns the
/// rectangles that were drawn, in page order.
pub fn draw_highlights(
    surface: &mut dyn OverlaySurface,
    document: &dyn Document,
    scale: f32,
    matches: &[PageMatch],
) -> Vec<HighlightRect> {
    clear_highlights(surface, document.page_count());

    let mut drawn = Vec::new();
    for page_match in matches {
        let page = page_match.page_index;
        let geometry = match document.page_geometry(page, scale) {
            Ok(geometry) => geometry,
            Err(error) => {
                warn!("no geometry for page {page}, skipping highlights: {error}");
                continue;
            }
        };

        for item in &page_match.items {
            let rect = project_run(page, item, scale, geometry.height);
            surface.add_rect(page, rect.clone());
            drawn.push(rect);
        }
    }

    debug!("drew {} highlight rect(s)", drawn.len());
    drawn
}

#[cfg(all(test, feature = "test-utils"))]
mod tests {
    use super::*;
    use crate::decoder::Decoder;
    use crate::render::PageStore;
    use crate::search::{SearchQuery, search_document};
    use crate::test_utils::{FakeDecoder, RecordingOverlay, document_bytes};
    use std::sync::Mutex;

    #[test]
    fn redraw_replaces_previous_rects() {
        let document = FakeDecoder
            .load(&document_bytes(&["apple pie", "apple tart"]))
            .expect("valid fake document");
        let store = Mutex::new(PageStore::new(8));
        let mut overlay = RecordingOverlay::default();

        let query = SearchQuery::parse("apple").expect("query");
        let matches = search_document(document.as_ref(), &store, &query);
        assert_eq!(matches.len(), 2);

        let first = draw_highlights(&mut overlay, document.as_ref(), 1.0, &matches);
        let second = draw_highlights(&mut overlay, document.as_ref(), 1.0, &matches);

        assert_eq!(first, second);
        // Clear-then-redraw: the surface holds one copy, not two.
        assert_eq!(overlay.rects().len(), first.len());
    }

    #[test]
    fn rects_scale_with_the_viewport() {
        let document = FakeDecoder
            .load(&document_bytes(&["needle"]))
            .expect("valid fake document");
        let store = Mutex::new(PageStore::new(8));
        let mut overlay = RecordingOverlay::default();

        let query = SearchQuery::parse("needle").expect("query");
        let matches = search_document(document.as_ref(), &store, &query);

        let at_one = draw_highlights(&mut overlay, document.as_ref(), 1.0, &matches);
        let at_two = draw_highlights(&mut overlay, document.as_ref(), 2.0, &matches);

        assert_eq!(at_one.len(), at_two.len());
        assert!((at_two[0].x - at_one[0].x * 2.0).abs() < 1e-3);
        assert!((at_two[0].width - at_one[0].width * 2.0).abs() < 1e-3);
    }
}
