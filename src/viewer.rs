//! Viewer facade
//!
//! The single entry point the embedding application talks to. Owns the
//! page store, the viewport state, the render worker channel, and the
//! overlay surface; every operation flows through the viewport state
//! machine and the resulting effects are executed here.

use std::io::Read;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use flume::{Receiver, Sender};
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::decoder::{Decoder, Document, LoadError};
use crate::overlay::{self, OverlaySurface};
use crate::render::{
    CachedRaster, Command, DEFAULT_RASTER_CACHE_CAPACITY, Effect, Generation, HighlightRect,
    PageStore, RenderEvent, RenderRequest, RenderRun, ViewportState, render_worker, zoom,
};
use crate::search::{PageMatch, SearchQuery, search_document};
use crate::source::collect_bytes;

/// Tuning knobs for a viewer instance
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Max rendered page rasters kept in memory
    pub raster_cache_capacity: usize,
    /// Scale the viewer starts at (clamped to the supported range)
    pub initial_scale: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            raster_cache_capacity: DEFAULT_RASTER_CACHE_CAPACITY,
            initial_scale: 1.0,
        }
    }
}

/// Read-only view of the viewport for UI binding
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ViewportSnapshot {
    pub scale: f32,
    /// Current page, 1-based; `None` until a document is loaded
    pub current_page: Option<usize>,
    pub total_pages: usize,
    /// Number of pages containing at least one match
    pub match_count: usize,
    /// Indexes (0-based) of the pages containing matches
    pub matched_pages: Vec<usize>,
}

/// A paged document viewer: rendering, search, and highlight state for
/// one document at a time.
///
/// Each instance owns its caches outright and tears them down on drop;
/// nothing is process-global, so multiple viewers can coexist.
pub struct Viewer {
    decoder: Arc<dyn Decoder>,
    overlay: Box<dyn OverlaySurface>,
    store: Arc<Mutex<PageStore>>,
    state: ViewportState,
    document: Option<Arc<dyn Document>>,
    matches: Vec<PageMatch>,
    highlights: Vec<HighlightRect>,
    requests: Sender<RenderRequest>,
    events: Receiver<RenderEvent>,
    /// Generation of the most recently completed render run
    completed: Option<Generation>,
}

impl Viewer {
    /// Create a viewer with default configuration
    #[must_use]
    pub fn new(decoder: Arc<dyn Decoder>, overlay: Box<dyn OverlaySurface>) -> Self {
        Self::with_config(decoder, overlay, ViewerConfig::default())
    }

    /// Create a viewer with custom configuration
    #[must_use]
    pub fn with_config(
        decoder: Arc<dyn Decoder>,
        overlay: Box<dyn OverlaySurface>,
        config: ViewerConfig,
    ) -> Self {
        let store = Arc::new(Mutex::new(PageStore::new(config.raster_cache_capacity)));

        let (request_tx, request_rx) = flume::unbounded();
        let (event_tx, event_rx) = flume::unbounded();

        let worker_store = Arc::clone(&store);
        std::thread::spawn(move || {
            render_worker(request_rx, event_tx, worker_store);
        });

        let state = ViewportState {
            scale: zoom::clamp_scale(config.initial_scale),
            ..ViewportState::default()
        };

        Self {
            decoder,
            overlay,
            store,
            state,
            document: None,
            matches: Vec::new(),
            highlights: Vec::new(),
            requests: request_tx,
            events: event_rx,
            completed: None,
        }
    }

    /// Load a document from a complete byte buffer.
    ///
    /// On failure the previously loaded document (if any) and all of its
    /// state stay in place. On success the old document and everything
    /// derived from it are discarded, the current page resets to 1, the
    /// active query is cleared, and a sequential render run starts.
    pub fn load_from_bytes(&mut self, bytes: &[u8]) -> Result<(), LoadError> {
        let document = match self.decoder.load(bytes) {
            Ok(document) => document,
            Err(e) => {
                error!("document load failed: {e}");
                return Err(e);
            }
        };

        let page_count = document.page_count();
        debug!("loaded document with {page_count} page(s)");
        self.document = Some(document);
        self.apply(Command::DocumentLoaded { page_count });
        Ok(())
    }

    /// Load a document by draining a byte stream to completion first
    pub fn load_from_reader<R: Read>(&mut self, reader: R) -> Result<(), LoadError> {
        let bytes = collect_bytes(reader)?;
        self.load_from_bytes(&bytes)
    }

    /// Set the viewport scale, clamped to the supported range
    pub fn set_scale(&mut self, scale: f32) {
        self.apply(Command::SetScale(scale));
    }

    /// Zoom in by one step
    pub fn zoom_in(&mut self) {
        self.apply(Command::ZoomIn);
    }

    /// Zoom out by one step
    pub fn zoom_out(&mut self) {
        self.apply(Command::ZoomOut);
    }

    /// Go to a page (1-based, clamped to the document)
    pub fn go_to_page(&mut self, page: usize) {
        self.apply(Command::GoToPage(page));
    }

    /// Search the whole document for `text`.
    ///
    /// Matching pages come back in ascending index order with their
    /// matching runs in extraction order; highlights are redrawn and the
    /// view scrolls to the first matching page. An empty or whitespace
    /// query clears all highlights and returns no matches.
    pub fn search(&mut self, text: &str) -> &[PageMatch] {
        match SearchQuery::parse(text) {
            None => {
                self.apply(Command::SetQuery(None));
            }
            Some(query) => {
                let Some(document) = self.document.clone() else {
                    return &self.matches;
                };
                self.matches = search_document(document.as_ref(), &self.store, &query);
                self.apply(Command::SetQuery(Some(query)));
                if let Some(first) = self.matches.first().map(|m| m.page_index) {
                    self.apply(Command::GoToPage(first + 1));
                }
            }
        }
        &self.matches
    }

    /// Pages matched by the last search
    #[must_use]
    pub fn matches(&self) -> &[PageMatch] {
        &self.matches
    }

    /// Highlight rectangles currently materialized on the overlay
    #[must_use]
    pub fn highlights(&self) -> &[HighlightRect] {
        &self.highlights
    }

    /// Cached raster for a page at the current scale, if rendered
    #[must_use]
    pub fn raster(&self, page: usize) -> Option<Arc<CachedRaster>> {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .raster(page, self.state.scale)
    }

    /// Read-only snapshot for UI binding
    #[must_use]
    pub fn snapshot(&self) -> ViewportSnapshot {
        ViewportSnapshot {
            scale: self.state.scale,
            current_page: self.state.current_page,
            total_pages: self.state.page_count,
            match_count: self.matches.len(),
            matched_pages: self.matches.iter().map(|m| m.page_index).collect(),
        }
    }

    /// Drain pending render events without blocking
    pub fn poll_events(&mut self) -> Vec<RenderEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            if let RenderEvent::RunCompleted { generation, .. } = &event {
                self.completed = Some(*generation);
            }
            drained.push(event);
        }
        drained
    }

    /// Block until the render run for the current generation completes,
    /// or `timeout` elapses. Returns immediately if that run already
    /// finished. Consumes render events; don't interleave with
    /// [`Self::poll_events`] while waiting for the same run.
    pub fn wait_for_completion(&mut self, timeout: Duration) -> bool {
        if self.document.is_none() {
            return true;
        }

        let target = self
            .store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generation();
        if self.completed == Some(target) {
            return true;
        }
        let deadline = Instant::now() + timeout;

        loop {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            match self.events.recv_timeout(deadline - now) {
                Ok(RenderEvent::RunCompleted { generation, .. }) => {
                    self.completed = Some(generation);
                    if generation == target {
                        return true;
                    }
                }
                Ok(_) => {}
                Err(_) => return false,
            }
        }
    }

    fn apply(&mut self, cmd: Command) {
        let effects = self.state.apply(cmd);
        self.execute(effects);
    }

    fn execute(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ClearStore => {
                    self.store
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .clear();
                }

                Effect::InvalidateRasters => {
                    self.store
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .invalidate_rasters();
                }

                Effect::RestartRender => self.start_render_run(),

                Effect::ClearHighlights => self.clear_overlay(),

                Effect::RecomputeHighlights => {
                    if let Some(document) = self.document.clone() {
                        self.highlights = overlay::draw_highlights(
                            self.overlay.as_mut(),
                            document.as_ref(),
                            self.state.scale,
                            &self.matches,
                        );
                    }
                }

                Effect::ScrollToPage(page) => {
                    debug!("scroll to page {page}");
                }
            }
        }
    }

    fn start_render_run(&mut self) {
        let Some(document) = &self.document else {
            return;
        };
        let generation = self
            .store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generation();

        let _ = self.requests.send(RenderRequest::Run(RenderRun {
            generation,
            scale: self.state.scale,
            document: Arc::clone(document),
        }));
    }

    fn clear_overlay(&mut self) {
        let page_count = self.state.page_count;
        overlay::clear_highlights(self.overlay.as_mut(), page_count);
        // A smaller replacement document may leave layers past the new
        // page count; clear those too.
        for page in self
            .highlights
            .iter()
            .map(|r| r.page_index)
            .filter(|p| *p >= page_count)
        {
            self.overlay.clear_page(page);
        }
        self.highlights.clear();
        self.matches.clear();
    }
}

impl Drop for Viewer {
    fn drop(&mut self) {
        let _ = self.requests.send(RenderRequest::Shutdown);
    }
}
