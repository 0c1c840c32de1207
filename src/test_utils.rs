//! Deterministic fakes for driving the engine in tests
//!
//! The fake decoder reads a tiny plain-text page format: a `%DOC` header
//! line, pages separated by form feeds, one text run per line. Runs are
//! laid out top-down on a US-letter-sized page so projected highlight
//! geometry is predictable. Directive lines inject page-level faults:
//! `!render-fail` makes the page's raster draw fail, `!extract-fail`
//! makes its text extraction fail.

use std::sync::{Arc, Mutex, Once, PoisonError};

use crate::decoder::{Decoder, Document, ExtractError, LoadError, RenderError};
use crate::overlay::OverlaySurface;
use crate::render::{HighlightRect, PageGeometry, Raster, TextItem, Transform};

/// Unscaled page width of fake documents
pub const PAGE_WIDTH: f32 = 612.0;
/// Unscaled page height of fake documents
pub const PAGE_HEIGHT: f32 = 792.0;

const MARGIN: f32 = 72.0;
const LINE_HEIGHT: f32 = 12.0;
const CHAR_WIDTH: f32 = 6.0;

const HEADER: &str = "%DOC\n";

/// Assemble fake document bytes from page texts
#[must_use]
pub fn document_bytes(pages: &[&str]) -> Vec<u8> {
    format!("{HEADER}{}", pages.join("\u{c}")).into_bytes()
}

/// Decoder for the fake plain-text page format
pub struct FakeDecoder;

impl Decoder for FakeDecoder {
    fn load(&self, bytes: &[u8]) -> Result<Arc<dyn Document>, LoadError> {
        let text =
            std::str::from_utf8(bytes).map_err(|_| LoadError::malformed("not valid utf-8"))?;
        let body = text
            .strip_prefix(HEADER)
            .ok_or_else(|| LoadError::malformed("missing %DOC header"))?;

        let pages = if body.is_empty() {
            Vec::new()
        } else {
            body.split('\u{c}').map(FakePage::parse).collect()
        };
        Ok(Arc::new(FakeDocument { pages }))
    }
}

struct FakePage {
    lines: Vec<String>,
    fail_render: bool,
    fail_extract: bool,
}

impl FakePage {
    fn parse(raw: &str) -> Self {
        Self {
            lines: raw
                .lines()
                .filter(|line| !line.is_empty() && !line.starts_with('!'))
                .map(str::to_string)
                .collect(),
            fail_render: raw.lines().any(|line| line == "!render-fail"),
            fail_extract: raw.lines().any(|line| line == "!extract-fail"),
        }
    }
}

/// Document produced by [`FakeDecoder`]
pub struct FakeDocument {
    pages: Vec<FakePage>,
}

impl FakeDocument {
    fn page(&self, page: usize) -> Option<&FakePage> {
        self.pages.get(page)
    }
}

impl Document for FakeDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_geometry(&self, page: usize, scale: f32) -> Result<PageGeometry, RenderError> {
        self.page(page)
            .ok_or(RenderError::PageOutOfRange { page })?;
        Ok(PageGeometry {
            width: PAGE_WIDTH * scale,
            height: PAGE_HEIGHT * scale,
        })
    }

    fn render_page(
        &self,
        page: usize,
        _geometry: &PageGeometry,
        target: &mut Raster,
    ) -> Result<(), RenderError> {
        let fake_page = self
            .page(page)
            .ok_or(RenderError::PageOutOfRange { page })?;
        if fake_page.fail_render {
            return Err(RenderError::failed("simulated raster fault"));
        }
        // Stamp the page number so rasters are distinguishable.
        if let Some(first) = target.pixels.first_mut() {
            *first = page as u8;
        }
        Ok(())
    }

    fn extract_text(&self, page: usize) -> Result<Vec<TextItem>, ExtractError> {
        let fake_page = self
            .page(page)
            .ok_or(ExtractError::PageOutOfRange { page })?;
        if fake_page.fail_extract {
            return Err(ExtractError::failed("simulated extraction fault"));
        }

        Ok(fake_page
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| TextItem {
                text: line.clone(),
                transform: Transform::translation(
                    MARGIN,
                    PAGE_HEIGHT - MARGIN - LINE_HEIGHT * (index as f32 + 1.0),
                ),
                width: line.chars().count() as f32 * CHAR_WIDTH,
                height: LINE_HEIGHT,
            })
            .collect())
    }
}

/// Overlay surface that records every operation, cloneable so tests can
/// keep a handle after moving it into a viewer
#[derive(Clone, Default)]
pub struct RecordingOverlay {
    inner: Arc<Mutex<OverlayLog>>,
}

#[derive(Default)]
struct OverlayLog {
    rects: Vec<HighlightRect>,
    clears: Vec<usize>,
}

impl RecordingOverlay {
    /// Rectangles currently on the surface, in draw order
    #[must_use]
    pub fn rects(&self) -> Vec<HighlightRect> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rects
            .clone()
    }

    /// Rectangles currently on the given page
    #[must_use]
    pub fn rects_for(&self, page: usize) -> Vec<HighlightRect> {
        self.rects()
            .into_iter()
            .filter(|r| r.page_index == page)
            .collect()
    }

    /// Number of clear operations seen so far
    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clears
            .len()
    }
}

impl OverlaySurface for RecordingOverlay {
    fn add_rect(&mut self, _page_index: usize, rect: HighlightRect) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .rects
            .push(rect);
    }

    fn clear_page(&mut self, page_index: usize) {
        let mut log = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        log.rects.retain(|r| r.page_index != page_index);
        log.clears.push(page_index);
    }
}

static LOGGER: Once = Once::new();

/// Route `log` output to the terminal for debugging test runs
pub fn init_test_logging() {
    LOGGER.call_once(|| {
        let _ = simplelog::TermLogger::init(
            simplelog::LevelFilter::Debug,
            simplelog::Config::default(),
            simplelog::TerminalMode::Mixed,
            simplelog::ColorChoice::Auto,
        );
    });
}
