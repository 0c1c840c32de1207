//! Document decoder seam
//!
//! The engine does not parse page-description formats itself. A [`Decoder`]
//! turns a byte buffer into an opaque [`Document`] handle that can report
//! page geometry, draw pages into raster surfaces, and extract positioned
//! text runs. The concrete implementation is supplied by the embedding
//! application.

use std::sync::Arc;

use crate::render::{PageGeometry, Raster, TextItem};

/// Fatal failure of a load attempt. The previously loaded document, if
/// any, stays in place.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("not a valid document: {detail}")]
    Malformed { detail: String },

    #[error("byte source: {0}")]
    Source(#[from] std::io::Error),
}

impl LoadError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed {
            detail: detail.into(),
        }
    }
}

/// A single page failed to rasterize. Logged and swallowed; the page's
/// raster stays absent and every other page is unaffected.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("page {page} out of range")]
    PageOutOfRange { page: usize },

    #[error("{detail}")]
    Failed { detail: String },
}

impl RenderError {
    pub fn failed(detail: impl Into<String>) -> Self {
        Self::Failed {
            detail: detail.into(),
        }
    }
}

/// Text extraction failed for a page. That page is simply unsearchable;
/// other pages are unaffected.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("page {page} out of range")]
    PageOutOfRange { page: usize },

    #[error("{detail}")]
    Failed { detail: String },
}

impl ExtractError {
    pub fn failed(detail: impl Into<String>) -> Self {
        Self::Failed {
            detail: detail.into(),
        }
    }
}

/// Turns raw bytes into a decoded document
pub trait Decoder: Send + Sync {
    fn load(&self, bytes: &[u8]) -> Result<Arc<dyn Document>, LoadError>;
}

/// Decoded document handle
pub trait Document: Send + Sync {
    /// Number of pages in the document
    fn page_count(&self) -> usize;

    /// Scaled viewport descriptor for a page
    fn page_geometry(&self, page: usize, scale: f32) -> Result<PageGeometry, RenderError>;

    /// Draw a page into `target`, which is sized to `geometry`
    fn render_page(
        &self,
        page: usize,
        geometry: &PageGeometry,
        target: &mut Raster,
    ) -> Result<(), RenderError>;

    /// Ordered text runs of a page, geometry in document space
    fn extract_text(&self, page: usize) -> Result<Vec<TextItem>, ExtractError>;
}
