//! Paged document viewer engine: renders a binary paginated document to
//! raster surfaces and supports full-document text search with precise
//! visual highlighting.
//!
//! Format decoding is delegated to a [`decoder::Decoder`] implementation
//! supplied by the embedding application; highlight rectangles land on an
//! [`overlay::OverlaySurface`] it provides. Everything in between - the
//! sequential render pipeline, the per-page raster/text cache, the lazy
//! text index, search, and the viewport state machine - lives here, behind
//! the [`viewer::Viewer`] facade.

pub mod decoder;
pub mod overlay;
pub mod render;
pub mod search;
pub mod source;
pub mod viewer;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use decoder::{Decoder, Document, ExtractError, LoadError, RenderError};
pub use overlay::OverlaySurface;
pub use render::{HighlightRect, PageGeometry, Raster, TextItem, Transform};
pub use search::{PageMatch, SearchQuery};
pub use viewer::{Viewer, ViewerConfig, ViewportSnapshot};
