//! Page rendering infrastructure

mod cache;
mod request;
mod state;
mod transform;
mod types;
mod worker;
pub mod zoom;

pub use cache::{CachedRaster, PageStore};
pub use request::{Generation, RenderEvent, RenderRequest, RenderRun};
pub use state::{Command, Effect, ViewportState};
pub use transform::{Transform, project_run};
pub use types::{HighlightRect, PageGeometry, Raster, TextItem};
pub use worker::{render_page, render_worker};

/// Default number of rendered page rasters kept in memory
pub const DEFAULT_RASTER_CACHE_CAPACITY: usize = 64;
