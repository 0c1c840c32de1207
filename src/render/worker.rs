//! Render worker - runs on a dedicated thread
//!
//! Pages of a run are rasterized strictly sequentially in index order,
//! one page in flight at a time, which caps peak memory to a single
//! page's working set on large documents. The store's generation is
//! checked before every page and again at every write, so a run that has
//! been superseded by a newer load or scale abandons its remaining work
//! without publishing anything.

use std::sync::{Arc, Mutex, PoisonError};

use flume::{Receiver, Sender};
use log::{debug, warn};

use crate::decoder::{Document, RenderError};

use super::cache::PageStore;
use super::request::{Generation, RenderEvent, RenderRequest, RenderRun};
use super::types::Raster;

/// Main worker loop - consumes runs until shutdown
pub fn render_worker(
    requests: Receiver<RenderRequest>,
    events: Sender<RenderEvent>,
    store: Arc<Mutex<PageStore>>,
) {
    for request in requests {
        match request {
            RenderRequest::Run(run) => execute_run(&run, &events, &store),
            RenderRequest::Shutdown => break,
        }
    }
}

fn current_generation(store: &Arc<Mutex<PageStore>>) -> Generation {
    store
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .generation()
}

fn execute_run(run: &RenderRun, events: &Sender<RenderEvent>, store: &Arc<Mutex<PageStore>>) {
    let page_count = run.document.page_count();
    debug!(
        "render run {:?}: {page_count} page(s) at scale {}",
        run.generation, run.scale
    );

    let mut rendered = 0;
    for page in 0..page_count {
        if current_generation(store) != run.generation {
            let _ = events.send(RenderEvent::RunSuperseded {
                generation: run.generation,
            });
            return;
        }

        match render_page(run.document.as_ref(), page, run.scale) {
            Ok(raster) => {
                let stored = store
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .store_raster(run.generation, page, run.scale, raster);
                if !stored {
                    let _ = events.send(RenderEvent::RunSuperseded {
                        generation: run.generation,
                    });
                    return;
                }
                rendered += 1;
                fill_text_items(run, page, store);
                let _ = events.send(RenderEvent::PageReady {
                    generation: run.generation,
                    page,
                });
            }
            Err(error) => {
                warn!("page {page} failed to render: {error}");
                let _ = events.send(RenderEvent::PageFailed {
                    generation: run.generation,
                    page,
                    error,
                });
            }
        }
    }

    let _ = events.send(RenderEvent::RunCompleted {
        generation: run.generation,
        rendered,
    });
}

/// Render a single page: geometry, surface allocation, decoder draw
pub fn render_page(
    document: &dyn Document,
    page: usize,
    scale: f32,
) -> Result<Raster, RenderError> {
    let geometry = document.page_geometry(page, scale)?;
    let mut raster = Raster::new(geometry.pixel_width(), geometry.pixel_height());
    document.render_page(page, &geometry, &mut raster)?;
    Ok(raster)
}

/// Build the page's text index on first render, if not already present.
/// Extraction failures leave the page unsearchable and are not fatal.
fn fill_text_items(run: &RenderRun, page: usize, store: &Arc<Mutex<PageStore>>) {
    let already_indexed = store
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .text_items(page)
        .is_some();
    if already_indexed {
        return;
    }

    match run.document.extract_text(page) {
        Ok(items) => {
            store
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .store_text_items(run.generation, page, items);
        }
        Err(error) => {
            warn!("text extraction failed for page {page}: {error}");
        }
    }
}
