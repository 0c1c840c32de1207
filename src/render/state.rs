//! Viewport state management
//!
//! The single source of truth for scale, current page, and the active
//! query. Mutations go through [`ViewportState::apply`], which returns the
//! effects the owner must execute; no other component keeps its own copy.

use crate::search::SearchQuery;

use super::zoom;

/// Current viewport state for a loaded document
#[derive(Clone, Debug)]
pub struct ViewportState {
    /// Scale factor, always within [`zoom::MIN_SCALE`, `zoom::MAX_SCALE`]
    pub scale: f32,

    /// Current page (1-based); unset until a document is loaded
    pub current_page: Option<usize>,

    /// Total page count of the loaded document
    pub page_count: usize,

    /// Query whose highlights are currently materialized
    pub active_query: Option<SearchQuery>,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            scale: 1.0,
            current_page: None,
            page_count: 0,
            active_query: None,
        }
    }
}

impl ViewportState {
    /// Apply a command and return resulting effects
    #[must_use]
    pub fn apply(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd {
            Command::DocumentLoaded { page_count } => {
                self.page_count = page_count;
                self.current_page = (page_count > 0).then_some(1);
                self.active_query = None;
                vec![Effect::ClearStore, Effect::ClearHighlights, Effect::RestartRender]
            }

            Command::SetScale(scale) => self.change_scale(zoom::clamp_scale(scale)),

            Command::ZoomIn => self.change_scale(zoom::step_in(self.scale)),

            Command::ZoomOut => self.change_scale(zoom::step_out(self.scale)),

            Command::GoToPage(page) => {
                if self.page_count == 0 {
                    return vec![];
                }
                let clamped = page.clamp(1, self.page_count);
                if self.current_page != Some(clamped) {
                    self.current_page = Some(clamped);
                    vec![Effect::ScrollToPage(clamped)]
                } else {
                    vec![]
                }
            }

            Command::SetQuery(query) => {
                let effects = match query {
                    Some(_) => vec![Effect::RecomputeHighlights],
                    None => vec![Effect::ClearHighlights],
                };
                self.active_query = query;
                effects
            }
        }
    }

    fn change_scale(&mut self, clamped: f32) -> Vec<Effect> {
        if (self.scale - clamped).abs() <= f32::EPSILON {
            return vec![];
        }
        self.scale = clamped;

        let mut effects = vec![Effect::InvalidateRasters, Effect::RestartRender];
        if self.active_query.is_some() {
            effects.push(Effect::RecomputeHighlights);
        }
        effects
    }
}

/// Commands that modify viewport state
#[derive(Clone, Debug)]
pub enum Command {
    /// A new document was decoded successfully
    DocumentLoaded { page_count: usize },
    /// Set the scale factor (clamped)
    SetScale(f32),
    /// Zoom in by one step
    ZoomIn,
    /// Zoom out by one step
    ZoomOut,
    /// Go to a specific page (1-based, clamped)
    GoToPage(usize),
    /// Replace the active query; `None` clears highlights
    SetQuery(Option<SearchQuery>),
}

/// Effects produced by state changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Drop all cached rasters and text items
    ClearStore,
    /// Drop cached rasters only
    InvalidateRasters,
    /// Start a fresh sequential render run at the current scale
    RestartRender,
    /// Remove every highlight rectangle
    ClearHighlights,
    /// Recompute highlight rectangles at the current scale
    RecomputeHighlights,
    /// Bring the given page (1-based) into view
    ScrollToPage(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded_state(page_count: usize) -> ViewportState {
        let mut state = ViewportState::default();
        let _ = state.apply(Command::DocumentLoaded { page_count });
        state
    }

    #[test]
    fn document_loaded_resets_page_and_query() {
        let mut state = ViewportState::default();
        state.active_query = SearchQuery::parse("old");

        let effects = state.apply(Command::DocumentLoaded { page_count: 5 });

        assert_eq!(state.page_count, 5);
        assert_eq!(state.current_page, Some(1));
        assert!(state.active_query.is_none());
        assert_eq!(
            effects,
            vec![Effect::ClearStore, Effect::ClearHighlights, Effect::RestartRender]
        );
    }

    #[test]
    fn empty_document_leaves_page_unset() {
        let state = loaded_state(0);
        assert_eq!(state.current_page, None);
    }

    #[test]
    fn set_scale_clamps_and_invalidates() {
        let mut state = loaded_state(3);

        let effects = state.apply(Command::SetScale(5.0));
        assert_eq!(state.scale, 3.0);
        assert_eq!(
            effects,
            vec![Effect::InvalidateRasters, Effect::RestartRender]
        );

        let effects = state.apply(Command::SetScale(0.1));
        assert_eq!(state.scale, 0.5);
        assert!(!effects.is_empty());
    }

    #[test]
    fn unchanged_scale_is_a_no_op() {
        let mut state = loaded_state(3);
        let effects = state.apply(Command::SetScale(1.0));
        assert!(effects.is_empty());
    }

    #[test]
    fn scale_change_with_active_query_recomputes_highlights() {
        let mut state = loaded_state(3);
        let _ = state.apply(Command::SetQuery(SearchQuery::parse("total")));

        let effects = state.apply(Command::SetScale(2.0));
        assert_eq!(
            effects,
            vec![
                Effect::InvalidateRasters,
                Effect::RestartRender,
                Effect::RecomputeHighlights
            ]
        );
    }

    #[test]
    fn zoom_steps_by_fixed_increment() {
        let mut state = loaded_state(3);

        let _ = state.apply(Command::ZoomIn);
        assert!((state.scale - 1.2).abs() < f32::EPSILON);

        let _ = state.apply(Command::ZoomOut);
        let _ = state.apply(Command::ZoomOut);
        assert!((state.scale - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn go_to_page_clamps_to_bounds() {
        let mut state = loaded_state(10);

        let effects = state.apply(Command::GoToPage(999));
        assert_eq!(state.current_page, Some(10));
        assert_eq!(effects, vec![Effect::ScrollToPage(10)]);

        let effects = state.apply(Command::GoToPage(0));
        assert_eq!(state.current_page, Some(1));
        assert_eq!(effects, vec![Effect::ScrollToPage(1)]);
    }

    #[test]
    fn go_to_page_without_document_does_nothing() {
        let mut state = ViewportState::default();
        let effects = state.apply(Command::GoToPage(3));
        assert!(effects.is_empty());
        assert_eq!(state.current_page, None);
    }

    #[test]
    fn clearing_query_clears_highlights() {
        let mut state = loaded_state(3);
        let _ = state.apply(Command::SetQuery(SearchQuery::parse("x")));
        assert!(state.active_query.is_some());

        let effects = state.apply(Command::SetQuery(None));
        assert!(state.active_query.is_none());
        assert_eq!(effects, vec![Effect::ClearHighlights]);
    }
}
