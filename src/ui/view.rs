use crate::models::{AppState, StatusIndicator};
use crate::ui::icons::Icons;

/// Opacity of the indicator glyph.
const INDICATOR_ALPHA: u8 = 204;

/// Everything the footer and busy button draw, derived from [`AppState`].
///
/// Kept free of Slint types so the mapping can be tested without a window.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub text: String,
    pub tint: Option<(u8, u8, u8)>,
    pub indicator: StatusIndicator,
    pub indicator_glyph: &'static str,
    pub indicator_rgba: (u8, u8, u8, u8),
    pub busy: bool,
    pub busy_icon: &'static str,
    pub progress: f32,
}

impl StatusView {
    pub fn from_state(state: &AppState) -> Self {
        let indicator = state.indicator();
        let busy_icon = Icons::hourglass(state.busy_frame);
        let (r, g, b) = indicator.color().to_rgb8();

        Self {
            text: state.task_status.clone(),
            tint: state.task_status_color.map(|c| c.to_rgb8()),
            indicator,
            indicator_glyph: match indicator {
                StatusIndicator::Ready => Icons::READY,
                _ => busy_icon,
            },
            indicator_rgba: (r, g, b, INDICATOR_ALPHA),
            busy: state.is_busy(),
            busy_icon,
            progress: if state.show_progress() { state.progress } else { 0.0 },
        }
    }
}
