//! Text glyphs used in place of an icon font.

use crate::models::BUSY_FRAMES;

/// Named glyphs for buttons, indicators and links.
pub struct Icons;

impl Icons {
    pub const READY: &'static str = "-";
    pub const GITHUB: &'static str = "</> GitHub";

    pub const HOURGLASS_FULL: &'static str = "⌛";
    pub const HOURGLASS_START: &'static str = "⏳";
    pub const HOURGLASS_HALF: &'static str = "⧗";
    pub const HOURGLASS_EMPTY: &'static str = "⧖";

    /// Busy animation, one entry per frame.
    pub const HOURGLASS: [&'static str; BUSY_FRAMES] = [
        Self::HOURGLASS_FULL,
        Self::HOURGLASS_START,
        Self::HOURGLASS_HALF,
        Self::HOURGLASS_FULL,
        Self::HOURGLASS_EMPTY,
    ];

    /// Glyph for a busy animation frame. Out-of-range frames wrap.
    pub fn hourglass(frame: usize) -> &'static str {
        Self::HOURGLASS[frame % BUSY_FRAMES]
    }
}
