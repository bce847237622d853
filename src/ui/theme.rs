use ratatui::style::{Color, Style};

/// Color theme for fado.
///
/// Text and chrome use the terminal's default foreground (Color::Reset);
/// color is reserved for functional signals: WIP pressure, carry
/// affordances, and the fade of completed cards.
pub struct Theme;

impl Theme {
    // Base — everything defaults to the terminal's own foreground
    pub const FG: Color = Color::Reset;
    pub const DIM: Color = Color::DarkGray;

    // Column
    pub const COLUMN_HEADER: Color = Color::Reset;
    pub const COLUMN_BORDER: Color = Color::Reset;

    // Card
    pub const CARD_BORDER: Color = Color::Reset;
    /// Border of the card currently being carried.
    pub const CARRY: Color = Color::Cyan;

    // Carry affordances on a hovered column surface
    pub const DROP_OK: Color = Color::Green;
    pub const DROP_INVALID: Color = Color::Red;

    // WIP limit badge
    pub const WIP_OK: Color = Color::Green;
    pub const WIP_NEAR: Color = Color::Yellow;
    pub const WIP_OVER: Color = Color::Red;

    // Status bar
    pub const STATUS_ERROR: Color = Color::Red;

    // Hint popup
    pub const HINT_KEY: Color = Color::Reset;
    pub const HINT_DESC: Color = Color::Reset;

    pub fn dim_style() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn status_style() -> Style {
        Style::default().fg(Self::FG)
    }

    /// Badge color for a column's card count against its WIP limit.
    pub fn wip_color(count: usize, limit: u32) -> Color {
        if count as u32 > limit {
            Self::WIP_OVER
        } else if count as u32 == limit {
            Self::WIP_NEAR
        } else {
            Self::WIP_OK
        }
    }

    /// Foreground for a completed card at the given opacity percentage.
    /// Terminal cells have no alpha channel, so the fade is stepped through
    /// progressively dimmer colors.
    pub fn fade_color(opacity: u8) -> Color {
        if opacity >= 75 {
            Self::FG
        } else if opacity >= 40 {
            Color::Gray
        } else {
            Color::DarkGray
        }
    }
}
