//! Color constants for the terminal user interface.

use ratatui::style::Color;

/// Accent for the active menu entry, focused fields and the header badge.
pub const ACCENT: Color = Color::Rgb(13, 110, 253);
/// Completed tasks and the progress gauge.
pub const DONE_GREEN: Color = Color::Rgb(25, 135, 84);
/// Pending tasks.
pub const PENDING_AMBER: Color = Color::Rgb(255, 193, 7);
/// Errors and the delete confirmation.
pub const DARK_RED: Color = Color::Rgb(114, 0, 0);
/// Text drawn on top of `PENDING_AMBER`.
pub const INK: Color = Color::Rgb(20, 20, 20);
