//! Drag-to-reposition geometry.

use serde::Serialize;

/// Top-left corner of the widget, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

pub const DEFAULT_VIEWPORT: Size = Size {
    width: 1280,
    height: 800,
};

/// Nominal widget height used for clamping.
pub const WIDGET_HEIGHT: i32 = 480;

/// Clamp `target` so the whole widget stays inside the viewport.
///
/// A widget larger than the viewport pins to the top-left edge.
pub fn clamp(target: Position, widget: Size, viewport: Size) -> Position {
    let max_x = (viewport.width - widget.width).max(0);
    let max_y = (viewport.height - widget.height).max(0);
    Position {
        x: target.x.clamp(0, max_x),
        y: target.y.clamp(0, max_y),
    }
}

/// Inline style placing the widget at `pos`.
pub fn style(width: u32, pos: Position) -> String {
    format!(
        "width:{width}px;left:{}px;top:{}px;right:auto",
        pos.x, pos.y
    )
}
