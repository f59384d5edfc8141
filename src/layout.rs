/// Grid geometry shared by the view and the rasterizer
///
/// The grid is a 1080x1920 phone story scaled down by 3.

use crate::state::data::FrameIndex;

/// Logical grid width
pub const GRID_WIDTH: u32 = 360;
/// Logical grid height
pub const GRID_HEIGHT: u32 = 640;

pub const COLUMNS: usize = 3;
pub const ROWS: usize = 2;

/// Border around each frame
pub const FRAME_BORDER: u32 = 1;
/// Border around the whole grid
pub const GRID_BORDER: u32 = 2;

pub const FRAME_BORDER_RGB: [u8; 3] = [0x00, 0x00, 0x00];
pub const GRID_BORDER_RGB: [u8; 3] = [0xcc, 0xcc, 0xcc];

/// Pixel rectangle inside the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Rectangle of `frame` at `scale` (1 = logical size)
///
/// Edges are computed from cumulative offsets, so frames tile the grid
/// exactly even when the size does not divide evenly.
pub fn frame_rect(frame: FrameIndex, scale: u32) -> PixelRect {
    let width = GRID_WIDTH * scale;
    let height = GRID_HEIGHT * scale;

    let x0 = width * frame.column() as u32 / COLUMNS as u32;
    let x1 = width * (frame.column() as u32 + 1) / COLUMNS as u32;
    let y0 = height * frame.row() as u32 / ROWS as u32;
    let y1 = height * (frame.row() as u32 + 1) / ROWS as u32;

    PixelRect {
        x: x0,
        y: y0,
        width: x1 - x0,
        height: y1 - y0,
    }
}

/// Logical frame size used by the view
pub fn frame_size() -> (f32, f32) {
    (
        GRID_WIDTH as f32 / COLUMNS as f32,
        GRID_HEIGHT as f32 / ROWS as f32,
    )
}
