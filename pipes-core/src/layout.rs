//! Pixel-to-cell mapping for the presentation layer.

use serde::{Deserialize, Serialize};

use crate::{Cell, Grid};

/// Where the board sits on screen.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct BoardLayout {
    pub tile_size: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub rows: u8,
    pub cols: u8,
}

impl BoardLayout {
    pub fn new(tile_size: f32, offset_x: f32, offset_y: f32, rows: u8, cols: u8) -> BoardLayout {
        BoardLayout {
            tile_size,
            offset_x,
            offset_y,
            rows,
            cols,
        }
    }

    /// Layout for `grid` centered in a `width`×`height` surface.
    pub fn centered(grid: &Grid, tile_size: f32, width: f32, height: f32) -> BoardLayout {
        let offset_x = (width - grid.cols() as f32 * tile_size) / 2.0;
        let offset_y = (height - grid.rows() as f32 * tile_size) / 2.0;
        BoardLayout::new(tile_size, offset_x, offset_y, grid.rows(), grid.cols())
    }

    /// Board width in pixels.
    #[inline]
    pub fn width(&self) -> f32 {
        self.cols as f32 * self.tile_size
    }

    /// Board height in pixels.
    #[inline]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_size
    }

    /// (row, col) under a pointer position, or None off the board.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<(i32, i32)> {
        if !(self.tile_size > 0.0) || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let col = ((x - self.offset_x) / self.tile_size).floor();
        let row = ((y - self.offset_y) / self.tile_size).floor();
        if row < 0.0 || col < 0.0 || row >= self.rows as f32 || col >= self.cols as f32 {
            return None;
        }
        Some((row as i32, col as i32))
    }

    /// Top-left pixel of a cell.
    #[inline]
    pub fn cell_origin(&self, cell: Cell) -> (f32, f32) {
        (
            self.offset_x + cell.col as f32 * self.tile_size,
            self.offset_y + cell.row as f32 * self.tile_size,
        )
    }
}
