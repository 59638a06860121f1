//! Pipe puzzle logic with bitmask tile connectivity.
//!
//! # Mask Encoding (4-bit)
//!
//! ```text
//! Bit 0 (1): top edge open
//! Bit 1 (2): right edge open
//! Bit 2 (4): bottom edge open
//! Bit 3 (8): left edge open
//!
//! One clockwise quarter turn moves every open edge up one bit,
//! with left wrapping around to top:
//!   top -> right -> bottom -> left -> top
//! ```
//!
//! # Base Masks (rotation 0)
//!
//! ```text
//!   Straight  │  top|bottom         0b0101
//!   Curve     └  top|right          0b0011
//!   Tee       ┴  top|right|left     0b1011
//!   Cross     ┼  all four           0b1111
//!   Empty        none               0b0000
//! ```
//!
//! # Tile Byte
//!
//! ```text
//! Bits 0-2: shape (0=straight, 1=curve, 2=tee, 3=cross, 4=empty)
//! Bits 3-4: rotation (0-3 clockwise quarter turns)
//! Bits 5-7: zero
//! ```
//!
//! # Board Code
//!
//! ```text
//! Byte 0: rows        Byte 2: start row   Byte 4: goal row
//! Byte 1: cols        Byte 3: start col   Byte 5: goal col
//! Bytes 6..: one tile byte per cell, row-major
//! ```

#[cfg(feature = "wasm")]
pub mod wasm;

pub mod generate;
pub mod layout;
pub mod session;

pub use generate::{BoardError, BoardSpec, RotateBoard, SlideBoard};
pub use layout::BoardLayout;
pub use session::{Activation, Session, SessionConfig, Status};

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Open-edge bitmask. Only the low 4 bits are meaningful.
pub type Mask = u8;

pub const TOP: Mask = 1;
pub const RIGHT: Mask = 2;
pub const BOTTOM: Mask = 4;
pub const LEFT: Mask = 8;
/// All four edges.
pub const ALL_EDGES: Mask = 0b1111;

/// Largest supported row or column count.
pub const MAX_DIM: u8 = 16;

/// Rotate a mask clockwise by `rotation` quarter turns (taken modulo 4).
#[inline]
pub const fn rotate_mask(mask: Mask, rotation: u8) -> Mask {
    let r = (rotation % 4) as u32;
    let m = mask & ALL_EDGES;
    ((m << r) | (m >> ((4 - r) % 4))) & ALL_EDGES
}

/// One of the four tile edges.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Dir {
    Top,
    Right,
    Bottom,
    Left,
}

impl Dir {
    /// All directions in bit order.
    pub const ALL: [Dir; 4] = [Dir::Top, Dir::Right, Dir::Bottom, Dir::Left];

    /// The mask bit for this edge.
    #[inline]
    pub const fn bit(self) -> Mask {
        match self {
            Dir::Top => TOP,
            Dir::Right => RIGHT,
            Dir::Bottom => BOTTOM,
            Dir::Left => LEFT,
        }
    }

    /// The facing edge on the neighboring tile.
    #[inline]
    pub const fn opposite(self) -> Dir {
        match self {
            Dir::Top => Dir::Bottom,
            Dir::Right => Dir::Left,
            Dir::Bottom => Dir::Top,
            Dir::Left => Dir::Right,
        }
    }

    /// Row and column offset of the neighbor in this direction.
    #[inline]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Dir::Top => (-1, 0),
            Dir::Right => (0, 1),
            Dir::Bottom => (1, 0),
            Dir::Left => (0, -1),
        }
    }
}

/// Tile shape. The discriminant is the shape index used in the tile byte.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Shape {
    Straight = 0,
    Curve = 1,
    Tee = 2,
    Cross = 3,
    Empty = 4,
}

impl Shape {
    /// Shapes that carry pipe, in index order.
    pub const PIPES: [Shape; 4] = [Shape::Straight, Shape::Curve, Shape::Tee, Shape::Cross];

    /// Connectivity at rotation 0.
    #[inline]
    pub const fn base_mask(self) -> Mask {
        match self {
            Shape::Straight => TOP | BOTTOM,
            Shape::Curve => TOP | RIGHT,
            Shape::Tee => TOP | RIGHT | LEFT,
            Shape::Cross => ALL_EDGES,
            Shape::Empty => 0,
        }
    }

    /// Convert from shape index (0-4) to Shape.
    #[inline]
    pub fn from_index(idx: u8) -> Option<Shape> {
        match idx {
            0 => Some(Shape::Straight),
            1 => Some(Shape::Curve),
            2 => Some(Shape::Tee),
            3 => Some(Shape::Cross),
            4 => Some(Shape::Empty),
            _ => None,
        }
    }

    /// Lowest rotation whose mask equals `mask` exactly.
    pub fn rotation_for(self, mask: Mask) -> Option<u8> {
        (0..4).find(|&r| rotate_mask(self.base_mask(), r) == mask)
    }

    /// Lowest rotation whose mask opens every edge in `needed`, or 0 if none does.
    pub fn orient(self, needed: Mask) -> u8 {
        (0..4)
            .find(|&r| rotate_mask(self.base_mask(), r) & needed == needed)
            .unwrap_or(0)
    }
}

/// A shape plus its clockwise rotation.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub struct Tile {
    pub shape: Shape,
    pub rotation: u8,
}

impl Tile {
    /// The blank tile of slide boards.
    pub const EMPTY: Tile = Tile {
        shape: Shape::Empty,
        rotation: 0,
    };

    #[inline]
    pub const fn new(shape: Shape, rotation: u8) -> Tile {
        Tile {
            shape,
            rotation: rotation % 4,
        }
    }

    /// Current open edges. Derived from (shape, rotation) on every call.
    #[inline]
    pub const fn mask(self) -> Mask {
        rotate_mask(self.shape.base_mask(), self.rotation)
    }

    /// Check if the edge in `dir` is open.
    #[inline]
    pub const fn opens(self, dir: Dir) -> bool {
        self.mask() & dir.bit() != 0
    }

    /// Turn a quarter clockwise in place.
    #[inline]
    pub fn rotate(&mut self) {
        self.rotation = (self.rotation + 1) % 4;
    }

    /// Copy turned `steps` quarters clockwise.
    #[inline]
    pub const fn rotated(self, steps: u8) -> Tile {
        Tile::new(self.shape, (self.rotation % 4) + (steps % 4))
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        matches!(self.shape, Shape::Empty)
    }

    /// Pack into the tile byte.
    #[inline]
    pub const fn to_byte(self) -> u8 {
        (self.shape as u8) | ((self.rotation % 4) << 3)
    }

    /// Unpack a tile byte. Rejects unknown shapes and set reserved bits.
    pub fn from_byte(byte: u8) -> Option<Tile> {
        if byte & 0b1110_0000 != 0 {
            return None;
        }
        let shape = Shape::from_index(byte & 0b111)?;
        Some(Tile::new(shape, (byte >> 3) & 0b11))
    }
}

/// Grid coordinate.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: u8,
    pub col: u8,
}

impl Cell {
    #[inline]
    pub const fn new(row: u8, col: u8) -> Cell {
        Cell { row, col }
    }

    /// The neighbor in `dir`, if it lies inside a `rows`×`cols` board.
    #[inline]
    pub fn step(self, dir: Dir, rows: u8, cols: u8) -> Option<Cell> {
        let (dr, dc) = dir.delta();
        let row = self.row as i32 + dr;
        let col = self.col as i32 + dc;
        if row < 0 || col < 0 || row >= rows as i32 || col >= cols as i32 {
            return None;
        }
        Some(Cell::new(row as u8, col as u8))
    }

    #[inline]
    pub fn manhattan(self, other: Cell) -> u32 {
        (self.row.abs_diff(other.row) as u32) + (self.col.abs_diff(other.col) as u32)
    }

    /// Direction from `self` to an orthogonally adjacent `other`.
    pub fn dir_to(self, other: Cell) -> Option<Dir> {
        Dir::ALL.into_iter().find(|&dir| {
            let (dr, dc) = dir.delta();
            self.row as i32 + dr == other.row as i32 && self.col as i32 + dc == other.col as i32
        })
    }
}

/// Which move the player makes on a board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Variant {
    /// Clicking a tile turns it a quarter clockwise.
    Rotate = 0,
    /// Clicking a tile next to the blank slides it into the blank.
    Slide = 1,
}

impl Variant {
    pub fn from_bits(bits: u8) -> Option<Variant> {
        match bits {
            0 => Some(Variant::Rotate),
            1 => Some(Variant::Slide),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Variant> {
        match name.trim().to_ascii_lowercase().as_str() {
            "rotate" => Some(Variant::Rotate),
            "slide" => Some(Variant::Slide),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Variant::Rotate => "rotate",
            Variant::Slide => "slide",
        }
    }
}

// ============================================================================
// GRID
// ============================================================================

/// Fixed-size board of tiles with a distinguished start and goal cell.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Grid {
    rows: u8,
    cols: u8,
    start: Cell,
    goal: Cell,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Header bytes ahead of the tiles in a board code.
    const CODE_HEADER: usize = 6;

    /// Create a board of empty tiles.
    ///
    /// Returns None unless both dimensions are in 1..=MAX_DIM, start and goal
    /// are on the board, and start differs from goal.
    pub fn new(rows: u8, cols: u8, start: Cell, goal: Cell) -> Option<Grid> {
        if rows == 0 || cols == 0 || rows > MAX_DIM || cols > MAX_DIM {
            return None;
        }
        let inside = |c: Cell| c.row < rows && c.col < cols;
        if !inside(start) || !inside(goal) || start == goal {
            return None;
        }
        Some(Grid {
            rows,
            cols,
            start,
            goal,
            tiles: vec![Tile::EMPTY; rows as usize * cols as usize],
        })
    }

    #[inline]
    pub fn rows(&self) -> u8 {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> u8 {
        self.cols
    }

    #[inline]
    pub fn start(&self) -> Cell {
        self.start
    }

    #[inline]
    pub fn goal(&self) -> Cell {
        self.goal
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Row-major index of a cell. Caller must pass a cell on this board.
    #[inline]
    pub fn index(&self, cell: Cell) -> usize {
        debug_assert!(cell.row < self.rows && cell.col < self.cols);
        cell.row as usize * self.cols as usize + cell.col as usize
    }

    /// Bounds-check signed coordinates.
    #[inline]
    pub fn contains(&self, row: i32, col: i32) -> Option<Cell> {
        if row < 0 || col < 0 || row >= self.rows as i32 || col >= self.cols as i32 {
            return None;
        }
        Some(Cell::new(row as u8, col as u8))
    }

    /// Iterate over all cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| Cell::new(row, col)))
    }

    #[inline]
    pub fn tile(&self, cell: Cell) -> Tile {
        self.tiles[self.index(cell)]
    }

    #[inline]
    pub fn set(&mut self, cell: Cell, tile: Tile) {
        let idx = self.index(cell);
        self.tiles[idx] = tile;
    }

    #[inline]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[inline]
    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// Open edges of the tile at `cell`.
    #[inline]
    pub fn mask(&self, cell: Cell) -> Mask {
        self.tile(cell).mask()
    }

    /// Turn the tile at `cell` a quarter clockwise.
    #[inline]
    pub fn rotate(&mut self, cell: Cell) {
        let idx = self.index(cell);
        self.tiles[idx].rotate();
    }

    /// Exchange the tiles at two cells.
    #[inline]
    pub fn swap(&mut self, a: Cell, b: Cell) {
        let (ia, ib) = (self.index(a), self.index(b));
        self.tiles.swap(ia, ib);
    }

    /// First cell holding an empty tile.
    pub fn find_blank(&self) -> Option<Cell> {
        self.cells().find(|&c| self.tile(c).is_empty())
    }

    /// Count of empty tiles.
    pub fn blank_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.is_empty()).count()
    }

    // ========== Connectivity ==========

    /// The neighbor in `dir` if both facing edges are open.
    #[inline]
    pub fn linked(&self, cell: Cell, dir: Dir) -> Option<Cell> {
        if self.mask(cell) & dir.bit() == 0 {
            return None;
        }
        let next = cell.step(dir, self.rows, self.cols)?;
        if self.mask(next) & dir.opposite().bit() == 0 {
            return None;
        }
        Some(next)
    }

    /// Breadth-first search from `start` over agreeing edges.
    pub fn connectivity(&self) -> Reach {
        let mut visited = vec![false; self.tiles.len()];
        let mut order = Vec::with_capacity(self.tiles.len());
        let mut queue = VecDeque::with_capacity(self.tiles.len());

        visited[self.index(self.start)] = true;
        queue.push_back(self.start);

        while let Some(cell) = queue.pop_front() {
            order.push(cell);
            for dir in Dir::ALL {
                if let Some(next) = self.linked(cell, dir) {
                    let idx = self.index(next);
                    if !visited[idx] {
                        visited[idx] = true;
                        queue.push_back(next);
                    }
                }
            }
        }

        let solved = visited[self.index(self.goal)];
        Reach {
            rows: self.rows,
            cols: self.cols,
            visited,
            order,
            solved,
        }
    }

    /// Check if the goal is connected to the start.
    #[inline]
    pub fn is_solved(&self) -> bool {
        self.connectivity().solved
    }

    // ========== Board Code ==========

    /// Encode as header plus one byte per tile.
    pub fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::CODE_HEADER + self.tiles.len());
        bytes.extend_from_slice(&[
            self.rows,
            self.cols,
            self.start.row,
            self.start.col,
            self.goal.row,
            self.goal.col,
        ]);
        bytes.extend(self.tiles.iter().map(|t| t.to_byte()));
        bytes
    }

    /// Decode a board code. Returns None for any malformed input.
    pub fn decode(bytes: &[u8]) -> Option<Grid> {
        if bytes.len() < Self::CODE_HEADER {
            return None;
        }
        let start = Cell::new(bytes[2], bytes[3]);
        let goal = Cell::new(bytes[4], bytes[5]);
        let mut grid = Grid::new(bytes[0], bytes[1], start, goal)?;
        let body = &bytes[Self::CODE_HEADER..];
        if body.len() != grid.tiles.len() {
            return None;
        }
        for (slot, &byte) in grid.tiles.iter_mut().zip(body) {
            *slot = Tile::from_byte(byte)?;
        }
        Some(grid)
    }

    /// Board code as lowercase hex.
    pub fn to_hex(&self) -> String {
        self.encode().iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Parse a hex board code.
    pub fn from_hex(hex: &str) -> Option<Grid> {
        let hex = hex.trim();
        if hex.len() % 2 != 0 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let bytes = (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
            .collect::<Option<Vec<u8>>>()?;
        Grid::decode(&bytes)
    }
}

/// Cells connected to the start, from one solver run.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Reach {
    rows: u8,
    cols: u8,
    visited: Vec<bool>,
    order: Vec<Cell>,
    solved: bool,
}

impl Reach {
    /// Check if `cell` is connected to the start.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.rows
            && cell.col < self.cols
            && self.visited[cell.row as usize * self.cols as usize + cell.col as usize]
    }

    /// Number of connected cells, start included.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Connected cells in discovery order.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.order
    }

    /// One flag per cell, row-major.
    #[inline]
    pub fn flags(&self) -> &[bool] {
        &self.visited
    }

    /// Check if the goal was reached.
    #[inline]
    pub fn is_solved(&self) -> bool {
        self.solved
    }
}
