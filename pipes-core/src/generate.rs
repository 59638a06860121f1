//! Board generation and scrambling.
//!
//! Every board starts from a solved layout: a guaranteed path from start to
//! goal, with random pipe tiles everywhere else. Rotate boards then get a
//! random rotation on every tile. Slide boards get a random walk of legal
//! blank slides, so the solved layout stays reachable by undoing the walk.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Cell, Dir, Grid, Shape, Tile, Variant, ALL_EDGES, MAX_DIM};

/// Blank slides applied to a solved slide board.
pub const DEFAULT_SCRAMBLE_MOVES: u32 = 200;

/// Scramble rounds tried before accepting a board that is still solved.
pub const MAX_SCRAMBLE_ATTEMPTS: u32 = 16;

/// Board configuration, fixed for the lifetime of a board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct BoardSpec {
    pub rows: u8,
    pub cols: u8,
    pub start: Cell,
    pub goal: Cell,
    /// Where the blank sits in the solved slide layout. Unused by rotate boards.
    pub blank: Cell,
}

impl BoardSpec {
    /// 6×6 rotate board with a corridor along row 3.
    pub const fn rotate_default() -> BoardSpec {
        BoardSpec {
            rows: 6,
            cols: 6,
            start: Cell::new(3, 0),
            goal: Cell::new(3, 5),
            blank: Cell::new(5, 5),
        }
    }

    /// 5×5 slide board with a corridor along row 2 and the blank in the corner.
    pub const fn slide_default() -> BoardSpec {
        BoardSpec {
            rows: 5,
            cols: 5,
            start: Cell::new(2, 0),
            goal: Cell::new(2, 4),
            blank: Cell::new(4, 4),
        }
    }

    pub fn for_variant(variant: Variant) -> BoardSpec {
        match variant {
            Variant::Rotate => BoardSpec::rotate_default(),
            Variant::Slide => BoardSpec::slide_default(),
        }
    }

    /// Same layout stretched to `rows`×`cols`: start on the middle row at the
    /// left edge, goal at the right edge, blank in the bottom-right corner.
    pub fn sized(rows: u8, cols: u8) -> BoardSpec {
        let mid = rows / 2;
        BoardSpec {
            rows,
            cols,
            start: Cell::new(mid, 0),
            goal: Cell::new(mid, cols.saturating_sub(1)),
            blank: Cell::new(rows.saturating_sub(1), cols.saturating_sub(1)),
        }
    }

    fn inside(&self, cell: Cell) -> bool {
        cell.row < self.rows && cell.col < self.cols
    }

    /// Check the configuration before building a board for `variant`.
    pub fn validate(&self, variant: Variant) -> Result<(), BoardError> {
        if self.rows < 2 || self.cols < 2 || self.rows > MAX_DIM || self.cols > MAX_DIM {
            return Err(BoardError::Dimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        for cell in [self.start, self.goal] {
            if !self.inside(cell) {
                return Err(BoardError::OutOfBounds(cell));
            }
        }
        if self.start == self.goal {
            return Err(BoardError::StartIsGoal);
        }
        if variant == Variant::Slide {
            if !self.inside(self.blank) {
                return Err(BoardError::OutOfBounds(self.blank));
            }
            if self.path().contains(&self.blank) {
                return Err(BoardError::BlankOnPath(self.blank));
            }
        }
        Ok(())
    }

    /// The guaranteed route: along the start row to the goal column, then
    /// along the goal column to the goal.
    pub fn path(&self) -> Vec<Cell> {
        let mut cells = vec![self.start];
        let mut cur = self.start;
        while cur.col != self.goal.col {
            cur.col = if cur.col < self.goal.col { cur.col + 1 } else { cur.col - 1 };
            cells.push(cur);
        }
        while cur.row != self.goal.row {
            cur.row = if cur.row < self.goal.row { cur.row + 1 } else { cur.row - 1 };
            cells.push(cur);
        }
        cells
    }
}

impl Default for BoardSpec {
    fn default() -> Self {
        BoardSpec::rotate_default()
    }
}

/// Invalid board configuration.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoardError {
    Dimensions { rows: u8, cols: u8 },
    OutOfBounds(Cell),
    StartIsGoal,
    BlankOnPath(Cell),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoardError::Dimensions { rows, cols } => {
                write!(f, "board must be between 2x2 and {0}x{0}, got {1}x{2}", MAX_DIM, rows, cols)
            }
            BoardError::OutOfBounds(cell) => {
                write!(f, "cell ({},{}) is outside the board", cell.row, cell.col)
            }
            BoardError::StartIsGoal => write!(f, "start and goal must differ"),
            BoardError::BlankOnPath(cell) => {
                write!(f, "blank ({},{}) lies on the start-goal path", cell.row, cell.col)
            }
        }
    }
}

impl std::error::Error for BoardError {}

/// A scrambled rotate board and the rotations that solve it.
#[derive(Clone, Debug)]
pub struct RotateBoard {
    pub grid: Grid,
    /// Known-good rotation for every tile on the guaranteed path.
    pub solution: Vec<(Cell, u8)>,
}

impl RotateBoard {
    /// Copy of the board with the path tiles turned back to their solved rotations.
    pub fn solved(&self) -> Grid {
        let mut grid = self.grid.clone();
        for &(cell, rotation) in &self.solution {
            let tile = grid.tile(cell);
            grid.set(cell, Tile::new(tile.shape, rotation));
        }
        grid
    }
}

/// A scrambled slide board together with the walk that produced it.
#[derive(Clone, Debug)]
pub struct SlideBoard {
    pub grid: Grid,
    pub blank: Cell,
    /// The layout before scrambling.
    pub solved: Grid,
    /// Blank positions visited, starting with the solved blank.
    pub trail: Vec<Cell>,
}

impl SlideBoard {
    /// Copy of the board with the scramble walk played backwards.
    pub fn unscrambled(&self) -> Grid {
        let mut grid = self.grid.clone();
        for pair in self.trail.windows(2).rev() {
            grid.swap(pair[1], pair[0]);
        }
        grid
    }
}

/// Tile that joins a path cell to its neighbors on the path.
fn path_tile(prev: Option<Dir>, next: Option<Dir>) -> Tile {
    match (prev, next) {
        // Endpoints are tees closed on the side facing away from the path.
        (None, Some(out)) => {
            let open = ALL_EDGES & !out.opposite().bit();
            Tile::new(Shape::Tee, Shape::Tee.orient(open))
        }
        (Some(inward), None) => {
            let open = ALL_EDGES & !inward.opposite().bit();
            Tile::new(Shape::Tee, Shape::Tee.orient(open))
        }
        (Some(a), Some(b)) => {
            let shape = if a.opposite() == b { Shape::Straight } else { Shape::Curve };
            Tile::new(shape, shape.orient(a.bit() | b.bit()))
        }
        (None, None) => Tile::new(Shape::Cross, 0),
    }
}

/// Random pipe tile for cells off the path.
pub fn random_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    let shape = Shape::PIPES[rng.random_range(0..Shape::PIPES.len())];
    Tile::new(shape, rng.random_range(0..4))
}

/// Solved layout: path tiles, random filler, and the blank for slide boards.
fn lay_out<R: Rng + ?Sized>(
    spec: &BoardSpec,
    variant: Variant,
    rng: &mut R,
) -> Result<(Grid, Vec<Cell>), BoardError> {
    spec.validate(variant)?;
    let mut grid = Grid::new(spec.rows, spec.cols, spec.start, spec.goal).ok_or(
        BoardError::Dimensions {
            rows: spec.rows,
            cols: spec.cols,
        },
    )?;

    let path = spec.path();
    for cell in grid.cells().collect::<Vec<_>>() {
        grid.set(cell, random_tile(rng));
    }
    for (i, &cell) in path.iter().enumerate() {
        let prev = i.checked_sub(1).and_then(|j| cell.dir_to(path[j]));
        let next = path.get(i + 1).and_then(|&n| cell.dir_to(n));
        grid.set(cell, path_tile(prev, next));
    }
    if variant == Variant::Slide {
        grid.set(spec.blank, Tile::EMPTY);
    }
    Ok((grid, path))
}

/// Give every tile a random rotation.
pub fn scramble_rotations<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) {
    for tile in grid.tiles_mut() {
        tile.rotation = rng.random_range(0..4);
    }
}

/// Cells that may slide into the blank.
pub fn slide_candidates(grid: &Grid, blank: Cell) -> Vec<Cell> {
    Dir::ALL
        .into_iter()
        .filter_map(|dir| blank.step(dir, grid.rows(), grid.cols()))
        .collect()
}

/// Apply `moves` random legal slides, recording each new blank in `trail`.
/// Returns the final blank.
pub fn scramble_slides<R: Rng + ?Sized>(
    grid: &mut Grid,
    mut blank: Cell,
    moves: u32,
    rng: &mut R,
    trail: &mut Vec<Cell>,
) -> Cell {
    for _ in 0..moves {
        let candidates = slide_candidates(grid, blank);
        if candidates.is_empty() {
            break;
        }
        let next = candidates[rng.random_range(0..candidates.len())];
        grid.swap(blank, next);
        blank = next;
        trail.push(blank);
    }
    blank
}

/// Build a rotate board: solved layout, then random rotations everywhere.
pub fn generate_rotate<R: Rng + ?Sized>(
    spec: &BoardSpec,
    rng: &mut R,
) -> Result<RotateBoard, BoardError> {
    let (mut grid, path) = lay_out(spec, Variant::Rotate, rng)?;
    let solution = path.iter().map(|&c| (c, grid.tile(c).rotation)).collect();

    for _ in 0..MAX_SCRAMBLE_ATTEMPTS {
        scramble_rotations(&mut grid, rng);
        if !grid.is_solved() {
            break;
        }
    }

    Ok(RotateBoard { grid, solution })
}

/// The solved slide layout, before any scrambling.
pub fn solved_slide_layout<R: Rng + ?Sized>(
    spec: &BoardSpec,
    rng: &mut R,
) -> Result<Grid, BoardError> {
    lay_out(spec, Variant::Slide, rng).map(|(grid, _)| grid)
}

/// Build a slide board: solved layout, then `moves` random blank slides.
pub fn generate_slide<R: Rng + ?Sized>(
    spec: &BoardSpec,
    moves: u32,
    rng: &mut R,
) -> Result<SlideBoard, BoardError> {
    let solved = solved_slide_layout(spec, rng)?;
    let mut grid = solved.clone();
    let mut blank = spec.blank;
    let mut trail = vec![blank];

    for _ in 0..MAX_SCRAMBLE_ATTEMPTS {
        blank = scramble_slides(&mut grid, blank, moves, rng, &mut trail);
        if !grid.is_solved() {
            break;
        }
    }

    Ok(SlideBoard {
        grid,
        blank,
        solved,
        trail,
    })
}
