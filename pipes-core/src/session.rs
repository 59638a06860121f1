//! Session controller: owns one board and applies player input to it.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::generate::{self, BoardError, BoardSpec, DEFAULT_SCRAMBLE_MOVES};
use crate::layout::BoardLayout;
use crate::{Cell, Grid, Reach, Tile, Variant};

/// Everything needed to (re)build a session's board.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    pub variant: Variant,
    pub spec: BoardSpec,
    /// Blank slides used to scramble slide boards.
    pub scramble_moves: u32,
    /// Ignore activations once the board has been solved.
    pub lock_on_solve: bool,
}

impl SessionConfig {
    pub fn rotate() -> SessionConfig {
        SessionConfig::for_variant(Variant::Rotate)
    }

    pub fn slide() -> SessionConfig {
        SessionConfig::for_variant(Variant::Slide)
    }

    pub fn for_variant(variant: Variant) -> SessionConfig {
        SessionConfig {
            variant,
            spec: BoardSpec::for_variant(variant),
            scramble_moves: DEFAULT_SCRAMBLE_MOVES,
            lock_on_solve: false,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig::rotate()
    }
}

/// What the presentation layer shows after each move.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct Status {
    pub moves: u32,
    /// Size of the reachable set.
    pub links: usize,
    pub solved: bool,
}

/// Result of activating a cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Activation {
    /// Out of range, not adjacent to the blank, or locked. Nothing changed.
    Ignored,
    /// The move was applied.
    Moved(Status),
    /// The move was applied and solved the board. Reported once per solve.
    Solved(Status),
}

impl Activation {
    #[inline]
    pub fn is_accepted(&self) -> bool {
        !matches!(self, Activation::Ignored)
    }

    #[inline]
    pub fn status(&self) -> Option<Status> {
        match self {
            Activation::Ignored => None,
            Activation::Moved(s) | Activation::Solved(s) => Some(*s),
        }
    }
}

/// An accepted move, kept for undo.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Step {
    Rotate(Cell),
    /// Tile slid from `from` into the blank at `to`.
    Slide { from: Cell, to: Cell },
}

/// A single game: board, counters, and solve state.
#[derive(Clone, Debug)]
pub struct Session {
    config: SessionConfig,
    grid: Grid,
    blank: Option<Cell>,
    moves: u32,
    history: Vec<Step>,
    reach: Reach,
    /// Move count at which the board was first solved.
    solved_at: Option<u32>,
}

impl Session {
    /// Generate a fresh board from `config`, seeded for reproducibility.
    pub fn new(config: SessionConfig, seed: u64) -> Result<Session, BoardError> {
        let (grid, blank) = Self::build(&config, seed)?;
        Ok(Self::start(config, grid, blank))
    }

    /// Play an existing board. Slide boards need exactly one blank.
    pub fn from_grid(variant: Variant, grid: Grid) -> Option<Session> {
        let blank = match variant {
            Variant::Rotate => None,
            Variant::Slide => {
                if grid.blank_count() != 1 {
                    return None;
                }
                Some(grid.find_blank()?)
            }
        };
        let spec = BoardSpec {
            rows: grid.rows(),
            cols: grid.cols(),
            start: grid.start(),
            goal: grid.goal(),
            blank: blank.unwrap_or(Cell::new(grid.rows() - 1, grid.cols() - 1)),
        };
        let config = SessionConfig {
            spec,
            ..SessionConfig::for_variant(variant)
        };
        Some(Self::start(config, grid, blank))
    }

    fn build(config: &SessionConfig, seed: u64) -> Result<(Grid, Option<Cell>), BoardError> {
        let mut rng = StdRng::seed_from_u64(seed);
        match config.variant {
            Variant::Rotate => {
                let board = generate::generate_rotate(&config.spec, &mut rng)?;
                Ok((board.grid, None))
            }
            Variant::Slide => {
                let board = generate::generate_slide(&config.spec, config.scramble_moves, &mut rng)?;
                Ok((board.grid, Some(board.blank)))
            }
        }
    }

    fn start(config: SessionConfig, grid: Grid, blank: Option<Cell>) -> Session {
        let reach = grid.connectivity();
        let solved_at = if reach.is_solved() { Some(0) } else { None };
        Session {
            config,
            grid,
            blank,
            moves: 0,
            history: Vec::new(),
            reach,
            solved_at,
        }
    }

    /// Discard the board and generate a new one with the same configuration.
    /// On error the current board is kept.
    pub fn reset(&mut self, seed: u64) -> Result<(), BoardError> {
        let (grid, blank) = Self::build(&self.config, seed)?;
        *self = Self::start(self.config, grid, blank);
        Ok(())
    }

    // ========== Mutation ==========

    /// Apply the variant's move to the tile at (`row`, `col`).
    ///
    /// Out-of-range cells, slides from cells not next to the blank, and input
    /// after a solve when `lock_on_solve` is set are ignored without any change.
    pub fn activate(&mut self, row: i32, col: i32) -> Activation {
        if self.config.lock_on_solve && self.solved_at.is_some() {
            return Activation::Ignored;
        }
        let Some(cell) = self.grid.contains(row, col) else {
            return Activation::Ignored;
        };

        let step = match self.config.variant {
            Variant::Rotate => {
                self.grid.rotate(cell);
                Step::Rotate(cell)
            }
            Variant::Slide => {
                let Some(blank) = self.blank else {
                    return Activation::Ignored;
                };
                if cell.manhattan(blank) != 1 {
                    return Activation::Ignored;
                }
                self.grid.swap(cell, blank);
                self.blank = Some(cell);
                Step::Slide {
                    from: cell,
                    to: blank,
                }
            }
        };

        self.history.push(step);
        self.moves += 1;
        self.refresh();

        let status = self.status();
        if self.solved_at.is_none() && self.reach.is_solved() {
            self.solved_at = Some(self.moves);
            Activation::Solved(Status {
                solved: true,
                ..status
            })
        } else {
            Activation::Moved(status)
        }
    }

    /// Map a pointer position through `layout`, then activate that cell.
    pub fn activate_at(&mut self, layout: &BoardLayout, x: f32, y: f32) -> Activation {
        match layout.cell_at(x, y) {
            Some((row, col)) => self.activate(row, col),
            None => Activation::Ignored,
        }
    }

    /// Revert the last accepted move. Returns false when there is nothing to undo.
    ///
    /// Undoing past the move that solved the board clears the solved flag.
    pub fn undo(&mut self) -> bool {
        let Some(step) = self.history.pop() else {
            return false;
        };
        match step {
            Step::Rotate(cell) => {
                let tile = self.grid.tile(cell);
                self.grid.set(cell, tile.rotated(3));
            }
            Step::Slide { from, to } => {
                self.grid.swap(from, to);
                self.blank = Some(to);
            }
        }
        self.moves -= 1;
        if self.solved_at.is_some_and(|at| at > self.moves) {
            self.solved_at = None;
        }
        self.refresh();
        true
    }

    fn refresh(&mut self) {
        self.reach = self.grid.connectivity();
    }

    // ========== Queries ==========

    pub fn status(&self) -> Status {
        Status {
            moves: self.moves,
            links: self.reach.len(),
            solved: self.solved_at.is_some(),
        }
    }

    #[inline]
    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// Check if the board has been solved since the last reset.
    #[inline]
    pub fn is_solved(&self) -> bool {
        self.solved_at.is_some()
    }

    /// Reachable set for the current tiles.
    #[inline]
    pub fn reach(&self) -> &Reach {
        &self.reach
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn tile(&self, cell: Cell) -> Tile {
        self.grid.tile(cell)
    }

    /// The blank cell on slide boards.
    #[inline]
    pub fn blank(&self) -> Option<Cell> {
        self.blank
    }

    #[inline]
    pub fn variant(&self) -> Variant {
        self.config.variant
    }

    #[inline]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shape;

    /// 1×3 corridor one quarter turn away from solved at the middle.
    fn almost_solved() -> Grid {
        let mut grid = Grid::new(1, 3, Cell::new(0, 0), Cell::new(0, 2)).unwrap();
        grid.set(Cell::new(0, 0), Tile::new(Shape::Tee, 1));
        grid.set(Cell::new(0, 1), Tile::new(Shape::Straight, 0));
        grid.set(Cell::new(0, 2), Tile::new(Shape::Tee, 3));
        grid
    }

    /// 2×3 slide board solved along row 0, blank at (1,2).
    fn slide_grid() -> Grid {
        let mut grid = Grid::new(2, 3, Cell::new(0, 0), Cell::new(0, 2)).unwrap();
        grid.set(Cell::new(0, 0), Tile::new(Shape::Tee, 1));
        grid.set(Cell::new(0, 1), Tile::new(Shape::Straight, 1));
        grid.set(Cell::new(0, 2), Tile::new(Shape::Tee, 3));
        grid.set(Cell::new(1, 0), Tile::new(Shape::Curve, 1));
        grid.set(Cell::new(1, 1), Tile::new(Shape::Cross, 0));
        grid
    }

    #[test]
    fn test_new_sessions_start_clean() {
        for config in [SessionConfig::rotate(), SessionConfig::slide()] {
            let session = Session::new(config, 9).unwrap();
            assert_eq!(session.moves(), 0);
            assert!(!session.can_undo());
            assert_eq!(session.status().links, session.reach().len());
        }
        let slide = Session::new(SessionConfig::slide(), 9).unwrap();
        let blank = slide.blank().unwrap();
        assert!(slide.tile(blank).is_empty());
        assert!(Session::new(SessionConfig::rotate(), 9).unwrap().blank().is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = SessionConfig::slide();
        config.spec.blank = Cell::new(2, 2);
        assert!(matches!(Session::new(config, 0), Err(BoardError::BlankOnPath(_))));
    }

    #[test]
    fn test_rotate_activation_solves_once() {
        let mut session = Session::from_grid(Variant::Rotate, almost_solved()).unwrap();
        assert!(!session.is_solved());
        assert_eq!(session.status().links, 1);

        match session.activate(0, 1) {
            Activation::Solved(status) => {
                assert_eq!(status, Status { moves: 1, links: 3, solved: true });
            }
            other => panic!("expected solve, got {:?}", other),
        }

        // Further moves stay permitted but never re-signal.
        for _ in 0..4 {
            assert!(matches!(session.activate(0, 1), Activation::Moved(_)));
        }
        assert_eq!(session.moves(), 5);
        assert!(session.is_solved());
    }

    #[test]
    fn test_lock_on_solve() {
        let mut session = Session::from_grid(Variant::Rotate, almost_solved()).unwrap();
        session.config.lock_on_solve = true;
        assert!(matches!(session.activate(0, 1), Activation::Solved(_)));
        assert_eq!(session.activate(0, 0), Activation::Ignored);
        assert_eq!(session.moves(), 1);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut session = Session::new(SessionConfig::rotate(), 1).unwrap();
        let before = session.grid().clone();
        for (row, col) in [(-1, 0), (0, -1), (6, 0), (0, 6), (i32::MIN, i32::MAX)] {
            assert_eq!(session.activate(row, col), Activation::Ignored);
        }
        assert_eq!(session.moves(), 0);
        assert_eq!(session.grid(), &before);
    }

    #[test]
    fn test_slide_requires_adjacency() {
        let mut session = Session::from_grid(Variant::Slide, slide_grid()).unwrap();
        assert_eq!(session.blank(), Some(Cell::new(1, 2)));
        assert!(session.is_solved());
        let before = session.grid().clone();

        // Diagonal, distance two, and the blank itself.
        for (row, col) in [(0, 1), (1, 0), (1, 2)] {
            assert_eq!(session.activate(row, col), Activation::Ignored);
        }
        assert_eq!(session.grid(), &before);
        assert_eq!(session.blank(), Some(Cell::new(1, 2)));
        assert_eq!(session.moves(), 0);

        let result = session.activate(1, 1);
        assert!(result.is_accepted());
        assert_eq!(session.blank(), Some(Cell::new(1, 1)));
        assert!(session.tile(Cell::new(1, 1)).is_empty());
        assert_eq!(session.tile(Cell::new(1, 2)).shape, Shape::Cross);
        assert_eq!(session.moves(), 1);
    }

    #[test]
    fn test_slide_breaking_the_path() {
        let mut session = Session::from_grid(Variant::Slide, slide_grid()).unwrap();
        // Pull the goal tee down into the blank.
        let result = session.activate(0, 2);
        assert_eq!(result.status().map(|s| s.links), Some(2));
        assert!(!session.reach().is_solved());
        // Already solved at creation, so the flag stays.
        assert!(session.is_solved());
    }

    #[test]
    fn test_from_grid_rejects_bad_blanks() {
        let mut grid = slide_grid();
        assert!(Session::from_grid(Variant::Slide, almost_solved()).is_none());
        grid.set(Cell::new(1, 1), Tile::EMPTY);
        assert!(Session::from_grid(Variant::Slide, grid.clone()).is_none());
        assert!(Session::from_grid(Variant::Rotate, grid).is_some());
    }

    #[test]
    fn test_undo_rotate_restores_and_unsolves() {
        let mut session = Session::from_grid(Variant::Rotate, almost_solved()).unwrap();
        let original = session.grid().clone();
        assert!(matches!(session.activate(0, 1), Activation::Solved(_)));

        assert!(session.undo());
        assert_eq!(session.grid(), &original);
        assert_eq!(session.moves(), 0);
        assert!(!session.is_solved());
        assert!(!session.undo());

        // Solving again signals again.
        assert!(matches!(session.activate(0, 1), Activation::Solved(_)));
    }

    #[test]
    fn test_undo_slide() {
        let mut session = Session::from_grid(Variant::Slide, slide_grid()).unwrap();
        let original = session.grid().clone();
        session.activate(1, 1);
        session.activate(1, 0);
        assert_eq!(session.blank(), Some(Cell::new(1, 0)));
        assert!(session.undo());
        assert!(session.undo());
        assert_eq!(session.grid(), &original);
        assert_eq!(session.blank(), Some(Cell::new(1, 2)));
        // Solved at creation survives undo.
        assert!(session.is_solved());
    }

    #[test]
    fn test_reset_rebuilds() {
        let mut session = Session::new(SessionConfig::slide(), 4).unwrap();
        let blank = session.blank().unwrap();
        let target = crate::generate::slide_candidates(session.grid(), blank)[0];
        session.activate(target.row as i32, target.col as i32);
        assert_eq!(session.moves(), 1);

        session.reset(4).unwrap();
        let fresh = Session::new(SessionConfig::slide(), 4).unwrap();
        assert_eq!(session.moves(), 0);
        assert!(!session.can_undo());
        assert_eq!(session.grid(), fresh.grid());
    }

    #[test]
    fn test_reset_failure_keeps_board() {
        let mut grid = slide_grid();
        grid.swap(Cell::new(1, 2), Cell::new(0, 2));
        // The imported blank now sits on the goal, so regeneration is refused.
        let mut session = Session::from_grid(Variant::Slide, grid.clone()).unwrap();
        assert!(session.reset(1).is_err());
        assert_eq!(session.grid(), &grid);
    }

    #[test]
    fn test_activate_at_uses_layout() {
        let mut session = Session::from_grid(Variant::Rotate, almost_solved()).unwrap();
        let layout = BoardLayout::new(40.0, 10.0, 20.0, 1, 3);
        assert_eq!(session.activate_at(&layout, 5.0, 25.0), Activation::Ignored);
        assert!(matches!(session.activate_at(&layout, 55.0, 30.0), Activation::Solved(_)));
    }
}
