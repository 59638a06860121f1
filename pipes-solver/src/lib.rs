//! Offline tooling for pipe boards: bulk generation, rotation search,
//! puzzle packs and terminal rendering.

pub mod pack;
pub mod render;
pub mod search;
pub mod stats;

use pipes_core::generate::{self, BoardError, SlideBoard, DEFAULT_SCRAMBLE_MOVES};
use pipes_core::{BoardSpec, Grid, Variant};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::search::{RotationSearch, SearchOutcome, SearchStats};

/// A generated board plus what the checks found.
#[derive(Debug)]
pub struct BoardReport {
    pub variant: Variant,
    pub seed: u64,
    pub grid: Grid,
    pub links: usize,
    /// Still solved after scrambling
    pub presolved: bool,
    /// Rotate boards only
    pub search: Option<(SearchOutcome, SearchStats)>,
    pub problems: Vec<String>,
}

/// Generate the board `seed` produces for `variant` on a `spec` board,
/// exactly as a fresh session would.
pub fn generate_board(variant: Variant, spec: &BoardSpec, seed: u64) -> Result<Grid, BoardError> {
    let mut rng = StdRng::seed_from_u64(seed);
    match variant {
        Variant::Rotate => generate::generate_rotate(spec, &mut rng).map(|b| b.grid),
        Variant::Slide => {
            generate::generate_slide(spec, DEFAULT_SCRAMBLE_MOVES, &mut rng).map(|b| b.grid)
        }
    }
}

/// Problems with a generated slide board: its solved layout must be solved,
/// replaying the scramble trail must restore that layout, and the board must
/// hold exactly one blank where the generator left it.
pub fn check_slide(board: &SlideBoard) -> Vec<String> {
    let mut problems = Vec::new();
    if !board.solved.is_solved() {
        problems.push("solved layout is not solved".to_string());
    }
    if board.unscrambled() != board.solved {
        problems.push("replaying the scramble does not restore the layout".to_string());
    }
    if board.grid.blank_count() != 1 || board.grid.find_blank() != Some(board.blank) {
        problems.push("blank bookkeeping is off".to_string());
    }
    problems
}

/// Generate one board and run every consistency check on it.
pub fn survey_board(
    variant: Variant,
    spec: &BoardSpec,
    seed: u64,
    search: &mut RotationSearch,
) -> Result<BoardReport, BoardError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut problems = Vec::new();

    let (grid, search_result) = match variant {
        Variant::Rotate => {
            let board = generate::generate_rotate(spec, &mut rng)?;
            if !board.solved().is_solved() {
                problems.push("recorded solution does not solve the board".to_string());
            }
            let outcome = search.solve(&board.grid);
            if let SearchOutcome::Solved(rotations) = &outcome {
                if !search::apply(&board.grid, rotations).is_solved() {
                    problems.push("search rotations do not solve the board".to_string());
                }
            }
            if outcome == SearchOutcome::Unsolvable {
                problems.push("search found no solution".to_string());
            }
            (board.grid, Some((outcome, search.stats)))
        }
        Variant::Slide => {
            let board = generate::generate_slide(spec, DEFAULT_SCRAMBLE_MOVES, &mut rng)?;
            problems.extend(check_slide(&board));
            (board.grid, None)
        }
    };

    if Grid::from_hex(&grid.to_hex()).as_ref() != Some(&grid) {
        problems.push("board code does not round-trip".to_string());
    }

    let reach = grid.connectivity();
    Ok(BoardReport {
        variant,
        seed,
        links: reach.len(),
        presolved: reach.is_solved(),
        grid,
        search: search_result,
        problems,
    })
}
