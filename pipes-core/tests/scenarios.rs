//! End-to-end board scenarios through the public API.

use pipes_core::generate::{self, DEFAULT_SCRAMBLE_MOVES};
use pipes_core::{
    Activation, BoardSpec, Cell, Grid, Session, SessionConfig, Shape, Tile, Variant,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Solved slide layout with every filler tile turned into a horizontal
/// straight, so nothing but the row-2 corridor can reach the goal.
fn quiet_slide_layout() -> Grid {
    let spec = BoardSpec::slide_default();
    let mut grid = generate::solved_slide_layout(&spec, &mut StdRng::seed_from_u64(1)).unwrap();
    for cell in grid.cells().collect::<Vec<_>>() {
        if cell.row != 2 && cell != spec.blank {
            grid.set(cell, Tile::new(Shape::Straight, 1));
        }
    }
    grid
}

#[test]
fn test_rotate_row_three_corridor() {
    let spec = BoardSpec::rotate_default();
    for seed in 0..20 {
        let mut grid = generate::generate_rotate(&spec, &mut StdRng::seed_from_u64(seed))
            .unwrap()
            .grid;
        for col in 0..6 {
            grid.set(Cell::new(3, col), Tile::new(Shape::Straight, 1));
        }
        grid.set(Cell::new(3, 0), Tile::new(Shape::Tee, 1));
        grid.set(Cell::new(3, 5), Tile::new(Shape::Tee, 3));

        let reach = grid.connectivity();
        assert!(reach.is_solved(), "seed {}", seed);
        for col in 0..6 {
            assert!(reach.contains(Cell::new(3, col)));
        }
    }
}

#[test]
fn test_slide_layout_is_solved_before_scramble() {
    let spec = BoardSpec::slide_default();
    for seed in 0..20 {
        let grid = generate::solved_slide_layout(&spec, &mut StdRng::seed_from_u64(seed)).unwrap();
        assert!(grid.is_solved());
        assert_eq!(grid.find_blank(), Some(Cell::new(4, 4)));
    }
}

#[test]
fn test_slide_swap_then_break_row_two() {
    let mut session = Session::from_grid(Variant::Slide, quiet_slide_layout()).unwrap();
    assert_eq!(session.blank(), Some(Cell::new(4, 4)));
    assert!(session.reach().is_solved());

    // A swap along the bottom row leaves the corridor alone.
    assert!(session.activate(4, 3).is_accepted());
    assert_eq!(session.blank(), Some(Cell::new(4, 3)));
    assert!(session.reach().is_solved());
    assert_eq!(session.status().links, 5);

    // Walking the blank up into the corridor cuts it.
    assert!(session.activate(3, 3).is_accepted());
    assert!(session.activate(2, 3).is_accepted());
    assert_eq!(session.blank(), Some(Cell::new(2, 3)));
    assert!(!session.reach().is_solved());
    assert_eq!(session.status().links, 3);
    assert_eq!(session.moves(), 3);
}

#[test]
fn test_slide_blank_in_corridor_never_reached() {
    for seed in 0..20 {
        let spec = BoardSpec::slide_default();
        let grid = generate::solved_slide_layout(&spec, &mut StdRng::seed_from_u64(seed)).unwrap();
        let mut session = Session::from_grid(Variant::Slide, grid).unwrap();
        for (row, col) in [(3, 4), (2, 4), (2, 3)] {
            session.activate(row, col);
        }
        assert_eq!(session.blank(), Some(Cell::new(2, 3)));
        assert!(!session.reach().contains(Cell::new(2, 3)));
    }
}

#[test]
fn test_non_adjacent_slides_change_nothing() {
    let mut session = Session::new(SessionConfig::slide(), 77).unwrap();
    let blank = session.blank().unwrap();
    let grid = session.grid().clone();

    for cell in grid.cells() {
        if cell.manhattan(blank) == 1 {
            continue;
        }
        assert_eq!(session.activate(cell.row as i32, cell.col as i32), Activation::Ignored);
        assert_eq!(session.grid(), &grid);
        assert_eq!(session.blank(), Some(blank));
        assert_eq!(session.moves(), 0);
    }
}

#[test]
fn test_out_of_bounds_activation() {
    for config in [SessionConfig::rotate(), SessionConfig::slide()] {
        let mut session = Session::new(config, 3).unwrap();
        let rows = session.grid().rows() as i32;
        let cols = session.grid().cols() as i32;
        for (row, col) in [(-1, 0), (rows, 0), (0, cols), (0, -1)] {
            assert_eq!(session.activate(row, col), Activation::Ignored);
        }
        assert_eq!(session.moves(), 0);
    }
}

#[test]
fn test_status_is_idempotent() {
    let mut session = Session::new(SessionConfig::rotate(), 12).unwrap();
    session.activate(0, 0);
    let first = (session.status(), session.reach().clone());
    let second = (session.status(), session.reach().clone());
    assert_eq!(first, second);
    assert_eq!(session.grid().connectivity(), first.1);
}

#[test]
fn test_rotate_board_solved_by_recorded_rotations() {
    let spec = BoardSpec::rotate_default();
    for seed in 0..30 {
        let board = generate::generate_rotate(&spec, &mut StdRng::seed_from_u64(seed)).unwrap();
        let mut session = Session::from_grid(Variant::Rotate, board.grid.clone()).unwrap();
        let mut events = 0;

        // Turn each path tile until it reaches its recorded rotation.
        for &(cell, target) in &board.solution {
            while session.tile(cell).rotation != target {
                if let Activation::Solved(_) = session.activate(cell.row as i32, cell.col as i32) {
                    events += 1;
                }
            }
        }

        assert!(session.reach().is_solved(), "seed {}", seed);
        assert!(session.is_solved());
        assert!(events <= 1);
    }
}

#[test]
fn test_slide_board_solved_by_reversing_trail() {
    let spec = BoardSpec::slide_default();
    let board = generate::generate_slide(&spec, DEFAULT_SCRAMBLE_MOVES, &mut StdRng::seed_from_u64(8))
        .unwrap();
    let mut session = Session::from_grid(Variant::Slide, board.grid.clone()).unwrap();

    // Each earlier blank position is next to the current blank, so sliding it
    // back is always legal.
    for &cell in board.trail.iter().rev().skip(1) {
        assert!(session.activate(cell.row as i32, cell.col as i32).is_accepted());
    }

    assert_eq!(session.grid(), &board.solved);
    assert!(session.reach().is_solved());
    assert_eq!(session.moves() as usize, board.trail.len() - 1);
}
