//! Hand-built board fixtures
//!
//! Loads boards drawn as text from `fixtures/boards.json` and checks the
//! solver's reachable-set size and solve flag for each one.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use pipes_core::{Cell, Grid, Shape, Tile};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct FixtureFile {
    version: String,
    boards: Vec<FixtureBoard>,
}

#[derive(Debug, Deserialize)]
struct FixtureBoard {
    name: String,
    rows: u8,
    cols: u8,
    start: [u8; 2],
    goal: [u8; 2],
    /// One string per row, tokens like "T1" (shape letter + rotation) or "."
    tiles: Vec<String>,
    links: usize,
    solved: bool,
}

fn parse_tile(token: &str) -> Tile {
    if token == "." {
        return Tile::EMPTY;
    }
    let mut chars = token.chars();
    let shape = match chars.next() {
        Some('S') => Shape::Straight,
        Some('C') => Shape::Curve,
        Some('T') => Shape::Tee,
        Some('X') => Shape::Cross,
        other => panic!("Invalid shape letter: {:?}", other),
    };
    let rotation: u8 = chars.as_str().parse().expect("rotation digit");
    Tile::new(shape, rotation)
}

fn build(board: &FixtureBoard) -> Grid {
    let start = Cell::new(board.start[0], board.start[1]);
    let goal = Cell::new(board.goal[0], board.goal[1]);
    let mut grid = Grid::new(board.rows, board.cols, start, goal).expect("valid fixture header");
    assert_eq!(board.tiles.len(), board.rows as usize, "{}: row count", board.name);
    for (row, line) in board.tiles.iter().enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        assert_eq!(tokens.len(), board.cols as usize, "{}: row {} width", board.name, row);
        for (col, token) in tokens.into_iter().enumerate() {
            grid.set(Cell::new(row as u8, col as u8), parse_tile(token));
        }
    }
    grid
}

fn load_fixtures() -> FixtureFile {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/boards.json");
    let file = File::open(&path).expect("Failed to open fixture file");
    serde_json::from_reader(BufReader::new(file)).expect("Failed to parse JSON")
}

#[test]
fn test_fixture_boards() {
    let fixtures = load_fixtures();
    assert_eq!(fixtures.version, "1");
    assert!(!fixtures.boards.is_empty());

    let mut failures = Vec::new();
    for board in &fixtures.boards {
        let grid = build(board);
        let reach = grid.connectivity();
        if reach.len() != board.links || reach.is_solved() != board.solved {
            failures.push(format!(
                "{}: expected links={} solved={}, got links={} solved={}",
                board.name,
                board.links,
                board.solved,
                reach.len(),
                reach.is_solved()
            ));
        }
    }

    assert!(failures.is_empty(), "Fixture mismatches:\n{}", failures.join("\n"));
}

#[test]
fn test_fixture_boards_survive_board_code() {
    for board in &load_fixtures().boards {
        let grid = build(board);
        let decoded = Grid::from_hex(&grid.to_hex()).expect("decodable code");
        assert_eq!(decoded.connectivity(), grid.connectivity(), "{}", board.name);
    }
}

#[test]
fn test_fixture_masks_agree_on_every_link() {
    // Every pair of linked neighbors must have both facing edges open.
    for board in &load_fixtures().boards {
        let grid = build(board);
        let reach = grid.connectivity();
        for &cell in reach.cells() {
            for dir in pipes_core::Dir::ALL {
                if let Some(next) = grid.linked(cell, dir) {
                    assert!(grid.tile(cell).opens(dir));
                    assert!(grid.tile(next).opens(dir.opposite()));
                    assert!(reach.contains(next), "{}: {:?} not reached", board.name, next);
                }
            }
        }
    }
}
