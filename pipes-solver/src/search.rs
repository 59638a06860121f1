//! Iterative depth-first search for a rotation that links start to goal.
//!
//! Tiles only ever turn in place on a rotate board, so a board is solvable
//! exactly when some simple path from start to goal visits cells whose shapes
//! can each be turned to cover the two edges the path uses. The search walks
//! such paths with an explicit stack and reports the rotations for the first
//! one it completes.

use pipes_core::{rotate_mask, Cell, Dir, Grid, Mask, Shape};

/// Default cap on expanded cells before the search gives up.
pub const DEFAULT_NODE_LIMIT: u64 = 2_000_000;

/// Result of a rotation search.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SearchOutcome {
    /// Rotations for every cell on the found path, start first.
    Solved(Vec<(Cell, u8)>),
    /// Every simple path was tried.
    Unsolvable,
    /// The node limit ran out first.
    GaveUp,
}

impl SearchOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, SearchOutcome::Solved(_))
    }
}

/// Stack frame: one cell on the current path.
struct Frame {
    cell: Cell,
    /// Edge of `cell` facing the previous frame (None for the start)
    inward: Option<Dir>,
    /// Exits to try, nearest to the goal first
    dirs: [Dir; 4],
    /// Index into dirs
    dir_idx: usize,
}

impl Frame {
    fn new(cell: Cell, inward: Option<Dir>, goal: Cell) -> Self {
        let mut dirs = Dir::ALL;
        dirs.sort_by_key(|&dir| {
            let (dr, dc) = dir.delta();
            let row = cell.row as i32 + dr;
            let col = cell.col as i32 + dc;
            (row - goal.row as i32).abs() + (col - goal.col as i32).abs()
        });
        Self {
            cell,
            inward,
            dirs,
            dir_idx: 0,
        }
    }
}

/// Search counters, reset on every call to `solve`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchStats {
    pub nodes: u64,
    pub max_depth: usize,
}

pub struct RotationSearch {
    pub node_limit: u64,
    pub stats: SearchStats,
}

/// Whether some rotation of `shape` opens every edge in `needed`.
#[inline]
fn fits(shape: Shape, needed: Mask) -> bool {
    (0..4).any(|r| rotate_mask(shape.base_mask(), r) & needed == needed)
}

/// Whether `goal` can still be reached from `from` through unvisited,
/// non-empty cells, ignoring tile shapes.
fn goal_reachable(grid: &Grid, visited: &[bool], from: Cell) -> bool {
    let goal = grid.goal();
    let mut seen = visited.to_vec();
    let mut stack = vec![from];
    seen[grid.index(from)] = true;

    while let Some(cell) = stack.pop() {
        if cell == goal {
            return true;
        }
        for dir in Dir::ALL {
            if let Some(next) = cell.step(dir, grid.rows(), grid.cols()) {
                let idx = grid.index(next);
                if !seen[idx] && !grid.tile(next).is_empty() {
                    seen[idx] = true;
                    stack.push(next);
                }
            }
        }
    }
    false
}

impl RotationSearch {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_NODE_LIMIT)
    }

    pub fn with_limit(node_limit: u64) -> Self {
        Self {
            node_limit,
            stats: SearchStats::default(),
        }
    }

    /// Search `grid` for a start-to-goal path reachable by rotations alone.
    /// Current rotations are ignored; only shapes matter.
    pub fn solve(&mut self, grid: &Grid) -> SearchOutcome {
        self.stats = SearchStats::default();

        let (rows, cols) = (grid.rows(), grid.cols());
        let goal = grid.goal();
        let mut visited = vec![false; grid.len()];
        visited[grid.index(grid.start())] = true;

        let mut stack = vec![Frame::new(grid.start(), None, goal)];

        while let Some(frame) = stack.last_mut() {
            if frame.cell == goal {
                return SearchOutcome::Solved(Self::rotations(grid, &stack));
            }

            if frame.dir_idx >= frame.dirs.len() {
                visited[grid.index(frame.cell)] = false;
                stack.pop();
                continue;
            }

            let out = frame.dirs[frame.dir_idx];
            frame.dir_idx += 1;

            if frame.inward == Some(out) {
                continue;
            }
            let needed = frame.inward.map_or(0, Dir::bit) | out.bit();
            if !fits(grid.tile(frame.cell).shape, needed) {
                continue;
            }
            let Some(next) = frame.cell.step(out, rows, cols) else {
                continue;
            };
            if visited[grid.index(next)] || !fits(grid.tile(next).shape, out.opposite().bit()) {
                continue;
            }

            self.stats.nodes += 1;
            if self.stats.nodes > self.node_limit {
                return SearchOutcome::GaveUp;
            }

            if !goal_reachable(grid, &visited, next) {
                continue;
            }

            visited[grid.index(next)] = true;
            stack.push(Frame::new(next, Some(out.opposite()), goal));
            self.stats.max_depth = self.stats.max_depth.max(stack.len());
        }

        SearchOutcome::Unsolvable
    }

    /// Rotation for each frame covering the edges its path segment uses.
    fn rotations(grid: &Grid, stack: &[Frame]) -> Vec<(Cell, u8)> {
        stack
            .iter()
            .enumerate()
            .map(|(i, frame)| {
                let outward = stack
                    .get(i + 1)
                    .and_then(|next| frame.cell.dir_to(next.cell))
                    .map_or(0, Dir::bit);
                let needed = frame.inward.map_or(0, Dir::bit) | outward;
                (frame.cell, grid.tile(frame.cell).shape.orient(needed))
            })
            .collect()
    }
}

impl Default for RotationSearch {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply the rotations from a solved search to a copy of `grid`.
pub fn apply(grid: &Grid, rotations: &[(Cell, u8)]) -> Grid {
    let mut out = grid.clone();
    for &(cell, rotation) in rotations {
        let tile = out.tile(cell);
        out.set(cell, pipes_core::Tile::new(tile.shape, rotation));
    }
    out
}
