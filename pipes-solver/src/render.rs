//! Board rendering: box-drawing text for the terminal and SVG for graphics.

use pipes_core::{Dir, Grid, Mask, Reach};

// ============================================================================
// Text
// ============================================================================

/// Glyph for an open-edge mask. Heavy lines mark tiles linked to the start.
pub fn glyph(mask: Mask, linked: bool) -> char {
    const LIGHT: [char; 16] = [
        '·', '╵', '╶', '└', '╷', '│', '┌', '├', '╴', '┘', '─', '┴', '┐', '┤', '┬', '┼',
    ];
    const HEAVY: [char; 16] = [
        '·', '╹', '╺', '┗', '╻', '┃', '┏', '┣', '╸', '┛', '━', '┻', '┓', '┫', '┳', '╋',
    ];
    let idx = (mask & 0xF) as usize;
    if linked {
        HEAVY[idx]
    } else {
        LIGHT[idx]
    }
}

/// Board as text, one glyph per tile, with `S`/`G` markers beside the
/// start and goal rows.
pub fn render_text(grid: &Grid, reach: &Reach) -> String {
    let mut out = String::new();
    for row in 0..grid.rows() {
        let mut line = String::new();
        let mut marks = String::new();
        for cell in grid.cells().filter(|c| c.row == row) {
            line.push(glyph(grid.mask(cell), reach.contains(cell)));
            if cell == grid.start() {
                marks.push_str(&format!(" S@{}", cell.col));
            }
            if cell == grid.goal() {
                marks.push_str(&format!(" G@{}", cell.col));
            }
        }
        out.push_str(&line);
        out.push_str(&marks);
        out.push('\n');
    }
    out
}

// ============================================================================
// SVG
// ============================================================================

const CELL_SIZE: f32 = 64.0;
const CELL_GAP: f32 = 4.0;
const BOARD_PADDING: f32 = 12.0;
const CELL_RADIUS: f32 = 6.0;
const BOARD_RADIUS: f32 = 10.0;
const PIPE_WIDTH: f32 = 14.0;

const BG_COLOR: &str = "#1a1a1a";
const BOARD_BG: &str = "#2a2a2a";
const CELL_BG: &str = "#3a3a3a";
const PIPE_COLOR: &str = "#7f8c8d";
const LINKED_COLOR: &str = "#3498db";
const START_COLOR: &str = "#27ae60";
const GOAL_COLOR: &str = "#f39c12";
const SOLVED_BG: &str = "#2f3d2a";

/// Options for rendering
#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    /// Scale factor (1.0 = 64px cells)
    pub scale: f32,
    /// Color pipes connected to the start
    pub highlight_links: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            highlight_links: true,
        }
    }
}

/// Generate SVG for a board state
pub fn render_svg(grid: &Grid, reach: &Reach, opts: &RenderOptions) -> String {
    let scale = if opts.scale > 0.0 { opts.scale } else { 1.0 };
    let cols = grid.cols() as f32;
    let rows = grid.rows() as f32;

    let width = cols * CELL_SIZE + (cols - 1.0) * CELL_GAP + 2.0 * BOARD_PADDING;
    let height = rows * CELL_SIZE + (rows - 1.0) * CELL_GAP + 2.0 * BOARD_PADDING;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        width * scale,
        height * scale,
        width,
        height
    ));
    svg.push('\n');
    svg.push_str(&format!(r#"  <rect width="{}" height="{}" fill="{}"/>"#, width, height, BG_COLOR));
    svg.push('\n');
    let board_bg = if reach.is_solved() { SOLVED_BG } else { BOARD_BG };
    svg.push_str(&format!(
        r#"  <rect width="{}" height="{}" rx="{}" fill="{}"/>"#,
        width, height, BOARD_RADIUS, board_bg
    ));
    svg.push('\n');

    for cell in grid.cells() {
        let x = BOARD_PADDING + cell.col as f32 * (CELL_SIZE + CELL_GAP);
        let y = BOARD_PADDING + cell.row as f32 * (CELL_SIZE + CELL_GAP);

        let stroke = if cell == grid.start() {
            START_COLOR
        } else if cell == grid.goal() {
            GOAL_COLOR
        } else {
            "transparent"
        };
        svg.push_str(&format!(
            r#"  <rect x="{}" y="{}" width="{}" height="{}" rx="{}" fill="{}" stroke="{}" stroke-width="3"/>"#,
            x, y, CELL_SIZE, CELL_SIZE, CELL_RADIUS, CELL_BG, stroke
        ));
        svg.push('\n');

        let mask = grid.mask(cell);
        if mask == 0 {
            continue;
        }
        let color = if opts.highlight_links && reach.contains(cell) {
            LINKED_COLOR
        } else {
            PIPE_COLOR
        };

        // One arm from the center to the middle of each open edge.
        let cx = x + CELL_SIZE / 2.0;
        let cy = y + CELL_SIZE / 2.0;
        for dir in Dir::ALL {
            if mask & dir.bit() == 0 {
                continue;
            }
            let (ex, ey) = match dir {
                Dir::Top => (cx, y),
                Dir::Right => (x + CELL_SIZE, cy),
                Dir::Bottom => (cx, y + CELL_SIZE),
                Dir::Left => (x, cy),
            };
            svg.push_str(&format!(
                r#"  <line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}" stroke-linecap="round"/>"#,
                cx, cy, ex, ey, color, PIPE_WIDTH
            ));
            svg.push('\n');
        }
        svg.push_str(&format!(
            r#"  <circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
            cx,
            cy,
            PIPE_WIDTH / 2.0,
            color
        ));
        svg.push('\n');
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipes_core::{Cell, Shape, Tile, BOTTOM, LEFT, RIGHT, TOP};

    fn corridor() -> Grid {
        let mut grid = Grid::new(2, 3, Cell::new(0, 0), Cell::new(0, 2)).unwrap();
        grid.set(Cell::new(0, 0), Tile::new(Shape::Tee, 1));
        grid.set(Cell::new(0, 1), Tile::new(Shape::Straight, 1));
        grid.set(Cell::new(0, 2), Tile::new(Shape::Tee, 3));
        grid.set(Cell::new(1, 0), Tile::new(Shape::Curve, 0));
        grid.set(Cell::new(1, 1), Tile::new(Shape::Cross, 0));
        grid
    }

    #[test]
    fn test_glyphs() {
        assert_eq!(glyph(TOP | BOTTOM, false), '│');
        assert_eq!(glyph(LEFT | RIGHT, true), '━');
        assert_eq!(glyph(TOP | RIGHT, false), '└');
        assert_eq!(glyph(0xF, true), '╋');
        assert_eq!(glyph(0, false), '·');
    }

    #[test]
    fn test_render_text() {
        let grid = corridor();
        let reach = grid.connectivity();
        assert!(reach.is_solved());
        // Row 1 is linked through the start tee's bottom edge.
        assert_eq!(render_text(&grid, &reach), "┣━┫ S@0 G@2\n┗╋·\n");
    }

    #[test]
    fn test_render_svg_arms() {
        let grid = corridor();
        let reach = grid.connectivity();
        let svg = render_svg(&grid, &reach, &RenderOptions::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>\n"));

        let expected: usize = grid.cells().map(|c| grid.mask(c).count_ones() as usize).sum();
        assert_eq!(svg.matches("<line").count(), expected);
        assert!(svg.contains(LINKED_COLOR));
        assert!(svg.contains(SOLVED_BG));

        // One element per line.
        for line in svg.lines() {
            assert!(line.trim_start().starts_with('<') && line.ends_with('>'), "{}", line);
        }
    }
}
