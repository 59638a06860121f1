//! WASM bindings for pipes-core
//!
//! Provides a JavaScript-friendly API for the session controller.

use wasm_bindgen::prelude::*;

use crate::{Activation, BoardLayout, Grid, Session, SessionConfig, Variant};

/// WASM-friendly wrapper around Session
#[wasm_bindgen]
pub struct WasmSession {
    inner: Session,
    /// Latched when a move solves the board, cleared by `takeSolvedEvent`.
    solved_event: bool,
}

#[wasm_bindgen]
impl WasmSession {
    /// Create a session for "rotate" or "slide" with the default board.
    /// Unknown variants fall back to "rotate".
    #[wasm_bindgen(constructor)]
    pub fn new(variant: &str, seed: u64) -> Result<WasmSession, JsValue> {
        let variant = Variant::from_name(variant).unwrap_or(Variant::Rotate);
        let inner = Session::new(SessionConfig::for_variant(variant), seed)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(WasmSession {
            inner,
            solved_event: false,
        })
    }

    /// Create a session from a hex board code
    #[wasm_bindgen(js_name = fromCode)]
    pub fn from_code(variant: &str, code: &str) -> Result<WasmSession, JsValue> {
        let variant = Variant::from_name(variant).ok_or_else(|| JsValue::from_str("unknown variant"))?;
        let grid = Grid::from_hex(code).ok_or_else(|| JsValue::from_str("invalid board code"))?;
        let inner = Session::from_grid(variant, grid)
            .ok_or_else(|| JsValue::from_str("slide boards need exactly one blank"))?;
        Ok(WasmSession {
            inner,
            solved_event: false,
        })
    }

    /// Hex board code of the current tiles
    #[wasm_bindgen(js_name = toCode)]
    pub fn to_code(&self) -> String {
        self.inner.grid().to_hex()
    }

    pub fn rows(&self) -> u8 {
        self.inner.grid().rows()
    }

    pub fn cols(&self) -> u8 {
        self.inner.grid().cols()
    }

    /// Activate a cell. Returns true if the move was applied.
    #[wasm_bindgen(js_name = activateCell)]
    pub fn activate_cell(&mut self, row: i32, col: i32) -> bool {
        let result = self.inner.activate(row, col);
        self.record(result)
    }

    /// Activate the cell under a pointer position.
    #[wasm_bindgen(js_name = activateAt)]
    pub fn activate_at(
        &mut self,
        x: f32,
        y: f32,
        tile_size: f32,
        offset_x: f32,
        offset_y: f32,
    ) -> bool {
        let grid = self.inner.grid();
        let layout = BoardLayout::new(tile_size, offset_x, offset_y, grid.rows(), grid.cols());
        let result = self.inner.activate_at(&layout, x, y);
        self.record(result)
    }

    fn record(&mut self, result: Activation) -> bool {
        if let Activation::Solved(_) = result {
            self.solved_event = true;
        }
        result.is_accepted()
    }

    pub fn moves(&self) -> u32 {
        self.inner.moves()
    }

    /// Size of the reachable set
    pub fn links(&self) -> usize {
        self.inner.reach().len()
    }

    #[wasm_bindgen(js_name = isSolved)]
    pub fn is_solved(&self) -> bool {
        self.inner.is_solved()
    }

    /// True once after the move that solved the board
    #[wasm_bindgen(js_name = takeSolvedEvent)]
    pub fn take_solved_event(&mut self) -> bool {
        std::mem::take(&mut self.solved_event)
    }

    /// Tiles as a JSON array of { shape, rotation, mask, linked }, row-major
    pub fn tiles(&self) -> JsValue {
        let reach = self.inner.reach();
        let grid = self.inner.grid();
        let tiles: Vec<WasmTile> = grid
            .cells()
            .map(|cell| {
                let tile = grid.tile(cell);
                WasmTile {
                    shape: tile.shape,
                    rotation: tile.rotation,
                    mask: tile.mask(),
                    linked: reach.contains(cell),
                }
            })
            .collect();
        serde_wasm_bindgen::to_value(&tiles).unwrap_or(JsValue::NULL)
    }

    /// One byte per cell: 1 if connected to the start, row-major
    pub fn reachable(&self) -> Vec<u8> {
        self.inner.reach().flags().iter().map(|&f| f as u8).collect()
    }

    /// Blank cell as [row, col], or empty for rotate boards
    pub fn blank(&self) -> Vec<u8> {
        self.inner
            .blank()
            .map(|c| vec![c.row, c.col])
            .unwrap_or_default()
    }

    /// Undo the last move. Returns false if there was nothing to undo.
    /// A pending solved event is dropped once the board is no longer solved.
    pub fn undo(&mut self) -> bool {
        let undone = self.inner.undo();
        if !self.inner.is_solved() {
            self.solved_event = false;
        }
        undone
    }

    /// New board with the same settings
    pub fn reset(&mut self, seed: u64) -> Result<(), JsValue> {
        self.solved_event = false;
        self.inner
            .reset(seed)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

/// Serializable tile for JavaScript
#[derive(serde::Serialize)]
struct WasmTile {
    shape: crate::Shape,
    rotation: u8,
    mask: u8,
    linked: bool,
}
