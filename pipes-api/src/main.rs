//! Pipe Puzzle Web API
//!
//! Serves one shared session over JSON for front ends that do not load the
//! WASM build of pipes-core. Every request locks the session, so moves are
//! applied one at a time.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use pipes_core::{Activation, BoardSpec, Grid, Session, SessionConfig, Shape, Variant};

const BIND_ADDR: &str = "0.0.0.0:8000";

// =============================================================================
// State
// =============================================================================

struct AppStateInner {
    session: Mutex<Session>,
}

type AppState = Arc<AppStateInner>;

impl AppStateInner {
    fn new(session: Session) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }

    /// Lock the session, ignoring poisoning.
    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// JSON Models
// =============================================================================

#[derive(Serialize)]
struct TileModel {
    shape: Shape,
    rotation: u8,
    mask: u8,
    linked: bool,
}

#[derive(Serialize)]
struct GameStateModel {
    variant: Variant,
    rows: u8,
    cols: u8,
    start: (u8, u8),
    goal: (u8, u8),
    /// Blank cell, slide boards only
    #[serde(skip_serializing_if = "Option::is_none")]
    blank: Option<(u8, u8)>,
    tiles: Vec<Vec<TileModel>>,
    moves: u32,
    links: usize,
    solved: bool,
    can_undo: bool,
    code: String,
}

#[derive(Serialize)]
struct ActivateModel {
    accepted: bool,
    /// True only for the move that solved the board
    just_solved: bool,
    game: GameStateModel,
}

#[derive(Deserialize)]
struct ActivateRequest {
    row: i32,
    col: i32,
}

#[derive(Deserialize, Default)]
struct ResetRequest {
    variant: Option<String>,
    seed: Option<u64>,
    rows: Option<u8>,
    cols: Option<u8>,
}

#[derive(Serialize)]
struct ExportModel {
    variant: Variant,
    code: String,
}

#[derive(Deserialize)]
struct ImportRequest {
    code: String,
    variant: String,
}

#[derive(Serialize)]
struct HealthModel {
    status: String,
}

#[derive(Serialize)]
struct ErrorModel {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorModel>);

fn bad_request(detail: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorModel {
            detail: detail.into(),
        }),
    )
}

// =============================================================================
// Conversion Functions
// =============================================================================

fn session_to_model(session: &Session) -> GameStateModel {
    let grid = session.grid();
    let reach = session.reach();
    let status = session.status();

    let tiles = (0..grid.rows())
        .map(|row| {
            grid.cells()
                .filter(|cell| cell.row == row)
                .map(|cell| {
                    let tile = grid.tile(cell);
                    TileModel {
                        shape: tile.shape,
                        rotation: tile.rotation,
                        mask: tile.mask(),
                        linked: reach.contains(cell),
                    }
                })
                .collect()
        })
        .collect();

    GameStateModel {
        variant: session.variant(),
        rows: grid.rows(),
        cols: grid.cols(),
        start: (grid.start().row, grid.start().col),
        goal: (grid.goal().row, grid.goal().col),
        blank: session.blank().map(|c| (c.row, c.col)),
        tiles,
        moves: status.moves,
        links: status.links,
        solved: status.solved,
        can_undo: session.can_undo(),
        code: grid.to_hex(),
    }
}

fn parse_variant(name: &str) -> Result<Variant, ApiError> {
    Variant::from_name(name).ok_or_else(|| {
        bad_request(format!("Unknown variant: {} (expected rotate or slide)", name))
    })
}

/// Session configuration for a reset request, starting from the current one.
fn reset_config(current: &SessionConfig, req: &ResetRequest) -> Result<SessionConfig, ApiError> {
    let variant = match &req.variant {
        Some(name) => parse_variant(name)?,
        None => current.variant,
    };
    let mut config = if variant == current.variant {
        *current
    } else {
        SessionConfig::for_variant(variant)
    };
    if req.rows.is_some() || req.cols.is_some() {
        let rows = req.rows.unwrap_or(config.spec.rows);
        let cols = req.cols.unwrap_or(config.spec.cols);
        config.spec = BoardSpec::sized(rows, cols);
    }
    Ok(config)
}

// =============================================================================
// API Endpoints
// =============================================================================

async fn get_game(State(state): State<AppState>) -> Json<GameStateModel> {
    let session = state.session();
    Json(session_to_model(&session))
}

async fn activate(
    State(state): State<AppState>,
    Json(req): Json<ActivateRequest>,
) -> Json<ActivateModel> {
    let mut session = state.session();
    let result = session.activate(req.row, req.col);
    Json(ActivateModel {
        accepted: result.is_accepted(),
        just_solved: matches!(result, Activation::Solved(_)),
        game: session_to_model(&session),
    })
}

async fn reset_game(
    State(state): State<AppState>,
    body: Option<Json<ResetRequest>>,
) -> Result<Json<GameStateModel>, ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let mut session = state.session();

    let config = reset_config(session.config(), &req)?;
    let seed = req.seed.unwrap_or_else(rand::random);
    let fresh = Session::new(config, seed).map_err(|e| bad_request(e.to_string()))?;
    *session = fresh;

    Ok(Json(session_to_model(&session)))
}

async fn undo(State(state): State<AppState>) -> Result<Json<GameStateModel>, ApiError> {
    let mut session = state.session();
    if !session.undo() {
        return Err(bad_request("Nothing to undo"));
    }
    Ok(Json(session_to_model(&session)))
}

async fn export_game(State(state): State<AppState>) -> Json<ExportModel> {
    let session = state.session();
    Json(ExportModel {
        variant: session.variant(),
        code: session.grid().to_hex(),
    })
}

async fn import_game(
    State(state): State<AppState>,
    Json(req): Json<ImportRequest>,
) -> Result<Json<GameStateModel>, ApiError> {
    let variant = parse_variant(&req.variant)?;
    let grid = Grid::from_hex(req.code.trim()).ok_or_else(|| bad_request("Invalid board code"))?;
    let imported = Session::from_grid(variant, grid)
        .ok_or_else(|| bad_request("Slide boards need exactly one blank tile"))?;

    let mut session = state.session();
    *session = imported;
    Ok(Json(session_to_model(&session)))
}

async fn health() -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_string(),
    })
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/game", get(get_game))
        .route("/activate", post(activate))
        .route("/reset", post(reset_game))
        .route("/undo", post(undo))
        .route("/export", get(export_game))
        .route("/import", post(import_game))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() {
    let session = match Session::new(SessionConfig::default(), rand::random()) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Failed to build the starting board: {}", e);
            std::process::exit(1);
        }
    };
    let state: AppState = Arc::new(AppStateInner::new(session));

    let listener = match tokio::net::TcpListener::bind(BIND_ADDR).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", BIND_ADDR, e);
            std::process::exit(1);
        }
    };
    println!("Pipes API running on http://localhost:8000");
    if let Err(e) = axum::serve(listener, router(state)).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(variant: Variant, seed: u64) -> AppState {
        let session = Session::new(SessionConfig::for_variant(variant), seed).unwrap();
        Arc::new(AppStateInner::new(session))
    }

    #[tokio::test]
    async fn test_game_model_shape() {
        let state = state(Variant::Rotate, 5);
        let Json(game) = get_game(State(state)).await;
        assert_eq!((game.rows, game.cols), (6, 6));
        assert_eq!(game.tiles.len(), 6);
        assert!(game.tiles.iter().all(|row| row.len() == 6));
        assert_eq!(game.start, (3, 0));
        assert_eq!(game.goal, (3, 5));
        assert!(game.blank.is_none());
        assert_eq!(game.moves, 0);
        assert!(!game.can_undo);
        assert_eq!(game.links, game.tiles.iter().flatten().filter(|t| t.linked).count());
    }

    #[tokio::test]
    async fn test_game_json_fields() {
        let Json(rotate) = get_game(State(state(Variant::Rotate, 3))).await;
        let json = serde_json::to_value(&rotate).unwrap();
        assert_eq!(json["variant"], "rotate");
        assert_eq!(json["start"], serde_json::json!([3, 0]));
        assert!(json.get("blank").is_none());
        assert!(json["tiles"][0][0]["shape"].is_string());

        let Json(slide) = get_game(State(state(Variant::Slide, 3))).await;
        let json = serde_json::to_value(&slide).unwrap();
        assert_eq!(json["variant"], "slide");
        assert!(json["blank"].is_array());
    }

    #[tokio::test]
    async fn test_activate_then_undo() {
        let state = state(Variant::Rotate, 9);
        let Json(before) = get_game(State(state.clone())).await;

        let Json(moved) = activate(State(state.clone()), Json(ActivateRequest { row: 0, col: 0 })).await;
        assert!(moved.accepted);
        assert_eq!(moved.game.moves, 1);
        assert_eq!(moved.game.tiles[0][0].rotation, (before.tiles[0][0].rotation + 1) % 4);

        let Json(undone) = undo(State(state.clone())).await.ok().unwrap();
        assert_eq!(undone.code, before.code);
        assert_eq!(undone.moves, 0);

        let (status, _) = undo(State(state)).await.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_just_solved_fires_on_the_solving_move() {
        // 1×3 corridor: tee, vertical straight, tee. One turn of the middle solves it.
        let state = state(Variant::Rotate, 0);
        let req = ImportRequest {
            code: "0103000000020a001a".to_string(),
            variant: "rotate".to_string(),
        };
        let Json(game) = import_game(State(state.clone()), Json(req)).await.ok().unwrap();
        assert!(!game.solved);

        let Json(solving) = activate(State(state.clone()), Json(ActivateRequest { row: 0, col: 1 })).await;
        assert!(solving.accepted);
        assert!(solving.just_solved);
        assert!(solving.game.solved);
        assert_eq!(solving.game.links, 3);

        let Json(after) = activate(State(state), Json(ActivateRequest { row: 0, col: 1 })).await;
        assert!(!after.just_solved);
        assert!(after.game.solved);
    }

    #[tokio::test]
    async fn test_out_of_range_activation_is_not_an_error() {
        let state = state(Variant::Slide, 2);
        let Json(result) = activate(State(state), Json(ActivateRequest { row: -1, col: 99 })).await;
        assert!(!result.accepted);
        assert!(!result.just_solved);
        assert_eq!(result.game.moves, 0);
        assert!(result.game.blank.is_some());
    }

    #[tokio::test]
    async fn test_reset_switches_variant_and_size() {
        let state = state(Variant::Rotate, 1);
        let req = ResetRequest {
            variant: Some("slide".to_string()),
            seed: Some(4),
            rows: Some(7),
            cols: None,
        };
        let Json(game) = reset_game(State(state.clone()), Some(Json(req))).await.ok().unwrap();
        assert_eq!(game.variant, Variant::Slide);
        assert_eq!((game.rows, game.cols), (7, 5));
        assert_eq!(game.blank.map(|_| ()), Some(()));

        let bad = ResetRequest {
            variant: Some("spin".to_string()),
            ..Default::default()
        };
        assert!(reset_game(State(state.clone()), Some(Json(bad))).await.is_err());

        let too_small = ResetRequest {
            rows: Some(1),
            ..Default::default()
        };
        assert!(reset_game(State(state), Some(Json(too_small))).await.is_err());
    }

    #[tokio::test]
    async fn test_export_import_roundtrip() {
        let source = state(Variant::Slide, 11);
        let Json(exported) = export_game(State(source)).await;

        let target = state(Variant::Rotate, 0);
        let req = ImportRequest {
            code: exported.code.clone(),
            variant: "slide".to_string(),
        };
        let Json(game) = import_game(State(target), Json(req)).await.ok().unwrap();
        assert_eq!(game.code, exported.code);
        assert_eq!(game.variant, Variant::Slide);

        let garbage = ImportRequest {
            code: "zz".to_string(),
            variant: "rotate".to_string(),
        };
        let (status, _) = import_game(State(state(Variant::Rotate, 0)), Json(garbage))
            .await
            .err()
            .unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
