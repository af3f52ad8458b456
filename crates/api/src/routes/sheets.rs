//! Sheet, view, cell and board endpoints.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `/api/sheets` | `list_sheets` |
//! | `POST` | `/api/sheets` | `create_sheet` |
//! | `GET` | `/api/board` | `board` |
//! | `GET` | `/api/sheets/:id` | `get_sheet` |
//! | `PUT` | `/api/sheets/:id` | `open_sheet` |
//! | `PATCH` | `/api/sheets/:id` | `update_meta` |
//! | `PUT` | `/api/sheets/:id/stage` | `set_stage` |
//! | `GET` | `/api/sheets/:id/views/:view` | `get_view` |
//! | `POST` | `/api/sheets/:id/cells` | `edit_cell` |
//! | `DELETE` | `/api/sheets/:id/cells` | `clear_cell` |
//! | `GET` | `/api/sheets/:id/print/:view` | `print_document` |

use std::collections::BTreeMap;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use shopfloor_core::{Projection, SheetId, SheetMeta, Stage, View};
use shopfloor_engine::{
    BoardColumn, CellEdit, CellTarget, PrintDocument, SheetDocument, SheetSummary, StoredCell,
};

use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateSheetRequest {
    #[serde(default)]
    pub meta: SheetMeta,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedSheet {
    pub id: SheetId,
}

#[derive(Debug, Serialize)]
pub struct SheetList {
    pub sheets: Vec<SheetSummary>,
}

#[derive(Debug, Serialize)]
pub struct Board {
    pub columns: Vec<BoardColumn>,
}

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    pub id: SheetId,
    pub meta: SheetMeta,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StageRequest {
    pub stage: Stage,
}

#[derive(Debug, Serialize)]
pub struct StageResponse {
    pub id: SheetId,
    pub stage: Stage,
}

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub removed: bool,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sheets", get(list_sheets).post(create_sheet))
        .route("/api/board", get(board))
        .route(
            "/api/sheets/:id",
            get(get_sheet).put(open_sheet).patch(update_meta),
        )
        .route("/api/sheets/:id/stage", put(set_stage))
        .route("/api/sheets/:id/views/:view", get(get_view))
        .route("/api/sheets/:id/cells", post(edit_cell).delete(clear_cell))
        .route("/api/sheets/:id/print/:view", get(print_document))
}

// ---------------------------------------------------------------------------
// Extraction helpers
// ---------------------------------------------------------------------------

fn sheet_id(raw: &str) -> Result<SheetId, AppError> {
    Ok(raw.parse::<SheetId>()?)
}

fn view(raw: &str) -> Result<View, AppError> {
    Ok(View::parse(raw)?)
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/sheets
async fn list_sheets(State(state): State<AppState>) -> Result<Json<SheetList>, AppError> {
    let sheets = state.workbench.lock().list_sheets()?;
    Ok(Json(SheetList { sheets }))
}

/// POST /api/sheets: an empty body creates a sheet with blank metadata.
async fn create_sheet(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let req: CreateSheetRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CreateSheetRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::bad_request(e.to_string()))?
    };
    let id = state.workbench.lock().create_sheet(req.meta)?;
    Ok((StatusCode::CREATED, Json(CreatedSheet { id })))
}

/// GET /api/board
async fn board(State(state): State<AppState>) -> Result<Json<Board>, AppError> {
    let columns = state.workbench.lock().board()?;
    Ok(Json(Board { columns }))
}

/// GET /api/sheets/:id: never creates the sheet.
async fn get_sheet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SheetDocument>, AppError> {
    let id = sheet_id(&id)?;
    let document = state.workbench.lock().document(id)?;
    Ok(Json(document))
}

/// PUT /api/sheets/:id: creates the sheet on first reference.
async fn open_sheet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SheetDocument>, AppError> {
    let id = sheet_id(&id)?;
    let snapshot = state.workbench.lock().get_or_create_sheet(id)?;
    Ok(Json(SheetDocument::from(&snapshot)))
}

/// PATCH /api/sheets/:id
async fn update_meta(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<BTreeMap<String, String>>, JsonRejection>,
) -> Result<Json<MetaResponse>, AppError> {
    let id = sheet_id(&id)?;
    let fields = json_body(body)?;
    let meta = state.workbench.lock().update_meta(id, fields)?;
    Ok(Json(MetaResponse { id, meta }))
}

/// PUT /api/sheets/:id/stage
async fn set_stage(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<StageRequest>, JsonRejection>,
) -> Result<Json<StageResponse>, AppError> {
    let id = sheet_id(&id)?;
    let StageRequest { stage } = json_body(body)?;
    state.workbench.lock().set_stage(id, stage)?;
    Ok(Json(StageResponse { id, stage }))
}

/// GET /api/sheets/:id/views/:view
async fn get_view(
    State(state): State<AppState>,
    Path((id, view_name)): Path<(String, String)>,
) -> Result<Json<Projection>, AppError> {
    let id = sheet_id(&id)?;
    let view = view(&view_name)?;
    let projection = state.workbench.lock().view(id, view)?;
    Ok(Json(projection))
}

/// POST /api/sheets/:id/cells
async fn edit_cell(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<CellEdit>, JsonRejection>,
) -> Result<Json<StoredCell>, AppError> {
    let id = sheet_id(&id)?;
    let edit = json_body(body)?;
    let stored = state.workbench.lock().edit_cell(id, edit)?;
    Ok(Json(stored))
}

/// DELETE /api/sheets/:id/cells
async fn clear_cell(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<CellTarget>, JsonRejection>,
) -> Result<Json<ClearResponse>, AppError> {
    let id = sheet_id(&id)?;
    let target = json_body(body)?;
    let removed = state.workbench.lock().clear_cell(id, target)?;
    Ok(Json(ClearResponse { removed }))
}

/// GET /api/sheets/:id/print/:view
async fn print_document(
    State(state): State<AppState>,
    Path((id, view_name)): Path<(String, String)>,
) -> Result<Json<PrintDocument>, AppError> {
    let id = sheet_id(&id)?;
    let view = view(&view_name)?;
    let document = state.workbench.lock().print_document(id, view)?;
    Ok(Json(document))
}
