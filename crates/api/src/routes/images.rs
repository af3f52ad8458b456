//! Image upload and retrieval.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/api/upload` | `upload` |
//! | `GET` | `/images/:filename` | `get_image` |

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub path: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/upload", post(upload))
        .route("/images/:filename", get(get_image))
}

/// POST /api/upload: stores the `file` field and returns its reference path.
async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|e| AppError::bad_request(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;
        let path = state.workbench.lock().store_image(&bytes, &file_name)?;
        return Ok(Json(UploadResponse { path }));
    }

    Err(AppError::bad_request(format!(
        "multipart body has no `{FILE_FIELD}` field"
    )))
}

/// GET /images/:filename
async fn get_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let blob = state.workbench.lock().load_image(&filename)?;
    Ok(([(header::CONTENT_TYPE, blob.content_type)], blob.bytes))
}
