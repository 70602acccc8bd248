use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

use super::services::{ext_from_filename, ext_from_link, ext_from_mime};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/upload-by-link", post(upload_by_link))
        .route("/upload", post(upload_files))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

#[derive(Debug, Deserialize)]
pub struct UploadByLinkRequest {
    pub link: String,
}

/// Fetch a remote image and store it under a generated name. The name is
/// returned so the client can reference it in `addedPhotos`.
#[instrument(skip(state))]
pub async fn upload_by_link(
    State(state): State<AppState>,
    Json(payload): Json<UploadByLinkRequest>,
) -> Result<Json<String>, ApiError> {
    if !payload.link.starts_with("http://") && !payload.link.starts_with("https://") {
        return Err(ApiError::Validation("link must be an http(s) URL".into()));
    }

    let response = state
        .http
        .get(&payload.link)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| {
            warn!(error = %e, link = %payload.link, "image fetch failed");
            ApiError::Upstream(e.to_string())
        })?;

    let ext = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(ext_from_mime)
        .or_else(|| ext_from_link(&payload.link))
        .unwrap_or("jpg")
        .to_string();

    let body = response
        .bytes()
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    let name = format!("photo{}.{}", millis, ext);
    state.storage.put_object(&name, body).await?;

    info!(name = %name, "image stored from link");
    Ok(Json(name))
}

/// Multipart upload, field name `photos`. Each stored file gets a generated
/// name that keeps the original extension.
#[instrument(skip(state, mp))]
pub async fn upload_files(
    State(state): State<AppState>,
    mut mp: Multipart,
) -> Result<Json<Vec<String>>, ApiError> {
    let mut stored = Vec::new();
    while let Ok(Some(field)) = mp.next_field().await {
        let field_name = field.name().map(|s| s.to_string());
        if field_name.as_deref() != Some("photos") && field_name.as_deref() != Some("photos[]") {
            continue;
        }

        let ext = field
            .file_name()
            .and_then(ext_from_filename)
            .unwrap_or("bin")
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        let name = format!("{}.{}", Uuid::new_v4(), ext);
        state.storage.put_object(&name, data).await?;
        stored.push(name);
    }

    if stored.is_empty() {
        return Err(ApiError::Validation("photos field is required".into()));
    }

    info!(count = stored.len(), "files uploaded");
    Ok(Json(stored))
}
