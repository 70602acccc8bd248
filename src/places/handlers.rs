use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::session::AuthUser,
    error::ApiError,
    state::AppState,
};

use super::dto::{PlaceData, UpdatePlaceRequest};
use super::repo::Place;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/places", get(list_places))
        .route("/places/:id", get(get_place))
        .route("/user-places", get(user_places))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/places", post(create_place))
        .route("/places", put(update_place))
}

/// Public listing feed, no auth.
#[instrument(skip(state))]
pub async fn list_places(State(state): State<AppState>) -> Result<Json<Vec<Place>>, ApiError> {
    let places = Place::list_all(&state.db).await?;
    Ok(Json(places))
}

#[instrument(skip(state))]
pub async fn get_place(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Place>, ApiError> {
    let place = Place::get(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("Place"))?;
    Ok(Json(place))
}

#[instrument(skip(state, session))]
pub async fn user_places(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> Result<Json<Vec<Place>>, ApiError> {
    let places = Place::list_by_owner(&state.db, session.sub).await?;
    Ok(Json(places))
}

#[instrument(skip(state, session, data))]
pub async fn create_place(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Json(data): Json<PlaceData>,
) -> Result<Json<Place>, ApiError> {
    let place = Place::create(&state.db, session.sub, &data).await?;
    info!(place_id = %place.id, owner_id = %place.owner_id, "place created");
    Ok(Json(place))
}

/// Nothing was updated: a place someone else owns is a 403, a missing one
/// a 404.
fn unmodified_rejection(place_exists: bool) -> ApiError {
    if place_exists {
        ApiError::Forbidden
    } else {
        ApiError::NotFound("Place")
    }
}

#[instrument(skip(state, session, payload))]
pub async fn update_place(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Json(payload): Json<UpdatePlaceRequest>,
) -> Result<Json<Place>, ApiError> {
    match Place::update_owned(&state.db, payload.id, session.sub, &payload.data).await? {
        Some(place) => {
            info!(place_id = %place.id, "place updated");
            Ok(Json(place))
        }
        None => {
            let exists = Place::get(&state.db, payload.id).await?.is_some();
            Err(unmodified_rejection(exists))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn foreign_place_update_is_forbidden() {
        assert!(matches!(unmodified_rejection(true), ApiError::Forbidden));
    }

    #[test]
    fn missing_place_update_is_not_found() {
        assert!(matches!(
            unmodified_rejection(false),
            ApiError::NotFound("Place")
        ));
    }
}
