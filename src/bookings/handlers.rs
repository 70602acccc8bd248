use axum::{extract::State, Json};
use time::Date;
use tracing::{info, instrument, warn};

use crate::{
    auth::session::AuthUser,
    error::ApiError,
    state::AppState,
};

use super::dto::{BookingWithPlace, CreateBookingRequest};
use super::repo::Booking;

fn dates_valid(check_in: Date, check_out: Date) -> bool {
    check_out > check_in
}

/// A booking against an unknown place trips the foreign key; everything else
/// falls through to the shared sqlx mapping.
fn map_create_error(e: sqlx::Error) -> ApiError {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => ApiError::NotFound("Place"),
        _ => e.into(),
    }
}

#[instrument(skip(state, session, payload))]
pub async fn create_booking(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Json<Booking>, ApiError> {
    if !dates_valid(payload.check_in, payload.check_out) {
        warn!(check_in = %payload.check_in, check_out = %payload.check_out, "rejected booking date range");
        return Err(ApiError::Validation(
            "checkOut must be after checkIn".into(),
        ));
    }
    if payload.number_of_guests < 1 {
        return Err(ApiError::Validation("numberOfGuests must be positive".into()));
    }

    // No availability check: overlapping bookings for the same place are
    // allowed. The foreign key rejects bookings against unknown places.
    let booking = Booking::create(&state.db, session.sub, &payload)
        .await
        .map_err(map_create_error)?;

    info!(booking_id = %booking.id, place_id = %booking.place_id, "booking created");
    Ok(Json(booking))
}

#[instrument(skip(state, session))]
pub async fn list_bookings(
    State(state): State<AppState>,
    AuthUser(session): AuthUser,
) -> Result<Json<Vec<BookingWithPlace>>, ApiError> {
    let rows = Booking::list_for_user(&state.db, session.sub).await?;
    Ok(Json(rows.into_iter().map(Into::into).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn checkout_before_checkin_is_invalid() {
        assert!(!dates_valid(date!(2026 - 09 - 05), date!(2026 - 09 - 01)));
    }

    #[test]
    fn same_day_checkout_is_invalid() {
        assert!(!dates_valid(date!(2026 - 09 - 01), date!(2026 - 09 - 01)));
    }

    #[test]
    fn forward_range_is_valid() {
        assert!(dates_valid(date!(2026 - 09 - 01), date!(2026 - 09 - 05)));
    }

    #[test]
    fn unknown_place_maps_to_not_found() {
        let err = map_create_error(crate::error::test_support::foreign_key_violation());
        assert!(matches!(err, ApiError::NotFound("Place")));
    }

    #[test]
    fn other_create_errors_stay_internal() {
        let err = map_create_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
