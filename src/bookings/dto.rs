use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use crate::places::repo::Place;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub place: Uuid,
    pub check_in: Date,
    pub check_out: Date,
    pub number_of_guests: i32,
    pub name: String,
    pub phone: String,
    pub price: i32,
}

/// Booking with the referenced place expanded inline, as the caller's
/// bookings page renders both together.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithPlace {
    pub id: Uuid,
    pub place: Place,
    pub check_in: Date,
    pub check_out: Date,
    pub number_of_guests: i32,
    pub name: String,
    pub phone: String,
    pub price: i32,
}
