use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::places::repo::Place;

use super::dto::{BookingWithPlace, CreateBookingRequest};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Booking {
    pub id: Uuid,
    pub place_id: Uuid,
    pub user_id: Uuid,
    pub check_in: Date,
    pub check_out: Date,
    pub number_of_guests: i32,
    pub name: String,
    pub phone: String,
    pub price: i32,
    pub created_at: OffsetDateTime,
}

/// Flat row for the bookings-with-place join; place columns are aliased with
/// a `place_` prefix.
#[derive(Debug, FromRow)]
pub struct BookingPlaceRow {
    pub id: Uuid,
    pub check_in: Date,
    pub check_out: Date,
    pub number_of_guests: i32,
    pub name: String,
    pub phone: String,
    pub price: i32,
    pub place_id: Uuid,
    pub place_owner_id: Uuid,
    pub place_title: String,
    pub place_address: String,
    pub place_photos: Vec<String>,
    pub place_description: String,
    pub place_perks: Vec<String>,
    pub place_extra_info: String,
    pub place_check_in: i32,
    pub place_check_out: i32,
    pub place_max_guests: i32,
    pub place_price: i32,
    pub place_created_at: OffsetDateTime,
}

impl From<BookingPlaceRow> for BookingWithPlace {
    fn from(r: BookingPlaceRow) -> Self {
        Self {
            id: r.id,
            place: Place {
                id: r.place_id,
                owner_id: r.place_owner_id,
                title: r.place_title,
                address: r.place_address,
                photos: r.place_photos,
                description: r.place_description,
                perks: r.place_perks,
                extra_info: r.place_extra_info,
                check_in: r.place_check_in,
                check_out: r.place_check_out,
                max_guests: r.place_max_guests,
                price: r.place_price,
                created_at: r.place_created_at,
            },
            check_in: r.check_in,
            check_out: r.check_out,
            number_of_guests: r.number_of_guests,
            name: r.name,
            phone: r.phone,
            price: r.price,
        }
    }
}

impl Booking {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        req: &CreateBookingRequest,
    ) -> Result<Booking, sqlx::Error> {
        sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (place_id, user_id, check_in, check_out,
                                  number_of_guests, name, phone, price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, place_id, user_id, check_in, check_out,
                      number_of_guests, name, phone, price, created_at
            "#,
        )
        .bind(req.place)
        .bind(user_id)
        .bind(req.check_in)
        .bind(req.check_out)
        .bind(req.number_of_guests)
        .bind(&req.name)
        .bind(&req.phone)
        .bind(req.price)
        .fetch_one(db)
        .await
    }

    pub async fn list_for_user(
        db: &PgPool,
        user_id: Uuid,
    ) -> anyhow::Result<Vec<BookingPlaceRow>> {
        let rows = sqlx::query_as::<_, BookingPlaceRow>(
            r#"
            SELECT b.id, b.check_in, b.check_out, b.number_of_guests,
                   b.name, b.phone, b.price,
                   p.id          AS place_id,
                   p.owner_id    AS place_owner_id,
                   p.title       AS place_title,
                   p.address     AS place_address,
                   p.photos      AS place_photos,
                   p.description AS place_description,
                   p.perks       AS place_perks,
                   p.extra_info  AS place_extra_info,
                   p.check_in    AS place_check_in,
                   p.check_out   AS place_check_out,
                   p.max_guests  AS place_max_guests,
                   p.price       AS place_price,
                   p.created_at  AS place_created_at
            FROM bookings b
            JOIN places p ON p.id = b.place_id
            WHERE b.user_id = $1
            ORDER BY b.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}
