use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::PlaceData;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub address: String,
    pub photos: Vec<String>,
    pub description: String,
    pub perks: Vec<String>,
    pub extra_info: String,
    pub check_in: i32,
    pub check_out: i32,
    pub max_guests: i32,
    pub price: i32,
    pub created_at: OffsetDateTime,
}

const PLACE_COLUMNS: &str = "id, owner_id, title, address, photos, description, perks, \
                             extra_info, check_in, check_out, max_guests, price, created_at";

impl Place {
    pub async fn create(db: &PgPool, owner_id: Uuid, data: &PlaceData) -> anyhow::Result<Place> {
        let place = sqlx::query_as::<_, Place>(&format!(
            r#"
            INSERT INTO places (owner_id, title, address, photos, description,
                                perks, extra_info, check_in, check_out, max_guests, price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {PLACE_COLUMNS}
            "#
        ))
        .bind(owner_id)
        .bind(&data.title)
        .bind(&data.address)
        .bind(&data.added_photos)
        .bind(&data.description)
        .bind(&data.perks)
        .bind(&data.extra_info)
        .bind(data.check_in)
        .bind(data.check_out)
        .bind(data.max_guests)
        .bind(data.price)
        .fetch_one(db)
        .await?;
        Ok(place)
    }

    pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Place>> {
        let rows = sqlx::query_as::<_, Place>(&format!(
            r#"
            SELECT {PLACE_COLUMNS}
            FROM places
            ORDER BY created_at DESC
            "#
        ))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn list_by_owner(db: &PgPool, owner_id: Uuid) -> anyhow::Result<Vec<Place>> {
        let rows = sqlx::query_as::<_, Place>(&format!(
            r#"
            SELECT {PLACE_COLUMNS}
            FROM places
            WHERE owner_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(owner_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Place>> {
        let place = sqlx::query_as::<_, Place>(&format!(
            r#"
            SELECT {PLACE_COLUMNS}
            FROM places
            WHERE id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(place)
    }

    /// Ownership check and write in one statement, so two concurrent updates
    /// cannot interleave a read-then-write. `None` means the row was not
    /// updated: either the place does not exist or the caller is not the
    /// owner; the handler tells those apart.
    pub async fn update_owned(
        db: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        data: &PlaceData,
    ) -> anyhow::Result<Option<Place>> {
        let place = sqlx::query_as::<_, Place>(&update_owned_sql())
        .bind(id)
        .bind(owner_id)
        .bind(&data.title)
        .bind(&data.address)
        .bind(&data.added_photos)
        .bind(&data.description)
        .bind(&data.perks)
        .bind(&data.extra_info)
        .bind(data.check_in)
        .bind(data.check_out)
        .bind(data.max_guests)
        .bind(data.price)
        .fetch_optional(db)
        .await?;
        Ok(place)
    }
}

fn update_owned_sql() -> String {
    format!(
        r#"
        UPDATE places
        SET title = $3, address = $4, photos = $5, description = $6,
            perks = $7, extra_info = $8, check_in = $9, check_out = $10,
            max_guests = $11, price = $12
        WHERE id = $1 AND owner_id = $2
        RETURNING {PLACE_COLUMNS}
        "#
    )
}
