use serde::Deserialize;
use uuid::Uuid;

/// Listing attributes as the client sends them. `addedPhotos` holds names
/// previously returned by the upload endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceData {
    pub title: String,
    pub address: String,
    #[serde(default)]
    pub added_photos: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub perks: Vec<String>,
    #[serde(default)]
    pub extra_info: String,
    pub check_in: i32,
    pub check_out: i32,
    pub max_guests: i32,
    pub price: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlaceRequest {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: PlaceData,
}
