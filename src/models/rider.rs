use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Rider profile as kept by the data store. The last known fix lives here so
/// nearby lookups never have to touch the history table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderProfile {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub location_updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

/// One row per rider; overwritten on every fix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiderLocation {
    pub rider_id: Uuid,
    pub location: GeoPoint,
    pub accuracy: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockItem {
    pub rider_id: Uuid,
    pub product: String,
    pub quantity: i64,
}
