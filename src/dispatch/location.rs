use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::rider::{GeoPoint, RiderLocation};
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct LocationUpdate {
    pub rider_id: Uuid,
    pub location: GeoPoint,
    pub accuracy: Option<f64>,
    pub heading: Option<f64>,
    pub speed: Option<f64>,
}

/// Stores a rider's device fix on their profile and in the location table.
pub fn update_rider_location(
    store: &dyn Store,
    cmd: LocationUpdate,
    now: DateTime<Utc>,
) -> Result<RiderLocation, AppError> {
    if !cmd.location.is_valid() {
        return Err(AppError::Validation(format!(
            "invalid coordinate ({}, {})",
            cmd.location.lat, cmd.location.lng
        )));
    }

    let sample = RiderLocation {
        rider_id: cmd.rider_id,
        location: cmd.location,
        accuracy: cmd.accuracy,
        heading: cmd.heading,
        speed: cmd.speed,
        updated_at: now,
    };

    store.record_location(sample.clone())?;

    debug!(
        rider_id = %sample.rider_id,
        lat = sample.location.lat,
        lng = sample.location.lng,
        "rider location recorded"
    );

    Ok(sample)
}
