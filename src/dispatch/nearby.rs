use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::config::DispatchSettings;
use crate::error::AppError;
use crate::geo::{eta_minutes, haversine_km, round_to_hundredths};
use crate::models::rider::GeoPoint;
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct NearbyQuery {
    pub customer: GeoPoint,
    /// Accepted from callers but not applied; every located rider is returned.
    pub radius_km: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NearbyRider {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub distance_km: f64,
    pub eta_minutes: i64,
    pub is_online: bool,
    pub location_updated_at: Option<DateTime<Utc>>,
    pub total_stock: i64,
}

pub fn is_online(
    location_updated_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window_secs: i64,
) -> bool {
    let Some(window) = Duration::try_seconds(window_secs) else {
        return false;
    };
    location_updated_at.is_some_and(|seen| now.signed_duration_since(seen) < window)
}

/// Ranks every active, located rider against the customer's position.
///
/// Online riders come first, then offline ones; each group is ordered by
/// ascending distance. Nothing is written.
pub fn locate_nearby_riders(
    store: &dyn Store,
    query: &NearbyQuery,
    settings: &DispatchSettings,
    now: DateTime<Utc>,
) -> Result<Vec<NearbyRider>, AppError> {
    if !query.customer.is_valid() {
        return Err(AppError::Validation(format!(
            "invalid customer coordinate ({}, {})",
            query.customer.lat, query.customer.lng
        )));
    }

    if let Some(radius_km) = query.radius_km {
        debug!(radius_km, "radius supplied; results are not filtered by it");
    }

    let mut riders = Vec::new();
    for profile in store.located_riders()? {
        let Some(location) = profile.location else {
            continue;
        };

        let distance_km = haversine_km(&location, &query.customer);
        riders.push(NearbyRider {
            id: profile.id,
            total_stock: store.total_stock(profile.id)?,
            name: profile.name,
            phone: profile.phone,
            lat: location.lat,
            lng: location.lng,
            distance_km: round_to_hundredths(distance_km),
            eta_minutes: eta_minutes(distance_km, settings.average_speed_kmh),
            is_online: is_online(profile.location_updated_at, now, settings.online_window_secs),
            location_updated_at: profile.location_updated_at,
        });
    }

    riders.sort_by(rank);

    debug!(count = riders.len(), "nearby riders ranked");
    Ok(riders)
}

fn rank(a: &NearbyRider, b: &NearbyRider) -> Ordering {
    b.is_online
        .cmp(&a.is_online)
        .then_with(|| a.distance_km.total_cmp(&b.distance_km))
}
