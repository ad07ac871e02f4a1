use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use super::ApiJson;
use crate::dispatch::{self, LocationUpdate, NearbyQuery, NearbyRider};
use crate::error::AppError;
use crate::models::rider::GeoPoint;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/nearby-riders", post(nearby_riders))
        .route("/rider-location", post(rider_location))
}

#[derive(Deserialize)]
pub struct NearbyRidersRequest {
    pub customer_lat: f64,
    pub customer_lng: f64,
    #[serde(default)]
    pub radius_km: Option<f64>,
}

#[derive(Serialize)]
pub struct NearbyRidersBody {
    pub riders: Vec<NearbyRider>,
}

#[derive(Deserialize)]
pub struct RiderLocationRequest {
    pub rider_profile_id: Uuid,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub accuracy: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
}

#[derive(Serialize)]
pub struct RiderLocationBody {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn nearby_riders(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NearbyRidersRequest>,
) -> Result<Json<NearbyRidersBody>, AppError> {
    let started = Instant::now();
    let query = NearbyQuery {
        customer: GeoPoint::new(payload.customer_lat, payload.customer_lng),
        radius_km: payload.radius_km,
    };

    let result =
        dispatch::locate_nearby_riders(state.store.as_ref(), &query, &state.settings, Utc::now());
    state.metrics.observe("nearby_riders", &result, started);

    Ok(Json(NearbyRidersBody { riders: result? }))
}

async fn rider_location(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<RiderLocationRequest>,
) -> Result<Json<RiderLocationBody>, AppError> {
    let started = Instant::now();
    let cmd = LocationUpdate {
        rider_id: payload.rider_profile_id,
        location: GeoPoint::new(payload.lat, payload.lng),
        accuracy: payload.accuracy,
        heading: payload.heading,
        speed: payload.speed,
    };

    let result = dispatch::update_rider_location(state.store.as_ref(), cmd, Utc::now());
    state.metrics.observe("rider_location", &result, started);
    let sample = result?;

    state.metrics.rider_location_updates_total.inc();
    let timestamp = sample.updated_at;
    if state.location_events_tx.send(sample).is_err() {
        debug!("no location subscribers");
    }

    Ok(Json(RiderLocationBody {
        success: true,
        message: "Location updated successfully",
        timestamp,
    }))
}
