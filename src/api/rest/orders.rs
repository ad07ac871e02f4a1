use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiJson, ApiPath};
use crate::dispatch::{self, OrderRequest, OrderResponse};
use crate::error::AppError;
use crate::models::order::{Order, OrderStatus, RiderAction, StatusHistoryEntry};
use crate::models::rider::GeoPoint;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/order-response", post(order_response))
        .route("/order-request", post(order_request))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/history", get(get_order_history))
}

#[derive(Deserialize)]
pub struct OrderResponseRequest {
    pub order_id: Uuid,
    pub rider_profile_id: Uuid,
    pub action: String,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

#[derive(Serialize)]
pub struct OrderResponseBody {
    pub success: bool,
    pub message: &'static str,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct OrderRequestPayload {
    pub customer_user_id: Uuid,
    pub rider_profile_id: Uuid,
    pub customer_lat: f64,
    pub customer_lng: f64,
    pub delivery_address: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Serialize)]
pub struct OrderRequestBody {
    pub success: bool,
    pub order_id: Uuid,
    pub estimated_arrival: DateTime<Utc>,
    pub eta_minutes: i64,
}

async fn order_response(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<OrderResponseRequest>,
) -> Result<Json<OrderResponseBody>, AppError> {
    let started = Instant::now();
    let cmd = OrderResponse {
        order_id: payload.order_id,
        rider_id: payload.rider_profile_id,
        action: payload.action,
        rejection_reason: payload.rejection_reason,
    };

    let result = dispatch::respond_to_order(state.store.as_ref(), cmd, Utc::now());
    state.metrics.observe("order_response", &result, started);
    let outcome = result?;

    state
        .metrics
        .order_transitions_total
        .with_label_values(&[outcome.order.status.as_str()])
        .inc();

    let message = match outcome.action {
        RiderAction::Accept => "Order accepted successfully",
        RiderAction::Reject => "Order rejected successfully",
    };

    Ok(Json(OrderResponseBody {
        success: true,
        message,
        status: outcome.order.status,
        reason: outcome.reason,
    }))
}

async fn order_request(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<OrderRequestPayload>,
) -> Result<Json<OrderRequestBody>, AppError> {
    let started = Instant::now();
    let cmd = OrderRequest {
        customer_user_id: payload.customer_user_id,
        rider_id: payload.rider_profile_id,
        delivery: GeoPoint::new(payload.customer_lat, payload.customer_lng),
        delivery_address: payload.delivery_address,
        notes: payload.notes,
    };

    let result =
        dispatch::create_order_request(state.store.as_ref(), cmd, &state.settings, Utc::now());
    state.metrics.observe("order_request", &result, started);
    let outcome = result?;

    Ok(Json(OrderRequestBody {
        success: true,
        order_id: outcome.order_id,
        estimated_arrival: outcome.estimated_arrival,
        eta_minutes: outcome.eta_minutes,
    }))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Order>, AppError> {
    let order = state
        .store
        .get_order(id)?
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", id)))?;

    Ok(Json(order))
}

async fn get_order_history(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<Vec<StatusHistoryEntry>>, AppError> {
    if state.store.get_order(id)?.is_none() {
        return Err(AppError::NotFound(format!("order {} not found", id)));
    }

    Ok(Json(state.store.order_history(id)?))
}
