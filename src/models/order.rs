use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::rider::GeoPoint;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
    PickedUp,
    OnDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Rejected => "rejected",
            OrderStatus::PickedUp => "picked_up",
            OrderStatus::OnDelivery => "on_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiderAction {
    Accept,
    Reject,
}

impl RiderAction {
    pub fn target_status(&self) -> OrderStatus {
        match self {
            RiderAction::Accept => OrderStatus::Accepted,
            RiderAction::Reject => OrderStatus::Rejected,
        }
    }
}

impl FromStr for RiderAction {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "accept" => Ok(RiderAction::Accept),
            "reject" => Ok(RiderAction::Reject),
            other => Err(AppError::Validation(format!("unknown action: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub rider_id: Uuid,
    pub status: OrderStatus,
    pub delivery_address: String,
    pub location: GeoPoint,
    pub notes: Option<String>,
    pub total_price: f64,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Append-only audit record; written alongside every status change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: Uuid,
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub notes: String,
    pub location: GeoPoint,
    pub created_at: DateTime<Utc>,
}

impl StatusHistoryEntry {
    pub fn new(order: &Order, status: OrderStatus, notes: String, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id: order.id,
            status,
            notes,
            location: order.location,
            created_at: at,
        }
    }
}
