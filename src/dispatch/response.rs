use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::order::{Order, OrderStatus, RiderAction, StatusHistoryEntry};
use crate::store::{StatusUpdate, Store};

pub const DEFAULT_REJECTION_REASON: &str = "No reason provided";

#[derive(Debug, Clone)]
pub struct OrderResponse {
    pub order_id: Uuid,
    pub rider_id: Uuid,
    pub action: String,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub order: Order,
    pub action: RiderAction,
    /// Present only for rejections.
    pub reason: Option<String>,
}

/// Applies a rider's accept/reject decision to a pending order.
///
/// Checks run in a fixed order: existence, pending status, rider match, then
/// the action itself. The status change and its history entry are committed
/// together; if another decision lands first the commit fails as InvalidState.
pub fn respond_to_order(
    store: &dyn Store,
    cmd: OrderResponse,
    now: DateTime<Utc>,
) -> Result<TransitionOutcome, AppError> {
    let order = store
        .get_order(cmd.order_id)?
        .ok_or_else(|| AppError::NotFound(format!("order {} not found", cmd.order_id)))?;

    if order.status != OrderStatus::Pending {
        return Err(AppError::InvalidState(format!(
            "order {} is {}, not pending",
            order.id, order.status
        )));
    }

    if order.rider_id != cmd.rider_id {
        return Err(AppError::Unauthorized(format!(
            "rider {} is not assigned to order {}",
            cmd.rider_id, order.id
        )));
    }

    let action: RiderAction = cmd.action.parse()?;
    let target = action.target_status();

    let (reason, notes) = match action {
        RiderAction::Accept => (None, "Order accepted by rider".to_string()),
        RiderAction::Reject => {
            let reason = cmd
                .rejection_reason
                .filter(|reason| !reason.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());
            let notes = format!("Order rejected: {reason}");
            (Some(reason), notes)
        }
    };

    let history = StatusHistoryEntry::new(&order, target, notes, now);
    let update = StatusUpdate {
        status: target,
        rejection_reason: reason.clone(),
        at: now,
    };

    let order = store.commit_transition(order.id, OrderStatus::Pending, update, history)?;

    info!(
        order_id = %order.id,
        rider_id = %cmd.rider_id,
        status = %order.status,
        "order transitioned"
    );

    Ok(TransitionOutcome {
        order,
        action,
        reason,
    })
}
