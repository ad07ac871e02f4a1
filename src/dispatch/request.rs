use chrono::{DateTime, Duration, Utc};
use tracing::info;
use uuid::Uuid;

use crate::config::DispatchSettings;
use crate::error::AppError;
use crate::geo::{eta_minutes, haversine_km};
use crate::models::order::{Order, OrderStatus, StatusHistoryEntry};
use crate::models::rider::GeoPoint;
use crate::store::Store;

#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub customer_user_id: Uuid,
    pub rider_id: Uuid,
    pub delivery: GeoPoint,
    pub delivery_address: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OrderRequestOutcome {
    pub order_id: Uuid,
    pub estimated_arrival: DateTime<Utc>,
    pub eta_minutes: i64,
}

/// Opens a pending order addressed to one rider, with an arrival estimate
/// taken from that rider's last known position.
pub fn create_order_request(
    store: &dyn Store,
    cmd: OrderRequest,
    settings: &DispatchSettings,
    now: DateTime<Utc>,
) -> Result<OrderRequestOutcome, AppError> {
    if !cmd.delivery.is_valid() {
        return Err(AppError::Validation(format!(
            "invalid delivery coordinate ({}, {})",
            cmd.delivery.lat, cmd.delivery.lng
        )));
    }

    let customer = store.customer_by_user(cmd.customer_user_id)?.ok_or_else(|| {
        AppError::NotFound(format!("customer for user {} not found", cmd.customer_user_id))
    })?;

    let rider = store
        .get_rider(cmd.rider_id)?
        .ok_or_else(|| AppError::NotFound(format!("rider {} not found", cmd.rider_id)))?;

    let eta = match rider.location {
        Some(location) => eta_minutes(
            haversine_km(&location, &cmd.delivery),
            settings.average_speed_kmh,
        ),
        None => settings.default_eta_minutes,
    };
    let estimated_arrival = Duration::try_minutes(eta)
        .and_then(|eta| now.checked_add_signed(eta))
        .ok_or_else(|| AppError::Internal(format!("eta of {eta} minutes is out of range")))?;

    let order = Order {
        id: Uuid::new_v4(),
        customer_id: customer.id,
        rider_id: rider.id,
        status: OrderStatus::Pending,
        delivery_address: cmd.delivery_address,
        location: cmd.delivery,
        notes: cmd.notes,
        total_price: 0.0,
        estimated_arrival: Some(estimated_arrival),
        rejection_reason: None,
        created_at: now,
        updated_at: now,
    };
    let history = StatusHistoryEntry::new(
        &order,
        OrderStatus::Pending,
        "Order request created".to_string(),
        now,
    );

    let order_id = order.id;
    store.create_order(order, history)?;

    info!(
        order_id = %order_id,
        customer_id = %customer.id,
        rider_id = %rider.id,
        eta_minutes = eta,
        "order request created"
    );

    Ok(OrderRequestOutcome {
        order_id,
        estimated_arrival,
        eta_minutes: eta,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::dispatch::testing::{ReadOnlyStore, rider_at};
    use crate::models::customer::Customer;
    use crate::models::rider::RiderProfile;
    use crate::store::MemoryStore;

    fn customer(store: &MemoryStore) -> Uuid {
        let user_id = Uuid::new_v4();
        store
            .insert_customer(Customer {
                id: Uuid::new_v4(),
                user_id,
                name: "Siti".to_string(),
            })
            .unwrap();
        user_id
    }

    fn request(user_id: Uuid, rider_id: Uuid) -> OrderRequest {
        OrderRequest {
            customer_user_id: user_id,
            rider_id,
            delivery: GeoPoint::new(0.0, 0.0),
            delivery_address: "Jl. Thamrin 5".to_string(),
            notes: Some("Pagar hijau".to_string()),
        }
    }

    #[test]
    fn creates_pending_order_with_eta_from_rider_position() {
        let store = MemoryStore::new();
        let now = Utc::now();
        let user_id = customer(&store);
        let rider = rider_at(&store, GeoPoint::new(0.0, 1.0), now);

        let outcome =
            create_order_request(&store, request(user_id, rider), &DispatchSettings::default(), now)
                .unwrap();

        assert_eq!(outcome.eta_minutes, 334);
        assert_eq!(outcome.estimated_arrival, now + Duration::minutes(334));

        let order = store.get_order(outcome.order_id).unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.rider_id, rider);
        assert_eq!(order.total_price, 0.0);
        assert_eq!(order.notes.as_deref(), Some("Pagar hijau"));

        let history = store.order_history(order.id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, OrderStatus::Pending);
    }

    #[test]
    fn unknown_customer_is_not_found() {
        let store = MemoryStore::new();
        let rider = rider_at(&store, GeoPoint::new(0.0, 1.0), Utc::now());

        let err = create_order_request(
            &store,
            request(Uuid::new_v4(), rider),
            &DispatchSettings::default(),
            Utc::now(),
        )
        .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(store.counts().orders, 0);
    }

    #[test]
    fn rider_without_location_gets_default_eta() {
        let store = MemoryStore::new();
        let user_id = customer(&store);
        let rider_id = Uuid::new_v4();
        store
            .insert_rider(RiderProfile {
                id: rider_id,
                name: "Agus".to_string(),
                phone: None,
                is_active: true,
                location: None,
                location_updated_at: None,
            })
            .unwrap();

        let settings = DispatchSettings::default();
        let outcome =
            create_order_request(&store, request(user_id, rider_id), &settings, Utc::now())
                .unwrap();

        assert_eq!(outcome.eta_minutes, settings.default_eta_minutes);
    }

    #[test]
    fn unrepresentable_eta_is_an_error_not_a_panic() {
        let store = MemoryStore::new();
        let user_id = customer(&store);
        let rider_id = Uuid::new_v4();
        store
            .insert_rider(RiderProfile {
                id: rider_id,
                name: "Yanto".to_string(),
                phone: None,
                is_active: true,
                location: None,
                location_updated_at: None,
            })
            .unwrap();

        let settings = DispatchSettings {
            default_eta_minutes: i64::MAX,
            ..DispatchSettings::default()
        };
        let err = create_order_request(&store, request(user_id, rider_id), &settings, Utc::now())
            .unwrap_err();

        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(store.counts().orders, 0);
    }

    #[test]
    fn store_failure_is_reported() {
        let store = ReadOnlyStore::default();
        let now = Utc::now();
        let user_id = customer(&store.inner);
        let rider = rider_at(&store.inner, GeoPoint::new(0.0, 1.0), now);

        let err =
            create_order_request(&store, request(user_id, rider), &DispatchSettings::default(), now)
                .unwrap_err();
        assert!(matches!(err, AppError::StoreWrite(_)));
    }
}
