//! Request-scoped dispatch operations. Each takes the store and the
//! evaluation time explicitly and keeps no state between calls.

pub mod location;
pub mod nearby;
pub mod request;
pub mod response;

pub use location::{LocationUpdate, update_rider_location};
pub use nearby::{NearbyQuery, NearbyRider, is_online, locate_nearby_riders};
pub use request::{OrderRequest, OrderRequestOutcome, create_order_request};
pub use response::{OrderResponse, TransitionOutcome, respond_to_order};

#[cfg(test)]
pub(crate) mod testing {
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use crate::models::customer::Customer;
    use crate::models::order::{Order, OrderStatus, StatusHistoryEntry};
    use crate::models::rider::{GeoPoint, RiderLocation, RiderProfile, StockItem};
    use crate::store::{MemoryStore, StatusUpdate, Store, StoreCounts, StoreError};

    pub fn rider_at(store: &MemoryStore, location: GeoPoint, seen_at: DateTime<Utc>) -> Uuid {
        let id = Uuid::new_v4();
        store
            .insert_rider(RiderProfile {
                id,
                name: format!("rider-{}", &id.to_string()[..8]),
                phone: Some("0812000000".to_string()),
                is_active: true,
                location: Some(location),
                location_updated_at: Some(seen_at),
            })
            .unwrap();
        id
    }

    pub fn order_for(store: &MemoryStore, rider_id: Uuid, status: OrderStatus) -> Order {
        let now = Utc::now();
        let order = Order {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            rider_id,
            status,
            delivery_address: "Jl. Sudirman 10".to_string(),
            location: GeoPoint::new(-6.2, 106.82),
            notes: None,
            total_price: 0.0,
            estimated_arrival: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        let entry = StatusHistoryEntry::new(&order, status, "seeded".to_string(), now);
        store.create_order(order.clone(), entry).unwrap();
        order
    }

    /// Reads pass through; every write fails as if the backend were down.
    #[derive(Default)]
    pub struct ReadOnlyStore {
        pub inner: MemoryStore,
    }

    fn down() -> StoreError {
        StoreError::Unavailable("store is read-only".to_string())
    }

    impl Store for ReadOnlyStore {
        fn get_order(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
            self.inner.get_order(id)
        }

        fn order_history(&self, order_id: Uuid) -> Result<Vec<StatusHistoryEntry>, StoreError> {
            self.inner.order_history(order_id)
        }

        fn get_rider(&self, id: Uuid) -> Result<Option<RiderProfile>, StoreError> {
            self.inner.get_rider(id)
        }

        fn located_riders(&self) -> Result<Vec<RiderProfile>, StoreError> {
            self.inner.located_riders()
        }

        fn rider_location(&self, rider_id: Uuid) -> Result<Option<RiderLocation>, StoreError> {
            self.inner.rider_location(rider_id)
        }

        fn customer_by_user(&self, user_id: Uuid) -> Result<Option<Customer>, StoreError> {
            self.inner.customer_by_user(user_id)
        }

        fn total_stock(&self, rider_id: Uuid) -> Result<i64, StoreError> {
            self.inner.total_stock(rider_id)
        }

        fn create_order(&self, _: Order, _: StatusHistoryEntry) -> Result<(), StoreError> {
            Err(down())
        }

        fn commit_transition(
            &self,
            _: Uuid,
            _: OrderStatus,
            _: StatusUpdate,
            _: StatusHistoryEntry,
        ) -> Result<Order, StoreError> {
            Err(down())
        }

        fn record_location(&self, _: RiderLocation) -> Result<RiderProfile, StoreError> {
            Err(down())
        }

        fn insert_rider(&self, _: RiderProfile) -> Result<(), StoreError> {
            Err(down())
        }

        fn insert_customer(&self, _: Customer) -> Result<(), StoreError> {
            Err(down())
        }

        fn insert_stock(&self, _: StockItem) -> Result<(), StoreError> {
            Err(down())
        }

        fn counts(&self) -> StoreCounts {
            self.inner.counts()
        }
    }
}
