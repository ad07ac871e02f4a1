use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

use super::{Store, StoreCounts, StoreError, StatusUpdate};
use crate::models::customer::Customer;
use crate::models::order::{Order, OrderStatus, StatusHistoryEntry};
use crate::models::rider::{RiderLocation, RiderProfile, StockItem};

/// In-process store. Compound writes hold the primary record's shard lock
/// (order or rider) while touching the secondary map, always in that order.
#[derive(Default)]
pub struct MemoryStore {
    riders: DashMap<Uuid, RiderProfile>,
    rider_locations: DashMap<Uuid, RiderLocation>,
    customers: DashMap<Uuid, Customer>,
    stock: DashMap<Uuid, Vec<StockItem>>,
    orders: DashMap<Uuid, Order>,
    history: DashMap<Uuid, Vec<StatusHistoryEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get_order(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.get(&id).map(|entry| entry.value().clone()))
    }

    fn order_history(&self, order_id: Uuid) -> Result<Vec<StatusHistoryEntry>, StoreError> {
        Ok(self
            .history
            .get(&order_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default())
    }

    fn get_rider(&self, id: Uuid) -> Result<Option<RiderProfile>, StoreError> {
        Ok(self.riders.get(&id).map(|entry| entry.value().clone()))
    }

    fn located_riders(&self) -> Result<Vec<RiderProfile>, StoreError> {
        Ok(self
            .riders
            .iter()
            .filter(|entry| entry.is_active && entry.location.is_some())
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn rider_location(&self, rider_id: Uuid) -> Result<Option<RiderLocation>, StoreError> {
        Ok(self
            .rider_locations
            .get(&rider_id)
            .map(|entry| entry.value().clone()))
    }

    fn customer_by_user(&self, user_id: Uuid) -> Result<Option<Customer>, StoreError> {
        Ok(self
            .customers
            .iter()
            .find(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone()))
    }

    fn total_stock(&self, rider_id: Uuid) -> Result<i64, StoreError> {
        Ok(self
            .stock
            .get(&rider_id)
            .map(|items| items.iter().map(|item| item.quantity).sum())
            .unwrap_or(0))
    }

    fn create_order(&self, order: Order, history: StatusHistoryEntry) -> Result<(), StoreError> {
        let id = order.id;
        match self.orders.entry(id) {
            Entry::Occupied(_) => {
                Err(StoreError::Conflict(format!("order {id} already exists")))
            }
            Entry::Vacant(slot) => {
                // Order shard stays locked until the first history entry is in.
                let guard = slot.insert(order);
                self.history.entry(id).or_default().push(history);
                drop(guard);
                Ok(())
            }
        }
    }

    fn commit_transition(
        &self,
        order_id: Uuid,
        expected: OrderStatus,
        update: StatusUpdate,
        history: StatusHistoryEntry,
    ) -> Result<Order, StoreError> {
        let mut order = self
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| StoreError::NotFound(format!("order {order_id} not found")))?;

        if order.status != expected {
            return Err(StoreError::Conflict(format!(
                "order {order_id} is {}, expected {expected}",
                order.status
            )));
        }

        order.status = update.status;
        if update.rejection_reason.is_some() {
            order.rejection_reason = update.rejection_reason;
        }
        order.updated_at = update.at;

        self.history.entry(order_id).or_default().push(history);

        Ok(order.clone())
    }

    fn record_location(&self, sample: RiderLocation) -> Result<RiderProfile, StoreError> {
        let rider_id = sample.rider_id;
        let mut rider = self
            .riders
            .get_mut(&rider_id)
            .ok_or_else(|| StoreError::NotFound(format!("rider {rider_id} not found")))?;

        rider.location = Some(sample.location);
        rider.location_updated_at = Some(sample.updated_at);
        self.rider_locations.insert(rider_id, sample);

        Ok(rider.clone())
    }

    fn insert_rider(&self, rider: RiderProfile) -> Result<(), StoreError> {
        self.riders.insert(rider.id, rider);
        Ok(())
    }

    fn insert_customer(&self, customer: Customer) -> Result<(), StoreError> {
        self.customers.insert(customer.id, customer);
        Ok(())
    }

    fn insert_stock(&self, item: StockItem) -> Result<(), StoreError> {
        self.stock.entry(item.rider_id).or_default().push(item);
        Ok(())
    }

    fn counts(&self) -> StoreCounts {
        StoreCounts {
            riders: self.riders.len(),
            customers: self.customers.len(),
            orders: self.orders.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::rider::GeoPoint;

    fn rider(location: Option<GeoPoint>, is_active: bool) -> RiderProfile {
        RiderProfile {
            id: Uuid::new_v4(),
            name: "rider".to_string(),
            phone: None,
            is_active,
            location,
            location_updated_at: location.map(|_| Utc::now()),
        }
    }

    fn pending_order() -> Order {
        let now = Utc::now();
        Order {
            id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            rider_id: Uuid::new_v4(),
            status: OrderStatus::Pending,
            delivery_address: "Jl. Merdeka 1".to_string(),
            location: GeoPoint::new(-6.2, 106.8),
            notes: None,
            total_price: 0.0,
            estimated_arrival: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn located_riders_skips_inactive_and_unlocated() {
        let store = MemoryStore::new();
        let visible = rider(Some(GeoPoint::new(1.0, 1.0)), true);
        store.insert_rider(visible.clone()).unwrap();
        store.insert_rider(rider(None, true)).unwrap();
        store.insert_rider(rider(Some(GeoPoint::new(2.0, 2.0)), false)).unwrap();

        let riders = store.located_riders().unwrap();
        assert_eq!(riders.len(), 1);
        assert_eq!(riders[0].id, visible.id);
    }

    #[test]
    fn total_stock_sums_all_items() {
        let store = MemoryStore::new();
        let rider_id = Uuid::new_v4();
        for quantity in [3, 4, 5] {
            store
                .insert_stock(StockItem {
                    rider_id,
                    product: "kopi".to_string(),
                    quantity,
                })
                .unwrap();
        }

        assert_eq!(store.total_stock(rider_id).unwrap(), 12);
        assert_eq!(store.total_stock(Uuid::new_v4()).unwrap(), 0);
    }

    #[test]
    fn commit_transition_rejects_stale_expectation() {
        let store = MemoryStore::new();
        let order = pending_order();
        let created = StatusHistoryEntry::new(&order, OrderStatus::Pending, "created".into(), Utc::now());
        store.create_order(order.clone(), created).unwrap();

        let update = StatusUpdate {
            status: OrderStatus::Accepted,
            rejection_reason: None,
            at: Utc::now(),
        };
        let entry = StatusHistoryEntry::new(&order, OrderStatus::Accepted, "ok".into(), Utc::now());
        store
            .commit_transition(order.id, OrderStatus::Pending, update.clone(), entry.clone())
            .unwrap();

        let err = store
            .commit_transition(order.id, OrderStatus::Pending, update, entry)
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(store.order_history(order.id).unwrap().len(), 2);
    }

    #[test]
    fn create_order_refuses_duplicate_id() {
        let store = MemoryStore::new();
        let order = pending_order();
        let entry = StatusHistoryEntry::new(&order, OrderStatus::Pending, "created".into(), Utc::now());
        store.create_order(order.clone(), entry.clone()).unwrap();

        assert!(store.create_order(order.clone(), entry).is_err());
        assert_eq!(store.order_history(order.id).unwrap().len(), 1);
    }

    #[test]
    fn record_location_for_unknown_rider_writes_nothing() {
        let store = MemoryStore::new();
        let rider_id = Uuid::new_v4();
        let err = store
            .record_location(RiderLocation {
                rider_id,
                location: GeoPoint::new(0.0, 0.0),
                accuracy: None,
                heading: None,
                speed: None,
                updated_at: Utc::now(),
            })
            .unwrap_err();

        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(store.rider_location(rider_id).unwrap().is_none());
    }
}
