pub mod memory;
pub mod seed;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::customer::Customer;
use crate::models::order::{Order, OrderStatus, StatusHistoryEntry};
use crate::models::rider::{RiderLocation, RiderProfile, StockItem};

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unavailable(String),
}

/// Fields written by a rider's accept/reject decision.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub status: OrderStatus,
    pub rejection_reason: Option<String>,
    pub at: DateTime<Utc>,
}

/// Backing data store for orders, riders and customers.
///
/// Compound writes (`create_order`, `commit_transition`, `record_location`)
/// either apply every part or none of it.
pub trait Store: Send + Sync + 'static {
    fn get_order(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

    fn order_history(&self, order_id: Uuid) -> Result<Vec<StatusHistoryEntry>, StoreError>;

    fn get_rider(&self, id: Uuid) -> Result<Option<RiderProfile>, StoreError>;

    /// Active riders that have reported at least one location.
    fn located_riders(&self) -> Result<Vec<RiderProfile>, StoreError>;

    fn rider_location(&self, rider_id: Uuid) -> Result<Option<RiderLocation>, StoreError>;

    fn customer_by_user(&self, user_id: Uuid) -> Result<Option<Customer>, StoreError>;

    fn total_stock(&self, rider_id: Uuid) -> Result<i64, StoreError>;

    fn create_order(&self, order: Order, history: StatusHistoryEntry) -> Result<(), StoreError>;

    /// Moves the order to `update.status` only if it is still in `expected`,
    /// appending `history` in the same write.
    fn commit_transition(
        &self,
        order_id: Uuid,
        expected: OrderStatus,
        update: StatusUpdate,
        history: StatusHistoryEntry,
    ) -> Result<Order, StoreError>;

    /// Updates the rider's last known fix and upserts their location row.
    fn record_location(&self, sample: RiderLocation) -> Result<RiderProfile, StoreError>;

    fn insert_rider(&self, rider: RiderProfile) -> Result<(), StoreError>;

    fn insert_customer(&self, customer: Customer) -> Result<(), StoreError>;

    fn insert_stock(&self, item: StockItem) -> Result<(), StoreError>;

    fn counts(&self) -> StoreCounts;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StoreCounts {
    pub riders: usize,
    pub customers: usize,
    pub orders: usize,
}
