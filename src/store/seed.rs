use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::{Store, StoreError};
use crate::error::AppError;
use crate::models::customer::Customer;
use crate::models::rider::{RiderProfile, StockItem};

/// Startup fixture for records that are normally created by other services.
#[derive(Debug, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub riders: Vec<RiderProfile>,
    #[serde(default)]
    pub customers: Vec<Customer>,
    #[serde(default)]
    pub stock: Vec<StockItem>,
}

impl SeedData {
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        serde_json::from_str(raw).map_err(|err| AppError::Internal(format!("invalid seed data: {err}")))
    }

    pub fn apply(self, store: &dyn Store) -> Result<(), StoreError> {
        let (riders, customers, stock) = (self.riders.len(), self.customers.len(), self.stock.len());

        for rider in self.riders {
            store.insert_rider(rider)?;
        }
        for customer in self.customers {
            store.insert_customer(customer)?;
        }
        for item in self.stock {
            store.insert_stock(item)?;
        }

        info!(riders, customers, stock, "seed data loaded");
        Ok(())
    }
}

pub fn load_seed_file(path: &Path, store: &dyn Store) -> Result<(), AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|err| AppError::Internal(format!("failed to read {}: {err}", path.display())))?;

    SeedData::from_json(&raw)?.apply(store)?;
    Ok(())
}
