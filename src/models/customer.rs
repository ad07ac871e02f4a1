use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    /// Identity of the signed-in account that owns this customer record.
    pub user_id: Uuid,
    pub name: String,
}
