use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Organisational tier or account kind of a signed-in user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    HeadOffice,
    BranchHub,
    SmallBranch,
    Rider,
    Customer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewDashboard,
    ViewReports,
    ManageBranches,
    ManageInventory,
    ManageRiders,
    PointOfSale,
    RespondToOrders,
    ShareLocation,
    PlaceOrders,
    TrackRiders,
}

const HEAD_OFFICE: &[Permission] = &[
    Permission::ViewDashboard,
    Permission::ViewReports,
    Permission::ManageBranches,
    Permission::ManageInventory,
    Permission::ManageRiders,
    Permission::TrackRiders,
];

const BRANCH_HUB: &[Permission] = &[
    Permission::ViewDashboard,
    Permission::ViewReports,
    Permission::ManageInventory,
    Permission::ManageRiders,
    Permission::PointOfSale,
    Permission::TrackRiders,
];

const SMALL_BRANCH: &[Permission] = &[
    Permission::ViewDashboard,
    Permission::ManageInventory,
    Permission::PointOfSale,
];

const RIDER: &[Permission] = &[
    Permission::PointOfSale,
    Permission::RespondToOrders,
    Permission::ShareLocation,
];

const CUSTOMER: &[Permission] = &[Permission::PlaceOrders, Permission::TrackRiders];

impl Role {
    pub fn permissions(&self) -> &'static [Permission] {
        match self {
            Role::HeadOffice => HEAD_OFFICE,
            Role::BranchHub => BRANCH_HUB,
            Role::SmallBranch => SMALL_BRANCH,
            Role::Rider => RIDER,
            Role::Customer => CUSTOMER,
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::HeadOffice => "head_office",
            Role::BranchHub => "branch_hub",
            Role::SmallBranch => "small_branch",
            Role::Rider => "rider",
            Role::Customer => "customer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "head_office" => Ok(Role::HeadOffice),
            "branch_hub" => Ok(Role::BranchHub),
            "small_branch" => Ok(Role::SmallBranch),
            "rider" => Ok(Role::Rider),
            "customer" => Ok(Role::Customer),
            other => Err(AppError::Validation(format!("unknown role: {other}"))),
        }
    }
}
