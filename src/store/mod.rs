//! Record store abstraction.
//!
//! Handlers receive the store as an injected `Arc<dyn RecordStore>` instead of
//! reaching for a process-wide client, so tests can substitute
//! `MockRecordStore` (generated by `mockall`) or an in-memory [`SqliteStore`].
//!
//! Every method is a single unit of work: multi-row writes (an item and its
//! extension record) commit or roll back together, and status transitions are
//! conditional on the status the caller last observed.

pub mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    InventoryItem, InventoryRecord, InventoryUpdate, IssuanceRequest, IssuanceStatus,
    MaintenanceRequest, MaintenanceStatus, NewInventoryItem, NewUser, User,
};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a registered user. Duplicate government IDs, and a second
    /// incharge at one location, fail with `Conflict`.
    async fn insert_user(&self, user: &NewUser) -> Result<User>;

    async fn find_user(&self, id: &str) -> Result<Option<User>>;

    async fn find_user_by_gov_id(&self, gov_id: &str) -> Result<Option<User>>;

    /// The incharge-role user stationed at `location`.
    async fn find_incharge_at(&self, location: &str) -> Result<Option<User>>;

    /// Insert an item and its extension record in one transaction.
    async fn insert_inventory_item(&self, item: &NewInventoryItem, owner_id: &str) -> Result<InventoryRecord>;

    async fn find_inventory_item(&self, item_id: &str) -> Result<Option<InventoryRecord>>;

    async fn list_inventory_items(&self) -> Result<Vec<InventoryItem>>;

    /// Apply a column patch and an optional extension patch in one
    /// transaction. Returns `None` when the item does not exist.
    async fn update_inventory_item(&self, item_id: &str, update: &InventoryUpdate) -> Result<Option<InventoryRecord>>;

    /// Returns `false` when no item was deleted.
    async fn delete_inventory_item(&self, item_id: &str) -> Result<bool>;

    async fn insert_issuance_request(&self, request: &IssuanceRequest) -> Result<IssuanceRequest>;

    async fn find_issuance_request(&self, id: &str) -> Result<Option<IssuanceRequest>>;

    async fn list_issuance_requests_for_incharge(&self, incharge_id: &str) -> Result<Vec<IssuanceRequest>>;

    /// Persist a decided request if its stored status is still `expected`.
    /// Returns `false` when another writer got there first.
    async fn save_issuance_decision(&self, request: &IssuanceRequest, expected: IssuanceStatus) -> Result<bool>;

    async fn insert_maintenance_request(&self, request: &MaintenanceRequest) -> Result<MaintenanceRequest>;

    async fn find_maintenance_request(&self, id: &str) -> Result<Option<MaintenanceRequest>>;

    async fn list_maintenance_requests(&self) -> Result<Vec<MaintenanceRequest>>;

    /// Persist a transitioned request if its stored status is still `expected`.
    /// Returns `false` when another writer got there first.
    async fn save_maintenance_transition(&self, request: &MaintenanceRequest, expected: MaintenanceStatus) -> Result<bool>;
}
