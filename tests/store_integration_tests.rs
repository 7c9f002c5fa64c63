//! Integration tests for the SQLite record store
//!
//! These run the workflow handlers against a private in-memory database so
//! that transactions, unique keys and foreign keys are the real ones.

use chrono::{NaiveDate, Utc};
use serde_json::json;
use std::sync::Arc;
use tokio_test::assert_ok;

use station_inventory::handlers::{
    CreateItemRequest, CreateMaintenanceRequest, DecideIssuanceRequest, DeleteItemRequest,
    InventoryHandler, IssuanceHandler, MaintenanceHandler, TransitionRequest, UpdateItemRequest,
};
use station_inventory::models::{
    CategoryDetails, IssuanceForm, IssuanceStatus, MaintenanceStatus, NewUser, PriorityLevel, Role,
    User,
};
use station_inventory::{InventoryError, RecordStore, SqliteStore, WorkflowMetrics};

const STATION: &str = "MP Nagar Police Station";

struct Fixture {
    store: Arc<SqliteStore>,
    metrics: Arc<WorkflowMetrics>,
    admin: User,
    officer: User,
    incharge: User,
}

impl Fixture {
    async fn new() -> Self {
        Self::with_store(SqliteStore::in_memory().await.unwrap()).await
    }

    async fn with_store(store: SqliteStore) -> Self {
        let store = Arc::new(store);
        let admin = add_user(&store, "100000000001", Role::Admin, "Headquarters").await;
        let officer = add_user(&store, "100000000002", Role::User, STATION).await;
        let incharge = add_user(&store, "100000000003", Role::Incharge, STATION).await;
        Self {
            store,
            metrics: Arc::new(WorkflowMetrics::new()),
            admin,
            officer,
            incharge,
        }
    }

    fn inventory(&self) -> InventoryHandler {
        InventoryHandler::new(self.store.clone(), self.metrics.clone())
    }

    fn issuance(&self) -> IssuanceHandler {
        IssuanceHandler::new(self.store.clone(), self.metrics.clone())
    }

    fn maintenance(&self) -> MaintenanceHandler {
        MaintenanceHandler::new(self.store.clone(), self.metrics.clone())
    }

    async fn add_item(&self, item_id: &str, category: &str, fields: serde_json::Value) -> Result<(), InventoryError> {
        let request: CreateItemRequest = serde_json::from_value(json!({
            "userId": self.admin.id,
            "itemData": { "itemId": item_id, "category": category, "type": "Test item" },
            "categorySpecificData": fields
        }))
        .unwrap();
        self.inventory().create(request).await.map(|_| ())
    }

    async fn report_fault(&self, item_id: &str) -> String {
        self.maintenance()
            .create(CreateMaintenanceRequest {
                user_id: Some(self.officer.id.clone()),
                item_id: Some(item_id.into()),
                issue_description: Some("Will not power on".into()),
            })
            .await
            .unwrap()
            .id
    }

    async fn transition(&self, action: &str, request_id: &str, is_repaired: Option<bool>) -> Result<MaintenanceStatus, InventoryError> {
        self.maintenance()
            .transition(TransitionRequest {
                action: Some(action.into()),
                request_id: Some(request_id.into()),
                is_repaired,
                ..Default::default()
            })
            .await
            .map(|r| r.status)
    }
}

async fn add_user(store: &SqliteStore, gov_id: &str, role: Role, location: &str) -> User {
    store
        .insert_user(&NewUser {
            gov_id: gov_id.into(),
            name: format!("Officer {gov_id}"),
            email: format!("{gov_id}@mppolice.gov.in"),
            phone: "9876543210".into(),
            role,
            location: location.into(),
        })
        .await
        .unwrap()
}

fn issuance_form(gov_id: &str, location: &str) -> IssuanceForm {
    IssuanceForm {
        user_id: Some(gov_id.into()),
        item: Some("Riot shield".into()),
        category: Some("PROTECTIVE_GEAR".into()),
        location: Some(location.into()),
        quantity: Some(10),
        expected_delivery_date: NaiveDate::from_ymd_opt(2026, 12, 1),
        purpose: Some("Crowd control".into()),
        approval_needed_by: NaiveDate::from_ymd_opt(2026, 11, 20),
        priority_level: Some("URGENT".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_item_created_with_partial_extension() {
    let fx = Fixture::new().await;
    assert_ok!(fx.add_item("LAP-0001", "COMPUTER_AND_IT_EQUIPMENT", json!({ "processor": "x86" })).await);

    let record = fx.store.find_inventory_item("LAP-0001").await.unwrap().unwrap();
    assert_eq!(record.item.quantity, 1);
    assert_eq!(record.item.condition, "new");
    assert_eq!(record.item.user_id, fx.admin.id);
    match record.extension {
        CategoryDetails::ComputerAndItEquipment(ext) => {
            assert_eq!(ext.processor.as_deref(), Some("x86"));
            assert!(ext.ram.is_none());
            assert!(ext.storage.is_none());
            assert!(ext.os.is_none());
        }
        other => panic!("unexpected extension {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_category_leaves_no_rows() {
    let fx = Fixture::new().await;
    let err = fx.add_item("TOY-0001", "TOYS", json!({})).await.unwrap_err();
    assert!(matches!(err, InventoryError::InvalidCategory(_)));
    assert!(fx.store.find_inventory_item("TOY-0001").await.unwrap().is_none());
    assert!(fx.store.list_inventory_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_admin_cannot_create_items() {
    let fx = Fixture::new().await;
    let request: CreateItemRequest = serde_json::from_value(json!({
        "userId": fx.officer.id,
        "itemData": { "itemId": "FA-0001", "category": "FIREARM", "type": "Pistol" },
        "categorySpecificData": { "caliber": "9mm" }
    }))
    .unwrap();

    let err = fx.inventory().create(request).await.unwrap_err();
    assert!(matches!(err, InventoryError::PermissionDenied(_)));
    assert!(fx.store.find_inventory_item("FA-0001").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_item_id_is_conflict() {
    let fx = Fixture::new().await;
    fx.add_item("RAD-0001", "COMMUNICATION_DEVICES", json!({})).await.unwrap();
    let err = fx.add_item("RAD-0001", "FIREARM", json!({})).await.unwrap_err();
    assert!(matches!(err, InventoryError::Conflict(_)));

    // The failed insert must not leave a stray extension row behind.
    let record = fx.store.find_inventory_item("RAD-0001").await.unwrap().unwrap();
    assert!(matches!(record.extension, CategoryDetails::CommunicationDevices(_)));
}

#[tokio::test]
async fn test_update_patches_item_and_extension_together() {
    let fx = Fixture::new().await;
    fx.add_item("FA-0002", "FIREARM", json!({ "caliber": "9mm" })).await.unwrap();

    let request: UpdateItemRequest = serde_json::from_value(json!({
        "userId": fx.admin.id,
        "itemId": "FA-0002",
        "fieldsToUpdate": { "quantity": 3, "supplier": "OFB Kanpur" },
        "childUpdates": { "firearm": { "serialNumber": "SN-7781" } }
    }))
    .unwrap();
    let record = fx.inventory().update(request).await.unwrap();

    assert_eq!(record.item.quantity, 3);
    assert_eq!(record.item.supplier.as_deref(), Some("OFB Kanpur"));
    match &record.extension {
        CategoryDetails::Firearm(ext) => {
            assert_eq!(ext.caliber.as_deref(), Some("9mm"));
            assert_eq!(ext.serial_number.as_deref(), Some("SN-7781"));
        }
        other => panic!("unexpected extension {other:?}"),
    }

    let reloaded = fx.store.find_inventory_item("FA-0002").await.unwrap().unwrap();
    assert_eq!(reloaded, record);
}

#[tokio::test]
async fn test_mismatched_child_update_rolls_back_column_patch() {
    let fx = Fixture::new().await;
    fx.add_item("FA-0003", "FIREARM", json!({})).await.unwrap();

    let request: UpdateItemRequest = serde_json::from_value(json!({
        "userId": fx.admin.id,
        "itemId": "FA-0003",
        "fieldsToUpdate": { "quantity": 9 },
        "childUpdates": { "protectiveGear": { "size": "L" } }
    }))
    .unwrap();
    let err = fx.inventory().update(request).await.unwrap_err();
    assert!(matches!(err, InventoryError::InvalidInput(_)));

    let record = fx.store.find_inventory_item("FA-0003").await.unwrap().unwrap();
    assert_eq!(record.item.quantity, 1);
}

#[tokio::test]
async fn test_second_delete_is_not_found() {
    let fx = Fixture::new().await;
    fx.add_item("OFF-0001", "OFFICE_SUPPLY", json!({ "material": "steel" })).await.unwrap();

    let request = DeleteItemRequest {
        user_id: Some(fx.admin.id.clone()),
        item_id: Some("OFF-0001".into()),
    };
    fx.inventory().delete(request.clone()).await.unwrap();
    let err = fx.inventory().delete(request).await.unwrap_err();
    assert!(matches!(err, InventoryError::NotFound { .. }));
}

#[tokio::test]
async fn test_item_with_maintenance_history_cannot_be_deleted() {
    let fx = Fixture::new().await;
    fx.add_item("VEH-0001", "VEHICLE_AND_ACCESSORIES", json!({})).await.unwrap();
    fx.report_fault("VEH-0001").await;

    let err = fx
        .inventory()
        .delete(DeleteItemRequest {
            user_id: Some(fx.admin.id.clone()),
            item_id: Some("VEH-0001".into()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, InventoryError::Conflict(_)));
    assert!(fx.store.find_inventory_item("VEH-0001").await.unwrap().is_some());
}

#[tokio::test]
async fn test_maintenance_for_unknown_item_creates_nothing() {
    let fx = Fixture::new().await;
    let err = fx
        .maintenance()
        .create(CreateMaintenanceRequest {
            user_id: Some(fx.officer.id.clone()),
            item_id: Some("GHOST-1".into()),
            issue_description: Some("Missing".into()),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, InventoryError::NotFound { entity: "InventoryItem", .. }));
    assert!(fx.store.list_maintenance_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_maintenance_lifecycle_to_discarded() {
    let fx = Fixture::new().await;
    fx.add_item("CAM-0001", "SURVEILLANCE_AND_TRACKING", json!({ "GPSAccuracy": "2m" })).await.unwrap();
    let id = fx.report_fault("CAM-0001").await;

    assert_eq!(fx.transition("approve", &id, None).await.unwrap(), MaintenanceStatus::Approved);
    assert_eq!(fx.transition("complete", &id, Some(false)).await.unwrap(), MaintenanceStatus::Discarded);

    let stored = fx.store.find_maintenance_request(&id).await.unwrap().unwrap();
    assert_eq!(stored.discard_reason.as_deref(), Some("Irreparable"));
    assert!(stored.approval_date.is_some());
    assert!(stored.completion_date.is_some());
}

#[tokio::test]
async fn test_bogus_action_mutates_nothing() {
    let fx = Fixture::new().await;
    fx.add_item("RAD-0002", "COMMUNICATION_DEVICES", json!({})).await.unwrap();
    let id = fx.report_fault("RAD-0002").await;
    let before = fx.store.find_maintenance_request(&id).await.unwrap().unwrap();

    let err = fx.transition("bogus", &id, None).await.unwrap_err();
    assert!(matches!(err, InventoryError::InvalidAction(_)));

    let after = fx.store.find_maintenance_request(&id).await.unwrap().unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_completed_request_cannot_be_reapproved() {
    let fx = Fixture::new().await;
    fx.add_item("MED-0001", "MEDICAL_FIRST_AID", json!({})).await.unwrap();
    let id = fx.report_fault("MED-0001").await;

    fx.transition("approve", &id, None).await.unwrap();
    fx.transition("complete", &id, Some(true)).await.unwrap();

    let err = fx.transition("approve", &id, None).await.unwrap_err();
    assert!(matches!(
        err,
        InventoryError::IllegalTransition { ref from, .. } if from == "COMPLETED"
    ));
}

#[tokio::test]
async fn test_stale_transition_write_is_refused() {
    let fx = Fixture::new().await;
    fx.add_item("NET-0001", "NETWORKING_EQUIPMENT", json!({})).await.unwrap();
    let id = fx.report_fault("NET-0001").await;
    let pending = fx.store.find_maintenance_request(&id).await.unwrap().unwrap();

    fx.transition("reject", &id, None).await.unwrap();

    let mut approved = pending.clone();
    approved.status = MaintenanceStatus::Approved;
    let saved = fx
        .store
        .save_maintenance_transition(&approved, MaintenanceStatus::Pending)
        .await
        .unwrap();
    assert!(!saved);
    let stored = fx.store.find_maintenance_request(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, MaintenanceStatus::Rejected);
}

#[tokio::test]
async fn test_issuance_with_unknown_user_creates_nothing() {
    let fx = Fixture::new().await;
    let err = fx
        .issuance()
        .create(issuance_form("999999999999", STATION))
        .await
        .unwrap_err();
    assert!(matches!(err, InventoryError::NotFound { entity: "User", .. }));
    assert!(fx
        .store
        .list_issuance_requests_for_incharge(&fx.incharge.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_issuance_without_incharge_creates_nothing() {
    let fx = Fixture::new().await;
    let err = fx
        .issuance()
        .create(issuance_form(&fx.officer.gov_id, "Unstaffed Outpost"))
        .await
        .unwrap_err();
    assert!(matches!(err, InventoryError::NotFound { entity: "Incharge", .. }));
    assert!(fx
        .store
        .list_issuance_requests_for_incharge(&fx.incharge.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_issuance_routed_and_decided_by_incharge() {
    let fx = Fixture::new().await;
    let request = fx
        .issuance()
        .create(issuance_form(&fx.officer.gov_id, STATION))
        .await
        .unwrap();
    assert_eq!(request.incharge_id, fx.incharge.id);
    assert_eq!(request.status, IssuanceStatus::Pending);
    assert!(!request.is_damaged);

    let queue = fx.issuance().list_for_incharge(&fx.incharge.gov_id).await.unwrap();
    assert_eq!(queue.len(), 1);

    let decided = fx
        .issuance()
        .decide(DecideIssuanceRequest {
            incharge_id: Some(fx.incharge.gov_id.clone()),
            request_id: Some(request.id.clone()),
            decision: Some("reject".into()),
            note: Some("Stock exhausted".into()),
        })
        .await
        .unwrap();
    assert_eq!(decided.status, IssuanceStatus::Rejected);

    let stored = fx.store.find_issuance_request(&request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, IssuanceStatus::Rejected);
    assert_eq!(stored.decision_note.as_deref(), Some("Stock exhausted"));

    let err = fx
        .issuance()
        .decide(DecideIssuanceRequest {
            incharge_id: Some(fx.incharge.gov_id.clone()),
            request_id: Some(request.id),
            decision: Some("approve".into()),
            note: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, InventoryError::IllegalTransition { .. }));
}

#[tokio::test]
async fn test_other_incharge_cannot_decide() {
    let fx = Fixture::new().await;
    let other = add_user(&fx.store, "100000000004", Role::Incharge, "Kolar Police Station").await;
    let request = fx
        .issuance()
        .create(issuance_form(&fx.officer.gov_id, STATION))
        .await
        .unwrap();

    let err = fx
        .issuance()
        .decide(DecideIssuanceRequest {
            incharge_id: Some(other.gov_id),
            request_id: Some(request.id.clone()),
            decision: Some("approve".into()),
            note: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, InventoryError::PermissionDenied(_)));

    let stored = fx.store.find_issuance_request(&request.id).await.unwrap().unwrap();
    assert_eq!(stored.status, IssuanceStatus::Pending);
}

#[tokio::test]
async fn test_store_enforces_unique_identities() {
    let fx = Fixture::new().await;
    let duplicate = NewUser {
        gov_id: fx.officer.gov_id.clone(),
        name: "Someone Else".into(),
        email: "else@mppolice.gov.in".into(),
        phone: "9123456780".into(),
        role: Role::User,
        location: STATION.into(),
    };
    assert!(matches!(
        fx.store.insert_user(&duplicate).await,
        Err(InventoryError::Conflict(_))
    ));

    let second_incharge = NewUser {
        gov_id: "100000000099".into(),
        role: Role::Incharge,
        ..duplicate
    };
    assert!(matches!(
        fx.store.insert_user(&second_incharge).await,
        Err(InventoryError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_file_database_persists_across_connections() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}", dir.path().join("inventory.db").display());

    let store = SqliteStore::connect(&url, 2).await.unwrap();
    store.migrate().await.unwrap();
    let admin = add_user(&store, "100000000001", Role::Admin, "Headquarters").await;
    store.shutdown().await;

    let reopened = SqliteStore::connect(&url, 2).await.unwrap();
    reopened.migrate().await.unwrap();
    let found = reopened.find_user(&admin.id).await.unwrap().unwrap();
    assert_eq!(found.gov_id, "100000000001");
    assert!(found.created_at <= Utc::now());
    reopened.shutdown().await;
}

#[tokio::test]
async fn test_issuance_accepts_every_priority_level() {
    let fx = Fixture::new().await;
    let cases = [
        ("medium", PriorityLevel::Medium),
        ("LOW", PriorityLevel::Low),
        ("HIGH", PriorityLevel::High),
        ("Urgent", PriorityLevel::Urgent),
        ("Not Urgent", PriorityLevel::Low),
    ];
    for (input, expected) in cases {
        let mut form = issuance_form(&fx.officer.gov_id, STATION);
        form.priority_level = Some(input.into());
        let request = fx.issuance().create(form).await.unwrap();
        let stored = fx.store.find_issuance_request(&request.id).await.unwrap().unwrap();
        assert_eq!(stored.priority_level, expected, "priority {input}");
    }

    let mut form = issuance_form(&fx.officer.gov_id, STATION);
    form.priority_level = Some("someday".into());
    assert!(matches!(
        fx.issuance().create(form).await,
        Err(InventoryError::InvalidInput(_))
    ));
}

async fn file_fixture(dir: &tempfile::TempDir) -> Fixture {
    let url = format!("sqlite://{}", dir.path().join("concurrent.db").display());
    let store = SqliteStore::connect(&url, 8).await.unwrap();
    store.migrate().await.unwrap();
    Fixture::with_store(store).await
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_item_updates_all_commit() {
    let dir = tempfile::tempdir().unwrap();
    let fx = file_fixture(&dir).await;
    fx.add_item("FA-0100", "FIREARM", json!({})).await.unwrap();

    let mut tasks = Vec::new();
    for n in 0..40 {
        let handler = fx.inventory();
        let request: UpdateItemRequest = serde_json::from_value(json!({
            "userId": fx.admin.id,
            "itemId": "FA-0100",
            "fieldsToUpdate": { "quantity": n + 1 },
            "childUpdates": { "firearm": { "serialNumber": format!("SN-{n}") } }
        }))
        .unwrap();
        tasks.push(tokio::spawn(async move { handler.update(request).await }));
    }

    for task in tasks {
        assert_ok!(task.await.unwrap());
    }

    let record = fx.store.find_inventory_item("FA-0100").await.unwrap().unwrap();
    let serial = match record.extension {
        CategoryDetails::Firearm(ext) => ext.serial_number.unwrap(),
        other => panic!("unexpected extension {other:?}"),
    };
    // Column patch and extension patch land together.
    assert_eq!(serial, format!("SN-{}", record.item.quantity - 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_approvals_apply_once() {
    let dir = tempfile::tempdir().unwrap();
    let fx = file_fixture(&dir).await;
    fx.add_item("NET-0100", "NETWORKING_EQUIPMENT", json!({})).await.unwrap();
    let id = fx.report_fault("NET-0100").await;

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let handler = fx.maintenance();
        let request = TransitionRequest {
            action: Some("approve".into()),
            request_id: Some(id.clone()),
            ..Default::default()
        };
        tasks.push(tokio::spawn(async move { handler.transition(request).await }));
    }

    let mut approved = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(request) => {
                assert_eq!(request.status, MaintenanceStatus::Approved);
                approved += 1;
            }
            Err(InventoryError::IllegalTransition { from, .. }) => assert_eq!(from, "APPROVED"),
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
    assert_eq!(approved, 1);

    let stored = fx.store.find_maintenance_request(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, MaintenanceStatus::Approved);
}
