use std::sync::Arc;
use tracing::info;

use super::run_workflow;
use crate::error::{InventoryError, Result};
use crate::models::{NewUser, RegistrationForm, Role, User};
use crate::observability::WorkflowMetrics;
use crate::store::RecordStore;

/// Stores users coming out of the external identity flow.
pub struct RegistrationHandler {
    store: Arc<dyn RecordStore>,
    metrics: Arc<WorkflowMetrics>,
}

impl RegistrationHandler {
    pub fn new(store: Arc<dyn RecordStore>, metrics: Arc<WorkflowMetrics>) -> Self {
        Self { store, metrics }
    }

    pub async fn register(&self, form: RegistrationForm) -> Result<User> {
        run_workflow("register_user", &self.metrics, async {
            let new_user = NewUser::try_from(form)?;

            if self.store.find_user_by_gov_id(&new_user.gov_id).await?.is_some() {
                return Err(InventoryError::Conflict(
                    "A user with this government ID already exists".to_string(),
                ));
            }

            if new_user.role == Role::Incharge
                && self.store.find_incharge_at(&new_user.location).await?.is_some()
            {
                return Err(InventoryError::Conflict(format!(
                    "{} already has an incharge",
                    new_user.location
                )));
            }

            // The store's unique indexes still catch a concurrent registration.
            let user = self.store.insert_user(&new_user).await?;
            self.metrics.record_created();
            info!(user_id = %user.id, role = %user.role, "User registered");
            Ok(user)
        })
        .await
    }

    pub async fn get(&self, user_id: &str) -> Result<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| InventoryError::not_found("User", user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::user;
    use crate::store::MockRecordStore;

    fn form(role: &str) -> RegistrationForm {
        RegistrationForm {
            gov_id: Some("123456789012".into()),
            name: Some("Ravi Kumar".into()),
            email: Some("ravi.kumar@police.gov.in".into()),
            phone: Some("9876543210".into()),
            role: Some(role.into()),
            location: Some("Habibganj Police Station".into()),
        }
    }

    fn handler(store: MockRecordStore) -> RegistrationHandler {
        RegistrationHandler::new(Arc::new(store), Arc::new(WorkflowMetrics::new()))
    }

    #[tokio::test]
    async fn test_register_stores_validated_user() {
        let mut store = MockRecordStore::new();
        store.expect_find_user_by_gov_id().returning(|_| Ok(None));
        store.expect_find_incharge_at().never();
        store
            .expect_insert_user()
            .withf(|u| u.gov_id == "123456789012" && u.role == Role::User)
            .times(1)
            .returning(|u| Ok(user("u-1", &u.gov_id, u.role, &u.location)));

        let registered = handler(store).register(form("User")).await.unwrap();
        assert_eq!(registered.id, "u-1");
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_store() {
        let mut store = MockRecordStore::new();
        store.expect_find_user_by_gov_id().never();
        store.expect_insert_user().never();

        let mut bad = form("User");
        bad.gov_id = Some("42".into());
        let err = handler(store).register(bad).await.unwrap_err();
        assert!(matches!(err, InventoryError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_duplicate_gov_id_is_conflict() {
        let mut store = MockRecordStore::new();
        store
            .expect_find_user_by_gov_id()
            .returning(|gov_id| Ok(Some(user("u-0", gov_id, Role::User, "Kolar Police Station"))));
        store.expect_insert_user().never();

        let err = handler(store).register(form("User")).await.unwrap_err();
        assert!(matches!(err, InventoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_second_incharge_at_location_is_conflict() {
        let mut store = MockRecordStore::new();
        store.expect_find_user_by_gov_id().returning(|_| Ok(None));
        store
            .expect_find_incharge_at()
            .withf(|location| location == "Habibganj Police Station")
            .returning(|location| Ok(Some(user("inc-1", "999999999999", Role::Incharge, location))));
        store.expect_insert_user().never();

        let err = handler(store).register(form("incharge")).await.unwrap_err();
        assert!(matches!(err, InventoryError::Conflict(ref msg) if msg.contains("already has an incharge")));
    }

    #[tokio::test]
    async fn test_get_unknown_user_is_not_found() {
        let mut store = MockRecordStore::new();
        store.expect_find_user().returning(|_| Ok(None));

        let err = handler(store).get("missing").await.unwrap_err();
        assert!(matches!(err, InventoryError::NotFound { entity: "User", .. }));
    }
}
