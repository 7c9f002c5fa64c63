// Domain records and the request shapes that produce them

pub mod category;
pub mod inventory;
pub mod issuance;
pub mod maintenance;
pub mod user;

pub use category::{Category, CategoryDetails};
pub use inventory::{InventoryItem, InventoryRecord, InventoryUpdate, ItemData, ItemPatch, NewInventoryItem};
pub use issuance::{IssuanceDecision, IssuanceForm, IssuanceRequest, IssuanceStatus, NewIssuanceRequest, PriorityLevel};
pub use maintenance::{MaintenanceAction, MaintenanceRequest, MaintenanceStatus, NewMaintenanceRequest};
pub use user::{NewUser, RegistrationForm, Role, User};

use crate::error::{InventoryError, Result};

/// Trim a form value and reject it when absent or blank.
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(InventoryError::invalid_input(format!("{field} is required"))),
    }
}

/// Trim a form value, mapping blank strings to `None`.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_rejects_blank_values() {
        assert!(required(None, "itemId").is_err());
        assert!(required(Some("   ".into()), "itemId").is_err());
        assert_eq!(required(Some(" RAD-01 ".into()), "itemId").unwrap(), "RAD-01");
    }

    #[test]
    fn test_optional_drops_blank_values() {
        assert_eq!(optional(Some("".into())), None);
        assert_eq!(optional(Some(" Motorola ".into())), Some("Motorola".to_string()));
    }
}
