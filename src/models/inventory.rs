use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::category::{Category, CategoryDetails};
use super::{optional, required};
use crate::error::{InventoryError, Result};

/// A tracked asset. `item_id` is chosen by the admin and doubles as the QR payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub item_id: String,
    pub category: Category,
    #[serde(rename = "type")]
    pub item_type: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub location: Option<String>,
    pub condition: String,
    pub acquisition_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub last_inspection_date: Option<NaiveDate>,
    pub price: Option<f64>,
    pub supplier: Option<String>,
    pub maintenance_schedule: Option<String>,
    pub maintenance_charge: Option<f64>,
    pub assigned_to: Option<String>,
    pub issued_to: Option<String>,
    /// Admin who registered the item.
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// An item together with its category extension record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub extension: CategoryDetails,
}

/// `itemData` as posted by the add-inventory form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemData {
    pub item_id: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub location: Option<String>,
    pub condition: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub last_inspection_date: Option<NaiveDate>,
    pub price: Option<f64>,
    pub supplier: Option<String>,
    pub maintenance_schedule: Option<String>,
    pub maintenance_charge: Option<f64>,
    pub assigned_to: Option<String>,
    pub issued_to: Option<String>,
}

/// A validated item plus its resolved extension record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInventoryItem {
    pub item_id: String,
    pub item_type: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub location: Option<String>,
    pub condition: String,
    pub acquisition_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub last_inspection_date: Option<NaiveDate>,
    pub price: Option<f64>,
    pub supplier: Option<String>,
    pub maintenance_schedule: Option<String>,
    pub maintenance_charge: Option<f64>,
    pub assigned_to: Option<String>,
    pub issued_to: Option<String>,
    pub details: CategoryDetails,
}

impl NewInventoryItem {
    /// Validate the form and resolve the category tag. Unknown categories are
    /// rejected here, before anything reaches the store.
    pub fn from_form(data: ItemData, category_fields: serde_json::Value) -> Result<Self> {
        let item_id = required(data.item_id, "itemId")?;
        let category: Category = required(data.category, "category")?.parse()?;
        let item_type = required(data.item_type, "type")?;

        // The add form starts at 0, which means "not filled in".
        let quantity = data.quantity.filter(|q| *q != 0).unwrap_or(1);
        if quantity < 1 {
            return Err(InventoryError::invalid_input("quantity must be at least 1"));
        }

        Ok(NewInventoryItem {
            item_id,
            item_type,
            description: optional(data.description),
            quantity,
            location: optional(data.location),
            condition: optional(data.condition).unwrap_or_else(|| "new".to_string()),
            acquisition_date: data.acquisition_date,
            expiry_date: data.expiry_date,
            return_date: data.return_date,
            last_inspection_date: data.last_inspection_date,
            price: data.price,
            supplier: optional(data.supplier),
            maintenance_schedule: optional(data.maintenance_schedule),
            maintenance_charge: data.maintenance_charge,
            assigned_to: optional(data.assigned_to),
            issued_to: optional(data.issued_to),
            details: CategoryDetails::from_json(category, category_fields)?,
        })
    }

    pub fn category(&self) -> Category {
        self.details.category()
    }

    pub fn into_item(self, owner_id: &str, created_at: DateTime<Utc>) -> (InventoryItem, CategoryDetails) {
        let item = InventoryItem {
            item_id: self.item_id,
            category: self.details.category(),
            item_type: self.item_type,
            description: self.description,
            quantity: self.quantity,
            location: self.location,
            condition: self.condition,
            acquisition_date: self.acquisition_date,
            expiry_date: self.expiry_date,
            return_date: self.return_date,
            last_inspection_date: self.last_inspection_date,
            price: self.price,
            supplier: self.supplier,
            maintenance_schedule: self.maintenance_schedule,
            maintenance_charge: self.maintenance_charge,
            assigned_to: self.assigned_to,
            issued_to: self.issued_to,
            user_id: owner_id.to_string(),
            created_at,
        };
        (item, self.details)
    }
}

/// Column patch for an existing item. The item ID, category and owner are
/// not patchable; naming them is a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemPatch {
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub location: Option<String>,
    pub condition: Option<String>,
    pub acquisition_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub last_inspection_date: Option<NaiveDate>,
    pub price: Option<f64>,
    pub supplier: Option<String>,
    pub maintenance_schedule: Option<String>,
    pub maintenance_charge: Option<f64>,
    pub assigned_to: Option<String>,
    pub issued_to: Option<String>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        *self == ItemPatch::default()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(item_type) = &self.item_type {
            if item_type.trim().is_empty() {
                return Err(InventoryError::invalid_input("type cannot be blank"));
            }
        }
        if matches!(self.quantity, Some(q) if q < 1) {
            return Err(InventoryError::invalid_input("quantity must be at least 1"));
        }
        Ok(())
    }
}

impl InventoryItem {
    pub fn apply_patch(&mut self, patch: &ItemPatch) {
        macro_rules! overlay {
            ($($field:ident),+) => {
                $(
                    if let Some(value) = &patch.$field {
                        self.$field = value.clone().into();
                    }
                )+
            };
        }

        overlay!(item_type, condition);
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        overlay!(
            description,
            location,
            acquisition_date,
            expiry_date,
            return_date,
            last_inspection_date,
            price,
            supplier,
            maintenance_schedule,
            maintenance_charge,
            assigned_to,
            issued_to
        );
    }
}

/// Everything an update may touch: the item columns and at most one
/// extension relation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryUpdate {
    pub fields: ItemPatch,
    pub extension: Option<CategoryDetails>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item_data() -> ItemData {
        ItemData {
            item_id: Some("LAP-0042".into()),
            category: Some("COMPUTER_AND_IT_EQUIPMENT".into()),
            item_type: Some("Laptop".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_applied_on_create() {
        let new_item = NewInventoryItem::from_form(item_data(), json!({})).unwrap();
        assert_eq!(new_item.quantity, 1);
        assert_eq!(new_item.condition, "new");
        assert_eq!(new_item.category(), Category::ComputerAndItEquipment);
    }

    #[test]
    fn test_zero_quantity_defaults_and_negative_rejected() {
        let mut data = item_data();
        data.quantity = Some(0);
        let new_item = NewInventoryItem::from_form(data, json!({})).unwrap();
        assert_eq!(new_item.quantity, 1);

        let mut data = item_data();
        data.quantity = Some(-2);
        assert!(matches!(
            NewInventoryItem::from_form(data, json!({})),
            Err(InventoryError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_unknown_category_rejected_before_store() {
        let mut data = item_data();
        data.category = Some("SNACKS".into());
        let err = NewInventoryItem::from_form(data, json!({})).unwrap_err();
        assert!(matches!(err, InventoryError::InvalidCategory(_)));
    }

    #[test]
    fn test_missing_item_id_rejected() {
        let mut data = item_data();
        data.item_id = None;
        let err = NewInventoryItem::from_form(data, json!({})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: itemId is required");
    }

    #[test]
    fn test_patch_rejects_immutable_columns() {
        let result: std::result::Result<ItemPatch, _> =
            serde_json::from_value(json!({ "itemId": "OTHER-1" }));
        assert!(result.is_err());
        let result: std::result::Result<ItemPatch, _> =
            serde_json::from_value(json!({ "category": "FIREARM" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_patch_touches_only_named_columns() {
        let (mut item, _) = NewInventoryItem::from_form(item_data(), json!({}))
            .unwrap()
            .into_item("admin-1", Utc::now());
        let patch: ItemPatch = serde_json::from_value(json!({
            "quantity": 3,
            "location": "Kolar Police Station",
            "price": 55000.0
        }))
        .unwrap();

        item.apply_patch(&patch);

        assert_eq!(item.quantity, 3);
        assert_eq!(item.location.as_deref(), Some("Kolar Police Station"));
        assert_eq!(item.price, Some(55000.0));
        assert_eq!(item.item_type, "Laptop");
        assert_eq!(item.condition, "new");
    }

    #[test]
    fn test_patch_validation() {
        assert!(ItemPatch::default().is_empty());
        let patch = ItemPatch {
            quantity: Some(0),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
