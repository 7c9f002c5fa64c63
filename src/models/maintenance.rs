use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{InventoryError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Discarded,
}

impl MaintenanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceStatus::Pending => "PENDING",
            MaintenanceStatus::Approved => "APPROVED",
            MaintenanceStatus::Rejected => "REJECTED",
            MaintenanceStatus::Completed => "COMPLETED",
            MaintenanceStatus::Discarded => "DISCARDED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MaintenanceStatus::Rejected | MaintenanceStatus::Completed | MaintenanceStatus::Discarded
        )
    }
}

impl FromStr for MaintenanceStatus {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(MaintenanceStatus::Pending),
            "APPROVED" => Ok(MaintenanceStatus::Approved),
            "REJECTED" => Ok(MaintenanceStatus::Rejected),
            "COMPLETED" => Ok(MaintenanceStatus::Completed),
            "DISCARDED" => Ok(MaintenanceStatus::Discarded),
            other => Err(InventoryError::invalid_input(format!(
                "unknown maintenance status {other}"
            ))),
        }
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reported fault against an inventory item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    pub id: String,
    pub user_id: String,
    pub item_id: String,
    pub issue_description: String,
    pub status: MaintenanceStatus,
    pub technician_id: Option<String>,
    pub resolution_details: Option<String>,
    pub discard_reason: Option<String>,
    pub approval_date: Option<DateTime<Utc>>,
    pub completion_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewMaintenanceRequest {
    pub user_id: String,
    pub item_id: String,
    pub issue_description: String,
}

impl NewMaintenanceRequest {
    pub fn into_request(self, created_at: DateTime<Utc>) -> MaintenanceRequest {
        MaintenanceRequest {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: self.user_id,
            item_id: self.item_id,
            issue_description: self.issue_description,
            status: MaintenanceStatus::Pending,
            technician_id: None,
            resolution_details: None,
            discard_reason: None,
            approval_date: None,
            completion_date: None,
            created_at,
        }
    }
}

/// The `action` field of a maintenance update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceAction {
    Approve,
    Reject,
    Complete,
}

impl MaintenanceAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaintenanceAction::Approve => "approve",
            MaintenanceAction::Reject => "reject",
            MaintenanceAction::Complete => "complete",
        }
    }
}

impl FromStr for MaintenanceAction {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "approve" => Ok(MaintenanceAction::Approve),
            "reject" => Ok(MaintenanceAction::Reject),
            "complete" => Ok(MaintenanceAction::Complete),
            other => Err(InventoryError::InvalidAction(other.to_string())),
        }
    }
}

impl fmt::Display for MaintenanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
