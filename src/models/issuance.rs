use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::category::Category;
use super::{optional, required};
use crate::error::{InventoryError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssuanceStatus {
    Pending,
    Approved,
    Rejected,
}

impl IssuanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssuanceStatus::Pending => "PENDING",
            IssuanceStatus::Approved => "APPROVED",
            IssuanceStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for IssuanceStatus {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "PENDING" => Ok(IssuanceStatus::Pending),
            "APPROVED" => Ok(IssuanceStatus::Approved),
            "REJECTED" => Ok(IssuanceStatus::Rejected),
            other => Err(InventoryError::invalid_input(format!("unknown issuance status {other}"))),
        }
    }
}

impl fmt::Display for IssuanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityLevel {
    Low,
    Medium,
    High,
    Urgent,
}

impl PriorityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityLevel::Low => "LOW",
            PriorityLevel::Medium => "MEDIUM",
            PriorityLevel::High => "HIGH",
            PriorityLevel::Urgent => "URGENT",
        }
    }
}

/// Case-insensitive. `Not Urgent` is read as `LOW`.
impl FromStr for PriorityLevel {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "low" | "noturgent" => Ok(PriorityLevel::Low),
            "medium" => Ok(PriorityLevel::Medium),
            "high" => Ok(PriorityLevel::High),
            "urgent" => Ok(PriorityLevel::Urgent),
            _ => Err(InventoryError::invalid_input(
                "priorityLevel must be one of LOW, MEDIUM, HIGH, URGENT",
            )),
        }
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's request to be issued an item, routed to their station's incharge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceRequest {
    pub id: String,
    pub requester_id: String,
    pub incharge_id: String,
    pub name: String,
    pub category: Category,
    pub description: Option<String>,
    pub quantity: i64,
    pub expected_delivery_date: NaiveDate,
    pub purpose: String,
    pub expected_usage_duration: Option<String>,
    pub approval_needed_by: NaiveDate,
    pub priority_level: PriorityLevel,
    pub is_damaged: bool,
    pub status: IssuanceStatus,
    pub decision_note: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Body of the issuance request form. `user_id` carries the requester's
/// government ID.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuanceForm {
    pub user_id: Option<String>,
    pub item: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub quantity: Option<i64>,
    pub expected_delivery_date: Option<NaiveDate>,
    pub purpose: Option<String>,
    pub expected_usage_duration: Option<String>,
    pub approval_needed_by: Option<NaiveDate>,
    pub priority_level: Option<String>,
}

/// A validated issuance request whose identities are not yet resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIssuanceRequest {
    pub requester_gov_id: String,
    pub location: String,
    pub name: String,
    pub category: Category,
    pub description: Option<String>,
    pub quantity: i64,
    pub expected_delivery_date: NaiveDate,
    pub purpose: String,
    pub expected_usage_duration: Option<String>,
    pub approval_needed_by: NaiveDate,
    pub priority_level: PriorityLevel,
}

impl TryFrom<IssuanceForm> for NewIssuanceRequest {
    type Error = InventoryError;

    fn try_from(form: IssuanceForm) -> Result<Self> {
        let quantity = form
            .quantity
            .ok_or_else(|| InventoryError::invalid_input("quantity is required"))?;
        if quantity < 1 {
            return Err(InventoryError::invalid_input("quantity must be at least 1"));
        }

        Ok(NewIssuanceRequest {
            requester_gov_id: required(form.user_id, "userId")?,
            name: required(form.item, "item")?,
            category: required(form.category, "category")?.parse()?,
            description: optional(form.description),
            location: required(form.location, "location")?,
            quantity,
            expected_delivery_date: form
                .expected_delivery_date
                .ok_or_else(|| InventoryError::invalid_input("expectedDeliveryDate is required"))?,
            purpose: required(form.purpose, "purpose")?,
            expected_usage_duration: optional(form.expected_usage_duration),
            approval_needed_by: form
                .approval_needed_by
                .ok_or_else(|| InventoryError::invalid_input("approvalNeededBy is required"))?,
            priority_level: required(form.priority_level, "priorityLevel")?.parse()?,
        })
    }
}

impl NewIssuanceRequest {
    pub fn into_request(
        self,
        requester_id: &str,
        incharge_id: &str,
        created_at: DateTime<Utc>,
    ) -> IssuanceRequest {
        IssuanceRequest {
            id: uuid::Uuid::new_v4().to_string(),
            requester_id: requester_id.to_string(),
            incharge_id: incharge_id.to_string(),
            name: self.name,
            category: self.category,
            description: self.description,
            quantity: self.quantity,
            expected_delivery_date: self.expected_delivery_date,
            purpose: self.purpose,
            expected_usage_duration: self.expected_usage_duration,
            approval_needed_by: self.approval_needed_by,
            priority_level: self.priority_level,
            is_damaged: false,
            status: IssuanceStatus::Pending,
            decision_note: None,
            decided_at: None,
            created_at,
        }
    }
}

/// An incharge's answer to a pending issuance request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuanceDecision {
    Approve,
    Reject,
}

impl IssuanceDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssuanceDecision::Approve => "approve",
            IssuanceDecision::Reject => "reject",
        }
    }

    pub fn target_status(&self) -> IssuanceStatus {
        match self {
            IssuanceDecision::Approve => IssuanceStatus::Approved,
            IssuanceDecision::Reject => IssuanceStatus::Rejected,
        }
    }
}

impl FromStr for IssuanceDecision {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "approve" => Ok(IssuanceDecision::Approve),
            "reject" => Ok(IssuanceDecision::Reject),
            other => Err(InventoryError::InvalidAction(other.to_string())),
        }
    }
}
