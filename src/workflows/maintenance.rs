// Maintenance request lifecycle
//
//   PENDING --approve--> APPROVED --complete(repaired)----> COMPLETED
//      |                     |
//      +--reject--> REJECTED +--complete(irreparable)--> DISCARDED
//
// REJECTED, COMPLETED and DISCARDED are terminal.

use chrono::{DateTime, Utc};

use crate::error::{InventoryError, Result};
use crate::models::{MaintenanceAction, MaintenanceRequest, MaintenanceStatus};

/// Discard reason recorded when a completed repair reports the item as not repaired.
pub const IRREPARABLE: &str = "Irreparable";

/// Optional inputs that accompany a maintenance `action`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionInput {
    pub technician_id: Option<String>,
    pub resolution_details: Option<String>,
    pub is_repaired: Option<bool>,
    pub discard_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaintenanceTransition {
    Approve {
        technician_id: Option<String>,
    },
    Reject {
        discard_reason: Option<String>,
    },
    Complete {
        is_repaired: bool,
        resolution_details: Option<String>,
    },
}

impl MaintenanceTransition {
    pub fn from_action(action: MaintenanceAction, input: TransitionInput) -> Result<Self> {
        Ok(match action {
            MaintenanceAction::Approve => MaintenanceTransition::Approve {
                technician_id: input.technician_id,
            },
            MaintenanceAction::Reject => MaintenanceTransition::Reject {
                discard_reason: input.discard_reason,
            },
            MaintenanceAction::Complete => MaintenanceTransition::Complete {
                is_repaired: input.is_repaired.ok_or_else(|| {
                    InventoryError::invalid_input("isRepaired is required to complete a request")
                })?,
                resolution_details: input.resolution_details,
            },
        })
    }

    pub fn action(&self) -> MaintenanceAction {
        match self {
            MaintenanceTransition::Approve { .. } => MaintenanceAction::Approve,
            MaintenanceTransition::Reject { .. } => MaintenanceAction::Reject,
            MaintenanceTransition::Complete { .. } => MaintenanceAction::Complete,
        }
    }

    pub fn target_status(&self) -> MaintenanceStatus {
        match self {
            MaintenanceTransition::Approve { .. } => MaintenanceStatus::Approved,
            MaintenanceTransition::Reject { .. } => MaintenanceStatus::Rejected,
            MaintenanceTransition::Complete { is_repaired: true, .. } => MaintenanceStatus::Completed,
            MaintenanceTransition::Complete { is_repaired: false, .. } => MaintenanceStatus::Discarded,
        }
    }
}

/// Legal-transition table.
pub fn is_legal(from: MaintenanceStatus, action: MaintenanceAction) -> bool {
    matches!(
        (from, action),
        (MaintenanceStatus::Pending, MaintenanceAction::Approve)
            | (MaintenanceStatus::Pending, MaintenanceAction::Reject)
            | (MaintenanceStatus::Approved, MaintenanceAction::Complete)
    )
}

/// Compute the record that results from applying `transition` to `request`.
/// The input record is left untouched.
pub fn apply(
    request: &MaintenanceRequest,
    transition: &MaintenanceTransition,
    now: DateTime<Utc>,
) -> Result<MaintenanceRequest> {
    if !is_legal(request.status, transition.action()) {
        return Err(InventoryError::IllegalTransition {
            from: request.status.to_string(),
            action: transition.action().to_string(),
        });
    }

    let mut next = request.clone();
    next.status = transition.target_status();

    match transition {
        MaintenanceTransition::Approve { technician_id } => {
            next.technician_id = technician_id.clone();
            next.approval_date = Some(now);
        }
        MaintenanceTransition::Reject { discard_reason } => {
            next.discard_reason = discard_reason.clone();
        }
        MaintenanceTransition::Complete {
            is_repaired,
            resolution_details,
        } => {
            next.resolution_details = resolution_details.clone();
            next.completion_date = Some(now);
            if !is_repaired {
                next.discard_reason = Some(IRREPARABLE.to_string());
            }
        }
    }

    Ok(next)
}
