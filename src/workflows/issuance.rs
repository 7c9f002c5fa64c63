// Issuance request decisions: PENDING --approve--> APPROVED, PENDING --reject--> REJECTED

use chrono::{DateTime, Utc};

use crate::error::{InventoryError, Result};
use crate::models::{IssuanceDecision, IssuanceRequest, IssuanceStatus};

pub fn apply_decision(
    request: &IssuanceRequest,
    decision: IssuanceDecision,
    note: Option<String>,
    now: DateTime<Utc>,
) -> Result<IssuanceRequest> {
    if request.status != IssuanceStatus::Pending {
        return Err(InventoryError::IllegalTransition {
            from: request.status.to_string(),
            action: decision.as_str().to_string(),
        });
    }

    let mut next = request.clone();
    next.status = decision.target_status();
    next.decision_note = note;
    next.decided_at = Some(now);
    Ok(next)
}
