//! Verification state machine - pure decision logic.
//!
//! The four status fields on a registration row form a small, fixed state
//! machine. Transitions are guarded functions that take the current row and
//! the acting staff identity and produce a single-row patch; the guard and
//! the patch are one unit, so no partial-transition state is possible.
//! Actions apply the patch through the store and handle notification
//! side effects.

use chrono::Utc;

use crate::common::{Actor, CoreError, PaymentStatus, RegistrationStatus};
use crate::domains::registration::models::{Registration, RegistrationPatch};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyDecision {
    Verified,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecision {
    Approved,
    Rejected,
}

/// Whether an admin decision is currently allowed on this row.
pub fn can_approve(row: &Registration) -> bool {
    row.accounts_verified && row.registration_status == RegistrationStatus::Pending
}

/// First-pass payment review: `submitted -> verified | rejected`.
/// Single-row; does not cascade to the rest of the group.
pub fn accounts_verification(
    row: &Registration,
    actor: &Actor,
    decision: VerifyDecision,
) -> Result<RegistrationPatch, CoreError> {
    if !actor.role.can_verify_accounts() {
        return Err(CoreError::Forbidden(
            "accounts verification requires the accounts-reviewer role".to_string(),
        ));
    }
    if row.payment_status != PaymentStatus::Submitted {
        return Err(CoreError::validation(format!(
            "payment for {} is not awaiting review",
            row.application_id
        )));
    }

    let verified = decision == VerifyDecision::Verified;
    Ok(RegistrationPatch {
        payment_status: Some(if verified {
            PaymentStatus::Verified
        } else {
            PaymentStatus::Rejected
        }),
        accounts_verified: Some(verified),
        accounts_verified_by: Some(Some(actor.id.clone())),
        accounts_verified_at: Some(Some(Utc::now())),
        ..Default::default()
    })
}

/// Second-pass admin decision, gated on accounts verification.
///
/// Approving also closes any open edit-mode cycle: the correction has been
/// re-verified and re-approved, so the row returns to the normal path.
pub fn approval(
    row: &Registration,
    actor: &Actor,
    decision: ApprovalDecision,
) -> Result<RegistrationPatch, CoreError> {
    if !actor.role.can_administer() {
        return Err(CoreError::Forbidden(
            "approval requires the admin role".to_string(),
        ));
    }
    if !row.accounts_verified {
        return Err(CoreError::validation(format!(
            "{} has not passed accounts verification",
            row.application_id
        )));
    }
    if row.registration_status != RegistrationStatus::Pending {
        return Err(CoreError::validation(format!(
            "{} is already {:?}",
            row.application_id, row.registration_status
        )));
    }

    Ok(RegistrationPatch {
        registration_status: Some(match decision {
            ApprovalDecision::Approved => RegistrationStatus::Approved,
            ApprovalDecision::Rejected => RegistrationStatus::Rejected,
        }),
        approved_by: Some(actor.id.clone()),
        approved_at: Some(Utc::now()),
        edit_mode_enabled: Some(false),
        pending_admin_approval: Some(false),
        ..Default::default()
    })
}

/// Administrative rollback reopening the row for correction.
///
/// Resets the row to pending and clears the verifier's attribution and the
/// receipt, but deliberately preserves `payment_proof_url` for audit
/// reference. A rollback, not a delete.
pub fn edit_mode_rollback(
    _row: &Registration,
    actor: &Actor,
    reason: &str,
) -> Result<RegistrationPatch, CoreError> {
    if !actor.role.can_administer() {
        return Err(CoreError::Forbidden(
            "edit mode requires the admin role".to_string(),
        ));
    }
    if reason.trim().is_empty() {
        return Err(CoreError::validation("edit mode requires a reason"));
    }

    Ok(RegistrationPatch {
        edit_mode_enabled: Some(true),
        edit_mode_enabled_by: Some(actor.id.clone()),
        edit_mode_enabled_at: Some(Utc::now()),
        edit_mode_reason: Some(reason.trim().to_string()),
        registration_status: Some(RegistrationStatus::Pending),
        accounts_verified: Some(false),
        accounts_verified_by: Some(None),
        accounts_verified_at: Some(None),
        payment_receipt_url: Some(None),
        ..Default::default()
    })
}
