use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::common::{ApplicationId, PaymentStatus, RegistrationStatus, StayType};

/// Registration row - one registrant's record.
///
/// A row with `parent_application_id = None` is a group primary; a non-null
/// parent marks a dependent attendee. Children never carry children, so the
/// parent reference cannot form a cycle.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Registration {
    pub application_id: ApplicationId,
    pub parent_application_id: Option<ApplicationId>,

    pub full_name: String,
    /// Primaries always carry an email (notification recipient); dependents
    /// usually don't.
    pub email: Option<String>,

    pub stay_type: StayType,
    /// Denormalized for audit/edit purposes; equals the fee model's output
    /// for `stay_type` at creation time.
    pub registration_fee: i64,

    pub payment_status: PaymentStatus,
    pub registration_status: RegistrationStatus,

    // First-pass human payment review
    pub accounts_verified: bool,
    pub accounts_verified_by: Option<String>,
    pub accounts_verified_at: Option<DateTime<Utc>>,

    // Second-pass admin decision
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,

    // Administrative rollback that reopens the row for correction
    pub edit_mode_enabled: bool,
    pub edit_mode_enabled_by: Option<String>,
    pub edit_mode_enabled_at: Option<DateTime<Utc>>,
    pub edit_mode_reason: Option<String>,
    /// Set when a correction lands while edit mode is on; accounts
    /// re-verification must complete before admin can re-approve.
    pub pending_admin_approval: bool,

    pub payment_proof_url: Option<String>,
    pub payment_receipt_url: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    pub fn is_primary(&self) -> bool {
        self.parent_application_id.is_none()
    }
}

/// Fields for a row about to be created. The store assigns the application
/// id and the parent back-reference.
#[derive(Debug, Clone)]
pub struct NewRegistrationRow {
    pub full_name: String,
    pub email: Option<String>,
    pub stay_type: StayType,
    pub registration_fee: i64,
}

/// Single-row conditional update, applied with
/// `WHERE application_id = $1`. Re-applying the same patch is harmless,
/// which is what makes the fan-out link step safe to retry.
///
/// Outer `Option` = "touch this column at all"; the double-`Option` fields
/// distinguish "set to NULL" from "leave alone".
#[derive(Debug, Clone, Default)]
pub struct RegistrationPatch {
    pub payment_status: Option<PaymentStatus>,
    pub registration_status: Option<RegistrationStatus>,

    pub payment_proof_url: Option<String>,
    pub payment_receipt_url: Option<Option<String>>,

    pub accounts_verified: Option<bool>,
    pub accounts_verified_by: Option<Option<String>>,
    pub accounts_verified_at: Option<Option<DateTime<Utc>>>,

    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,

    pub edit_mode_enabled: Option<bool>,
    pub edit_mode_enabled_by: Option<String>,
    pub edit_mode_enabled_at: Option<DateTime<Utc>>,
    pub edit_mode_reason: Option<String>,
    pub pending_admin_approval: Option<bool>,
}

impl RegistrationPatch {
    pub fn is_empty(&self) -> bool {
        self.payment_status.is_none()
            && self.registration_status.is_none()
            && self.payment_proof_url.is_none()
            && self.payment_receipt_url.is_none()
            && self.accounts_verified.is_none()
            && self.accounts_verified_by.is_none()
            && self.accounts_verified_at.is_none()
            && self.approved_by.is_none()
            && self.approved_at.is_none()
            && self.edit_mode_enabled.is_none()
            && self.edit_mode_enabled_by.is_none()
            && self.edit_mode_enabled_at.is_none()
            && self.edit_mode_reason.is_none()
            && self.pending_admin_approval.is_none()
    }

    /// Apply to an in-memory row. Used by the memory store and tests; the
    /// Postgres store builds the equivalent UPDATE.
    pub fn apply(&self, row: &mut Registration) {
        if let Some(v) = self.payment_status {
            row.payment_status = v;
        }
        if let Some(v) = self.registration_status {
            row.registration_status = v;
        }
        if let Some(v) = &self.payment_proof_url {
            row.payment_proof_url = Some(v.clone());
        }
        if let Some(v) = &self.payment_receipt_url {
            row.payment_receipt_url = v.clone();
        }
        if let Some(v) = self.accounts_verified {
            row.accounts_verified = v;
        }
        if let Some(v) = &self.accounts_verified_by {
            row.accounts_verified_by = v.clone();
        }
        if let Some(v) = self.accounts_verified_at {
            row.accounts_verified_at = v;
        }
        if let Some(v) = &self.approved_by {
            row.approved_by = Some(v.clone());
        }
        if let Some(v) = self.approved_at {
            row.approved_at = Some(v);
        }
        if let Some(v) = self.edit_mode_enabled {
            row.edit_mode_enabled = v;
        }
        if let Some(v) = &self.edit_mode_enabled_by {
            row.edit_mode_enabled_by = Some(v.clone());
        }
        if let Some(v) = self.edit_mode_enabled_at {
            row.edit_mode_enabled_at = Some(v);
        }
        if let Some(v) = &self.edit_mode_reason {
            row.edit_mode_reason = Some(v.clone());
        }
        if let Some(v) = self.pending_admin_approval {
            row.pending_admin_approval = v;
        }
        row.updated_at = Utc::now();
    }
}
