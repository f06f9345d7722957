//! Shared domain enums and the resolved actor identity.
//!
//! Enum columns are stored as snake_case text; `sqlx::Type` with
//! `type_name = "text"` keeps the Rust enums and the column values aligned.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Where the registrant stays during the event; drives the registration fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum StayType {
    OnCampus,
    Outside,
}

impl StayType {
    pub fn as_str(self) -> &'static str {
        match self {
            StayType::OnCampus => "on_campus",
            StayType::Outside => "outside",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Submitted,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum RegistrationStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

/// Staff roles, resolved by the auth layer before any core operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    AccountsReviewer,
    Admin,
    SuperAdmin,
}

impl Role {
    /// First-pass payment review.
    pub fn can_verify_accounts(self) -> bool {
        matches!(self, Role::AccountsReviewer | Role::SuperAdmin)
    }

    /// Final approval and edit-mode rollback.
    pub fn can_administer(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accounts_reviewer" => Ok(Role::AccountsReviewer),
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::SuperAdmin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// The already-resolved identity performing a state-machine transition.
///
/// The core never reads ambient session state; every admin-side operation
/// takes the actor explicitly.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self { id: id.into(), role }
    }
}

/// Timing + honeypot signal computed by the form layer.
///
/// Submissions faster than a human could plausibly fill the form, or with
/// the hidden honeypot field populated, are rejected before any I/O.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BotSignal {
    pub honeypot_filled: bool,
    pub elapsed_ms: u64,
}

/// Minimum believable form fill time.
pub const MIN_FORM_FILL_MS: u64 = 1_500;

impl BotSignal {
    pub fn is_suspect(&self) -> bool {
        self.honeypot_filled || self.elapsed_ms < MIN_FORM_FILL_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn honeypot_marks_submission_suspect() {
        let signal = BotSignal {
            honeypot_filled: true,
            elapsed_ms: 60_000,
        };
        assert!(signal.is_suspect());
    }

    #[test]
    fn fast_fill_marks_submission_suspect() {
        let signal = BotSignal {
            honeypot_filled: false,
            elapsed_ms: 300,
        };
        assert!(signal.is_suspect());
    }

    #[test]
    fn plausible_fill_passes() {
        let signal = BotSignal {
            honeypot_filled: false,
            elapsed_ms: 42_000,
        };
        assert!(!signal.is_suspect());
    }

    #[test]
    fn role_gates() {
        assert!(Role::AccountsReviewer.can_verify_accounts());
        assert!(!Role::AccountsReviewer.can_administer());
        assert!(Role::Admin.can_administer());
        assert!(!Role::Admin.can_verify_accounts());
        assert!(Role::SuperAdmin.can_verify_accounts());
        assert!(Role::SuperAdmin.can_administer());
    }
}
