//! Notification intents emitted by the registration lifecycle.
//!
//! Emission is fire-and-forget everywhere: a failed email never rolls back
//! the transition that triggered it.

use tracing::warn;

use crate::domains::registration::models::Registration;
use crate::kernel::BaseMailer;

#[derive(Debug, Clone)]
pub enum RegistrationNotice {
    SubmissionReceived { group_size: usize, total_fee: i64 },
    Approved,
    Rejected { reason: Option<String> },
}

impl RegistrationNotice {
    fn subject(&self) -> String {
        match self {
            RegistrationNotice::SubmissionReceived { .. } => {
                "Alumni Meet: registration received".to_string()
            }
            RegistrationNotice::Approved => "Alumni Meet: registration approved".to_string(),
            RegistrationNotice::Rejected { .. } => "Alumni Meet: registration update".to_string(),
        }
    }

    fn body(&self, row: &Registration) -> String {
        match self {
            RegistrationNotice::SubmissionReceived {
                group_size,
                total_fee,
            } => format!(
                "Hi {},\n\nWe received your registration {} for {} attendee(s), \
                 total fee {}. Our accounts team will verify your payment proof shortly.",
                row.full_name, row.application_id, group_size, total_fee
            ),
            RegistrationNotice::Approved => format!(
                "Hi {},\n\nYour registration {} has been approved. See you at the meet!",
                row.full_name, row.application_id
            ),
            RegistrationNotice::Rejected { reason } => {
                let reason = reason.as_deref().unwrap_or("not specified");
                format!(
                    "Hi {},\n\nYour registration {} could not be approved. Reason: {}.\n\
                     Please contact the organizing team.",
                    row.full_name, row.application_id, reason
                )
            }
        }
    }
}

/// Send a lifecycle notice to the row's registrant, if it carries an email.
/// Failures are logged and swallowed.
pub async fn send_notice(mailer: &dyn BaseMailer, row: &Registration, notice: RegistrationNotice) {
    let Some(email) = row.email.as_deref() else {
        return;
    };

    // Receipt rides along on approval when one has been issued.
    let attachment = match &notice {
        RegistrationNotice::Approved => row.payment_receipt_url.as_deref(),
        _ => None,
    };

    if let Err(e) = mailer
        .send_email(email, &notice.subject(), &notice.body(row), attachment)
        .await
    {
        warn!(
            "Notification for {} failed (ignored): {}",
            row.application_id, e
        );
    }
}
