//! Admin approval action - second-pass decision, gated on accounts
//! verification.

use tracing::info;

use crate::common::{Actor, ApplicationId, CoreError};
use crate::domains::registration::events::{send_notice, RegistrationNotice};
use crate::domains::registration::machines::{approval, ApprovalDecision};
use crate::domains::registration::models::Registration;
use crate::kernel::ServerDeps;

pub async fn approve(
    deps: &ServerDeps,
    application_id: &ApplicationId,
    actor: &Actor,
    decision: ApprovalDecision,
    reason: Option<String>,
) -> Result<Registration, CoreError> {
    let row = deps
        .store
        .select_by_application_id(application_id)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("registration {}", application_id)))?;

    let patch = approval(&row, actor, decision)?;
    deps.store.update_registration(application_id, patch).await?;

    info!(
        "Admin decision for {} by {}: {:?}",
        application_id, actor.id, decision
    );

    let updated = deps
        .store
        .select_by_application_id(application_id)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("registration {}", application_id)))?;

    // Notification is fire-and-forget; a mail failure never rolls back the
    // decision.
    let notice = match decision {
        ApprovalDecision::Approved => RegistrationNotice::Approved,
        ApprovalDecision::Rejected => RegistrationNotice::Rejected { reason },
    };
    send_notice(deps.mailer.as_ref(), &updated, notice).await;

    Ok(updated)
}
