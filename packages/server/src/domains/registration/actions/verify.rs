//! Accounts verification action - first-pass human payment review.

use tracing::info;

use crate::common::{Actor, ApplicationId, CoreError};
use crate::domains::registration::machines::{accounts_verification, VerifyDecision};
use crate::domains::registration::models::Registration;
use crate::kernel::ServerDeps;

/// Apply an accounts-reviewer decision to a single row. No cascade: each
/// group member's payment is reviewed on its own.
pub async fn accounts_verify(
    deps: &ServerDeps,
    application_id: &ApplicationId,
    actor: &Actor,
    decision: VerifyDecision,
) -> Result<Registration, CoreError> {
    let row = deps
        .store
        .select_by_application_id(application_id)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("registration {}", application_id)))?;

    let patch = accounts_verification(&row, actor, decision)?;
    deps.store.update_registration(application_id, patch).await?;

    info!(
        "Accounts verification for {} by {}: {:?}",
        application_id, actor.id, decision
    );

    deps.store
        .select_by_application_id(application_id)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("registration {}", application_id)))
}
