//! Edit-mode rollback action.

use tracing::info;

use crate::common::{Actor, ApplicationId, CoreError};
use crate::domains::registration::machines::edit_mode_rollback;
use crate::domains::registration::models::Registration;
use crate::kernel::ServerDeps;

/// Reopen an already-processed registration for correction. Atomically
/// resets the verification pass while preserving the existing proof for
/// audit; a new proof then arrives through the relink flow.
pub async fn enable_edit_mode(
    deps: &ServerDeps,
    application_id: &ApplicationId,
    actor: &Actor,
    reason: &str,
) -> Result<Registration, CoreError> {
    let row = deps
        .store
        .select_by_application_id(application_id)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("registration {}", application_id)))?;

    let patch = edit_mode_rollback(&row, actor, reason)?;
    deps.store.update_registration(application_id, patch).await?;

    info!(
        "Edit mode enabled on {} by {} ({})",
        application_id, actor.id, reason
    );

    deps.store
        .select_by_application_id(application_id)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("registration {}", application_id)))
}
