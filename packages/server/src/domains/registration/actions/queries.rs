//! Read-side actions for the lookup flow and the admin console queues.

use serde::Serialize;

use crate::common::{ApplicationId, CoreError};
use crate::domains::registration::group::discover_group;
use crate::domains::registration::models::Registration;
use crate::kernel::{PendingQueue, ServerDeps};

#[derive(Debug, Clone, Serialize)]
pub struct LookupResult {
    pub registration: Registration,
    /// The full group, primary first, regardless of which member was looked
    /// up.
    pub group_members: Vec<Registration>,
    pub group_total_fee: i64,
}

pub async fn lookup_by_application_id(
    deps: &ServerDeps,
    application_id: &ApplicationId,
) -> Result<LookupResult, CoreError> {
    let registration = deps
        .store
        .select_by_application_id(application_id)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("registration {}", application_id)))?;

    let group = discover_group(deps.store.as_ref(), application_id).await?;
    let group_total_fee = group.total_fee();
    let group_members = group.members().cloned().collect();

    Ok(LookupResult {
        registration,
        group_members,
        group_total_fee,
    })
}

/// Admin-console work queue, oldest first.
pub async fn pending_queue(
    deps: &ServerDeps,
    queue: PendingQueue,
) -> Result<Vec<Registration>, CoreError> {
    Ok(deps.store.select_pending(queue).await?)
}
