//! Standalone proof relink: the "lookup and pay later" flow and the
//! edit-mode correction path.
//!
//! Re-runs the upload/finalize/link pipeline for rows that already exist.
//! This is also the recovery path for submissions whose fan-out step only
//! partially succeeded.

use serde::Serialize;
use tracing::info;

use crate::common::{ApplicationId, CoreError, PaymentStatus};
use crate::domains::proof::{ProofStore, ProofUpload};
use crate::domains::registration::actions::submit::link_proof_with_retry;
use crate::domains::registration::group::discover_group;
use crate::domains::registration::models::RegistrationPatch;
use crate::kernel::ServerDeps;

#[derive(Debug, Clone, Serialize)]
pub struct RelinkResult {
    pub application_id: ApplicationId,
    /// Members that received the new proof reference.
    pub linked: Vec<ApplicationId>,
    pub link_failures: Vec<ApplicationId>,
    pub proof_url: String,
}

pub async fn relink_proof(
    deps: &ServerDeps,
    application_id: &ApplicationId,
    proof: ProofUpload,
) -> Result<RelinkResult, CoreError> {
    let entry = deps
        .store
        .select_by_application_id(application_id)
        .await?
        .ok_or_else(|| CoreError::not_found(format!("registration {}", application_id)))?;

    // A new proof on a group primary covers the whole group; a dependent's
    // individual proof covers only itself.
    let group = discover_group(deps.store.as_ref(), application_id).await?;
    let targets = if entry.is_primary() {
        group.member_ids()
    } else {
        vec![entry.application_id.clone()]
    };

    let proofs = ProofStore::new(deps.blobs.clone());
    let temp_key = proofs
        .upload_temporary(&proof, application_id.as_str())
        .await?;

    let prefix = if targets.len() > 1 {
        format!("group-{}", entry.application_id)
    } else {
        format!("proof-{}", entry.application_id)
    };
    let final_key = proofs.finalize(&temp_key, &prefix).await;
    if final_key != temp_key {
        proofs.delete_best_effort(&temp_key).await;
    }
    let proof_url = proofs.resolve_url(&final_key);

    info!(
        "Relinking proof for {} across {} member(s)",
        application_id,
        targets.len()
    );

    let mut linked = Vec::new();
    let mut link_failures = Vec::new();
    for id in &targets {
        let mut patch = RegistrationPatch {
            payment_proof_url: Some(proof_url.clone()),
            payment_status: Some(PaymentStatus::Submitted),
            ..Default::default()
        };
        // A correction saved while edit mode is open must pass accounts
        // re-verification before admin can re-approve.
        if id == &entry.application_id && entry.edit_mode_enabled {
            patch.pending_admin_approval = Some(true);
        }
        if link_proof_with_retry(deps.store.as_ref(), id, &patch).await {
            linked.push(id.clone());
        } else {
            link_failures.push(id.clone());
        }
    }

    Ok(RelinkResult {
        application_id: entry.application_id,
        linked,
        link_failures,
        proof_url,
    })
}
