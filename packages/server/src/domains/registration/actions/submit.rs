//! Submission orchestrator: the end-to-end create-then-link pipeline.
//!
//! Ordering contract: group rows are fully created, with every application
//! id known, before any fan-out update runs. Failures before row creation
//! abort with nothing persisted (except, intentionally, the temporary blob
//! when row creation itself fails); failures after row creation never roll
//! the rows back - the system degrades toward "registration exists, proof
//! needs relinking".

use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::common::{ApplicationId, BotSignal, CoreError, PaymentStatus};
use crate::domains::proof::{ProofStore, ProofUpload};
use crate::domains::registration::events::{send_notice, RegistrationNotice};
use crate::domains::registration::group::{build_group, AttendeeSpec, RegistrantSpec};
use crate::domains::registration::models::RegistrationPatch;
use crate::kernel::{BaseRegistrationStore, ServerDeps};

/// Per-row attempts for the fan-out link step.
pub const LINK_MAX_ATTEMPTS: u32 = 3;
/// Backoff between attempts grows linearly: 400ms, 800ms.
const LINK_BACKOFF: Duration = Duration::from_millis(400);

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionResult {
    pub application_id: ApplicationId,
    /// Every id in the group, primary first, in creation order.
    pub group_application_ids: Vec<ApplicationId>,
    pub proof_url: String,
    /// Members whose rows exist but did not receive the proof reference.
    /// Non-empty is still overall success; the caller directs the user to
    /// the lookup/relink flow for these ids.
    pub link_failures: Vec<ApplicationId>,
}

pub async fn submit(
    deps: &ServerDeps,
    registrant: RegistrantSpec,
    attendees: Vec<AttendeeSpec>,
    proof: Option<ProofUpload>,
    bot_signal: BotSignal,
) -> Result<SubmissionResult, CoreError> {
    // 1. Abuse gate - nothing has been touched yet, rejecting is free.
    if bot_signal.is_suspect() {
        warn!(
            "Rejecting suspected automated submission (honeypot: {}, elapsed: {}ms)",
            bot_signal.honeypot_filled, bot_signal.elapsed_ms
        );
        return Err(CoreError::AbuseSuspected);
    }

    // 2. Proof is mandatory, checked before any I/O.
    let proof = proof.ok_or_else(|| CoreError::validation("payment proof is required"))?;

    let group = build_group(registrant, attendees)?;
    info!(
        "Submitting registration group of {} (total fee {})",
        group.size(),
        group.total_fee()
    );

    // 3. Upload under a temporary key; no identifiers exist yet.
    let proofs = ProofStore::new(deps.blobs.clone());
    let temp_key = proofs
        .upload_temporary(&proof, &group.primary.full_name)
        .await?;

    // 4. Create the rows. The temporary blob is deliberately left behind if
    // this fails: it may be the only copy of the registrant's proof.
    let group_size = group.size();
    let total_fee = group.total_fee();
    let created = match deps
        .store
        .create_group_rows(group.primary, group.attendees)
        .await
    {
        Ok(created) => created,
        Err(e) => {
            error!(
                "Row creation failed; temporary proof retained at {}: {}",
                temp_key, e
            );
            return Err(CoreError::Internal(e));
        }
    };

    // 5. Rename the artifact now that the primary id is known. A shared
    // group proof gets a distinct prefix from an individual one.
    let prefix = if created.attendee_application_ids.is_empty() {
        format!("proof-{}", created.application_id)
    } else {
        format!("group-{}", created.application_id)
    };
    let final_key = proofs.finalize(&temp_key, &prefix).await;
    if final_key != temp_key {
        proofs.delete_best_effort(&temp_key).await;
    }
    let proof_url = proofs.resolve_url(&final_key);

    // 6. Fan out the reference to every member; tolerate partial failure.
    let mut group_ids = vec![created.application_id.clone()];
    group_ids.extend(created.attendee_application_ids.iter().cloned());

    let patch = RegistrationPatch {
        payment_proof_url: Some(proof_url.clone()),
        payment_status: Some(PaymentStatus::Submitted),
        ..Default::default()
    };

    let mut link_failures = Vec::new();
    for id in &group_ids {
        if !link_proof_with_retry(deps.store.as_ref(), id, &patch).await {
            link_failures.push(id.clone());
        }
    }

    if !link_failures.is_empty() {
        warn!(
            "Submission {} succeeded with {} unlinked member(s): {:?}",
            created.application_id,
            link_failures.len(),
            link_failures
        );
    }

    // Confirmation email; failure never affects the result.
    if let Ok(Some(primary_row)) = deps
        .store
        .select_by_application_id(&created.application_id)
        .await
    {
        send_notice(
            deps.mailer.as_ref(),
            &primary_row,
            RegistrationNotice::SubmissionReceived {
                group_size,
                total_fee,
            },
        )
        .await;
    }

    Ok(SubmissionResult {
        application_id: created.application_id,
        group_application_ids: group_ids,
        proof_url,
        link_failures,
    })
}

/// Idempotent single-row update with bounded retry. Returns whether the
/// update eventually landed; the caller collects failures instead of
/// aborting the loop.
pub(crate) async fn link_proof_with_retry(
    store: &dyn BaseRegistrationStore,
    application_id: &ApplicationId,
    patch: &RegistrationPatch,
) -> bool {
    for attempt in 1..=LINK_MAX_ATTEMPTS {
        match store
            .update_registration(application_id, patch.clone())
            .await
        {
            Ok(()) => return true,
            Err(e) => {
                warn!(
                    "Linking proof to {} failed (attempt {}/{}): {}",
                    application_id, attempt, LINK_MAX_ATTEMPTS, e
                );
                if attempt < LINK_MAX_ATTEMPTS {
                    tokio::time::sleep(LINK_BACKOFF * attempt).await;
                }
            }
        }
    }
    error!(
        "Giving up on linking proof to {} after {} attempts",
        application_id, LINK_MAX_ATTEMPTS
    );
    false
}
