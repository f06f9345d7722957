//! Registration lifecycle endpoints.
//!
//! Submission and relink arrive as multipart (JSON fields + proof file);
//! staff actions are JSON bodies with the actor identity in headers.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::common::{Actor, ApplicationId, BotSignal, CoreError};
use crate::domains::proof::ProofUpload;
use crate::domains::registration::actions::{
    accounts_verify, approve, enable_edit_mode, lookup_by_application_id, pending_queue,
    relink_proof, submit, LookupResult, RelinkResult,
};
use crate::domains::registration::group::{AttendeeSpec, RegistrantSpec};
use crate::domains::registration::machines::{ApprovalDecision, VerifyDecision};
use crate::domains::registration::models::Registration;
use crate::kernel::PendingQueue;
use crate::server::app::AppState;

// =============================================================================
// Submission
// =============================================================================

#[derive(Serialize)]
pub struct SubmitResponse {
    pub application_id: ApplicationId,
    pub group_application_ids: Vec<ApplicationId>,
    pub proof_url: String,
    pub link_failures: Vec<ApplicationId>,
    /// Present when some members did not receive the proof reference; the
    /// registration itself still succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

pub async fn submit_handler(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitResponse>), CoreError> {
    let form = SubmissionForm::parse(multipart).await?;
    let bot_signal = form.bot_signal();

    let registrant = form
        .registrant
        .ok_or_else(|| CoreError::validation("registrant field is required"))?;

    let result = submit(
        &state.deps,
        registrant,
        form.attendees,
        form.proof,
        bot_signal,
    )
    .await?;

    let warning = if result.link_failures.is_empty() {
        None
    } else {
        Some(format!(
            "Your registration was created, but the payment proof could not be \
             attached to: {}. Use the lookup flow with your application id to \
             re-upload the proof.",
            result
                .link_failures
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ))
    };

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            application_id: result.application_id,
            group_application_ids: result.group_application_ids,
            proof_url: result.proof_url,
            link_failures: result.link_failures,
            warning,
        }),
    ))
}

/// Multipart fields of the submission form. The honeypot field is named
/// `website` so bots fill it in.
#[derive(Default)]
struct SubmissionForm {
    registrant: Option<RegistrantSpec>,
    attendees: Vec<AttendeeSpec>,
    proof: Option<ProofUpload>,
    elapsed_ms: u64,
    honeypot_filled: bool,
}

impl SubmissionForm {
    fn bot_signal(&self) -> BotSignal {
        BotSignal {
            honeypot_filled: self.honeypot_filled,
            elapsed_ms: self.elapsed_ms,
        }
    }

    async fn parse(mut multipart: Multipart) -> Result<Self, CoreError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| CoreError::validation(format!("malformed multipart body: {}", e)))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "registrant" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| CoreError::validation(e.to_string()))?;
                    form.registrant = Some(
                        serde_json::from_str(&text)
                            .map_err(|e| CoreError::validation(format!("registrant: {}", e)))?,
                    );
                }
                "attendees" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| CoreError::validation(e.to_string()))?;
                    form.attendees = serde_json::from_str(&text)
                        .map_err(|e| CoreError::validation(format!("attendees: {}", e)))?;
                }
                "elapsed_ms" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| CoreError::validation(e.to_string()))?;
                    form.elapsed_ms = text.trim().parse().unwrap_or(0);
                }
                "website" => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| CoreError::validation(e.to_string()))?;
                    form.honeypot_filled = !text.trim().is_empty();
                }
                "proof" => {
                    form.proof = Some(read_proof_field(field).await?);
                }
                _ => {}
            }
        }

        Ok(form)
    }
}

async fn read_proof_field(field: axum::extract::multipart::Field<'_>) -> Result<ProofUpload, CoreError> {
    let file_name = field.file_name().unwrap_or("proof").to_string();
    let content_type = field
        .content_type()
        .ok_or_else(|| CoreError::validation("proof file must carry a content type"))?
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| CoreError::validation(format!("proof upload aborted: {}", e)))?;

    Ok(ProofUpload {
        bytes: bytes.to_vec(),
        content_type,
        file_name,
    })
}

// =============================================================================
// Lookup & relink
// =============================================================================

pub async fn lookup_handler(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
) -> Result<Json<LookupResult>, CoreError> {
    let result =
        lookup_by_application_id(&state.deps, &ApplicationId::from(application_id)).await?;
    Ok(Json(result))
}

pub async fn relink_handler(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<RelinkResult>, CoreError> {
    let mut proof = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| CoreError::validation(format!("malformed multipart body: {}", e)))?
    {
        if field.name() == Some("proof") {
            proof = Some(read_proof_field(field).await?);
        }
    }
    let proof = proof.ok_or_else(|| CoreError::validation("payment proof is required"))?;

    let result = relink_proof(&state.deps, &ApplicationId::from(application_id), proof).await?;
    Ok(Json(result))
}

// =============================================================================
// Staff actions
// =============================================================================

#[derive(Deserialize)]
pub struct VerifyRequest {
    pub decision: VerifyDecision,
}

pub async fn verify_handler(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    actor: Actor,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<Registration>, CoreError> {
    let row = accounts_verify(
        &state.deps,
        &ApplicationId::from(application_id),
        &actor,
        request.decision,
    )
    .await?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct ApproveRequest {
    pub decision: ApprovalDecision,
    pub reason: Option<String>,
}

pub async fn approve_handler(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    actor: Actor,
    Json(request): Json<ApproveRequest>,
) -> Result<Json<Registration>, CoreError> {
    let row = approve(
        &state.deps,
        &ApplicationId::from(application_id),
        &actor,
        request.decision,
        request.reason,
    )
    .await?;
    Ok(Json(row))
}

#[derive(Deserialize)]
pub struct EditModeRequest {
    pub reason: String,
}

pub async fn edit_mode_handler(
    State(state): State<AppState>,
    Path(application_id): Path<String>,
    actor: Actor,
    Json(request): Json<EditModeRequest>,
) -> Result<Json<Registration>, CoreError> {
    let row = enable_edit_mode(
        &state.deps,
        &ApplicationId::from(application_id),
        &actor,
        &request.reason,
    )
    .await?;
    Ok(Json(row))
}

pub async fn pending_queue_handler(
    State(state): State<AppState>,
    Path(queue): Path<String>,
    // Extracting the actor enforces that staff identity headers are present;
    // any staff role may read the queues.
    _actor: Actor,
) -> Result<Json<Vec<Registration>>, CoreError> {
    let queue = match queue.as_str() {
        "accounts" => PendingQueue::AccountsReview,
        "approval" => PendingQueue::AdminApproval,
        other => {
            return Err(CoreError::validation(format!(
                "unknown queue {}; expected accounts or approval",
                other
            )))
        }
    };

    Ok(Json(pending_queue(&state.deps, queue).await?))
}
