//! Integration tests for the verification/approval state machine, the
//! edit-mode rollback, and group discovery through the lookup flow.

mod common;

use common::{attendee, human_signal, proof_file, registrant, TestHarness};
use server_core::common::{
    Actor, ApplicationId, CoreError, PaymentStatus, RegistrationStatus, Role, StayType,
};
use server_core::domains::registration::actions::{
    accounts_verify, approve, enable_edit_mode, lookup_by_application_id, pending_queue,
    relink_proof, submit, SubmissionResult,
};
use server_core::domains::registration::machines::{ApprovalDecision, VerifyDecision};
use server_core::domains::registration::models::RegistrationPatch;
use server_core::kernel::{BaseRegistrationStore, PendingQueue};

fn reviewer() -> Actor {
    Actor::new("rev-1", Role::AccountsReviewer)
}

fn admin() -> Actor {
    Actor::new("adm-1", Role::Admin)
}

async fn submitted_group(ctx: &TestHarness, attendees: usize) -> SubmissionResult {
    let attendee_specs = (0..attendees)
        .map(|i| attendee(&format!("Guest {}", i), StayType::Outside))
        .collect();
    submit(
        &ctx.deps,
        registrant(StayType::OnCampus),
        attendee_specs,
        Some(proof_file()),
        human_signal(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn verify_then_approve_happy_path() {
    let ctx = TestHarness::new();
    let submission = submitted_group(&ctx, 0).await;
    let id = &submission.application_id;

    let verified = accounts_verify(&ctx.deps, id, &reviewer(), VerifyDecision::Verified)
        .await
        .unwrap();
    assert_eq!(verified.payment_status, PaymentStatus::Verified);
    assert!(verified.accounts_verified);
    assert_eq!(verified.accounts_verified_by.as_deref(), Some("rev-1"));

    let approved = approve(&ctx.deps, id, &admin(), ApprovalDecision::Approved, None)
        .await
        .unwrap();
    assert_eq!(approved.registration_status, RegistrationStatus::Approved);
    assert_eq!(approved.approved_by.as_deref(), Some("adm-1"));

    // Approval email went out (after the submission confirmation)
    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].subject.contains("approved"));
}

#[tokio::test]
async fn approve_without_accounts_verification_is_rejected() {
    let ctx = TestHarness::new();
    let submission = submitted_group(&ctx, 0).await;
    let id = &submission.application_id;

    let err = approve(&ctx.deps, id, &admin(), ApprovalDecision::Approved, None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));

    // No state change
    let row = ctx.store.row(id).unwrap();
    assert_eq!(row.registration_status, RegistrationStatus::Pending);
    assert!(row.approved_by.is_none());
}

#[tokio::test]
async fn role_guards_hold_across_actions() {
    let ctx = TestHarness::new();
    let submission = submitted_group(&ctx, 0).await;
    let id = &submission.application_id;

    let err = accounts_verify(&ctx.deps, id, &admin(), VerifyDecision::Verified)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));

    let err = enable_edit_mode(&ctx.deps, id, &reviewer(), "fix the name")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden(_)));
}

#[tokio::test]
async fn rejection_notifies_with_the_reason() {
    let ctx = TestHarness::new();
    let submission = submitted_group(&ctx, 0).await;
    let id = &submission.application_id;

    accounts_verify(&ctx.deps, id, &reviewer(), VerifyDecision::Verified)
        .await
        .unwrap();
    let rejected = approve(
        &ctx.deps,
        id,
        &admin(),
        ApprovalDecision::Rejected,
        Some("duplicate registration".to_string()),
    )
    .await
    .unwrap();

    assert_eq!(rejected.registration_status, RegistrationStatus::Rejected);
    let sent = ctx.mailer.sent();
    assert!(sent[1].body.contains("duplicate registration"));
}

#[tokio::test]
async fn edit_mode_resets_verification_but_preserves_the_proof() {
    let ctx = TestHarness::new();
    let submission = submitted_group(&ctx, 0).await;
    let id = &submission.application_id;

    accounts_verify(&ctx.deps, id, &reviewer(), VerifyDecision::Verified)
        .await
        .unwrap();
    approve(&ctx.deps, id, &admin(), ApprovalDecision::Approved, None)
        .await
        .unwrap();

    // A receipt was issued after approval
    ctx.deps
        .store
        .update_registration(
            id,
            RegistrationPatch {
                payment_receipt_url: Some(Some("https://blobs.test/receipt.pdf".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let row = enable_edit_mode(&ctx.deps, id, &admin(), "fee mismatch on receipt")
        .await
        .unwrap();

    assert!(row.edit_mode_enabled);
    assert_eq!(row.registration_status, RegistrationStatus::Pending);
    assert!(!row.accounts_verified);
    assert!(row.accounts_verified_by.is_none());
    assert!(row.payment_receipt_url.is_none());
    // Preserved for audit reference
    assert_eq!(row.payment_proof_url.as_deref(), Some(submission.proof_url.as_str()));
    assert_eq!(row.edit_mode_reason.as_deref(), Some("fee mismatch on receipt"));
}

#[tokio::test(start_paused = true)]
async fn full_edit_cycle_returns_the_row_to_approved() {
    let ctx = TestHarness::new();
    let submission = submitted_group(&ctx, 0).await;
    let id = &submission.application_id;

    accounts_verify(&ctx.deps, id, &reviewer(), VerifyDecision::Verified)
        .await
        .unwrap();
    approve(&ctx.deps, id, &admin(), ApprovalDecision::Approved, None)
        .await
        .unwrap();
    enable_edit_mode(&ctx.deps, id, &admin(), "wrong proof uploaded")
        .await
        .unwrap();

    // Correction: a fresh proof through the relink pipeline
    let relinked = relink_proof(&ctx.deps, id, proof_file()).await.unwrap();
    let row = ctx.store.row(id).unwrap();
    assert_eq!(row.payment_status, PaymentStatus::Submitted);
    assert!(row.pending_admin_approval);
    assert_eq!(row.payment_proof_url.as_deref(), Some(relinked.proof_url.as_str()));
    assert_ne!(relinked.proof_url, submission.proof_url);

    // Re-verify and re-approve
    accounts_verify(&ctx.deps, id, &reviewer(), VerifyDecision::Verified)
        .await
        .unwrap();
    let row = approve(&ctx.deps, id, &admin(), ApprovalDecision::Approved, None)
        .await
        .unwrap();

    assert_eq!(row.registration_status, RegistrationStatus::Approved);
    assert!(!row.edit_mode_enabled);
    assert!(!row.pending_admin_approval);
    assert_eq!(row.payment_proof_url.as_deref(), Some(relinked.proof_url.as_str()));
}

#[tokio::test(start_paused = true)]
async fn primary_correction_cascades_to_the_whole_group() {
    let ctx = TestHarness::new();
    let submission = submitted_group(&ctx, 2).await;
    let id = &submission.application_id;

    enable_edit_mode(&ctx.deps, id, &admin(), "blurred proof image")
        .await
        .unwrap();
    let relinked = relink_proof(&ctx.deps, id, proof_file()).await.unwrap();

    assert_eq!(relinked.linked.len(), 3);
    for member_id in &submission.group_application_ids {
        let row = ctx.store.row(member_id).unwrap();
        assert_eq!(row.payment_proof_url.as_deref(), Some(relinked.proof_url.as_str()));
        assert_eq!(row.payment_status, PaymentStatus::Submitted);
    }

    // Only the edited row awaits re-approval
    let primary = ctx.store.row(id).unwrap();
    assert!(primary.pending_admin_approval);
    let sibling = ctx.store.row(&submission.group_application_ids[1]).unwrap();
    assert!(!sibling.pending_admin_approval);
}

#[tokio::test(start_paused = true)]
async fn dependent_relink_touches_only_itself() {
    let ctx = TestHarness::new();
    let submission = submitted_group(&ctx, 2).await;
    let dependent_id = &submission.group_application_ids[1];
    let original_url = submission.proof_url.clone();

    let relinked = relink_proof(&ctx.deps, dependent_id, proof_file())
        .await
        .unwrap();

    assert_eq!(relinked.linked, vec![dependent_id.clone()]);
    assert!(relinked.proof_url.contains(&format!("proof-{}", dependent_id)));

    let untouched = ctx.store.row(&submission.application_id).unwrap();
    assert_eq!(untouched.payment_proof_url.as_deref(), Some(original_url.as_str()));
}

#[tokio::test]
async fn lookup_returns_the_same_group_from_any_member() {
    let ctx = TestHarness::new();
    let submission = submitted_group(&ctx, 2).await;

    let via_primary = lookup_by_application_id(&ctx.deps, &submission.application_id)
        .await
        .unwrap();
    let via_dependent =
        lookup_by_application_id(&ctx.deps, &submission.group_application_ids[2])
            .await
            .unwrap();

    assert_eq!(via_primary.group_members.len(), 3);
    assert_eq!(via_dependent.group_members.len(), 3);
    assert_eq!(via_primary.group_total_fee, 30_000);
    assert_eq!(via_dependent.group_total_fee, 30_000);
}

#[tokio::test]
async fn lookup_on_orphaned_dependent_reports_the_integrity_violation() {
    let ctx = TestHarness::new();
    let submission = submitted_group(&ctx, 1).await;

    ctx.store.remove_row(&submission.application_id);

    let err = lookup_by_application_id(&ctx.deps, &submission.group_application_ids[1])
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn lookup_of_unknown_id_is_not_found() {
    let ctx = TestHarness::new();
    let err = lookup_by_application_id(&ctx.deps, &ApplicationId::from("AM26-MISSIN"))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn pending_queues_track_the_review_stages() {
    let ctx = TestHarness::new();
    let submission = submitted_group(&ctx, 0).await;
    let id = &submission.application_id;

    // Submitted -> accounts review queue
    let accounts = pending_queue(&ctx.deps, PendingQueue::AccountsReview)
        .await
        .unwrap();
    assert_eq!(accounts.len(), 1);
    assert!(pending_queue(&ctx.deps, PendingQueue::AdminApproval)
        .await
        .unwrap()
        .is_empty());

    // Verified -> approval queue
    accounts_verify(&ctx.deps, id, &reviewer(), VerifyDecision::Verified)
        .await
        .unwrap();
    assert!(pending_queue(&ctx.deps, PendingQueue::AccountsReview)
        .await
        .unwrap()
        .is_empty());
    let approval = pending_queue(&ctx.deps, PendingQueue::AdminApproval)
        .await
        .unwrap();
    assert_eq!(approval.len(), 1);

    // Approved -> no queue
    approve(&ctx.deps, id, &admin(), ApprovalDecision::Approved, None)
        .await
        .unwrap();
    assert!(pending_queue(&ctx.deps, PendingQueue::AdminApproval)
        .await
        .unwrap()
        .is_empty());
}
