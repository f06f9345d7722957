// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic. Business logic
// (like "link this proof to the whole group") lives in domain actions that
// use these traits.
//
// Naming convention: Base* for trait names (e.g., BaseBlobStore)

use anyhow::Result;
use async_trait::async_trait;

use crate::common::ApplicationId;
use crate::domains::registration::models::{NewRegistrationRow, Registration, RegistrationPatch};

// =============================================================================
// Registration Store Trait (relational rows)
// =============================================================================

/// Ids assigned by `create_group_rows`, in attendee input order.
#[derive(Debug, Clone)]
pub struct CreatedGroup {
    pub application_id: ApplicationId,
    pub attendee_application_ids: Vec<ApplicationId>,
}

/// Which admin-console queue to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingQueue {
    /// Proof submitted, awaiting first-pass accounts review.
    AccountsReview,
    /// Accounts-verified, awaiting admin decision.
    AdminApproval,
}

#[async_trait]
pub trait BaseRegistrationStore: Send + Sync {
    /// Persist a primary plus its dependents and assign application ids.
    /// Atomic for the set of rows it creates.
    async fn create_group_rows(
        &self,
        primary: NewRegistrationRow,
        attendees: Vec<NewRegistrationRow>,
    ) -> Result<CreatedGroup>;

    /// Single-row conditional update. Must be safe to call repeatedly with
    /// an identical patch (idempotent).
    async fn update_registration(
        &self,
        application_id: &ApplicationId,
        patch: RegistrationPatch,
    ) -> Result<()>;

    async fn select_by_parent(&self, parent: &ApplicationId) -> Result<Vec<Registration>>;

    async fn select_by_application_id(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<Registration>>;

    /// Admin-console work queues, oldest first.
    async fn select_pending(&self, queue: PendingQueue) -> Result<Vec<Registration>>;
}

// =============================================================================
// Blob Store Trait (payment-proof artifacts)
// =============================================================================

#[async_trait]
pub trait BaseBlobStore: Send + Sync {
    async fn blob_upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()>;

    async fn blob_copy(&self, src_key: &str, dst_key: &str) -> Result<()>;

    async fn blob_delete(&self, key: &str) -> Result<()>;

    /// Public URL construction; deterministic, no I/O.
    fn blob_public_url(&self, key: &str) -> String;
}

// =============================================================================
// Mailer Trait (outbound transactional email)
// =============================================================================

#[async_trait]
pub trait BaseMailer: Send + Sync {
    /// Send one transactional email. Callers treat this as fire-and-forget:
    /// failures are logged, never propagated into a state transition.
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachment_url: Option<&str>,
    ) -> Result<()>;
}
