// TestDependencies - mock implementations for testing
//
// Provides in-memory services that can be injected as ServerDeps for tests.
// Each mock records its calls and supports failure injection so tests can
// exercise the partial-failure paths of the submission pipeline.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::common::{ApplicationId, PaymentStatus, RegistrationStatus};
use crate::domains::registration::models::{NewRegistrationRow, Registration, RegistrationPatch};
use crate::kernel::traits::{
    BaseBlobStore, BaseMailer, BaseRegistrationStore, CreatedGroup, PendingQueue,
};

/// Always-fail marker for `with_update_failures`.
pub const FAIL_ALWAYS: u32 = u32::MAX;

// =============================================================================
// Memory Registration Store
// =============================================================================

#[derive(Clone, Default)]
pub struct MemoryRegistrationStore {
    rows: Arc<Mutex<HashMap<String, Registration>>>,
    update_calls: Arc<Mutex<Vec<String>>>,
    /// application id -> number of injected failures remaining
    /// (`FAIL_ALWAYS` never decrements).
    update_failures: Arc<Mutex<HashMap<String, u32>>>,
    /// creation index (0 = primary) -> failure count, armed when the id is
    /// assigned. Lets tests target rows whose ids don't exist yet.
    fail_created_index: Arc<Mutex<HashMap<usize, u32>>>,
    fail_create: Arc<Mutex<bool>>,
}

impl MemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` updates for `id` fail.
    pub fn with_update_failures(self, id: &ApplicationId, count: u32) -> Self {
        self.update_failures
            .lock()
            .unwrap()
            .insert(id.as_str().to_string(), count);
        self
    }

    pub fn with_create_failure(self) -> Self {
        *self.fail_create.lock().unwrap() = true;
        self
    }

    /// Make updates fail for the row created at `index` (0 = primary,
    /// attendees follow in input order). Ids are assigned at creation time,
    /// so tests targeting the fan-out step can't name them up front.
    pub fn with_update_failures_for_created_index(self, index: usize, count: u32) -> Self {
        self.fail_created_index.lock().unwrap().insert(index, count);
        self
    }

    /// Inject failures for an id that does not exist yet (ids are assigned
    /// at creation time, so tests targeting the fan-out step set this after
    /// the fact).
    pub fn inject_update_failures(&self, id: &ApplicationId, count: u32) {
        self.update_failures
            .lock()
            .unwrap()
            .insert(id.as_str().to_string(), count);
    }

    /// Seed a pre-existing row (for lookup / verification tests).
    pub fn insert_row(&self, row: Registration) {
        self.rows
            .lock()
            .unwrap()
            .insert(row.application_id.as_str().to_string(), row);
    }

    pub fn remove_row(&self, id: &ApplicationId) {
        self.rows.lock().unwrap().remove(id.as_str());
    }

    pub fn row(&self, id: &ApplicationId) -> Option<Registration> {
        self.rows.lock().unwrap().get(id.as_str()).cloned()
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    /// Ids passed to `update_registration`, in call order (including failed
    /// attempts).
    pub fn update_calls(&self) -> Vec<String> {
        self.update_calls.lock().unwrap().clone()
    }

    fn arm_injected_failures(&self, index: usize, id: &ApplicationId) {
        if let Some(count) = self.fail_created_index.lock().unwrap().remove(&index) {
            self.update_failures
                .lock()
                .unwrap()
                .insert(id.as_str().to_string(), count);
        }
    }
}

#[async_trait]
impl BaseRegistrationStore for MemoryRegistrationStore {
    async fn create_group_rows(
        &self,
        primary: NewRegistrationRow,
        attendees: Vec<NewRegistrationRow>,
    ) -> Result<CreatedGroup> {
        if *self.fail_create.lock().unwrap() {
            anyhow::bail!("injected create failure");
        }

        let now = Utc::now();
        let make_row = |fields: NewRegistrationRow, parent: Option<ApplicationId>| Registration {
            application_id: ApplicationId::generate(),
            parent_application_id: parent,
            full_name: fields.full_name,
            email: fields.email,
            stay_type: fields.stay_type,
            registration_fee: fields.registration_fee,
            payment_status: PaymentStatus::Pending,
            registration_status: RegistrationStatus::Pending,
            accounts_verified: false,
            accounts_verified_by: None,
            accounts_verified_at: None,
            approved_by: None,
            approved_at: None,
            edit_mode_enabled: false,
            edit_mode_enabled_by: None,
            edit_mode_enabled_at: None,
            edit_mode_reason: None,
            pending_admin_approval: false,
            payment_proof_url: None,
            payment_receipt_url: None,
            created_at: now,
            updated_at: now,
        };

        let primary_row = make_row(primary, None);
        let primary_id = primary_row.application_id.clone();

        let mut rows = self.rows.lock().unwrap();
        rows.insert(primary_id.as_str().to_string(), primary_row);
        self.arm_injected_failures(0, &primary_id);

        let mut attendee_ids = Vec::with_capacity(attendees.len());
        for (i, fields) in attendees.into_iter().enumerate() {
            let row = make_row(fields, Some(primary_id.clone()));
            self.arm_injected_failures(i + 1, &row.application_id);
            attendee_ids.push(row.application_id.clone());
            rows.insert(row.application_id.as_str().to_string(), row);
        }

        Ok(CreatedGroup {
            application_id: primary_id,
            attendee_application_ids: attendee_ids,
        })
    }

    async fn update_registration(
        &self,
        application_id: &ApplicationId,
        patch: RegistrationPatch,
    ) -> Result<()> {
        self.update_calls
            .lock()
            .unwrap()
            .push(application_id.as_str().to_string());

        {
            let mut failures = self.update_failures.lock().unwrap();
            if let Some(remaining) = failures.get_mut(application_id.as_str()) {
                if *remaining > 0 {
                    if *remaining != FAIL_ALWAYS {
                        *remaining -= 1;
                    }
                    anyhow::bail!("injected update failure for {}", application_id);
                }
            }
        }

        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .get_mut(application_id.as_str())
            .ok_or_else(|| anyhow::anyhow!("no row with application id {}", application_id))?;
        patch.apply(row);
        Ok(())
    }

    async fn select_by_parent(&self, parent: &ApplicationId) -> Result<Vec<Registration>> {
        let rows = self.rows.lock().unwrap();
        let mut children: Vec<Registration> = rows
            .values()
            .filter(|r| r.parent_application_id.as_ref() == Some(parent))
            .cloned()
            .collect();
        children.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(children)
    }

    async fn select_by_application_id(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<Registration>> {
        Ok(self.rows.lock().unwrap().get(application_id.as_str()).cloned())
    }

    async fn select_pending(&self, queue: PendingQueue) -> Result<Vec<Registration>> {
        let rows = self.rows.lock().unwrap();
        let mut pending: Vec<Registration> = rows
            .values()
            .filter(|r| match queue {
                PendingQueue::AccountsReview => {
                    r.payment_status == PaymentStatus::Submitted && !r.accounts_verified
                }
                PendingQueue::AdminApproval => {
                    r.accounts_verified && r.registration_status == RegistrationStatus::Pending
                }
            })
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(pending)
    }
}

// =============================================================================
// Mock Blob Store
// =============================================================================

#[derive(Clone, Default)]
pub struct MockBlobStore {
    objects: Arc<Mutex<HashMap<String, (Vec<u8>, String)>>>,
    upload_calls: Arc<Mutex<Vec<String>>>,
    copy_calls: Arc<Mutex<Vec<(String, String)>>>,
    delete_calls: Arc<Mutex<Vec<String>>>,
    fail_uploads: Arc<Mutex<bool>>,
    fail_copies: Arc<Mutex<bool>>,
    fail_deletes: Arc<Mutex<bool>>,
}

impl MockBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_upload_failure(self) -> Self {
        *self.fail_uploads.lock().unwrap() = true;
        self
    }

    pub fn with_copy_failure(self) -> Self {
        *self.fail_copies.lock().unwrap() = true;
        self
    }

    pub fn with_delete_failure(self) -> Self {
        *self.fail_deletes.lock().unwrap() = true;
        self
    }

    pub fn has_object(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn object_keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn upload_calls(&self) -> Vec<String> {
        self.upload_calls.lock().unwrap().clone()
    }

    pub fn copy_calls(&self) -> Vec<(String, String)> {
        self.copy_calls.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseBlobStore for MockBlobStore {
    async fn blob_upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        self.upload_calls.lock().unwrap().push(key.to_string());
        if *self.fail_uploads.lock().unwrap() {
            anyhow::bail!("injected upload failure");
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (bytes.to_vec(), content_type.to_string()));
        Ok(())
    }

    async fn blob_copy(&self, src_key: &str, dst_key: &str) -> Result<()> {
        self.copy_calls
            .lock()
            .unwrap()
            .push((src_key.to_string(), dst_key.to_string()));
        if *self.fail_copies.lock().unwrap() {
            anyhow::bail!("injected copy failure");
        }
        let mut objects = self.objects.lock().unwrap();
        let blob = objects
            .get(src_key)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no blob at {}", src_key))?;
        objects.insert(dst_key.to_string(), blob);
        Ok(())
    }

    async fn blob_delete(&self, key: &str) -> Result<()> {
        self.delete_calls.lock().unwrap().push(key.to_string());
        if *self.fail_deletes.lock().unwrap() {
            anyhow::bail!("injected delete failure");
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn blob_public_url(&self, key: &str) -> String {
        format!("https://blobs.test/{}", key)
    }
}

// =============================================================================
// Spy Mailer
// =============================================================================

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachment_url: Option<String>,
}

#[derive(Clone, Default)]
pub struct SpyMailer {
    sent: Arc<Mutex<Vec<SentEmail>>>,
    fail: Arc<Mutex<bool>>,
}

impl SpyMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failure(self) -> Self {
        *self.fail.lock().unwrap() = true;
        self
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl BaseMailer for SpyMailer {
    async fn send_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachment_url: Option<&str>,
    ) -> Result<()> {
        if *self.fail.lock().unwrap() {
            anyhow::bail!("injected mail failure");
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            attachment_url: attachment_url.map(str::to_string),
        });
        Ok(())
    }
}
