//! Payment-proof artifact storage.
//!
//! Artifacts are uploaded under a temporary key before the owning rows
//! exist, then copied to a key derived from the real application id once it
//! is known. The copy step is allowed to fail without aborting a submission:
//! the pipeline continues with the temporary key rather than losing the only
//! copy of a registrant's proof.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::common::CoreError;
use crate::kernel::BaseBlobStore;

pub const MAX_PROOF_BYTES: usize = 5 * 1024 * 1024;

pub const ACCEPTED_MIME_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/webp", "application/pdf"];

/// An uploaded proof file, as received at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct ProofUpload {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

impl ProofUpload {
    /// Boundary constraints, checked before any storage call.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !ACCEPTED_MIME_TYPES.contains(&self.content_type.as_str()) {
            return Err(CoreError::validation(format!(
                "unsupported proof type {}; accepted: jpeg, png, webp, pdf",
                self.content_type
            )));
        }
        if self.bytes.len() > MAX_PROOF_BYTES {
            return Err(CoreError::validation(format!(
                "proof file is {} bytes; maximum is 5 MiB",
                self.bytes.len()
            )));
        }
        if self.bytes.is_empty() {
            return Err(CoreError::validation("proof file is empty"));
        }
        Ok(())
    }

    fn extension(&self) -> &'static str {
        match self.content_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "pdf",
        }
    }
}

/// Adapter over the blob store implementing the proof artifact lifecycle.
pub struct ProofStore {
    blobs: Arc<dyn BaseBlobStore>,
}

impl ProofStore {
    pub fn new(blobs: Arc<dyn BaseBlobStore>) -> Self {
        Self { blobs }
    }

    /// Store the file under a temporary key namespaced by the caller's hint
    /// and a timestamp. Transport failure surfaces as `Storage`; the caller
    /// decides whether anything needs cleaning up.
    pub async fn upload_temporary(
        &self,
        file: &ProofUpload,
        owner_hint: &str,
    ) -> Result<String, CoreError> {
        file.validate()?;

        let temp_key = format!(
            "tmp/{}-{}.{}",
            sanitize_hint(owner_hint),
            Utc::now().timestamp_millis(),
            file.extension()
        );

        self.blobs
            .blob_upload(&temp_key, &file.bytes, &file.content_type)
            .await
            .map_err(|e| CoreError::Storage(e.to_string()))?;

        Ok(temp_key)
    }

    /// Copy the blob to a deterministic key derived from real identifiers.
    /// On failure the original temporary key is returned unchanged so the
    /// pipeline degrades instead of aborting.
    pub async fn finalize(&self, temp_key: &str, final_prefix: &str) -> String {
        let extension = temp_key.rsplit('.').next().unwrap_or("pdf");
        let final_key = format!(
            "{}-{}.{}",
            final_prefix,
            Utc::now().timestamp_millis(),
            extension
        );

        match self.blobs.blob_copy(temp_key, &final_key).await {
            Ok(()) => {
                info!("Finalized proof artifact: {} -> {}", temp_key, final_key);
                final_key
            }
            Err(e) => {
                warn!(
                    "Proof finalize failed, keeping temporary key {}: {}",
                    temp_key, e
                );
                temp_key.to_string()
            }
        }
    }

    /// Deterministic public URL; no I/O failure modeled.
    pub fn resolve_url(&self, key: &str) -> String {
        self.blobs.blob_public_url(key)
    }

    /// Fire-and-forget cleanup. Failures are logged, never surfaced.
    pub async fn delete_best_effort(&self, key: &str) {
        if let Err(e) = self.blobs.blob_delete(key).await {
            warn!("Best-effort delete of {} failed: {}", key, e);
        }
    }
}

fn sanitize_hint(hint: &str) -> String {
    let cleaned: String = hint
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "proof".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::test_dependencies::MockBlobStore;

    fn proof() -> ProofUpload {
        ProofUpload {
            bytes: vec![0u8; 1024],
            content_type: "image/png".to_string(),
            file_name: "receipt.png".to_string(),
        }
    }

    #[tokio::test]
    async fn oversized_file_rejected_before_any_storage_call() {
        let blobs = MockBlobStore::new();
        let store = ProofStore::new(Arc::new(blobs.clone()));

        let file = ProofUpload {
            bytes: vec![0u8; 6 * 1024 * 1024],
            ..proof()
        };
        let err = store.upload_temporary(&file, "asha").await.unwrap_err();

        assert!(matches!(err, CoreError::Validation(_)));
        assert!(blobs.upload_calls().is_empty());
    }

    #[tokio::test]
    async fn unsupported_mime_rejected_before_any_storage_call() {
        let blobs = MockBlobStore::new();
        let store = ProofStore::new(Arc::new(blobs.clone()));

        let file = ProofUpload {
            content_type: "image/gif".to_string(),
            ..proof()
        };
        let err = store.upload_temporary(&file, "asha").await.unwrap_err();

        assert!(matches!(err, CoreError::Validation(_)));
        assert!(blobs.upload_calls().is_empty());
    }

    #[tokio::test]
    async fn temporary_keys_are_namespaced_by_hint() {
        let blobs = MockBlobStore::new();
        let store = ProofStore::new(Arc::new(blobs.clone()));

        let key = store
            .upload_temporary(&proof(), "Asha Varma")
            .await
            .unwrap();

        assert!(key.starts_with("tmp/asha-varma-"));
        assert!(key.ends_with(".png"));
        assert!(blobs.has_object(&key));
    }

    #[tokio::test]
    async fn upload_transport_failure_is_storage_error() {
        let blobs = MockBlobStore::new().with_upload_failure();
        let store = ProofStore::new(Arc::new(blobs.clone()));

        let err = store.upload_temporary(&proof(), "asha").await.unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
    }

    #[tokio::test]
    async fn finalize_copies_to_prefixed_key() {
        let blobs = MockBlobStore::new();
        let store = ProofStore::new(Arc::new(blobs.clone()));

        let temp = store.upload_temporary(&proof(), "asha").await.unwrap();
        let final_key = store.finalize(&temp, "proof-AM26-AB12CD").await;

        assert!(final_key.starts_with("proof-AM26-AB12CD-"));
        assert!(final_key.ends_with(".png"));
        assert!(blobs.has_object(&final_key));
    }

    #[tokio::test]
    async fn finalize_failure_falls_back_to_temporary_key() {
        let blobs = MockBlobStore::new().with_copy_failure();
        let store = ProofStore::new(Arc::new(blobs.clone()));

        let temp = store.upload_temporary(&proof(), "asha").await.unwrap();
        let final_key = store.finalize(&temp, "proof-AM26-AB12CD").await;

        assert_eq!(final_key, temp);
        assert!(blobs.has_object(&temp));
    }

    #[tokio::test]
    async fn best_effort_delete_swallows_failures() {
        let blobs = MockBlobStore::new().with_delete_failure();
        let store = ProofStore::new(Arc::new(blobs.clone()));

        let temp = store.upload_temporary(&proof(), "asha").await.unwrap();
        store.delete_best_effort(&temp).await;

        // Failure recorded but never surfaced
        assert_eq!(blobs.delete_calls(), vec![temp.clone()]);
        assert!(blobs.has_object(&temp));
    }
}
