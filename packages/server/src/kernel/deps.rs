//! Server dependencies for domain actions (using traits for testability)
//!
//! This module provides the central dependency container used by all domain
//! actions. All external services use trait abstractions to enable testing.

use std::sync::Arc;

use crate::kernel::{BaseBlobStore, BaseMailer, BaseRegistrationStore};

/// Server dependencies accessible to domain actions.
#[derive(Clone)]
pub struct ServerDeps {
    /// Relational rows, mutated exclusively through single-row conditional
    /// updates.
    pub store: Arc<dyn BaseRegistrationStore>,
    /// Durable blob storage for payment-proof artifacts.
    pub blobs: Arc<dyn BaseBlobStore>,
    /// Outbound transactional email (fire-and-forget).
    pub mailer: Arc<dyn BaseMailer>,
}

impl ServerDeps {
    pub fn new(
        store: Arc<dyn BaseRegistrationStore>,
        blobs: Arc<dyn BaseBlobStore>,
        mailer: Arc<dyn BaseMailer>,
    ) -> Self {
        Self {
            store,
            blobs,
            mailer,
        }
    }
}
