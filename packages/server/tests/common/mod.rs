#![allow(dead_code)]

// Shared harness for integration tests: ServerDeps wired to the in-memory
// mocks, plus fixture builders.

use std::sync::Arc;

use server_core::common::{BotSignal, StayType};
use server_core::domains::proof::ProofUpload;
use server_core::domains::registration::group::{AttendeeSpec, RegistrantSpec};
use server_core::kernel::test_dependencies::{MemoryRegistrationStore, MockBlobStore, SpyMailer};
use server_core::kernel::ServerDeps;

pub struct TestHarness {
    pub deps: ServerDeps,
    pub store: MemoryRegistrationStore,
    pub blobs: MockBlobStore,
    pub mailer: SpyMailer,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with(MemoryRegistrationStore::new(), MockBlobStore::new())
    }

    pub fn with(store: MemoryRegistrationStore, blobs: MockBlobStore) -> Self {
        let mailer = SpyMailer::new();
        let deps = ServerDeps::new(
            Arc::new(store.clone()),
            Arc::new(blobs.clone()),
            Arc::new(mailer.clone()),
        );
        Self {
            deps,
            store,
            blobs,
            mailer,
        }
    }
}

pub fn registrant(stay: StayType) -> RegistrantSpec {
    RegistrantSpec {
        full_name: "Asha Varma".to_string(),
        email: "asha@example.org".to_string(),
        stay_type: stay,
    }
}

pub fn attendee(name: &str, stay: StayType) -> AttendeeSpec {
    AttendeeSpec {
        full_name: name.to_string(),
        stay_type: stay,
    }
}

pub fn proof_file() -> ProofUpload {
    ProofUpload {
        bytes: vec![0u8; 2048],
        content_type: "image/jpeg".to_string(),
        file_name: "upi-confirmation.jpg".to_string(),
    }
}

/// A signal a human submission would produce.
pub fn human_signal() -> BotSignal {
    BotSignal {
        honeypot_filled: false,
        elapsed_ms: 45_000,
    }
}
