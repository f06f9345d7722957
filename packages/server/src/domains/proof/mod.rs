pub mod store;

pub use store::{ProofStore, ProofUpload, ACCEPTED_MIME_TYPES, MAX_PROOF_BYTES};
