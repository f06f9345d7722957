pub mod approve;
pub mod edit_mode;
pub mod queries;
pub mod relink;
pub mod submit;
pub mod verify;

pub use approve::approve;
pub use edit_mode::enable_edit_mode;
pub use queries::{lookup_by_application_id, pending_queue, LookupResult};
pub use relink::{relink_proof, RelinkResult};
pub use submit::{submit, SubmissionResult};
pub use verify::accounts_verify;
