pub mod errors;
pub mod id;
pub mod types;

pub use errors::CoreError;
pub use id::ApplicationId;
pub use types::*;
