pub mod deps;
pub mod mailer;
pub mod storage_client;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use mailer::HttpMailer;
pub use storage_client::HttpBlobStore;
pub use traits::{BaseBlobStore, BaseMailer, BaseRegistrationStore, CreatedGroup, PendingQueue};
