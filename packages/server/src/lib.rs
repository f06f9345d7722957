// Alumni Meet Registration - API Core
//
// Backend for alumni event registration: group submissions with payment-proof
// upload, accounts verification, and admin approval.
//
// Architecture follows domain-driven design: infrastructure traits live in
// kernel/, business logic in domains/, HTTP wiring in server/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
