pub mod proof;
pub mod registration;
