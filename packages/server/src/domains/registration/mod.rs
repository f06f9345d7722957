pub mod actions;
pub mod data;
pub mod events;
pub mod fees;
pub mod group;
pub mod machines;
pub mod models;
