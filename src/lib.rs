pub mod chassis;
pub mod config;
pub mod messages;
