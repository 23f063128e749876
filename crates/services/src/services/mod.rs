pub mod assistant;
pub mod auth;
pub mod automation;
pub mod config;
pub mod importer;
