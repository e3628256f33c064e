pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod importer;
pub mod models;
pub mod store;
pub mod transform;
