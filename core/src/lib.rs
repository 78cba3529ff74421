pub mod api;
pub mod broadcast;
pub mod categorize;
pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod progress;
pub mod record;
pub mod runner;
pub mod summary;
