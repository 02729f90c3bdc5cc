//! Persistence layer for the Eventdesk backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - Embedded migrations

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;

/// Embedded database migrations, run at startup.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("src/migrations");
