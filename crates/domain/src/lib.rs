//! Domain layer for the Eventdesk backend.
//!
//! This crate contains:
//! - Domain models (registrations, events, inventory, groups)
//! - Business logic services (extraction classification, notification
//!   templates, calendar feed encoding)
//! - Domain error types

pub mod models;
pub mod services;
