//! Shared utilities and common types for the Eventdesk backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Capability token generation
//! - Common validation logic

pub mod token;
pub mod validation;
