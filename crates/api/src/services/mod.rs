//! Application services.

pub mod email;
pub mod extraction;
pub mod intake;

pub use email::{EmailError, EmailMessage, EmailService};
pub use extraction::HttpExtractor;
