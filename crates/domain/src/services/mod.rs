//! Domain services for Eventdesk.
//!
//! Services contain business logic that operates on domain models.

pub mod extraction;
pub mod feed;
pub mod notification;

pub use extraction::{
    classify_extraction, ExtractedEvent, ExtractionError, ExtractionOutcome, Extractor,
    FixedExtractor,
};
pub use notification::{render_outcome_email, NotificationContext, OutcomeEmail};
