//! Domain models for Eventdesk.

pub mod booking;
pub mod draft;
pub mod email;
pub mod event;
pub mod group;
pub mod inventory;

pub use booking::{BookingRegistration, BookingStatus};
pub use draft::{DraftRegistration, ExtractionStatus};
pub use event::{CalendarEvent, RegistrationSource, RequiredField, ResolvedEventFields};
pub use group::Group;
pub use inventory::{Availability, InventoryItem, InventoryRequest};
