//! Repository implementations.

pub mod booking;
pub mod draft;
pub mod email;
pub mod event;
pub mod group;
pub mod inventory;

pub use booking::{BookingRepository, CreateBookingError, DecisionError};
pub use draft::{ConfirmError, ConfirmOutcome, CreateDraftError, DraftRepository, UpdateDraftError};
pub use email::EmailRepository;
pub use event::EventRepository;
pub use group::GroupRepository;
pub use inventory::{InventoryRepository, ReserveError};
