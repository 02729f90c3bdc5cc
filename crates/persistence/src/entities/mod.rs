//! Entity definitions (database row mappings).

pub mod booking_registration;
pub mod draft_registration;
pub mod email;
pub mod event;
pub mod group;
pub mod inventory_item;

pub use booking_registration::{
    BookingInventoryRequestEntity, BookingRegistrationEntity, BookingSource, BookingStatusDb,
};
pub use draft_registration::{DraftRegistrationEntity, ExtractionStatusDb};
pub use email::InboundEmailEntity;
pub use event::{EventAllocationEntity, EventEntity};
pub use group::GroupEntity;
pub use inventory_item::InventoryItemEntity;
