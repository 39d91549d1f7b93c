//! Owner-scoped contact storage and queries.
//!
//! Every operation is scoped to the owning user: one owner can never see,
//! change, or collide with another owner's contacts.

mod model;
pub(crate) mod repository;
mod service;
mod validation;

pub use model::{Contact, ContactFilter, ContactId, ContactPatch, NewContact};
pub use repository::ContactRepository;
pub use service::ContactService;
pub use validation::{ValidationError, ValidationResult, validate_new_contact, validate_patch};
