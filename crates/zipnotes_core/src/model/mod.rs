//! Note record model and its text encoding.
//!
//! # Responsibility
//! - Define the single note shape (`Record`) with open-ended user fields.
//! - Provide the reversible text encoding used inside archives.
//!
//! # Invariants
//! - Every record is identified by a `RecordId` that is never reassigned.
//! - Reserved fields (`id`, `time`) cannot be touched through the generic setter.

pub mod codec;
pub mod record;
pub mod value;
