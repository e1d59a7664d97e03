//! In-memory note collection with soft delete and compaction.
//!
//! # Responsibility
//! - Keep records keyed by id in insertion order.
//! - Offer create/read/update/delete over that set plus `pack` compaction.
//! - Encode the live records as a list of record texts.
//!
//! # Invariants
//! - `count() + count_deleted() == len_keys()` at all times.
//! - `update`/`delete` never insert new keys.
//! - Deleted entries stay keyed until `pack`.

mod store;

pub use store::{Collection, CollectionError, CollectionResult, Entry, RecordKey};
