//! In-memory novel model shared by both project formats.
//!
//! # Responsibility
//! - Hold chapters, scenes, characters, locations and items with their
//!   sort orders.
//! - Stay format-agnostic: readers fill it, writers walk it.
//!
//! # Invariants
//! - Every id listed in a `srt_*` vector is a key of the matching collection.
//! - After a complete read, scene references hold ids, never titles.

pub mod novel;
