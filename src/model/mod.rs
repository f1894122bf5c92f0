//! The record-type model: flat raw records, typed public records, and
//! deduplication over user-chosen equivalence keys (§3, §4.8).

pub mod common;
pub mod dedup;
pub mod events;
pub mod gkg;
pub mod mentions;
pub mod ngrams;
pub mod raw;

pub use events::Event;
pub use gkg::GkgRecord;
pub use mentions::Mention;
pub use ngrams::NGram;
