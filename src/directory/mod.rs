//! Identity directory — external identity records indexed for lookup.
//!
//! Raw identity records arrive as a JSON array (file or HTTPS); the indexer
//! deduplicates them into a key→record map, merging duplicate keys into a
//! survivor record whose alternate-DN list grows.

pub mod dn;
pub mod index;
pub mod loader;
pub mod record;

pub use dn::sorted_dn;
pub use index::{IdentityDirectory, KeyPolicy, build_directory, build_directory_by_key};
pub use loader::{fetch_directory, fetch_entries, load_directory, read_entries};
pub use record::IdentityRecord;
