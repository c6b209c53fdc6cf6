//! Standard definition model
//!
//! A standard definition is a table of rules ([`Entry`]) naming the groups,
//! datasets and attributes an ODIM_H5 file must or may contain, the type each
//! attribute must have and, optionally, the values it may take.

mod entry;
mod ruleset;

pub use entry::{Category, Entry, EntryType};
pub use ruleset::Ruleset;
