//! Changelog model for shapediff.
//!
//! This crate holds the output side of a structural comparison: the ordered
//! list of atomic changes, the paths that address them, and the owned value
//! snapshots recorded as their `from`/`to` sides. The comparison engine
//! itself lives in the `shapediff` crate.
//!
//! # Key Types
//!
//! - [`Changelog`] / [`Change`] / [`ChangeKind`] -- Ordered list of create, update, and delete records
//! - [`Path`] -- String segments locating a change inside the compared structure
//! - [`Value`] -- Owned snapshot of a compared value, with an explicit [`Value::Absent`]

pub mod change;
pub mod path;
pub mod value;

pub use change::{Change, ChangeKind, Changelog};
pub use path::Path;
pub use value::Value;
