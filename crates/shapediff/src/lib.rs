//! Structural diff engine.
//!
//! Compares two values of the same declared shape and produces a flat
//! [`Changelog`] of create, update and delete changes, each addressed by the
//! path of field names, sequence positions or identity keys, and mapping keys
//! that leads to it.
//!
//! # Key Types
//!
//! - [`Diffable`] / [`Node`] / [`Shape`] -- The category model comparable types map onto
//! - [`Differ`] / [`DiffConfig`] -- The comparison engine and its settings
//! - [`Change`] / [`Changelog`] / [`Path`] / [`Value`] -- The changelog model
//! - [`FieldDescriptor`] / [`RecordFields`] -- Resolved record field directives
//! - [`DiffError`] -- Errors that abort a comparison
//!
//! Records opt in with [`diffable_record!`], listing their fields and
//! optional directives (`"name"`, `"name,identifier"`, `"-"`).

#[macro_use]
mod macros;

pub mod config;
pub mod diffable;
pub mod differ;
pub mod error;
mod impls;
pub mod matcher;
pub mod resolver;
pub mod snapshot;

pub use config::{DiffConfig, EditHeuristic};
pub use diffable::{Diffable, Dynamic, FieldSpec, MapKey, Node, RecordNode, Shape};
pub use differ::{diff, Differ};
pub use error::{DiffError, DiffResult};
pub use matcher::SeqOp;
pub use resolver::{field_descriptors, FieldDescriptor, RecordFields};
pub use snapshot::snapshot;
pub use shapediff_types::{Change, ChangeKind, Changelog, Path, Value};
