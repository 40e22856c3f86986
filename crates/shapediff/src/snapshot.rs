//! Owned snapshots of [`Diffable`] values.
//!
//! Changes record whole values on their `from`/`to` sides (a created
//! sequence element, a replaced mapping entry, a newly set optional). This
//! module captures those values as [`Value`] trees. Optionals are captured
//! dereferenced, and records keep only their included fields under their
//! external names.

use std::any::TypeId;
use std::collections::{BTreeMap, HashSet};

use shapediff_types::{Path, Value};

use crate::diffable::{Diffable, Node};
use crate::error::{DiffError, DiffResult};
use crate::resolver;

/// Capture `value` as an owned [`Value`].
pub fn snapshot(value: &dyn Diffable) -> DiffResult<Value> {
    capture_at(&Path::root(), value)
}

/// Capture `value`, reporting errors relative to `path`.
pub(crate) fn capture_at(path: &Path, value: &dyn Diffable) -> DiffResult<Value> {
    Snapshotter::default().capture(path, value)
}

#[derive(Default)]
struct Snapshotter {
    active: HashSet<(usize, TypeId)>,
}

impl Snapshotter {
    fn capture(&mut self, path: &Path, value: &dyn Diffable) -> DiffResult<Value> {
        match value.node() {
            Node::Scalar(v) => Ok(v),
            Node::Optional(None) => Ok(Value::Absent),
            Node::Optional(Some(inner)) => self.capture(path, inner),
            Node::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.capture(&path.child(i.to_string()), *item))
                .collect::<DiffResult<Vec<_>>>()
                .map(Value::Seq),
            Node::Mapping(entries) => {
                let mut map = BTreeMap::new();
                for (key, item) in entries {
                    let captured = self.capture(&path.child(key.as_str()), item)?;
                    map.insert(key, captured);
                }
                Ok(Value::Map(map))
            }
            Node::Record(record) => {
                let fields = resolver::resolve(&record)?;
                if record.values.len() != fields.len() {
                    return Err(DiffError::shape_mismatch(
                        path,
                        format!("{} fields", fields.len()),
                        format!("{} values", record.values.len()),
                    ));
                }

                let key = record.identity();
                if !self.active.insert(key) {
                    return Err(DiffError::CycleDetected { path: path.clone() });
                }
                let mut captured = Vec::new();
                let mut identity = None;
                for descriptor in fields.included() {
                    let field_path = path.child(descriptor.name.as_str());
                    let value = self.capture(&field_path, record.values[descriptor.index])?;
                    if descriptor.identifier {
                        identity = value.key_string();
                    }
                    captured.push((descriptor.name.clone(), value));
                }
                self.active.remove(&key);

                Ok(Value::Record {
                    type_name: record.short_name().to_owned(),
                    identity,
                    fields: captured,
                })
            }
            Node::Unsupported(type_name) => Err(DiffError::unsupported(path, type_name)),
        }
    }
}
