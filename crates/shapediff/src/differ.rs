//! The comparison engine.
//!
//! [`Differ`] walks two values of the same shape in parallel and appends a
//! [`Change`] to the changelog for every difference it finds. Dispatch is by
//! category:
//!
//! - scalars compare by equality and produce at most one update;
//! - optionals produce an update when exactly one side is absent and the
//!   other holds a value, and otherwise compare their contents at the same
//!   path;
//! - mappings compare entry by entry, treating values as opaque leaves;
//! - records compare their included fields in declaration order;
//! - sequences ask the matcher which elements correspond, by identity key,
//!   by the cursor edit heuristic, or by position.
//!
//! Shape mismatches, unsupported values, cycles, bad directives and depth
//! overruns abort the comparison; no partial changelog is returned.

use std::any::TypeId;
use std::collections::{BTreeMap, HashSet};

use shapediff_types::{Change, Changelog, Path, Value};
use tracing::debug;

use crate::config::{DiffConfig, EditHeuristic};
use crate::diffable::{Diffable, Node, RecordNode};
use crate::error::{DiffError, DiffResult};
use crate::matcher::{self, SeqOp};
use crate::resolver;
use crate::snapshot::capture_at;

/// Compare two values of the same type with the default configuration.
pub fn diff<T: Diffable>(old: &T, new: &T) -> DiffResult<Changelog> {
    Differ::new().diff(old, new)
}

/// A configured comparison engine. Cheap to create; holds no state between
/// comparisons, so one instance may serve concurrent callers.
#[derive(Clone, Debug, Default)]
pub struct Differ {
    config: DiffConfig,
}

impl Differ {
    /// A differ with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DiffConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DiffConfig {
        &self.config
    }

    /// Compare two values of the same type.
    pub fn diff<T: Diffable>(&self, old: &T, new: &T) -> DiffResult<Changelog> {
        self.diff_dyn(old, new)
    }

    /// Compare two type-erased values. Their shapes are checked first, so
    /// values of different types fail with a shape mismatch at the root.
    pub fn diff_dyn(&self, old: &dyn Diffable, new: &dyn Diffable) -> DiffResult<Changelog> {
        let mut walker = Walker::new(&self.config);
        walker.compare(&Path::root(), old, new, 0)?;
        debug!(
            shape = %old.shape(),
            changes = walker.changelog.len(),
            "comparison complete"
        );
        Ok(walker.changelog)
    }
}

/// Per-comparison state: the accumulating changelog and the records on the
/// active path.
struct Walker<'c> {
    config: &'c DiffConfig,
    changelog: Changelog,
    active: HashSet<(usize, usize, TypeId)>,
}

impl<'c> Walker<'c> {
    fn new(config: &'c DiffConfig) -> Self {
        Self {
            config,
            changelog: Changelog::new(),
            active: HashSet::new(),
        }
    }

    fn compare(
        &mut self,
        path: &Path,
        old: &dyn Diffable,
        new: &dyn Diffable,
        depth: usize,
    ) -> DiffResult<()> {
        if let Some(limit) = self.config.max_depth {
            if depth > limit {
                return Err(DiffError::DepthExceeded {
                    path: path.clone(),
                    limit,
                });
            }
        }

        let (old_shape, new_shape) = (old.shape(), new.shape());
        if old_shape != new_shape {
            return Err(DiffError::shape_mismatch(path, old_shape, new_shape));
        }

        match (old.node(), new.node()) {
            (Node::Unsupported(type_name), _) | (_, Node::Unsupported(type_name)) => {
                Err(DiffError::unsupported(path, type_name))
            }
            (Node::Scalar(a), Node::Scalar(b)) => {
                if !a.equivalent(&b) {
                    self.changelog.push(Change::update(path.clone(), a, b));
                }
                Ok(())
            }
            (Node::Optional(a), Node::Optional(b)) => self.compare_optional(path, a, b, depth),
            (Node::Sequence(a), Node::Sequence(b)) => self.compare_sequence(path, &a, &b, depth),
            (Node::Mapping(a), Node::Mapping(b)) => self.compare_mapping(path, a, b),
            (Node::Record(a), Node::Record(b)) => self.compare_record(path, &a, &b, depth),
            (a, b) => Err(DiffError::shape_mismatch(path, a.category(), b.category())),
        }
    }

    fn compare_optional(
        &mut self,
        path: &Path,
        old: Option<&dyn Diffable>,
        new: Option<&dyn Diffable>,
        depth: usize,
    ) -> DiffResult<()> {
        match (old, new) {
            (None, None) => Ok(()),
            (None, Some(b)) => {
                let to = capture_at(path, b)?;
                if !to.is_absent() {
                    self.changelog.push(Change::update(path.clone(), Value::Absent, to));
                }
                Ok(())
            }
            (Some(a), None) => {
                let from = capture_at(path, a)?;
                if !from.is_absent() {
                    self.changelog.push(Change::update(path.clone(), from, Value::Absent));
                }
                Ok(())
            }
            (Some(a), Some(b)) => self.compare(path, a, b, depth + 1),
        }
    }

    fn compare_record(
        &mut self,
        path: &Path,
        old: &RecordNode<'_>,
        new: &RecordNode<'_>,
        depth: usize,
    ) -> DiffResult<()> {
        if old.type_id != new.type_id {
            return Err(DiffError::shape_mismatch(path, old.type_name, new.type_name));
        }
        let fields = resolver::resolve(old)?;
        if old.values.len() != fields.len() || new.values.len() != fields.len() {
            return Err(DiffError::shape_mismatch(
                path,
                format!("{} with {} values", old.type_name, old.values.len()),
                format!("{} with {} values", new.type_name, new.values.len()),
            ));
        }

        let (old_addr, type_id) = old.identity();
        let (new_addr, _) = new.identity();
        let key = (old_addr, new_addr, type_id);
        if !self.active.insert(key) {
            return Err(DiffError::CycleDetected { path: path.clone() });
        }
        for descriptor in fields.included() {
            self.compare(
                &path.child(descriptor.name.as_str()),
                old.values[descriptor.index],
                new.values[descriptor.index],
                depth + 1,
            )?;
        }
        self.active.remove(&key);
        Ok(())
    }

    fn compare_mapping(
        &mut self,
        path: &Path,
        old: Vec<(String, &dyn Diffable)>,
        new: Vec<(String, &dyn Diffable)>,
    ) -> DiffResult<()> {
        let mut entries: BTreeMap<String, (Option<&dyn Diffable>, Option<&dyn Diffable>)> =
            BTreeMap::new();
        for (key, value) in old {
            entries.entry(key).or_default().0 = Some(value);
        }
        for (key, value) in new {
            entries.entry(key).or_default().1 = Some(value);
        }

        for (key, sides) in entries {
            let entry_path = path.child(key);
            match sides {
                (Some(a), None) => {
                    let from = capture_at(&entry_path, a)?;
                    self.changelog.push(Change::delete(entry_path, from));
                }
                (None, Some(b)) => {
                    let to = capture_at(&entry_path, b)?;
                    self.changelog.push(Change::create(entry_path, to));
                }
                (Some(a), Some(b)) => {
                    let (old_shape, new_shape) = (a.shape(), b.shape());
                    if old_shape != new_shape {
                        return Err(DiffError::shape_mismatch(&entry_path, old_shape, new_shape));
                    }
                    let from = capture_at(&entry_path, a)?;
                    let to = capture_at(&entry_path, b)?;
                    if !from.equivalent(&to) {
                        self.changelog.push(Change::update(entry_path, from, to));
                    }
                }
                (None, None) => {}
            }
        }
        Ok(())
    }

    fn compare_sequence(
        &mut self,
        path: &Path,
        old: &[&dyn Diffable],
        new: &[&dyn Diffable],
        depth: usize,
    ) -> DiffResult<()> {
        if let Some((old_keys, new_keys)) = self.identity_keys(path, old, new)? {
            for op in matcher::by_identity(&old_keys, &new_keys) {
                match op {
                    SeqOp::Delete { old: i } => {
                        let element_path = path.child(old_keys[i].as_str());
                        let from = capture_at(&element_path, old[i])?;
                        self.changelog.push(Change::delete(element_path, from));
                    }
                    SeqOp::Create { new: j } => {
                        let element_path = path.child(new_keys[j].as_str());
                        let to = capture_at(&element_path, new[j])?;
                        self.changelog.push(Change::create(element_path, to));
                    }
                    SeqOp::Update { old: i, new: j } => {
                        let element_path = path.child(old_keys[i].as_str());
                        self.compare(&element_path, old[i], new[j], depth + 1)?;
                    }
                }
            }
            return Ok(());
        }

        let ops = match self.edit_scalars(path, old, new)? {
            Some((old_values, new_values)) => matcher::by_edits(&old_values, &new_values),
            None => matcher::by_position(old.len(), new.len()),
        };
        for op in ops {
            match op {
                SeqOp::Delete { old: i } => {
                    let element_path = path.child(i.to_string());
                    let from = capture_at(&element_path, old[i])?;
                    self.changelog.push(Change::delete(element_path, from));
                }
                SeqOp::Create { new: j } => {
                    let element_path = path.child(j.to_string());
                    let to = capture_at(&element_path, new[j])?;
                    self.changelog.push(Change::create(element_path, to));
                }
                SeqOp::Update { old: i, new: j } => {
                    self.compare(&path.child(i.to_string()), old[i], new[j], depth + 1)?;
                }
            }
        }
        Ok(())
    }

    /// Identity keys of both sequences, when their elements are records that
    /// declare an identity field and identity matching is enabled.
    fn identity_keys(
        &self,
        path: &Path,
        old: &[&dyn Diffable],
        new: &[&dyn Diffable],
    ) -> DiffResult<Option<(Vec<String>, Vec<String>)>> {
        if !self.config.identity_matching {
            return Ok(None);
        }
        let Some(first) = old.first().or_else(|| new.first()) else {
            return Ok(None);
        };
        let Node::Record(record) = first.node() else {
            return Ok(None);
        };
        let fields = resolver::resolve(&record)?;
        let Some(identity) = fields.identity() else {
            return Ok(None);
        };

        let key_of = |element: &dyn Diffable| -> DiffResult<String> {
            let item = match element.node() {
                Node::Record(item) => item,
                other => {
                    return Err(DiffError::shape_mismatch(path, record.type_name, other.category()));
                }
            };
            if item.type_id != record.type_id {
                return Err(DiffError::shape_mismatch(path, record.type_name, item.type_name));
            }
            let key = match item.values.get(identity.index).map(|v| v.node()) {
                Some(Node::Scalar(value)) => value.key_string(),
                _ => None,
            };
            key.ok_or_else(|| {
                DiffError::unsupported(
                    path,
                    format!("non-scalar identifier `{}` of {}", identity.name, item.type_name),
                )
            })
        };

        let old_keys = old.iter().map(|e| key_of(*e)).collect::<DiffResult<Vec<_>>>()?;
        let new_keys = new.iter().map(|e| key_of(*e)).collect::<DiffResult<Vec<_>>>()?;
        Ok(Some((old_keys, new_keys)))
    }

    /// Element values of both sequences, when both hold only scalars and the
    /// edit heuristic applies at this path. Elements must all share the shape
    /// of the first one, since the heuristic never compares them in depth.
    fn edit_scalars(
        &self,
        path: &Path,
        old: &[&dyn Diffable],
        new: &[&dyn Diffable],
    ) -> DiffResult<Option<(Vec<Value>, Vec<Value>)>> {
        let applies = match self.config.edit_heuristic {
            EditHeuristic::Root => path.is_root(),
            EditHeuristic::Everywhere => true,
            EditHeuristic::Never => false,
        };
        if !applies {
            return Ok(None);
        }
        let (Some(old_values), Some(new_values)) = (scalar_values(old), scalar_values(new)) else {
            return Ok(None);
        };

        if let Some(first) = old.first().or_else(|| new.first()) {
            let expected = first.shape();
            for (i, element) in old.iter().enumerate().chain(new.iter().enumerate()) {
                let shape = element.shape();
                if shape != expected {
                    return Err(DiffError::shape_mismatch(
                        &path.child(i.to_string()),
                        &expected,
                        shape,
                    ));
                }
            }
        }
        Ok(Some((old_values, new_values)))
    }
}

fn scalar_values(elements: &[&dyn Diffable]) -> Option<Vec<Value>> {
    elements
        .iter()
        .map(|element| match element.node() {
            Node::Scalar(value) => Some(value),
            _ => None,
        })
        .collect()
}
