//! Field resolution: turning a record's static field list and directive
//! strings into descriptors the walker consumes.
//!
//! A directive is a comma-separated option list attached to a field:
//!
//! - the first option is the external name (empty keeps the default, the
//!   declared name lower-cased);
//! - `identifier` marks the field as the record's identity key;
//! - the entire directive `-` excludes the field from comparison.
//!
//! Record shapes never change at runtime, so descriptors are resolved once
//! per type and cached for the life of the process.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::trace;

use crate::diffable::{Diffable, FieldSpec, Node, RecordNode};
use crate::error::{DiffError, DiffResult};

const EXCLUDE: &str = "-";
const IDENTIFIER: &str = "identifier";

/// How one record field takes part in a comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Position of the field in declaration order.
    pub index: usize,
    /// The field's name in source.
    pub declared_name: &'static str,
    /// The name used as a path segment.
    pub name: String,
    /// Excluded fields are skipped entirely.
    pub excluded: bool,
    /// The identity key used to match elements of identity-keyed sequences.
    pub identifier: bool,
}

/// The resolved field list of one record type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordFields {
    descriptors: Vec<FieldDescriptor>,
    identity: Option<usize>,
}

impl RecordFields {
    /// All fields in declaration order, excluded ones included.
    pub fn all(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    /// Fields that take part in comparison, in declaration order.
    pub fn included(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.descriptors.iter().filter(|d| !d.excluded)
    }

    /// The identity field, if the record declares one.
    pub fn identity(&self) -> Option<&FieldDescriptor> {
        self.identity.map(|i| &self.descriptors[i])
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

type Cache = RwLock<HashMap<TypeId, Arc<RecordFields>>>;

fn cache() -> &'static Cache {
    static CACHE: OnceLock<Cache> = OnceLock::new();
    CACHE.get_or_init(Default::default)
}

/// Resolve the field descriptors of a record, consulting the process-wide
/// cache first.
///
/// Concurrent first lookups of the same type may both parse; the first
/// insert wins and both callers see the same descriptors. Parse failures are
/// not cached.
pub fn resolve(record: &RecordNode<'_>) -> DiffResult<Arc<RecordFields>> {
    let cached = cache()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&record.type_id)
        .cloned();
    if let Some(fields) = cached {
        return Ok(fields);
    }

    let parsed = Arc::new(parse_fields(record.short_name(), record.fields)?);
    let mut map = cache().write().unwrap_or_else(PoisonError::into_inner);
    let fields = map.entry(record.type_id).or_insert_with(|| {
        trace!(
            record = record.type_name,
            fields = parsed.len(),
            identity = parsed.identity().map(|d| d.name.as_str()),
            "resolved record fields"
        );
        parsed
    });
    Ok(Arc::clone(fields))
}

/// The field descriptors of `value`, or `None` when it is not a record.
pub fn field_descriptors(value: &dyn Diffable) -> DiffResult<Option<Arc<RecordFields>>> {
    match value.node() {
        Node::Record(record) => resolve(&record).map(Some),
        _ => Ok(None),
    }
}

fn parse_fields(type_name: &str, specs: &[FieldSpec]) -> DiffResult<RecordFields> {
    let descriptors = specs
        .iter()
        .enumerate()
        .map(|(index, spec)| parse_field(type_name, index, spec))
        .collect::<DiffResult<Vec<_>>>()?;

    let mut identity = None;
    let mut names = HashSet::new();
    for descriptor in &descriptors {
        if descriptor.identifier {
            if let Some(first) = identity.map(|i: usize| &descriptors[i]) {
                return Err(invalid(
                    type_name,
                    &specs[descriptor.index],
                    format!("`{}` is already the identifier", first.declared_name),
                ));
            }
            identity = Some(descriptor.index);
        }
        if !descriptor.excluded && !names.insert(descriptor.name.as_str()) {
            return Err(invalid(
                type_name,
                &specs[descriptor.index],
                format!("external name `{}` is used twice", descriptor.name),
            ));
        }
    }

    Ok(RecordFields {
        descriptors,
        identity,
    })
}

fn parse_field(type_name: &str, index: usize, spec: &FieldSpec) -> DiffResult<FieldDescriptor> {
    let declared = spec.name.strip_prefix("r#").unwrap_or(spec.name);
    let mut descriptor = FieldDescriptor {
        index,
        declared_name: spec.name,
        name: declared.to_lowercase(),
        excluded: false,
        identifier: false,
    };

    let Some(directive) = spec.directive else {
        return Ok(descriptor);
    };
    if directive.trim() == EXCLUDE {
        descriptor.excluded = true;
        return Ok(descriptor);
    }

    let mut options = directive.split(',').map(str::trim);
    if let Some(name) = options.next().filter(|n| !n.is_empty()) {
        descriptor.name = name.to_owned();
    }
    for option in options {
        match option {
            IDENTIFIER => descriptor.identifier = true,
            "" => {}
            other => {
                return Err(invalid(type_name, spec, format!("unknown option `{other}`")));
            }
        }
    }
    Ok(descriptor)
}

fn invalid(type_name: &str, spec: &FieldSpec, reason: String) -> DiffError {
    DiffError::InvalidDirective {
        type_name: type_name.to_owned(),
        field: spec.name.to_owned(),
        directive: spec.directive.unwrap_or_default().to_owned(),
        reason,
    }
}
