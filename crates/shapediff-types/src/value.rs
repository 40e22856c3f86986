//! Owned snapshots of compared values.
//!
//! Every [`Change`](crate::Change) records its `from` and `to` sides as a
//! [`Value`]. Absence is an explicit variant rather than a null, so a change
//! that creates something has `from == Value::Absent` and a change that
//! deletes something has `to == Value::Absent`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::Path;

/// An owned, structurally comparable snapshot of a value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    /// No value: an unset optional, or the missing side of a create/delete.
    #[default]
    Absent,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Str(String),
    /// An ordered sequence.
    Seq(Vec<Value>),
    /// A mapping, keyed by the string form of the original keys.
    Map(BTreeMap<String, Value>),
    /// A structured record.
    Record {
        /// Name of the record type.
        type_name: String,
        /// Identity key, for record types that declare an identity field.
        identity: Option<String>,
        /// Included fields in declaration order, under their external names.
        fields: Vec<(String, Value)>,
    },
}

impl Value {
    /// Returns `true` for [`Value::Absent`].
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Returns `true` for leaf values (booleans, numbers, characters, strings).
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_)
                | Value::Int(_)
                | Value::UInt(_)
                | Value::Float(_)
                | Value::Char(_)
                | Value::Str(_)
        )
    }

    /// The string form used when this value keys a sequence element or a
    /// mapping entry. Only scalars have one.
    pub fn key_string(&self) -> Option<String> {
        if self.is_scalar() {
            Some(self.to_string())
        } else {
            None
        }
    }

    /// Deep equality in which two NaN floats are considered equal.
    ///
    /// This is the equality the comparison engine uses, so that comparing a
    /// value with itself never reports a change.
    pub fn equivalent(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Seq(a), Value::Seq(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equivalent(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a
                        .iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.equivalent(vb))
            }
            (
                Value::Record {
                    type_name: ta,
                    identity: ia,
                    fields: fa,
                },
                Value::Record {
                    type_name: tb,
                    identity: ib,
                    fields: fb,
                },
            ) => {
                ta == tb
                    && ia == ib
                    && fa.len() == fb.len()
                    && fa
                        .iter()
                        .zip(fb)
                        .all(|((na, va), (nb, vb))| na == nb && va.equivalent(vb))
            }
            _ => self == other,
        }
    }

    /// Look up a record field by its external name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record { fields, .. } => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// The identity key of a record snapshot, if its type declares one.
    pub fn identity(&self) -> Option<&str> {
        match self {
            Value::Record { identity, .. } => identity.as_deref(),
            _ => None,
        }
    }

    /// Navigate this snapshot along a changelog path.
    ///
    /// Sequence segments are matched against element identity keys first
    /// (the last element with a matching key wins), then read as decimal
    /// indices. Mapping segments are keys and record segments are external
    /// field names.
    pub fn pointer(&self, path: &Path) -> Option<&Value> {
        path.segments()
            .iter()
            .try_fold(self, |current, segment| current.step(segment))
    }

    fn step(&self, segment: &str) -> Option<&Value> {
        match self {
            Value::Seq(items) => items
                .iter()
                .rev()
                .find(|item| item.identity() == Some(segment))
                .or_else(|| segment.parse::<usize>().ok().and_then(|i| items.get(i))),
            Value::Map(entries) => entries.get(segment),
            Value::Record { .. } => self.field(segment),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => f.write_str("<absent>"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::UInt(u) => write!(f, "{u}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Str(s) => f.write_str(s),
            Value::Seq(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Record {
                type_name, fields, ..
            } => {
                write!(f, "{type_name} {{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    f.write_str(if i == 0 { " " } else { ", " })?;
                    write!(f, "{name}: {value}")?;
                }
                if fields.is_empty() {
                    f.write_str("}")
                } else {
                    f.write_str(" }")
                }
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        Value::UInt(u)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Absent, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }
}
