//! Changes and changelogs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::Path;
use crate::value::Value;

/// The kind of an atomic change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Create,
    Update,
    Delete,
}

impl ChangeKind {
    /// The kind describing the same change seen from the other side.
    pub fn inverted(self) -> Self {
        match self {
            ChangeKind::Create => ChangeKind::Delete,
            ChangeKind::Update => ChangeKind::Update,
            ChangeKind::Delete => ChangeKind::Create,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Create => "create",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// One atomic difference between two compared values.
///
/// A create has `from == Value::Absent`; a delete has `to == Value::Absent`.
/// An update never has equivalent `from` and `to`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub path: Path,
    pub from: Value,
    pub to: Value,
}

impl Change {
    /// Something that exists only on the new side.
    pub fn create(path: Path, to: Value) -> Self {
        Self {
            kind: ChangeKind::Create,
            path,
            from: Value::Absent,
            to,
        }
    }

    /// Something present on both sides with a different value.
    pub fn update(path: Path, from: Value, to: Value) -> Self {
        Self {
            kind: ChangeKind::Update,
            path,
            from,
            to,
        }
    }

    /// Something that exists only on the old side.
    pub fn delete(path: Path, from: Value) -> Self {
        Self {
            kind: ChangeKind::Delete,
            path,
            from,
            to: Value::Absent,
        }
    }

    /// The same change described from the opposite direction: kinds are
    /// inverted and `from`/`to` swapped.
    pub fn inverted(&self) -> Self {
        Self {
            kind: self.kind.inverted(),
            path: self.path.clone(),
            from: self.to.clone(),
            to: self.from.clone(),
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ChangeKind::Create => write!(f, "create {}: {}", self.path, self.to),
            ChangeKind::Update => write!(f, "update {}: {} -> {}", self.path, self.from, self.to),
            ChangeKind::Delete => write!(f, "delete {}: {}", self.path, self.from),
        }
    }
}

/// The ordered result of one comparison.
///
/// Entries appear in discovery order: record fields in declaration order,
/// then sequence and mapping entries as the matcher reports them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Changelog {
    pub changes: Vec<Change>,
}

impl Changelog {
    /// Create an empty changelog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if there are no changes.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Append a change.
    pub fn push(&mut self, change: Change) {
        self.changes.push(change);
    }

    /// Iterate over the changes in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, Change> {
        self.changes.iter()
    }

    /// Number of create changes.
    pub fn creations(&self) -> usize {
        self.count(ChangeKind::Create)
    }

    /// Number of update changes.
    pub fn updates(&self) -> usize {
        self.count(ChangeKind::Update)
    }

    /// Number of delete changes.
    pub fn deletions(&self) -> usize {
        self.count(ChangeKind::Delete)
    }

    /// All changes recorded at exactly `path`.
    pub fn at<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a Change> + 'a {
        self.changes.iter().filter(move |c| &c.path == path)
    }

    /// Every change inverted, in the same order.
    pub fn inverted(&self) -> Self {
        Self {
            changes: self.changes.iter().map(Change::inverted).collect(),
        }
    }

    fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }
}

impl IntoIterator for Changelog {
    type Item = Change;
    type IntoIter = std::vec::IntoIter<Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.into_iter()
    }
}

impl<'a> IntoIterator for &'a Changelog {
    type Item = &'a Change;
    type IntoIter = std::slice::Iter<'a, Change>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

impl FromIterator<Change> for Changelog {
    fn from_iter<I: IntoIterator<Item = Change>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Changelog {
        vec![
            Change::delete(Path::from(["1"]), Value::Int(2)),
            Change::create(Path::from(["2"]), Value::Int(4)),
            Change::update(Path::from(["name"]), "one".into(), "two".into()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn constructors_fill_absent_sides() {
        let create = Change::create(Path::from(["3"]), Value::Int(4));
        assert_eq!(create.kind, ChangeKind::Create);
        assert!(create.from.is_absent());

        let delete = Change::delete(Path::from(["1"]), Value::Int(2));
        assert_eq!(delete.kind, ChangeKind::Delete);
        assert!(delete.to.is_absent());
    }

    #[test]
    fn counts_by_kind() {
        let log = sample();
        assert_eq!(log.len(), 3);
        assert_eq!(log.creations(), 1);
        assert_eq!(log.updates(), 1);
        assert_eq!(log.deletions(), 1);
        assert!(!log.is_empty());
        assert!(Changelog::new().is_empty());
    }

    #[test]
    fn inversion_swaps_kinds_and_sides() {
        let inverted = sample().inverted();
        assert_eq!(inverted.changes[0], Change::create(Path::from(["1"]), Value::Int(2)));
        assert_eq!(inverted.changes[1], Change::delete(Path::from(["2"]), Value::Int(4)));
        assert_eq!(
            inverted.changes[2],
            Change::update(Path::from(["name"]), "two".into(), "one".into())
        );
        assert_eq!(inverted.inverted(), sample());
    }

    #[test]
    fn lookup_by_path() {
        let log = sample();
        let path = Path::from(["name"]);
        let found: Vec<_> = log.at(&path).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, ChangeKind::Update);
    }

    #[test]
    fn display_is_readable() {
        let log = sample();
        let lines: Vec<String> = log.iter().map(ToString::to_string).collect();
        assert_eq!(lines, ["delete 1: 2", "create 2: 4", "update name: one -> two"]);
    }

    #[test]
    fn json_shape() {
        let change = Change::create(Path::from(["3"]), Value::Int(4));
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "kind": "create",
                "path": ["3"],
                "from": "absent",
                "to": { "int": 4 }
            })
        );
    }
}
