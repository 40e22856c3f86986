use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of a change inside a compared structure.
///
/// A path is an ordered list of string segments: record field names,
/// sequence indices as decimal strings, identity-key values for
/// identity-matched sequence elements, or mapping keys. The empty path
/// addresses the compared value itself.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<String>);

impl Path {
    /// The empty path, addressing the root of the comparison.
    pub fn root() -> Self {
        Self::default()
    }

    /// A new path extending this one by a single segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend(self.0.iter().cloned());
        segments.push(segment.into());
        Self(segments)
    }

    /// The segments of this path, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The innermost segment, if any.
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Returns `true` if `prefix` is a (non-strict) prefix of this path.
    pub fn starts_with(&self, prefix: &Path) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({self})")
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.0.join("."))
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for Path {
    fn from(segments: [S; N]) -> Self {
        segments.into_iter().collect()
    }
}

impl From<Vec<String>> for Path {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_is_empty() {
        let root = Path::root();
        assert!(root.is_root());
        assert_eq!(root.len(), 0);
        assert_eq!(root.last(), None);
    }

    #[test]
    fn child_does_not_touch_parent() {
        let parent = Path::from(["items"]);
        let child = parent.child("3");
        assert_eq!(parent.segments(), ["items"]);
        assert_eq!(child.segments(), ["items", "3"]);
        assert_eq!(child.last(), Some("3"));
    }

    #[test]
    fn display_is_dotted() {
        assert_eq!(Path::from(["identifiables", "one", "value"]).to_string(), "identifiables.one.value");
        assert_eq!(Path::root().to_string(), "<root>");
    }

    #[test]
    fn prefix_check() {
        let path = Path::from(["a", "b", "c"]);
        assert!(path.starts_with(&Path::root()));
        assert!(path.starts_with(&Path::from(["a", "b"])));
        assert!(!path.starts_with(&Path::from(["b"])));
    }

    #[test]
    fn serializes_as_plain_list() {
        let path = Path::from(["map", "key"]);
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, r#"["map","key"]"#);
        let parsed: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, path);
    }
}
