//! Error types for the comparison engine.

use shapediff_types::Path;

/// Errors that abort a comparison. None of them yields a partial changelog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// The two sides do not share a declared shape at `path`.
    #[error("shape mismatch at {path}: {old} vs {new}")]
    ShapeMismatch {
        path: Path,
        old: String,
        new: String,
    },

    /// A value at `path` does not fall into any comparable category.
    #[error("unsupported type at {path}: {type_name}")]
    UnsupportedType { path: Path, type_name: String },

    /// The same pair of records reappeared on the active comparison path.
    #[error("cycle detected at {path}")]
    CycleDetected { path: Path },

    /// A record field carries a directive the field resolver rejects.
    #[error("invalid diff directive {directive:?} on {type_name}.{field}: {reason}")]
    InvalidDirective {
        type_name: String,
        field: String,
        directive: String,
        reason: String,
    },

    /// Nesting went deeper than the configured limit.
    #[error("maximum depth {limit} exceeded at {path}")]
    DepthExceeded { path: Path, limit: usize },
}

impl DiffError {
    /// Create a shape mismatch error at a path.
    pub fn shape_mismatch(path: &Path, old: impl ToString, new: impl ToString) -> Self {
        Self::ShapeMismatch {
            path: path.clone(),
            old: old.to_string(),
            new: new.to_string(),
        }
    }

    /// Create an unsupported type error at a path.
    pub fn unsupported(path: &Path, type_name: impl Into<String>) -> Self {
        Self::UnsupportedType {
            path: path.clone(),
            type_name: type_name.into(),
        }
    }
}

/// Convenience alias for comparison results.
pub type DiffResult<T> = Result<T, DiffError>;
