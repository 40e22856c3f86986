use serde::{Deserialize, Serialize};

/// Configuration for a [`Differ`](crate::Differ).
///
/// Every field has a default, so a partial configuration (for example a
/// section of a larger TOML or JSON file) deserializes cleanly.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    /// Maximum nesting depth to descend before failing with
    /// [`DiffError::DepthExceeded`](crate::DiffError::DepthExceeded).
    /// `None` means unbounded.
    pub max_depth: Option<usize>,
    /// Whether sequences of records that declare an identity field are
    /// matched by identity key. When `false` they are matched by position.
    pub identity_matching: bool,
    /// Where the cursor edit heuristic is used for sequences of scalars.
    pub edit_heuristic: EditHeuristic,
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            identity_matching: true,
            edit_heuristic: EditHeuristic::Root,
        }
    }
}

impl DiffConfig {
    /// A configuration that fails comparisons nested deeper than `limit`.
    pub fn bounded(limit: usize) -> Self {
        Self {
            max_depth: Some(limit),
            ..Default::default()
        }
    }
}

/// Scope of the insert/delete heuristic for sequences of scalars.
///
/// Outside that scope scalar sequences are compared position by position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditHeuristic {
    /// Only when the scalar sequence is the compared value itself.
    #[default]
    Root,
    /// For every scalar sequence, at any depth.
    Everywhere,
    /// Never; scalar sequences are always positional.
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DiffConfig::default();
        assert_eq!(config.max_depth, None);
        assert!(config.identity_matching);
        assert_eq!(config.edit_heuristic, EditHeuristic::Root);
    }

    #[test]
    fn bounded_keeps_other_defaults() {
        let config = DiffConfig::bounded(8);
        assert_eq!(config.max_depth, Some(8));
        assert!(config.identity_matching);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: DiffConfig = serde_json::from_str(r#"{"edit_heuristic":"everywhere"}"#).unwrap();
        assert_eq!(config.edit_heuristic, EditHeuristic::Everywhere);
        assert!(config.identity_matching);
        assert_eq!(config.max_depth, None);
    }

    #[test]
    fn serde_roundtrip() {
        let config = DiffConfig {
            max_depth: Some(3),
            identity_matching: false,
            edit_heuristic: EditHeuristic::Never,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: DiffConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
