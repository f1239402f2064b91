//! Per-evaluation configuration (§6, AMBIENT CONFIGURATION).
//!
//! There is no ambient global config for the core — the operator registry
//! is the only process-wide state and it is read-only (§5). Everything an
//! evaluation needs is threaded through one `Options` value.

#[derive(Debug, Clone)]
pub struct Options {
    /// The key that disambiguates a literal array from a call form, e.g.
    /// `"array"` (default) or `"@data"`. Fixed for one evaluation (§3).
    pub array_key: String,
    /// Whether the JSON loader (outside the evaluator proper) permits
    /// line/block comments before handing the evaluator a parsed script.
    pub allow_comments: bool,
    /// Ceiling on non-tail evaluator recursion before failing with
    /// `InvalidScript` instead of overflowing the native stack (§4.1).
    pub max_eval_depth: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            array_key: "array".to_string(),
            allow_comments: false,
            max_eval_depth: 4096,
        }
    }
}

impl Options {
    pub fn with_array_key(mut self, key: impl Into<String>) -> Self {
        self.array_key = key.into();
        self
    }
}
