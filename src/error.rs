//! Structured errors carrying an evaluation path, per §7.
//!
//! Grounded on the original evaluator's exception hierarchy
//! (`computo.hpp`'s `ComputoException`/`InvalidArgumentException` family)
//! and on `json-logic-rs`'s use of `thiserror` for the same kind of
//! expression-language error surface.

use thiserror::Error;

/// One of the closed set of error kinds from §7.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("invalid script: {message}{}", path_suffix(path))]
    InvalidScript { message: String, path: Vec<String> },

    #[error("unknown operator '{name}'{}{}", suggestion_suffix(suggestions), path_suffix(path))]
    UnknownOperator {
        name: String,
        suggestions: Vec<String>,
        path: Vec<String>,
    },

    #[error("unknown variable '{name}'{}{}", suggestion_suffix(suggestions), path_suffix(path))]
    UnknownVariable {
        name: String,
        suggestions: Vec<String>,
        path: Vec<String>,
    },

    #[error("'{op}' expects {expected}, got {actual}{}", path_suffix(path))]
    Arity {
        op: String,
        expected: String,
        actual: usize,
        path: Vec<String>,
    },

    #[error("'{op}' requires {expected}, got {actual}{}", path_suffix(path))]
    TypeError {
        op: String,
        expected: String,
        actual: String,
        path: Vec<String>,
    },

    #[error("{message}{}", path_suffix(path))]
    DomainError { message: String, path: Vec<String> },

    #[error("JSON pointer '{pointer}' failed: {message}{}", path_suffix(path))]
    PathError {
        pointer: String,
        message: String,
        path: Vec<String>,
    },

    #[error("JSON patch operation {index} failed: {message}{}", path_suffix(path))]
    PatchError {
        index: usize,
        message: String,
        path: Vec<String>,
    },

    #[error("parse error at line {line}, column {column}: {message}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },
}

fn path_suffix(path: &[String]) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" (at {})", path.join("."))
    }
}

fn suggestion_suffix(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean {}?)", suggestions.join(" or "))
    }
}

impl Error {
    /// Evaluation-path-carrying variants get the path prepended with one
    /// more context frame as the error unwinds, so the reported path
    /// spells the full spine from root to failure (Testable Property 12).
    pub fn with_context(mut self, frame: impl Into<String>) -> Self {
        let path = match &mut self {
            Error::InvalidScript { path, .. }
            | Error::UnknownOperator { path, .. }
            | Error::UnknownVariable { path, .. }
            | Error::Arity { path, .. }
            | Error::TypeError { path, .. }
            | Error::DomainError { path, .. }
            | Error::PathError { path, .. }
            | Error::PatchError { path, .. } => path,
            Error::ParseError { .. } => return self,
        };
        path.insert(0, frame.into());
        self
    }

    pub fn invalid_script(message: impl Into<String>) -> Self {
        Error::InvalidScript {
            message: message.into(),
            path: Vec::new(),
        }
    }

    pub fn unknown_operator(name: impl Into<String>, candidates: &[&str]) -> Self {
        let name = name.into();
        let suggestions = crate::error::suggest(&name, candidates);
        Error::UnknownOperator {
            name,
            suggestions,
            path: Vec::new(),
        }
    }

    pub fn unknown_variable(name: impl Into<String>, candidates: &[String]) -> Self {
        let name = name.into();
        let candidate_refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
        let suggestions = suggest(&name, &candidate_refs);
        Error::UnknownVariable {
            name,
            suggestions,
            path: Vec::new(),
        }
    }

    pub fn arity(op: impl Into<String>, expected: impl Into<String>, actual: usize) -> Self {
        Error::Arity {
            op: op.into(),
            expected: expected.into(),
            actual,
            path: Vec::new(),
        }
    }

    pub fn type_error(op: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Error::TypeError {
            op: op.into(),
            expected: expected.into(),
            actual: actual.into(),
            path: Vec::new(),
        }
    }

    pub fn domain_error(message: impl Into<String>) -> Self {
        Error::DomainError {
            message: message.into(),
            path: Vec::new(),
        }
    }

    pub fn path_error(pointer: impl Into<String>, message: impl Into<String>) -> Self {
        Error::PathError {
            pointer: pointer.into(),
            message: message.into(),
            path: Vec::new(),
        }
    }

    pub fn patch_error(index: usize, message: impl Into<String>) -> Self {
        Error::PatchError {
            index,
            message: message.into(),
            path: Vec::new(),
        }
    }

    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Error::ParseError {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Levenshtein edit distance, used by the suggestion mechanism (§7).
/// Grounded on `operators/shared.cpp`'s `calculate_levenshtein_distance`.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (la, lb) = (a.len(), b.len());
    let mut row: Vec<usize> = (0..=lb).collect();
    for i in 1..=la {
        let mut prev_diag = row[0];
        row[0] = i;
        for j in 1..=lb {
            let tmp = row[j];
            row[j] = if a[i - 1] == b[j - 1] {
                prev_diag
            } else {
                1 + prev_diag.min(row[j]).min(row[j - 1])
            };
            prev_diag = tmp;
        }
    }
    row[lb]
}

/// Candidates within edit distance 2, sorted by (distance, alphabetical).
/// Grounded on `operators/shared.cpp`'s `suggest_similar_names`.
pub fn suggest(target: &str, candidates: &[&str]) -> Vec<String> {
    const MAX_DISTANCE: usize = 2;
    let mut matches: Vec<(usize, &str)> = candidates
        .iter()
        .map(|c| (levenshtein(target, c), *c))
        .filter(|(d, _)| *d <= MAX_DISTANCE)
        .collect();
    matches.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    matches.into_iter().map(|(_, name)| name.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_identical_is_zero() {
        assert_eq!(levenshtein("map", "map"), 0);
    }

    #[test]
    fn levenshtein_single_substitution() {
        assert_eq!(levenshtein("fliter", "filter"), 2);
    }

    #[test]
    fn suggest_filters_by_threshold() {
        let candidates = ["filter", "map", "reduce"];
        let s = suggest("fitler", &candidates);
        assert_eq!(s, vec!["filter".to_string()]);
    }

    #[test]
    fn suggest_sorts_by_distance_then_alpha() {
        let candidates = ["mapi", "mapz", "maap"];
        let s = suggest("map", &candidates);
        assert_eq!(s, vec!["maap".to_string(), "mapi".to_string(), "mapz".to_string()]);
    }

    #[test]
    fn with_context_prepends_path() {
        let err = Error::domain_error("divide by zero").with_context("then");
        if let Error::DomainError { path, .. } = err {
            assert_eq!(path, vec!["then".to_string()]);
        } else {
            panic!("wrong variant");
        }
    }
}
