//! Lexically-scoped, immutable variable environment (§3, §4.3).
//!
//! Grounded on `original_source`'s `ExecutionContext` (`computo.hpp`):
//! `with_variables` pushes a frame and returns a new context rather than
//! mutating in place, and `with_path` extends the evaluation-path spine.
//! Frames are reference-counted so `let`/lambda capture is cheap and
//! closures can share a tail of frames without copying them.

use std::collections::HashMap;
use std::rc::Rc;

use crate::error::Error;
use crate::value::Value;

#[derive(Debug, Clone)]
struct Frame {
    vars: HashMap<String, Value>,
    parent: Option<Rc<Frame>>,
}

/// An immutable chain of frames plus the ordered inputs and the current
/// evaluation path. Cloning an `Environment` is O(1): it shares the frame
/// chain by `Rc`.
#[derive(Debug, Clone)]
pub struct Environment {
    frame: Option<Rc<Frame>>,
    inputs: Rc<Vec<Value>>,
    path: Vec<String>,
}

impl Environment {
    pub fn new(inputs: Vec<Value>) -> Self {
        Environment {
            frame: None,
            inputs: Rc::new(inputs),
            path: Vec::new(),
        }
    }

    pub fn inputs(&self) -> &[Value] {
        &self.inputs
    }

    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Extends the evaluation path by one frame, for error reporting
    /// (§4.1 "Evaluation-path tracking").
    pub fn with_path(&self, frame: impl Into<String>) -> Environment {
        let mut next = self.clone();
        next.path.push(frame.into());
        next
    }

    /// Pushes a new frame of bindings on top of the current chain. Used by
    /// `let` and lambda application; bindings never see each other or
    /// themselves (non-recursive, Open Question 1 resolved in DESIGN.md).
    pub fn with_bindings(&self, vars: HashMap<String, Value>) -> Environment {
        Environment {
            frame: Some(Rc::new(Frame {
                vars,
                parent: self.frame.clone(),
            })),
            inputs: self.inputs.clone(),
            path: self.path.clone(),
        }
    }

    /// Innermost-first lookup, matching `let` shadowing semantics.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        let mut frame = self.frame.as_deref();
        while let Some(f) = frame {
            if let Some(v) = f.vars.get(name) {
                return Some(v);
            }
            frame = f.parent.as_deref();
        }
        None
    }

    /// All names visible from the innermost frame outward, for
    /// `UnknownVariable` suggestions (§4.3) and `["$"]` with no argument.
    pub fn all_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut frame = self.frame.as_deref();
        while let Some(f) = frame {
            names.extend(f.vars.keys().cloned());
            frame = f.parent.as_deref();
        }
        names
    }

    /// Union of every visible binding as an object, innermost wins
    /// (`["$"]` with no pointer argument, §4.3).
    pub fn all_bindings_as_object(&self) -> Value {
        let mut seen = serde_json::Map::new();
        let mut frame = self.frame.as_deref();
        while let Some(f) = frame {
            for (k, v) in &f.vars {
                seen.entry(k.clone()).or_insert_with(|| v.clone());
            }
            frame = f.parent.as_deref();
        }
        Value::Object(seen)
    }

    pub fn error_with_path(&self, err: Error) -> Error {
        self.path.iter().rev().fold(err, |e, frame| e.with_context(frame.clone()))
    }
}
