use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// One reason a payload failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// The rule that failed (e.g. `type`, `required`).
    pub keyword: String,
    /// Location of the offending value inside the payload.
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(
        keyword: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            keyword: keyword.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}, {}", self.keyword, self.path, self.message)
    }
}

/// Renders violations one per line.
pub fn describe_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub type ValidatorFn = Arc<dyn Fn(&Value) -> Result<(), Vec<Violation>> + Send + Sync>;

/// Per-method payload validators.
///
/// A server runs a method's validator against each decoded call for that
/// method; a client runs it against each decoded reply. Methods without a
/// validator accept everything.
///
/// Clones share the same registry, so validators added through a handle
/// returned by a client or server apply to that client or server.
#[derive(Clone, Default)]
pub struct Validators {
    inner: Arc<RwLock<HashMap<String, ValidatorFn>>>,
}

impl Validators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `validator` for `method`, replacing any previous one.
    pub fn insert<F>(&self, method: impl Into<String>, validator: F)
    where
        F: Fn(&Value) -> Result<(), Vec<Violation>> + Send + Sync + 'static,
    {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(method.into(), Arc::new(validator));
    }

    pub fn remove(&self, method: &str) -> Option<ValidatorFn> {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(method)
    }

    pub fn get(&self, method: &str) -> Option<ValidatorFn> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method)
            .cloned()
    }

    /// Runs the validator registered for `method`, if any.
    pub fn validate(&self, method: &str, payload: &Value) -> Result<(), Vec<Violation>> {
        match self.get(method) {
            Some(validator) => validator(payload),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Validators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_set().entries(guard.keys()).finish()
    }
}
