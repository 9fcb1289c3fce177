use serde::Serialize;
use std::fmt;

/// Cache identity of one endpoint call: the endpoint name followed by every
/// parameter that changes the result, each serialised as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(String);

impl QueryKey {
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Appends one parameter. Parameters that cannot be serialised contribute
    /// `null`, which still keeps the key stable.
    pub fn with<P: Serialize + ?Sized>(mut self, param: &P) -> Self {
        let encoded = serde_json::to_string(param).unwrap_or_else(|_| "null".to_string());
        self.0.push('|');
        self.0.push_str(&encoded);
        self
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The endpoint name the key was started from.
    pub fn name(&self) -> &str {
        self.0.split('|').next().unwrap_or_default()
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
