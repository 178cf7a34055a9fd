//! Serving contexts.

use std::collections::BTreeMap;
use std::fmt;

/// Identifier of the serving context a handler runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub i64);

impl ContextId {
    /// Context reserved for handlers registered directly through the alias registry.
    pub const DIRECT: ContextId = ContextId(0);
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ContextId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// The environment a servlet or filter is served under.
#[derive(Debug, Clone, Default)]
pub struct ServletContext {
    name: String,
    init_params: BTreeMap<String, String>,
}

impl ServletContext {
    /// Create a context with no init parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            init_params: BTreeMap::new(),
        }
    }

    /// Attach an init parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.init_params.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn init_param(&self, key: &str) -> Option<&str> {
        self.init_params.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_params() {
        let ctx = ServletContext::new("default").with_param("charset", "utf-8");
        assert_eq!(ctx.name(), "default");
        assert_eq!(ctx.init_param("charset"), Some("utf-8"));
        assert_eq!(ctx.init_param("missing"), None);
    }

    #[test]
    fn test_direct_context_id() {
        assert_eq!(ContextId::DIRECT, ContextId::from(0));
        assert_eq!(ContextId(42).to_string(), "42");
    }
}
