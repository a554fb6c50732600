//! In-process provider backed by statically registered handlers.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ActionError;
use crate::provider::{ActionProvider, Invocable};

/// Adapts a plain function or closure into an [`Invocable`].
///
/// An `Err(text)` from the function becomes [`ActionError::Invocation`].
pub struct FnInvocable<F> {
    f: F,
}

impl<F> FnInvocable<F>
where
    F: Fn(&[String]) -> Result<String, String> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> Invocable for FnInvocable<F>
where
    F: Fn(&[String]) -> Result<String, String> + Send + Sync,
{
    async fn call(&self, args: &[String]) -> Result<String, ActionError> {
        (self.f)(args).map_err(ActionError::Invocation)
    }
}

/// Provider over a fixed, in-memory table of handlers.
#[derive(Default)]
pub struct StaticProvider {
    actions: HashMap<String, Arc<dyn Invocable>>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an invocable under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, invocable: Arc<dyn Invocable>) {
        self.actions.insert(name.into(), invocable);
    }

    /// Register a closure under `name`.
    pub fn register_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&[String]) -> Result<String, String> + Send + Sync + 'static,
    {
        self.register(name, Arc::new(FnInvocable::new(f)));
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl ActionProvider for StaticProvider {
    fn lookup(&self, name: &str) -> Result<Arc<dyn Invocable>, ActionError> {
        self.actions
            .get(name)
            .cloned()
            .ok_or_else(|| ActionError::NotFound(name.to_string()))
    }

    fn list(&self) -> Result<BTreeSet<String>, ActionError> {
        Ok(self.actions.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_fn_invocable_success_and_failure() {
        let join = FnInvocable::new(|a: &[String]| Ok(a.join(",")));
        assert_eq!(join.call(&args(&["a", "b"])).await.unwrap(), "a,b");

        let fail = FnInvocable::new(|_: &[String]| Err("boom failed".to_string()));
        let err = fail.call(&[]).await.unwrap_err();
        assert!(matches!(err, ActionError::Invocation(_)));
        assert_eq!(err.to_string(), "boom failed");
    }

    #[tokio::test]
    async fn test_static_provider_lookup() {
        let mut provider = StaticProvider::new();
        assert!(provider.is_empty());
        provider.register_fn("echo", |a| Ok(a.join(" ")));

        let echo = provider.lookup("echo").unwrap();
        assert_eq!(echo.call(&args(&["hi", "there"])).await.unwrap(), "hi there");

        let err = provider.lookup("ghost").err().unwrap();
        assert!(matches!(err, ActionError::NotFound(ref n) if n == "ghost"));
    }

    #[test]
    fn test_static_provider_list_is_sorted() {
        let mut provider = StaticProvider::new();
        provider.register_fn("zeta", |_| Ok(String::new()));
        provider.register_fn("alpha", |_| Ok(String::new()));
        provider.register_fn("alpha", |_| Ok("replaced".to_string()));

        let names: Vec<String> = provider.list().unwrap().into_iter().collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(provider.len(), 2);
    }
}
