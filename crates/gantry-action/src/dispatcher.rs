//! The single invocation path shared by the CLI and the HTTP API.

use std::sync::Arc;
use std::time::{Duration, Instant};

use gantry_stats::StatsStore;

use crate::error::ActionError;
use crate::provider::Invocable;
use crate::registry::ActionRegistry;

/// Runs actions and records what happened.
///
/// Every call to [`Dispatcher::dispatch`] resolves the action, times the
/// invocation, and records exactly one execution in the [`StatsStore`] once
/// the invocation has finished. Resolution failures are returned before
/// anything is recorded.
///
/// The sequence runs on its own task. A caller that stops waiting, such as
/// an HTTP client that disconnects, does not cancel the action or its record.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ActionRegistry>,
    stats: Arc<StatsStore>,
    timeout: Option<Duration>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ActionRegistry>, stats: Arc<StatsStore>) -> Self {
        Self {
            registry,
            stats,
            timeout: None,
        }
    }

    /// Bound each invocation. `None` lets actions run indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn registry(&self) -> &Arc<ActionRegistry> {
        &self.registry
    }

    pub fn stats(&self) -> &Arc<StatsStore> {
        &self.stats
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Run `name` with `args` and return its outcome unchanged.
    pub async fn dispatch(&self, name: &str, args: &[String]) -> Result<String, ActionError> {
        let this = self.clone();
        let owned_name = name.to_string();
        let owned_args = args.to_vec();
        let task = tokio::spawn(async move { this.run(&owned_name, &owned_args).await });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(action = %name, error = %e, "Dispatch task failed");
                Err(ActionError::Invocation(format!("Dispatch task failed: {}", e)))
            }
        }
    }

    async fn run(&self, name: &str, args: &[String]) -> Result<String, ActionError> {
        let invocable = self.resolve(name).await?;

        let start = Instant::now();
        let outcome = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, invocable.call(args)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ActionError::Timeout(limit)),
            },
            None => invocable.call(args).await,
        };
        let duration = start.elapsed();

        let (success, result_text) = match &outcome {
            Ok(result) => (true, result.clone()),
            Err(e) => (false, e.to_string()),
        };

        tracing::info!(
            action = %name,
            duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            success,
            "Action dispatched"
        );

        self.record(name, duration, success, result_text).await;
        outcome
    }

    /// Cache hits return directly. A miss goes to the provider, which may
    /// touch the filesystem, so it runs off the async workers.
    async fn resolve(&self, name: &str) -> Result<Arc<dyn Invocable>, ActionError> {
        if let Some(hit) = self.registry.cached(name) {
            return Ok(hit);
        }
        let registry = Arc::clone(&self.registry);
        let owned_name = name.to_string();
        tokio::task::spawn_blocking(move || registry.resolve(&owned_name))
            .await
            .unwrap_or_else(|e| {
                Err(ActionError::ResolutionFailed {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
            })
    }

    /// Persisting is blocking file I/O, so it runs off the async workers.
    /// A persistence failure has already been logged by the store and does
    /// not affect the dispatch outcome.
    async fn record(&self, name: &str, duration: Duration, success: bool, result: String) {
        let stats = Arc::clone(&self.stats);
        let owned_name = name.to_string();
        let recorded = tokio::task::spawn_blocking(move || {
            stats.record_execution(&owned_name, duration, success, &result)
        })
        .await;

        match recorded {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!(action = %name, error = %e, "Execution kept in memory only");
            }
            Err(e) => {
                tracing::error!(action = %name, error = %e, "Statistics recording task failed");
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("stats", &self.stats)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::StaticProvider;
    use gantry_core::ExecutionStatus;

    struct Sleeper(Duration);

    #[async_trait::async_trait]
    impl Invocable for Sleeper {
        async fn call(&self, _args: &[String]) -> Result<String, ActionError> {
            tokio::time::sleep(self.0).await;
            Ok("done".to_string())
        }
    }

    fn sleeper_dispatcher(dir: &std::path::Path, delay: Duration) -> Dispatcher {
        let mut provider = StaticProvider::new();
        provider.register("slow", Arc::new(Sleeper(delay)));
        let registry = Arc::new(ActionRegistry::new(Arc::new(provider)));
        let stats = Arc::new(StatsStore::open(dir.join("stats.json")).unwrap());
        Dispatcher::new(registry, stats)
    }

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn make_dispatcher(dir: &std::path::Path) -> Dispatcher {
        let mut provider = StaticProvider::new();
        provider.register_fn("echo", |a| Ok(a.join(",")));
        provider.register_fn("boom", |_| Err("boom failed".to_string()));
        let registry = Arc::new(ActionRegistry::new(Arc::new(provider)));
        let stats = Arc::new(StatsStore::open(dir.join("stats.json")).unwrap());
        Dispatcher::new(registry, stats)
    }

    #[tokio::test]
    async fn test_dispatch_success_is_recorded() {
        let tmp = tempfile::tempdir().unwrap();
        let dispatcher = make_dispatcher(tmp.path());

        let result = dispatcher.dispatch("echo", &args(&["a", "b"])).await.unwrap();
        assert_eq!(result, "a,b");

        let stats = dispatcher.stats().get_stats("echo").unwrap();
        assert_eq!(stats.total_calls, 1);
        assert_eq!(stats.successful_calls, 1);
        assert!(stats.last_executed.is_some());

        let history = dispatcher.stats().get_history("echo");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, ExecutionStatus::Success);
        assert_eq!(history[0].result, "a,b");
    }

    #[tokio::test]
    async fn test_dispatch_failure_is_recorded_and_returned() {
        let tmp = tempfile::tempdir().unwrap();
        let dispatcher = make_dispatcher(tmp.path());

        let err = dispatcher.dispatch("boom", &[]).await.unwrap_err();
        assert!(matches!(err, ActionError::Invocation(_)));
        assert_eq!(err.to_string(), "boom failed");

        let stats = dispatcher.stats().get_stats("boom").unwrap();
        assert_eq!(stats.total_calls, 1);
        assert_eq!(stats.successful_calls, 0);

        let history = dispatcher.stats().get_history("boom");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, ExecutionStatus::Failure);
        assert_eq!(history[0].result, "boom failed");
    }

    #[tokio::test]
    async fn test_dispatch_unknown_records_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let dispatcher = make_dispatcher(tmp.path());

        let err = dispatcher.dispatch("ghost", &[]).await.unwrap_err();
        assert!(matches!(err, ActionError::NotFound(_)));
        assert!(dispatcher.stats().get_stats("ghost").is_none());
        assert!(dispatcher.stats().get_history("ghost").is_empty());
    }

    #[tokio::test]
    async fn test_dispatch_persists_before_returning() {
        let tmp = tempfile::tempdir().unwrap();
        let dispatcher = make_dispatcher(tmp.path());
        dispatcher.dispatch("echo", &args(&["x"])).await.unwrap();

        let reopened = StatsStore::open(tmp.path().join("stats.json")).unwrap();
        assert_eq!(reopened.get_stats("echo").unwrap().total_calls, 1);
        assert_eq!(reopened.get_history("echo")[0].result, "x");
    }

    #[tokio::test]
    async fn test_dispatch_timeout_is_a_recorded_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let dispatcher = sleeper_dispatcher(tmp.path(), Duration::from_secs(10))
            .with_timeout(Some(Duration::from_millis(50)));

        let err = dispatcher.dispatch("slow", &[]).await.unwrap_err();
        assert!(matches!(err, ActionError::Timeout(_)));

        let history = dispatcher.stats().get_history("slow");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, ExecutionStatus::Failure);
        assert_eq!(history[0].result, err.to_string());
    }

    #[tokio::test]
    async fn test_abandoned_dispatch_runs_to_completion() {
        let tmp = tempfile::tempdir().unwrap();
        let dispatcher = sleeper_dispatcher(tmp.path(), Duration::from_millis(100));

        // The caller gives up while the action is still sleeping.
        let abandoned =
            tokio::time::timeout(Duration::from_millis(10), dispatcher.dispatch("slow", &[])).await;
        assert!(abandoned.is_err());
        assert!(dispatcher.stats().get_stats("slow").is_none());

        let mut waited = Duration::ZERO;
        while dispatcher.stats().get_stats("slow").is_none() && waited < Duration::from_secs(5) {
            tokio::time::sleep(Duration::from_millis(20)).await;
            waited += Duration::from_millis(20);
        }

        let history = dispatcher.stats().get_history("slow");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, ExecutionStatus::Success);
        assert_eq!(history[0].result, "done");
        let reopened = StatsStore::open(tmp.path().join("stats.json")).unwrap();
        assert_eq!(reopened.get_stats("slow").unwrap().total_calls, 1);
    }

    #[tokio::test]
    async fn test_dispatch_uses_registry_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let dispatcher = make_dispatcher(tmp.path());

        assert!(!dispatcher.registry().is_cached("echo"));
        dispatcher.dispatch("echo", &[]).await.unwrap();
        assert!(dispatcher.registry().is_cached("echo"));
        dispatcher.dispatch("boom", &[]).await.unwrap_err();
        assert!(dispatcher.registry().is_cached("boom"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fifty_concurrent_dispatches() {
        let tmp = tempfile::tempdir().unwrap();
        let dispatcher = Arc::new(make_dispatcher(tmp.path()));

        let mut handles = Vec::new();
        for i in 0..50 {
            let dispatcher = Arc::clone(&dispatcher);
            handles.push(tokio::spawn(async move {
                let args = vec![i.to_string()];
                dispatcher.dispatch("echo", &args).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let stats = dispatcher.stats().get_stats("echo").unwrap();
        assert_eq!(stats.total_calls, 50);
        assert_eq!(stats.successful_calls, 50);

        let history = dispatcher.stats().get_history("echo");
        assert_eq!(history.len(), 50);
        let mut results: Vec<u32> = history.iter().map(|r| r.result.parse().unwrap()).collect();
        results.sort_unstable();
        assert_eq!(results, (0..50).collect::<Vec<u32>>());

        let reopened = StatsStore::open(tmp.path().join("stats.json")).unwrap();
        assert_eq!(reopened.get_history("echo").len(), 50);
    }
}
