//! Registry mapping remote identifiers to loaders.

use crate::error::{RemoteLoadSnafu, RemoteNotFoundSnafu, Result};
use crate::mount::RemoteApp;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

/// Produces a remote's capability object. Called at most once per successful load.
pub type RemoteLoader = Box<dyn Fn() -> anyhow::Result<Arc<dyn RemoteApp>> + Send + Sync>;

/// Remote applications known to a host, loaded on first use.
#[derive(Default)]
pub struct RemoteRegistry {
    loaders: BTreeMap<String, RemoteLoader>,
    loaded: Mutex<HashMap<String, Arc<dyn RemoteApp>>>,
}

impl RemoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loader under `id`, replacing any previous one.
    pub fn register<F>(&mut self, id: impl Into<String>, loader: F) -> &mut Self
    where
        F: Fn() -> anyhow::Result<Arc<dyn RemoteApp>> + Send + Sync + 'static,
    {
        let id = id.into();
        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
        self.loaders.insert(id, Box::new(loader));
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.loaders.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.loaders.keys().map(String::as_str)
    }

    /// Resolve `id` to its remote, running the loader on first use.
    pub fn load(&self, id: &str) -> Result<Arc<dyn RemoteApp>> {
        if let Some(remote) = self
            .loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
        {
            return Ok(Arc::clone(remote));
        }

        let loader = self
            .loaders
            .get(id)
            .ok_or_else(|| RemoteNotFoundSnafu { id }.build())?;
        let remote = loader().map_err(|err| {
            tracing::error!(remote = id, error = %err, "remote failed to load");
            RemoteLoadSnafu {
                id,
                message: format!("{err:#}"),
            }
            .build()
        })?;
        tracing::info!(remote = id, "remote loaded");

        self.loaded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id.to_string(), Arc::clone(&remote));
        Ok(remote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mount::tests::EchoRemote;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_load_caches_remote() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = RemoteRegistry::new();
        {
            let calls = Arc::clone(&calls);
            registry.register("echo", move || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Arc::new(EchoRemote::new()) as Arc<dyn RemoteApp>)
            });
        }

        let a = registry.load("echo").unwrap();
        let b = registry.load("echo").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.name(), "echo");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_remote() {
        let registry = RemoteRegistry::new();
        assert!(matches!(
            registry.load("nope"),
            Err(Error::RemoteNotFound { ref id }) if id == "nope"
        ));
    }

    #[test]
    fn test_loader_failure_is_reported_and_retried_later() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let mut registry = RemoteRegistry::new();
        {
            let attempts = Arc::clone(&attempts);
            registry.register("flaky", move || {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    anyhow::bail!("bundle unavailable");
                }
                Ok(Arc::new(EchoRemote::new()) as Arc<dyn RemoteApp>)
            });
        }

        let err = registry.load("flaky").err().unwrap();
        assert!(err.to_string().contains("bundle unavailable"));
        assert!(registry.load("flaky").is_ok());
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["flaky"]);
    }
}
