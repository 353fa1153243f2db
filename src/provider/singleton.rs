//! Lazy, thread-safe memoization of a provider.

use std::cell::Cell;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::ReentrantMutex;
use tracing::trace;

use crate::error::{DiError, DiResult};
use crate::provider::{AnyArc, Provider};
use crate::traits::DependencyResolver;

/// Wraps a provider so its delegate runs at most once across all threads.
///
/// `get` is double-checked: the fast path reads the cached instance without
/// locking; on a miss the lock is taken, the cache checked again, and only
/// then is the delegate invoked and its result stored. A failed construction
/// caches nothing, so a later call tries again.
///
/// The cache belongs to this wrapper, not to an injector. Every injector that
/// can see the same `SingletonProvider` sees the same instance.
///
/// Re-entering `get` from the delegate on the same thread (a cycle that
/// escaped graph validation) fails with [`DiError::ReentrantSingleton`]
/// instead of deadlocking.
///
/// # Examples
///
/// ```
/// use saber_di::{FnProvider, Provider, ProviderRegistry, SingletonProvider};
/// use std::sync::Arc;
///
/// let singleton = SingletonProvider::new(Arc::new(FnProvider::new(|_| Ok(String::from("db")))));
/// let registry = ProviderRegistry::new();
///
/// let a = singleton.get(&registry).unwrap();
/// let b = singleton.get(&registry).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub struct SingletonProvider {
    delegate: Arc<dyn Provider>,
    instance: OnceCell<AnyArc>,
    // guards construction; the flag marks a construction in progress
    constructing: ReentrantMutex<Cell<bool>>,
}

impl SingletonProvider {
    pub fn new(delegate: Arc<dyn Provider>) -> Self {
        Self {
            delegate,
            instance: OnceCell::new(),
            constructing: ReentrantMutex::new(Cell::new(false)),
        }
    }

    /// The cached instance, if construction already happened.
    pub fn cached(&self) -> Option<AnyArc> {
        self.instance.get().cloned()
    }

    pub fn is_initialized(&self) -> bool {
        self.instance.get().is_some()
    }
}

impl Provider for SingletonProvider {
    fn get(&self, resolver: &dyn DependencyResolver) -> DiResult<AnyArc> {
        if let Some(instance) = self.instance.get() {
            return Ok(instance.clone());
        }

        let guard = self.constructing.lock();
        if let Some(instance) = self.instance.get() {
            return Ok(instance.clone());
        }
        if guard.replace(true) {
            return Err(DiError::ReentrantSingleton);
        }

        let construction = Construction(&*guard);
        let result = self.delegate.get(resolver);
        drop(construction);
        let instance = result?;
        trace!("Constructed singleton instance");
        // Only this thread can be here with an empty cell.
        Ok(self.instance.get_or_init(|| instance).clone())
    }
}

/// Clears the in-progress flag when construction ends, including by unwinding.
struct Construction<'a>(&'a Cell<bool>);

impl Drop for Construction<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
