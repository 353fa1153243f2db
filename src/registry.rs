//! Provider registry: the per-scope `Key -> Provider` map.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{DiError, DiResult};
use crate::internal::AppendMap;
use crate::key::Key;
use crate::provider::{AnyArc, FnProvider, InstanceProvider, Provider, SingletonProvider};
use crate::traits::DependencyResolver;

/// Write-once map from keys to providers, chained to an optional parent.
///
/// Lookups are local first, then the parent. Registering a key the parent
/// already provides shadows the parent's provider for this registry and
/// anything chained below it; it never conflicts. Registering a key twice in
/// the same registry fails with [`DiError::DuplicateRegistration`].
///
/// Registration takes `&mut self`. Once a registry is handed to an
/// [`Injector`](crate::Injector) it is shared behind an `Arc` and can no
/// longer change, so concurrent lookups need no locking.
///
/// # Examples
///
/// ```
/// use saber_di::{Key, ProviderRegistry, ResolverExt};
/// use std::sync::Arc;
///
/// let mut parent = ProviderRegistry::new();
/// parent.register_instance(Key::of_type::<String>(), "Parent".to_string()).unwrap();
/// let parent = Arc::new(parent);
///
/// let mut child = ProviderRegistry::with_parent(parent.clone());
/// assert_eq!(*child.instance_of::<String>().unwrap(), "Parent");
///
/// child.register_instance(Key::of_type::<String>(), "Child".to_string()).unwrap();
/// assert_eq!(*child.instance_of::<String>().unwrap(), "Child");
/// assert_eq!(*parent.instance_of::<String>().unwrap(), "Parent");
/// ```
#[derive(Default)]
pub struct ProviderRegistry {
    providers: AppendMap<Key, Arc<dyn Provider>>,
    parent: Option<Arc<dyn DependencyResolver>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that falls back to `parent` for keys it does not hold.
    pub fn with_parent(parent: Arc<dyn DependencyResolver>) -> Self {
        Self {
            providers: AppendMap::new(),
            parent: Some(parent),
        }
    }

    pub fn parent(&self) -> Option<&Arc<dyn DependencyResolver>> {
        self.parent.as_ref()
    }

    /// Registers `provider` for `key`.
    ///
    /// Only this registry is checked for duplicates; the parent chain is not.
    pub fn register_provider(&mut self, key: Key, provider: Arc<dyn Provider>) -> DiResult<()> {
        if let Some(parent) = &self.parent {
            if let Ok(Some(_)) = parent.find_provider(&key) {
                debug!(key = %key, "Registration shadows a parent provider");
            }
        }
        match self.providers.insert(key, provider) {
            Ok(()) => Ok(()),
            Err((key, _)) => Err(DiError::DuplicateRegistration(key)),
        }
    }

    /// Registers a pre-built instance.
    pub fn register_instance<T: Any + Send + Sync>(&mut self, key: Key, value: T) -> DiResult<()> {
        self.register_provider(key, Arc::new(InstanceProvider::new(value)))
    }

    /// Registers a factory invoked on every resolution.
    pub fn register_factory<T, F>(&mut self, key: Key, factory: F) -> DiResult<()>
    where
        T: Any + Send + Sync,
        F: Fn(&dyn DependencyResolver) -> DiResult<T> + Send + Sync + 'static,
    {
        self.register_provider(key, Arc::new(FnProvider::new(factory)))
    }

    /// Registers a factory invoked at most once; its result is shared.
    pub fn register_singleton<T, F>(&mut self, key: Key, factory: F) -> DiResult<()>
    where
        T: Any + Send + Sync,
        F: Fn(&dyn DependencyResolver) -> DiResult<T> + Send + Sync + 'static,
    {
        let delegate: Arc<dyn Provider> = Arc::new(FnProvider::new(factory));
        self.register_provider(key, Arc::new(SingletonProvider::new(delegate)))
    }

    /// True when this registry itself, ignoring the parent, holds `key`.
    pub fn contains_local(&self, key: &Key) -> bool {
        self.providers.contains_key(key)
    }

    /// Locally registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.providers.keys()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl DependencyResolver for ProviderRegistry {
    fn find_provider(&self, key: &Key) -> DiResult<Option<Arc<dyn Provider>>> {
        match (self.providers.get(key), &self.parent) {
            (Some(provider), _) => Ok(Some(provider.clone())),
            (None, Some(parent)) => parent.find_provider(key),
            (None, None) => Ok(None),
        }
    }

    fn get_instance(&self, key: &Key) -> DiResult<AnyArc> {
        self.get_provider(key)?.get(self)
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("keys", &self.providers.keys().collect::<Vec<_>>())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}
