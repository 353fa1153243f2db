//! Deferred dependencies: `Provider<T>` and `Lazy<T>` handles.
//!
//! A factory that depends on a deferred key does not receive an instance;
//! it receives a handle bound to the active [`Injector`] and resolves through
//! it later. Dependency edges to deferred keys are therefore excluded from
//! cycle detection.
//!
//! Handles do not keep their injector alive. A singleton holding a handle is
//! itself owned by the injector, so a strong reference would leak both. Once
//! the injector is gone, `get` fails with [`DiError::InjectorDropped`].

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::{DiError, DiResult};
use crate::injector::{Injector, WeakInjector};
use crate::key::Key;
use crate::traits::{DependencyResolver, ResolverExt};

/// Resolves a fresh instance of `T` on every [`get`](TypedProvider::get).
///
/// Whether the instance really is fresh depends on the provider behind the
/// key; a singleton-scoped key returns its cached instance.
pub struct TypedProvider<T> {
    injector: WeakInjector,
    key: Key,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypedProvider<T> {
    pub fn new(injector: &Injector, key: Key) -> Self {
        Self {
            injector: injector.downgrade(),
            key,
            _marker: PhantomData,
        }
    }

    /// Binds to the injector registered in `resolver` under the `Injector` key.
    pub fn from_resolver(resolver: &dyn DependencyResolver, key: Key) -> DiResult<Self> {
        let injector = resolver.instance_of::<Injector>()?;
        Ok(Self::new(&injector, key))
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn get(&self) -> DiResult<Arc<T>> {
        let injector = self
            .injector
            .upgrade()
            .ok_or_else(|| DiError::InjectorDropped(self.key.clone()))?;
        injector.instance::<T>(&self.key)
    }
}

impl<T> Clone for TypedProvider<T> {
    fn clone(&self) -> Self {
        Self {
            injector: self.injector.clone(),
            key: self.key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedProvider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedProvider").field("key", &self.key).finish()
    }
}

/// Resolves `T` once, on first access, then keeps returning that instance.
///
/// A failed resolution is not remembered; the next `get` tries again.
pub struct Lazy<T> {
    provider: TypedProvider<T>,
    value: OnceCell<Arc<T>>,
}

impl<T: Any + Send + Sync> Lazy<T> {
    pub fn new(injector: &Injector, key: Key) -> Self {
        Self {
            provider: TypedProvider::new(injector, key),
            value: OnceCell::new(),
        }
    }

    pub fn from_resolver(resolver: &dyn DependencyResolver, key: Key) -> DiResult<Self> {
        Ok(Self {
            provider: TypedProvider::from_resolver(resolver, key)?,
            value: OnceCell::new(),
        })
    }

    pub fn get(&self) -> DiResult<Arc<T>> {
        self.value.get_or_try_init(|| self.provider.get()).cloned()
    }

    pub fn is_resolved(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("key", &self.provider.key)
            .field("resolved", &self.value.get().is_some())
            .finish()
    }
}
