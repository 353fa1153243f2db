//! Providers: factories producing one instance for a key.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::DiResult;
use crate::traits::DependencyResolver;

pub mod deferred;
pub mod singleton;

pub use deferred::{Lazy, TypedProvider};
pub use singleton::SingletonProvider;

/// Type-erased shared instance.
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// A factory capable of producing instances for one key.
///
/// The resolver handed to [`get`](Provider::get) is the one the request came
/// through, usually the active [`Injector`](crate::Injector). Providers resolve
/// their own dependencies against it, so the active injector flows down
/// explicitly instead of through ambient state.
///
/// Closures of the right shape are providers:
///
/// ```
/// use saber_di::{AnyArc, DependencyResolver, DiResult, Key, ProviderRegistry};
/// use std::sync::Arc;
///
/// let mut registry = ProviderRegistry::new();
/// registry
///     .register_provider(
///         Key::of_type::<u32>(),
///         Arc::new(|_: &dyn DependencyResolver| -> DiResult<AnyArc> { Ok(Arc::new(7u32)) }),
///     )
///     .unwrap();
/// ```
pub trait Provider: Send + Sync {
    fn get(&self, resolver: &dyn DependencyResolver) -> DiResult<AnyArc>;
}

impl<F> Provider for F
where
    F: Fn(&dyn DependencyResolver) -> DiResult<AnyArc> + Send + Sync,
{
    fn get(&self, resolver: &dyn DependencyResolver) -> DiResult<AnyArc> {
        self(resolver)
    }
}

/// Always returns the same pre-built instance.
#[derive(Clone)]
pub struct InstanceProvider {
    instance: AnyArc,
}

impl InstanceProvider {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            instance: Arc::new(value),
        }
    }

    pub fn from_arc(instance: AnyArc) -> Self {
        Self { instance }
    }
}

impl Provider for InstanceProvider {
    fn get(&self, _resolver: &dyn DependencyResolver) -> DiResult<AnyArc> {
        Ok(self.instance.clone())
    }
}

impl fmt::Debug for InstanceProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceProvider").finish_non_exhaustive()
    }
}

/// Builds a fresh `T` on every call.
pub struct FnProvider<T, F> {
    factory: F,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T, F> FnProvider<T, F> {
    pub fn new(factory: F) -> Self
    where
        T: Any + Send + Sync,
        F: Fn(&dyn DependencyResolver) -> DiResult<T> + Send + Sync,
    {
        Self {
            factory,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<T, F> Provider for FnProvider<T, F>
where
    T: Any + Send + Sync,
    F: Fn(&dyn DependencyResolver) -> DiResult<T> + Send + Sync,
{
    fn get(&self, resolver: &dyn DependencyResolver) -> DiResult<AnyArc> {
        Ok(Arc::new((self.factory)(resolver)?))
    }
}
