//! Resolver traits for runtime key resolution.

use std::any::Any;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::Key;
use crate::provider::{AnyArc, Provider};
use crate::types::TypeRef;

/// Object-safe resolution interface.
///
/// Implemented by [`ProviderRegistry`](crate::ProviderRegistry), by
/// [`Injector`](crate::Injector) and by anything a
/// [`DependencyResolverInterceptor`](crate::DependencyResolverInterceptor)
/// wraps around them. Resolvers are shared across threads once active and are
/// never mutated through this trait.
pub trait DependencyResolver: Send + Sync {
    /// Looks a provider up, treating a miss as an answer.
    ///
    /// `Ok(None)` means "not provided here or by any ancestor". An `Err` is a
    /// lookup that failed, such as an interceptor producing nothing, and is
    /// never reported as a miss.
    fn find_provider(&self, key: &Key) -> DiResult<Option<Arc<dyn Provider>>>;

    /// Looks a provider up, failing with [`DiError::ProviderNotFound`].
    fn get_provider(&self, key: &Key) -> DiResult<Arc<dyn Provider>> {
        self.find_provider(key)?
            .ok_or_else(|| DiError::ProviderNotFound(key.clone()))
    }

    /// Resolves an instance: `get_provider(key)?.get(..)`.
    fn get_instance(&self, key: &Key) -> DiResult<AnyArc>;
}

/// Typed helpers over any [`DependencyResolver`], including trait objects.
///
/// # Examples
///
/// ```
/// use saber_di::{Key, ProviderRegistry, ResolverExt};
///
/// let mut registry = ProviderRegistry::new();
/// registry.register_instance(Key::of_type::<String>(), "hello".to_string()).unwrap();
///
/// let value = registry.instance_of::<String>().unwrap();
/// assert_eq!(*value, "hello");
/// ```
pub trait ResolverExt: DependencyResolver {
    /// Resolves `key` and downcasts the instance to `T`.
    fn instance<T: Any + Send + Sync>(&self, key: &Key) -> DiResult<Arc<T>> {
        let any = self.get_instance(key)?;
        downcast(any, key)
    }

    /// Resolves the unqualified key of the Rust type `T`.
    fn instance_of<T: Any + Send + Sync>(&self) -> DiResult<Arc<T>> {
        self.instance(&Key::of_type::<T>())
    }

    /// Resolves an unqualified key for an analyzed type.
    fn instance_for<T: Any + Send + Sync>(&self, ty: TypeRef) -> DiResult<Arc<T>> {
        self.instance(&Key::of(ty))
    }

    fn provider_of<T: ?Sized + 'static>(&self) -> DiResult<Arc<dyn Provider>> {
        self.get_provider(&Key::of_type::<T>())
    }
}

impl<R: DependencyResolver + ?Sized> ResolverExt for R {}

pub(crate) fn downcast<T: Any + Send + Sync>(any: AnyArc, key: &Key) -> DiResult<Arc<T>> {
    any.downcast::<T>().map_err(|_| DiError::TypeMismatch {
        key: key.clone(),
        expected: std::any::type_name::<T>(),
    })
}
