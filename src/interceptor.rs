//! Interception of resolution, mainly for substituting test doubles.
//!
//! Two independent hooks exist. A [`DependencyResolverInterceptor`] wraps the
//! whole resolver an injector uses. A [`ProviderInterceptor`] sees each
//! provider lookup by key and may substitute a provider or pass the lookup
//! on through the [`ProviderChain`]. Both kinds run in the order they were
//! added: the first-added interceptor sees a request first.
//!
//! An interceptor that produces nothing is a configuration error
//! ([`DiError::NullInterceptorResult`]); it never falls through silently.

use std::sync::Arc;

use crate::component::Component;
use crate::error::{DiError, DiResult};
use crate::internal::AppendMap;
use crate::key::Key;
use crate::provider::{AnyArc, InstanceProvider, Provider};
use crate::registry::ProviderRegistry;
use crate::traits::DependencyResolver;

/// Wraps the resolver used by an injector.
///
/// Returning `None` fails injector construction with
/// [`DiError::NullInterceptorResult`].
///
/// # Examples
///
/// ```
/// use saber_di::{Injector, Key, OverrideInterceptor, ProviderRegistry, ResolverExt};
/// use std::sync::Arc;
///
/// let component = |registry: &mut ProviderRegistry| {
///     registry.register_instance(Key::of_type::<String>(), "Real".to_string())
/// };
///
/// let mut overrides = ProviderRegistry::new();
/// overrides.register_instance(Key::of_type::<String>(), "Fake".to_string()).unwrap();
///
/// let injector = Injector::builder()
///     .resolver_interceptor(Arc::new(OverrideInterceptor::new(overrides)))
///     .build(&component)
///     .unwrap();
/// assert_eq!(*injector.instance_of::<String>().unwrap(), "Fake");
///
/// let injector = Injector::builder().build(&component).unwrap();
/// assert_eq!(*injector.instance_of::<String>().unwrap(), "Real");
/// ```
pub trait DependencyResolverInterceptor: Send + Sync {
    fn intercept(&self, resolver: Arc<dyn DependencyResolver>) -> Option<Arc<dyn DependencyResolver>>;

    /// Name reported when the interceptor misbehaves.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Intercepts provider lookups key by key.
///
/// Either return a substitute provider or call [`ProviderChain::proceed`] to
/// continue with the next interceptor and finally the injector's resolver.
pub trait ProviderInterceptor: Send + Sync {
    fn intercept(&self, chain: &ProviderChain<'_>, key: &Key) -> DiResult<Option<Arc<dyn Provider>>>;

    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// The remainder of a provider interceptor chain.
pub struct ProviderChain<'a> {
    interceptors: &'a [Arc<dyn ProviderInterceptor>],
    resolver: &'a dyn DependencyResolver,
}

impl<'a> ProviderChain<'a> {
    pub(crate) fn new(interceptors: &'a [Arc<dyn ProviderInterceptor>], resolver: &'a dyn DependencyResolver) -> Self {
        Self { interceptors, resolver }
    }

    /// Hands the lookup to the next interceptor, or to the resolver at the end.
    ///
    /// A key nobody provides fails with [`DiError::ProviderNotFound`].
    pub fn proceed(&self, key: &Key) -> DiResult<Arc<dyn Provider>> {
        match self.interceptors.split_first() {
            Some((interceptor, rest)) => {
                let next = ProviderChain::new(rest, self.resolver);
                interceptor
                    .intercept(&next, key)?
                    .ok_or(DiError::NullInterceptorResult(interceptor.name()))
            }
            None => self.resolver.get_provider(key),
        }
    }

    /// The resolver at the end of the chain.
    pub fn resolver(&self) -> &dyn DependencyResolver {
        self.resolver
    }
}

/// Resolver interceptor that answers a fixed set of keys from its own
/// registry and delegates everything else.
pub struct OverrideInterceptor {
    overrides: Arc<ProviderRegistry>,
}

impl OverrideInterceptor {
    /// `overrides` should have no parent; lookups it misses go to the
    /// intercepted resolver.
    pub fn new(overrides: ProviderRegistry) -> Self {
        Self {
            overrides: Arc::new(overrides),
        }
    }

    /// Collects the overrides from a component.
    pub fn from_component<C: Component + ?Sized>(component: &C) -> DiResult<Self> {
        let mut overrides = ProviderRegistry::new();
        component.configure(&mut overrides)?;
        Ok(Self::new(overrides))
    }
}

impl DependencyResolverInterceptor for OverrideInterceptor {
    fn intercept(&self, resolver: Arc<dyn DependencyResolver>) -> Option<Arc<dyn DependencyResolver>> {
        Some(Arc::new(OverridingResolver {
            overrides: self.overrides.clone(),
            delegate: resolver,
        }))
    }
}

struct OverridingResolver {
    overrides: Arc<ProviderRegistry>,
    delegate: Arc<dyn DependencyResolver>,
}

impl DependencyResolver for OverridingResolver {
    fn find_provider(&self, key: &Key) -> DiResult<Option<Arc<dyn Provider>>> {
        match self.overrides.find_provider(key)? {
            Some(provider) => Ok(Some(provider)),
            None => self.delegate.find_provider(key),
        }
    }

    fn get_instance(&self, key: &Key) -> DiResult<AnyArc> {
        self.get_provider(key)?.get(self)
    }
}

/// Provider interceptor substituting providers for specific keys.
#[derive(Default)]
pub struct KeyOverrideInterceptor {
    providers: AppendMap<Key, Arc<dyn Provider>>,
}

impl KeyOverrideInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Substitutes `provider` for `key`. The first substitution for a key wins.
    pub fn with_provider(mut self, key: Key, provider: Arc<dyn Provider>) -> Self {
        let _ = self.providers.insert(key, provider);
        self
    }

    pub fn with_instance<T: std::any::Any + Send + Sync>(self, key: Key, value: T) -> Self {
        self.with_provider(key, Arc::new(InstanceProvider::new(value)))
    }
}

impl ProviderInterceptor for KeyOverrideInterceptor {
    fn intercept(&self, chain: &ProviderChain<'_>, key: &Key) -> DiResult<Option<Arc<dyn Provider>>> {
        match self.providers.get(key) {
            Some(provider) => Ok(Some(provider.clone())),
            None => chain.proceed(key).map(Some),
        }
    }
}
