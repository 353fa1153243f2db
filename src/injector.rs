//! The per-component resolution facade.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::component::{Component, Injectable};
use crate::error::{DiError, DiResult};
use crate::interceptor::{DependencyResolverInterceptor, ProviderChain, ProviderInterceptor};
use crate::key::Key;
use crate::provider::{AnyArc, Lazy, Provider, TypedProvider};
use crate::registry::ProviderRegistry;
use crate::traits::DependencyResolver;

/// Runtime facade resolving keys to instances, chained parent to child.
///
/// An injector is built for a component: a fresh [`ProviderRegistry`] is
/// configured by the component, the registry is wrapped by the resolver
/// interceptors, and from then on the injector only answers queries. Every
/// injector registers itself under [`Key::injector`] so factories can ask
/// for the injector they are being resolved through.
///
/// Providers receive the injector a request came through as their resolver.
/// A provider registered in a parent but resolved through a child therefore
/// sees the child's providers for its own dependencies.
///
/// Cloning is cheap and yields a handle to the same injector.
///
/// # Examples
///
/// ```
/// use saber_di::{DependencyResolver, Injector, Key, ProviderRegistry, ResolverExt};
///
/// struct Engine(u32);
/// struct Car { engine: std::sync::Arc<Engine> }
///
/// let injector = Injector::builder()
///     .build(&|registry: &mut ProviderRegistry| {
///         registry.register_instance(Key::of_type::<Engine>(), Engine(300))?;
///         registry.register_factory(Key::of_type::<Car>(), |resolver: &dyn DependencyResolver| {
///             Ok(Car { engine: resolver.instance_of::<Engine>()? })
///         })
///     })
///     .unwrap();
///
/// let car = injector.instance_of::<Car>().unwrap();
/// assert_eq!(car.engine.0, 300);
/// ```
#[derive(Clone)]
pub struct Injector {
    inner: Arc<InjectorInner>,
}

struct InjectorInner {
    registry: Arc<ProviderRegistry>,
    // registry wrapped by the resolver interceptors
    resolver: Arc<dyn DependencyResolver>,
    parent: Option<Injector>,
    resolver_interceptors: Vec<Arc<dyn DependencyResolverInterceptor>>,
    provider_interceptors: Vec<Arc<dyn ProviderInterceptor>>,
}

/// Builder for root injectors.
///
/// Replaces any process-wide default: the application entry point owns the
/// builder and the injector it produces.
#[derive(Default)]
pub struct InjectorBuilder {
    resolver_interceptors: Vec<Arc<dyn DependencyResolverInterceptor>>,
    provider_interceptors: Vec<Arc<dyn ProviderInterceptor>>,
}

impl InjectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resolver interceptor. The first added sees requests first.
    ///
    /// Interceptors are listed outermost first: the last one added wraps the
    /// registry directly and each earlier one wraps the result of the one
    /// added after it. Wrapping runs from last to first, so calls run in the
    /// reverse of the wrapping order, first to last.
    ///
    /// ```
    /// # use saber_di::{DependencyResolver, DependencyResolverInterceptor, Injector, ProviderRegistry};
    /// # use std::sync::Arc;
    /// # struct Outer;
    /// # struct Inner;
    /// # impl DependencyResolverInterceptor for Outer {
    /// #     fn intercept(&self, r: Arc<dyn DependencyResolver>) -> Option<Arc<dyn DependencyResolver>> { Some(r) }
    /// # }
    /// # impl DependencyResolverInterceptor for Inner {
    /// #     fn intercept(&self, r: Arc<dyn DependencyResolver>) -> Option<Arc<dyn DependencyResolver>> { Some(r) }
    /// # }
    /// // requests reach Outer, then Inner, then the registry
    /// let injector = Injector::builder()
    ///     .resolver_interceptor(Arc::new(Outer))
    ///     .resolver_interceptor(Arc::new(Inner))
    ///     .build(&|_: &mut ProviderRegistry| -> saber_di::DiResult<()> { Ok(()) })
    ///     .unwrap();
    /// # let _ = injector;
    /// ```
    pub fn resolver_interceptor(mut self, interceptor: Arc<dyn DependencyResolverInterceptor>) -> Self {
        debug!(interceptor = interceptor.name(), "Adding resolver interceptor");
        self.resolver_interceptors.push(interceptor);
        self
    }

    /// Adds a provider interceptor. The first added sees lookups first.
    pub fn provider_interceptor(mut self, interceptor: Arc<dyn ProviderInterceptor>) -> Self {
        debug!(interceptor = interceptor.name(), "Adding provider interceptor");
        self.provider_interceptors.push(interceptor);
        self
    }

    /// Configures a root injector from `component`.
    pub fn build<C: Component + ?Sized>(self, component: &C) -> DiResult<Injector> {
        Injector::create(
            ProviderRegistry::new(),
            None,
            self.resolver_interceptors,
            self.provider_interceptors,
            component,
        )
    }
}

impl Injector {
    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::new()
    }

    /// Root injector without interceptors.
    pub fn new<C: Component + ?Sized>(component: &C) -> DiResult<Self> {
        Self::builder().build(component)
    }

    fn create<C: Component + ?Sized>(
        mut registry: ProviderRegistry,
        parent: Option<Injector>,
        resolver_interceptors: Vec<Arc<dyn DependencyResolverInterceptor>>,
        provider_interceptors: Vec<Arc<dyn ProviderInterceptor>>,
        component: &C,
    ) -> DiResult<Self> {
        let self_provider = Arc::new(SelfProvider::default());
        registry.register_provider(Key::injector(), self_provider.clone())?;
        component.configure(&mut registry)?;

        let registry = Arc::new(registry);
        let resolver = chain_resolvers(registry.clone(), &resolver_interceptors)?;
        debug!(
            providers = registry.len(),
            child = parent.is_some(),
            "Injector configured"
        );

        let inner = Arc::new(InjectorInner {
            registry,
            resolver,
            parent,
            resolver_interceptors,
            provider_interceptors,
        });
        // Set exactly once, right after construction.
        let _ = self_provider.injector.set(WeakInjector {
            inner: Arc::downgrade(&inner),
        });
        Ok(Self { inner })
    }

    /// Creates a child whose registry falls back to this injector.
    ///
    /// The child inherits both interceptor lists and re-applies them around
    /// its own registry. Keys the child's component registers shadow this
    /// injector's providers for the child only.
    pub fn create_child_injector<C: Component + ?Sized>(&self, component: &C) -> DiResult<Injector> {
        let registry = ProviderRegistry::with_parent(self.inner.resolver.clone());
        Self::create(
            registry,
            Some(self.clone()),
            self.inner.resolver_interceptors.clone(),
            self.inner.provider_interceptors.clone(),
            component,
        )
    }

    pub fn parent(&self) -> Option<&Injector> {
        self.inner.parent.as_ref()
    }

    /// The registry the component configured, without interceptors.
    pub fn registry(&self) -> &ProviderRegistry {
        &self.inner.registry
    }

    /// Fills in the members of an existing value.
    pub fn inject_members<T: Injectable>(&self, target: &mut T) -> DiResult<()> {
        target
            .inject_members(self)
            .map_err(|source| DiError::MembersInjection {
                target: std::any::type_name::<T>(),
                source: Box::new(source),
            })
    }

    /// Deferred handle resolving `key` on every call.
    pub fn provider<T: Any + Send + Sync>(&self, key: Key) -> TypedProvider<T> {
        TypedProvider::new(self, key)
    }

    /// Deferred handle resolving `key` once, on first access.
    pub fn lazy<T: Any + Send + Sync>(&self, key: Key) -> Lazy<T> {
        Lazy::new(self, key)
    }

    pub fn ptr_eq(&self, other: &Injector) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Handle that does not keep this injector alive.
    pub(crate) fn downgrade(&self) -> WeakInjector {
        WeakInjector {
            inner: Arc::downgrade(&self.inner),
        }
    }

    fn provider_chain(&self) -> ProviderChain<'_> {
        ProviderChain::new(&self.inner.provider_interceptors, &*self.inner.resolver)
    }
}

fn chain_resolvers(
    registry: Arc<ProviderRegistry>,
    interceptors: &[Arc<dyn DependencyResolverInterceptor>],
) -> DiResult<Arc<dyn DependencyResolver>> {
    // The last-added interceptor wraps first, leaving the first-added outermost.
    interceptors
        .iter()
        .rev()
        .try_fold(registry as Arc<dyn DependencyResolver>, |resolver, interceptor| {
            interceptor
                .intercept(resolver)
                .ok_or(DiError::NullInterceptorResult(interceptor.name()))
        })
}

impl DependencyResolver for Injector {
    fn find_provider(&self, key: &Key) -> DiResult<Option<Arc<dyn Provider>>> {
        if self.inner.provider_interceptors.is_empty() {
            return self.inner.resolver.find_provider(key);
        }
        match self.provider_chain().proceed(key) {
            Ok(provider) => Ok(Some(provider)),
            Err(DiError::ProviderNotFound(missing)) if missing == *key => Ok(None),
            Err(error) => {
                warn!(key = %key, error = %error, "Provider interceptor failed during lookup");
                Err(error)
            }
        }
    }

    fn get_provider(&self, key: &Key) -> DiResult<Arc<dyn Provider>> {
        self.provider_chain().proceed(key)
    }

    fn get_instance(&self, key: &Key) -> DiResult<AnyArc> {
        self.get_provider(key)?.get(self)
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("registry", &self.inner.registry)
            .field("has_parent", &self.inner.parent.is_some())
            .field("resolver_interceptors", &self.inner.resolver_interceptors.len())
            .field("provider_interceptors", &self.inner.provider_interceptors.len())
            .finish()
    }
}

/// Non-owning reference to an injector.
#[derive(Clone)]
pub(crate) struct WeakInjector {
    inner: Weak<InjectorInner>,
}

impl WeakInjector {
    pub(crate) fn upgrade(&self) -> Option<Injector> {
        self.inner.upgrade().map(|inner| Injector { inner })
    }
}

/// Provides the owning injector. Held weakly: the injector owns its registry.
#[derive(Default)]
struct SelfProvider {
    injector: OnceCell<WeakInjector>,
}

impl Provider for SelfProvider {
    fn get(&self, _resolver: &dyn DependencyResolver) -> DiResult<AnyArc> {
        self.injector
            .get()
            .and_then(WeakInjector::upgrade)
            .map(|injector| Arc::new(injector) as AnyArc)
            .ok_or_else(|| DiError::ProviderNotFound(Key::injector()))
    }
}
