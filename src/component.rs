//! Components and injection targets: the user-facing wiring seams.

use crate::error::DiResult;
use crate::registry::ProviderRegistry;
use crate::traits::DependencyResolver;

/// A declaration unit that registers providers into an injector's registry.
///
/// Closures taking `&mut ProviderRegistry` are components, which is the usual
/// way to write one in tests.
pub trait Component {
    fn configure(&self, registry: &mut ProviderRegistry) -> DiResult<()>;
}

impl<F> Component for F
where
    F: Fn(&mut ProviderRegistry) -> DiResult<()>,
{
    fn configure(&self, registry: &mut ProviderRegistry) -> DiResult<()> {
        self(registry)
    }
}

/// A value with members filled in after construction.
///
/// # Examples
///
/// ```
/// use saber_di::{DependencyResolver, DiResult, Injectable, Injector, Key, ProviderRegistry, ResolverExt};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Screen {
///     title: Option<Arc<String>>,
/// }
///
/// impl Injectable for Screen {
///     fn inject_members(&mut self, resolver: &dyn DependencyResolver) -> DiResult<()> {
///         self.title = Some(resolver.instance_of::<String>()?);
///         Ok(())
///     }
/// }
///
/// let injector = Injector::builder()
///     .build(&|registry: &mut ProviderRegistry| {
///         registry.register_instance(Key::of_type::<String>(), "Home".to_string())
///     })
///     .unwrap();
///
/// let mut screen = Screen::default();
/// injector.inject_members(&mut screen).unwrap();
/// assert_eq!(screen.title.as_deref().map(String::as_str), Some("Home"));
/// ```
pub trait Injectable {
    fn inject_members(&mut self, resolver: &dyn DependencyResolver) -> DiResult<()>;
}
