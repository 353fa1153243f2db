//! Analysis input: provider and injection-target descriptors.
//!
//! These are the structured facts an analysis front end extracts from
//! declarations. The core never parses anything itself; it consumes
//! descriptors and produces a validated graph.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::key::Key;
use crate::types::TypeRef;

/// Instance-reuse policy attached to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// One instance for the lifetime of the providing injector
    Singleton,
    /// A user-defined scope annotation
    Custom(TypeRef),
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Singleton => f.write_str("Singleton"),
            ScopeKind::Custom(ty) => write!(f, "{}", ty),
        }
    }
}

/// What kind of declaration a provider came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Method,
    Field,
    Constructor,
}

/// Where a provider was declared, used as the diagnostic location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderOrigin {
    pub module: Arc<str>,
    pub kind: ProviderKind,
    pub member: Arc<str>,
}

impl ProviderOrigin {
    pub fn method(module: &str, member: &str) -> Self {
        Self::new(module, ProviderKind::Method, member)
    }

    pub fn field(module: &str, member: &str) -> Self {
        Self::new(module, ProviderKind::Field, member)
    }

    pub fn constructor(class: &str) -> Self {
        Self::new(class, ProviderKind::Constructor, "<init>")
    }

    fn new(module: &str, kind: ProviderKind, member: &str) -> Self {
        Self {
            module: Arc::from(module),
            kind,
            member: Arc::from(member),
        }
    }
}

impl fmt::Display for ProviderOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.member)
    }
}

/// One way to produce an instance of a key.
///
/// A provider with no dependencies (a default constructor, a field) has an
/// empty dependency list, which is different from not being provided at all.
///
/// # Examples
///
/// ```
/// use saber_di::{Key, ProviderDescriptor, ProviderOrigin, ScopeKind, TypeRef};
///
/// let engine = Key::of(TypeRef::plain("Engine"));
/// let car = ProviderDescriptor::new(ProviderOrigin::method("CarModule", "provide_car"), Key::of(TypeRef::plain("Car")))
///     .depends_on(engine.clone())
///     .scoped(ScopeKind::Singleton);
///
/// assert_eq!(car.dependencies(), &[engine]);
/// assert!(car.is_singleton());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDescriptor {
    pub origin: ProviderOrigin,
    pub key: Key,
    pub dependencies: SmallVec<[Key; 4]>,
    pub scope: Option<ScopeKind>,
}

impl ProviderDescriptor {
    pub fn new(origin: ProviderOrigin, key: Key) -> Self {
        Self {
            origin,
            key,
            dependencies: SmallVec::new(),
            scope: None,
        }
    }

    pub fn depends_on(mut self, key: Key) -> Self {
        self.dependencies.push(key);
        self
    }

    pub fn with_dependencies(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.dependencies.extend(keys);
        self
    }

    pub fn scoped(mut self, scope: ScopeKind) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn dependencies(&self) -> &[Key] {
        &self.dependencies
    }

    pub fn is_singleton(&self) -> bool {
        self.scope == Some(ScopeKind::Singleton)
    }
}

/// A declaration unit holding provider declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub name: Arc<str>,
    pub providers: Vec<ProviderDescriptor>,
}

impl ModuleDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            providers: Vec::new(),
        }
    }

    pub fn provider(mut self, provider: ProviderDescriptor) -> Self {
        self.providers.push(provider);
        self
    }

    /// Adds a provider method declared on this module.
    pub fn provides(self, member: &str, key: Key, dependencies: impl IntoIterator<Item = Key>) -> Self {
        let origin = ProviderOrigin::method(&self.name, member);
        self.provider(ProviderDescriptor::new(origin, key).with_dependencies(dependencies))
    }
}

/// A place on a target where a dependency is injected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectionPoint {
    Constructor(Vec<Key>),
    Field { name: Arc<str>, key: Key },
    Method { name: Arc<str>, keys: Vec<Key> },
}

impl InjectionPoint {
    pub fn keys(&self) -> &[Key] {
        match self {
            InjectionPoint::Constructor(keys) => keys,
            InjectionPoint::Field { key, .. } => std::slice::from_ref(key),
            InjectionPoint::Method { keys, .. } => keys,
        }
    }

    fn member(&self) -> &str {
        match self {
            InjectionPoint::Constructor(_) => "<init>",
            InjectionPoint::Field { name, .. } | InjectionPoint::Method { name, .. } => name,
        }
    }
}

/// A class with members marked for injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionTargetDescriptor {
    pub target: TypeRef,
    pub injection_points: Vec<InjectionPoint>,
}

impl InjectionTargetDescriptor {
    pub fn new(target: TypeRef) -> Self {
        Self {
            target,
            injection_points: Vec::new(),
        }
    }

    pub fn field(mut self, name: &str, key: Key) -> Self {
        self.injection_points.push(InjectionPoint::Field {
            name: Arc::from(name),
            key,
        });
        self
    }

    pub fn method(mut self, name: &str, keys: Vec<Key>) -> Self {
        self.injection_points.push(InjectionPoint::Method {
            name: Arc::from(name),
            keys,
        });
        self
    }

    pub fn constructor(mut self, keys: Vec<Key>) -> Self {
        self.injection_points.push(InjectionPoint::Constructor(keys));
        self
    }

    /// Every key the target needs, paired with the member that needs it.
    pub fn requirements(&self) -> impl Iterator<Item = (String, &Key)> + '_ {
        self.injection_points.iter().flat_map(move |point| {
            let location = format!("{}::{}", self.target, point.member());
            point.keys().iter().map(move |key| (location.clone(), key))
        })
    }
}
