//! # saber-di
//!
//! Dependency graph validation and runtime injection for build-time wired
//! dependency injection.
//!
//! An analysis front end describes what each module provides and what each
//! injection target needs. This crate builds the global dependency graph from
//! those descriptors, validates it, and plans the wiring. Generated code then
//! resolves keys at runtime through [`Injector`]s chained parent to child.
//!
//! ## Features
//!
//! - **Structural identity**: keys are a [`TypeRef`] plus an optional qualifier
//!   [`AnnotationValue`], compared structurally
//! - **Build-time validation**: duplicate providers, unresolved dependencies and
//!   dependency cycles are all reported in a single pass
//! - **Deterministic wiring**: a topologically ordered [`WiringPlan`]
//! - **Scoped resolution**: child injectors shadow their parents, never conflict
//! - **Thread-safe singletons**: a delegate runs at most once across all threads
//! - **Interception**: deterministic substitution of test doubles
//!
//! ## Validating a graph
//!
//! ```rust
//! use saber_di::{ErrorKind, Key, ModuleDescriptor, Processor, ProcessorConfig, TypeRef};
//!
//! let a = Key::of(TypeRef::plain("A"));
//! let b = Key::of(TypeRef::plain("B"));
//!
//! let failure = Processor::new(ProcessorConfig::default())
//!     .add_module(
//!         ModuleDescriptor::new("AppModule")
//!             .provides("provide_a", a.clone(), [b.clone()])
//!             .provides("provide_b", b.clone(), [a.clone()]),
//!     )
//!     .process()
//!     .unwrap_err();
//!
//! assert_eq!(failure.keys(ErrorKind::CyclicDependency), vec![&a, &b]);
//! ```
//!
//! ## Resolving at runtime
//!
//! ```rust
//! use saber_di::{DependencyResolver, Injector, Key, ProviderRegistry, ResolverExt};
//! use std::sync::Arc;
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! let root = Injector::new(&|registry: &mut ProviderRegistry| {
//!     registry.register_singleton(Key::of_type::<Database>(), |_: &dyn DependencyResolver| {
//!         Ok(Database { url: "postgres://localhost".to_string() })
//!     })?;
//!     registry.register_factory(Key::of_type::<UserService>(), |resolver: &dyn DependencyResolver| {
//!         Ok(UserService { db: resolver.instance_of::<Database>()? })
//!     })
//! })
//! .unwrap();
//!
//! let child = root
//!     .create_child_injector(&|registry: &mut ProviderRegistry| {
//!         registry.register_instance(Key::named::<String>("request_id"), "req-1".to_string())
//!     })
//!     .unwrap();
//!
//! let users = child.instance_of::<UserService>().unwrap();
//! assert_eq!(users.db.url, "postgres://localhost");
//! assert!(Arc::ptr_eq(&users.db, &root.instance_of::<Database>().unwrap()));
//! assert_eq!(*child.instance::<String>(&Key::named::<String>("request_id")).unwrap(), "req-1");
//! ```

// Module declarations
pub mod annotation;
pub mod component;
pub mod config;
pub mod descriptors;
pub mod error;
pub mod graph;
pub mod injector;
pub mod interceptor;
pub mod key;
pub mod processor;
pub mod provider;
pub mod registry;
pub mod traits;
pub mod types;
pub mod validation;
pub mod wiring;

// Internal modules
mod internal;

// Re-export core types
pub use annotation::{AnnotationBuilder, AnnotationType, AnnotationValue, ArrayValue, MemberValue};
pub use component::{Component, Injectable};
pub use config::{ConfigError, ProcessorConfig};
pub use descriptors::{
    InjectionPoint, InjectionTargetDescriptor, ModuleDescriptor, ProviderDescriptor, ProviderKind,
    ProviderOrigin, ScopeKind,
};
pub use error::{Diagnostic, DiError, DiResult, ErrorKind, ValidationFailure};
pub use graph::{
    CycleSearcher, DependencyGraph, DependencyGraphBuilder, GraphNode, UnresolvedDependenciesSearcher,
    UnresolvedDependency,
};
pub use injector::{Injector, InjectorBuilder};
pub use interceptor::{
    DependencyResolverInterceptor, KeyOverrideInterceptor, OverrideInterceptor, ProviderChain, ProviderInterceptor,
};
pub use internal::AppendMap;
pub use key::{key_of_type, Key};
pub use processor::{ProcessingOutput, Processor};
pub use provider::{AnyArc, FnProvider, InstanceProvider, Lazy, Provider, SingletonProvider, TypedProvider};
pub use registry::ProviderRegistry;
pub use traits::{DependencyResolver, ResolverExt};
pub use types::TypeRef;
pub use validation::{GraphValidator, ValidatedGraph};
pub use wiring::{WiringInstruction, WiringPlan};
