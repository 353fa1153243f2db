//! Error types for graph validation and runtime resolution.

use std::fmt;

use thiserror::Error;

use crate::key::Key;

/// Runtime resolution errors.
///
/// These fail fast at the call site. In a program whose graph went through
/// validation they indicate a wiring bug or code that bypassed the generated
/// wiring, never a user data problem.
///
/// # Examples
///
/// ```rust
/// use saber_di::{DiError, Key, ProviderRegistry, DependencyResolver};
///
/// let registry = ProviderRegistry::new();
/// match registry.get_instance(&Key::of_type::<String>()) {
///     Err(DiError::ProviderNotFound(key)) => assert_eq!(key, Key::of_type::<String>()),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum DiError {
    /// No provider in the registry or any of its ancestors
    #[error("no provider found for {0}")]
    ProviderNotFound(Key),
    /// A registry already holds a provider for the key
    #[error("provider for {0} is already registered")]
    DuplicateRegistration(Key),
    /// Annotation member read with neither an explicit value nor a default
    #[error("annotation {annotation} is missing a value for member '{member}'")]
    IncompleteAnnotation { annotation: String, member: String },
    /// Annotation member that the annotation type does not declare
    #[error("annotation {annotation} has no member '{member}'")]
    UnknownAnnotationMember { annotation: String, member: String },
    /// An interceptor produced no resolver or provider
    #[error("interceptor {0} returned no result")]
    NullInterceptorResult(&'static str),
    /// A resolved instance is not of the requested Rust type
    #[error("instance for {key} is not a {expected}")]
    TypeMismatch { key: Key, expected: &'static str },
    /// A deferred handle outlived the injector it was bound to
    #[error("injector for deferred {0} has been dropped")]
    InjectorDropped(Key),
    /// A singleton's delegate asked for the singleton it is constructing
    #[error("singleton requested itself while under construction")]
    ReentrantSingleton,
    /// A members injector failed for a target
    #[error("failed to inject members of {target}: {source}")]
    MembersInjection {
        target: &'static str,
        #[source]
        source: Box<DiError>,
    },
}

/// Result type for runtime DI operations
pub type DiResult<T> = Result<T, DiError>;

/// Kind of a build-time graph problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Two providers for the same key in one module
    DuplicateProvider,
    /// A key is depended upon but never provided
    UnresolvedDependency,
    /// A key takes part in a dependency cycle
    CyclicDependency,
    /// A provider's key mentions a wildcard or type variable
    NonConcreteProvider,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::DuplicateProvider => f.write_str("duplicate provider"),
            ErrorKind::UnresolvedDependency => f.write_str("unresolved dependency"),
            ErrorKind::CyclicDependency => f.write_str("cyclic dependency"),
            ErrorKind::NonConcreteProvider => f.write_str("non-concrete provided type"),
        }
    }
}

/// One accumulated problem found while building or validating a graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub key: Key,
    pub kind: ErrorKind,
    /// Where the problem was found, e.g. `AppModule::provide_engine`
    pub location: String,
}

impl Diagnostic {
    pub fn new(key: Key, kind: ErrorKind, location: impl Into<String>) -> Self {
        Self {
            key,
            kind,
            location: location.into(),
        }
    }

    pub fn message(&self) -> String {
        format!("{}: {}", self.kind, self.key)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message())
    }
}

/// Aggregate failure of a processing run.
///
/// Carries every diagnostic found in the pass; nothing downstream may run over
/// the graph that produced it.
#[derive(Debug, Clone, Error)]
#[error("{}", render_failure(.diagnostics, .omitted))]
pub struct ValidationFailure {
    pub diagnostics: Vec<Diagnostic>,
    /// Diagnostics dropped from the report by configuration
    pub omitted: usize,
}

impl ValidationFailure {
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    pub fn keys(&self, kind: ErrorKind) -> Vec<&Key> {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == kind)
            .map(|d| &d.key)
            .collect()
    }
}

fn render_failure(diagnostics: &[Diagnostic], omitted: &usize) -> String {
    let total = diagnostics.len() + omitted;
    let mut report = format!(
        "dependency graph is invalid ({} problem{})",
        total,
        if total == 1 { "" } else { "s" }
    );
    for diagnostic in diagnostics {
        report.push_str(&format!("\n  - {}", diagnostic));
    }
    if *omitted > 0 {
        report.push_str(&format!("\n  ... and {} more", omitted));
    }
    report
}
