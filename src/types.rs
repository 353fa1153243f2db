//! Structural type references.
//!
//! Analysis hands the core already-extracted type descriptors. The same logical
//! type may be described from several places (a provider's return type, a
//! constructor parameter, a generated proxy), so identity is structural: two
//! `TypeRef`s built independently compare and hash equal when their shape is
//! the same, recursing through every variant.

use std::fmt;
use std::sync::Arc;

/// Raw name of the deferred `Provider<T>` wrapper.
pub const PROVIDER_TYPE: &str = "saber_di::Provider";
/// Raw name of the deferred `Lazy<T>` wrapper.
pub const LAZY_TYPE: &str = "saber_di::Lazy";

/// A type as seen by the dependency graph.
///
/// # Examples
///
/// ```
/// use saber_di::TypeRef;
///
/// let a = TypeRef::parameterized(TypeRef::plain("List"), vec![TypeRef::plain("String")]);
/// let b = TypeRef::parameterized(TypeRef::plain("List"), vec![TypeRef::plain("String")]);
/// assert_eq!(a, b);
/// assert_eq!(a.to_string(), "List<String>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// A non-generic type, identified by its fully qualified name
    Plain(Arc<str>),
    /// A generic type applied to arguments, optionally nested in an owner type
    Parameterized {
        owner: Option<Box<TypeRef>>,
        raw: Box<TypeRef>,
        args: Vec<TypeRef>,
    },
    /// An array of the element type
    Array(Box<TypeRef>),
    /// `?`, `? extends A & B` or `? super C`
    ///
    /// An unbounded wildcard has empty bound lists.
    Wildcard {
        upper: Vec<TypeRef>,
        lower: Vec<TypeRef>,
    },
    /// A type variable such as `T`
    Variable(Arc<str>),
}

impl TypeRef {
    pub fn plain(name: impl Into<Arc<str>>) -> Self {
        TypeRef::Plain(name.into())
    }

    /// Plain type named after a Rust type.
    pub fn of<T: ?Sized + 'static>() -> Self {
        TypeRef::Plain(Arc::from(std::any::type_name::<T>()))
    }

    pub fn parameterized(raw: TypeRef, args: Vec<TypeRef>) -> Self {
        TypeRef::Parameterized {
            owner: None,
            raw: Box::new(raw),
            args,
        }
    }

    pub fn nested_parameterized(owner: TypeRef, raw: TypeRef, args: Vec<TypeRef>) -> Self {
        TypeRef::Parameterized {
            owner: Some(Box::new(owner)),
            raw: Box::new(raw),
            args,
        }
    }

    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array(Box::new(element))
    }

    pub fn wildcard() -> Self {
        TypeRef::Wildcard {
            upper: Vec::new(),
            lower: Vec::new(),
        }
    }

    pub fn wildcard_extends(upper: Vec<TypeRef>) -> Self {
        TypeRef::Wildcard {
            upper,
            lower: Vec::new(),
        }
    }

    pub fn wildcard_super(lower: TypeRef) -> Self {
        TypeRef::Wildcard {
            upper: Vec::new(),
            lower: vec![lower],
        }
    }

    pub fn variable(name: impl Into<Arc<str>>) -> Self {
        TypeRef::Variable(name.into())
    }

    /// `Provider<T>`: resolved on demand rather than at construction.
    pub fn provider_of(inner: TypeRef) -> Self {
        Self::parameterized(Self::plain(PROVIDER_TYPE), vec![inner])
    }

    /// `Lazy<T>`: resolved once, on first access.
    pub fn lazy_of(inner: TypeRef) -> Self {
        Self::parameterized(Self::plain(LAZY_TYPE), vec![inner])
    }

    /// The erased type: the raw type of a parameterization, itself otherwise.
    pub fn raw(&self) -> &TypeRef {
        match self {
            TypeRef::Parameterized { raw, .. } => raw.raw(),
            other => other,
        }
    }

    /// For `Provider<T>` and `Lazy<T>`, the wrapped `T`.
    pub fn deferred_argument(&self) -> Option<&TypeRef> {
        match self {
            TypeRef::Parameterized { owner: None, raw, args } if args.len() == 1 => match raw.as_ref() {
                TypeRef::Plain(name) if &**name == PROVIDER_TYPE || &**name == LAZY_TYPE => args.first(),
                _ => None,
            },
            _ => None,
        }
    }

    /// True when the type mentions no type variables or wildcards, i.e. it can
    /// be provided by a concrete factory.
    pub fn is_concrete(&self) -> bool {
        match self {
            TypeRef::Plain(_) => true,
            TypeRef::Parameterized { owner, raw, args } => {
                owner.as_deref().map_or(true, TypeRef::is_concrete)
                    && raw.is_concrete()
                    && args.iter().all(TypeRef::is_concrete)
            }
            TypeRef::Array(element) => element.is_concrete(),
            TypeRef::Wildcard { .. } | TypeRef::Variable(_) => false,
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, types: &[TypeRef], separator: &str) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write!(f, "{}", ty)?;
    }
    Ok(())
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Plain(name) | TypeRef::Variable(name) => f.write_str(name),
            TypeRef::Parameterized { owner, raw, args } => {
                if let Some(owner) = owner {
                    write!(f, "{}.", owner)?;
                }
                write!(f, "{}<", raw)?;
                write_joined(f, args, ", ")?;
                f.write_str(">")
            }
            TypeRef::Array(element) => write!(f, "{}[]", element),
            TypeRef::Wildcard { upper, lower } => {
                f.write_str("?")?;
                if !upper.is_empty() {
                    f.write_str(" extends ")?;
                    write_joined(f, upper, " & ")?;
                }
                if !lower.is_empty() {
                    f.write_str(" super ")?;
                    write_joined(f, lower, " & ")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for TypeRef {
    fn from(name: &str) -> Self {
        TypeRef::plain(name)
    }
}
