//! Dependency keys.

use std::fmt;
use std::sync::Arc;

use crate::annotation::AnnotationValue;
use crate::types::TypeRef;

/// Identity of a dependency: a type plus an optional qualifier.
///
/// Keys are the unit of lookup everywhere, in the dependency graph and in the
/// provider registries. Equality and hashing are structural over both halves,
/// so keys describing the same dependency from different code paths are
/// interchangeable. A qualified key never matches the unqualified key of the
/// same type.
///
/// Cloning is cheap; the contents are shared.
///
/// # Examples
///
/// ```rust
/// use saber_di::{AnnotationValue, Key, TypeRef};
///
/// let plain = Key::of(TypeRef::plain("Database"));
/// let primary = Key::qualified(TypeRef::plain("Database"), AnnotationValue::named("primary"));
///
/// assert_eq!(plain, Key::of(TypeRef::plain("Database")));
/// assert_ne!(plain, primary);
/// assert_eq!(primary.to_string(), "@saber_di::Named(value=\"primary\") Database");
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Key {
    inner: Arc<KeyInner>,
}

#[derive(PartialEq, Eq, Hash)]
struct KeyInner {
    ty: TypeRef,
    qualifier: Option<AnnotationValue>,
}

impl Key {
    /// Unqualified key for a type.
    pub fn of(ty: TypeRef) -> Self {
        Self::with_qualifier(ty, None)
    }

    pub fn qualified(ty: TypeRef, qualifier: AnnotationValue) -> Self {
        Self::with_qualifier(ty, Some(qualifier))
    }

    /// `None` and "no qualifier" are the same state.
    pub fn with_qualifier(ty: TypeRef, qualifier: Option<AnnotationValue>) -> Self {
        Self {
            inner: Arc::new(KeyInner { ty, qualifier }),
        }
    }

    /// Unqualified key for a Rust type.
    #[inline]
    pub fn of_type<T: ?Sized + 'static>() -> Self {
        Self::of(TypeRef::of::<T>())
    }

    /// Key for a Rust type qualified with `@Named(value = name)`.
    pub fn named<T: ?Sized + 'static>(name: &str) -> Self {
        Self::qualified(TypeRef::of::<T>(), AnnotationValue::named(name))
    }

    /// Key every [`Injector`](crate::Injector) provides for itself.
    ///
    /// Dependency graphs treat it as provided with no dependencies.
    pub fn injector() -> Self {
        Self::of_type::<crate::injector::Injector>()
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.inner.ty
    }

    pub fn qualifier(&self) -> Option<&AnnotationValue> {
        self.inner.qualifier.as_ref()
    }

    pub fn is_qualified(&self) -> bool {
        self.inner.qualifier.is_some()
    }

    /// For `Provider<T>` and `Lazy<T>` keys, the key of `T` with the same
    /// qualifier.
    pub fn unwrap_deferred(&self) -> Option<Key> {
        self.inner
            .ty
            .deferred_argument()
            .map(|inner| Key::with_qualifier(inner.clone(), self.inner.qualifier.clone()))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.qualifier {
            Some(qualifier) => write!(f, "{} {}", qualifier, self.inner.ty),
            None => write!(f, "{}", self.inner.ty),
        }
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key({})", self)
    }
}

impl From<TypeRef> for Key {
    fn from(ty: TypeRef) -> Self {
        Key::of(ty)
    }
}

// Helper function for creating type keys
#[inline(always)]
pub fn key_of_type<T: 'static>() -> Key {
    Key::of_type::<T>()
}
