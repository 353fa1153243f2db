//! Qualifier values.
//!
//! A qualifier is an annotation instance: an annotation type plus a map of
//! member values. [`AnnotationValue`] is the comparable, hashable data form of
//! such an instance, so keys that carry qualifiers get structural identity
//! without synthesizing anything at runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::types::TypeRef;

/// Shape of an annotation: its type and the members it declares, with their
/// default values where present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationType {
    name: TypeRef,
    members: BTreeMap<Arc<str>, Option<MemberValue>>,
}

impl AnnotationType {
    pub fn new(name: impl Into<TypeRef>) -> Self {
        Self {
            name: name.into(),
            members: BTreeMap::new(),
        }
    }

    /// Declares a member without a default.
    pub fn member(mut self, name: &str) -> Self {
        self.members.insert(Arc::from(name), None);
        self
    }

    /// Declares a member with a default value.
    pub fn member_with_default(mut self, name: &str, default: MemberValue) -> Self {
        self.members.insert(Arc::from(name), Some(default));
        self
    }

    /// The standard `Named` qualifier with a single required `value` member.
    pub fn named() -> Arc<Self> {
        Arc::new(Self::new("saber_di::Named").member("value"))
    }

    pub fn name(&self) -> &TypeRef {
        &self.name
    }

    pub fn declares(&self, member: &str) -> bool {
        self.members.contains_key(member)
    }

    pub fn default_value(&self, member: &str) -> Option<&MemberValue> {
        self.members.get(member).and_then(Option::as_ref)
    }
}

/// A single annotation member value.
///
/// Floating point values compare by bit pattern, which keeps `Eq` and `Hash`
/// lawful (`NaN` equals itself, `0.0` and `-0.0` differ).
#[derive(Debug, Clone)]
pub enum MemberValue {
    Bool(bool),
    Byte(i8),
    Char(char),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Str(Arc<str>),
    Type(TypeRef),
    Enum { ty: TypeRef, constant: Arc<str> },
    Annotation(AnnotationValue),
    Array(ArrayValue),
}

impl MemberValue {
    pub fn str(value: &str) -> Self {
        MemberValue::Str(Arc::from(value))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MemberValue::Str(s) => Some(s),
            _ => None,
        }
    }

    fn discriminant(&self) -> u8 {
        match self {
            MemberValue::Bool(_) => 0,
            MemberValue::Byte(_) => 1,
            MemberValue::Char(_) => 2,
            MemberValue::Short(_) => 3,
            MemberValue::Int(_) => 4,
            MemberValue::Long(_) => 5,
            MemberValue::Float(_) => 6,
            MemberValue::Double(_) => 7,
            MemberValue::Str(_) => 8,
            MemberValue::Type(_) => 9,
            MemberValue::Enum { .. } => 10,
            MemberValue::Annotation(_) => 11,
            MemberValue::Array(_) => 12,
        }
    }
}

impl PartialEq for MemberValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MemberValue::Bool(a), MemberValue::Bool(b)) => a == b,
            (MemberValue::Byte(a), MemberValue::Byte(b)) => a == b,
            (MemberValue::Char(a), MemberValue::Char(b)) => a == b,
            (MemberValue::Short(a), MemberValue::Short(b)) => a == b,
            (MemberValue::Int(a), MemberValue::Int(b)) => a == b,
            (MemberValue::Long(a), MemberValue::Long(b)) => a == b,
            (MemberValue::Float(a), MemberValue::Float(b)) => a.to_bits() == b.to_bits(),
            (MemberValue::Double(a), MemberValue::Double(b)) => a.to_bits() == b.to_bits(),
            (MemberValue::Str(a), MemberValue::Str(b)) => a == b,
            (MemberValue::Type(a), MemberValue::Type(b)) => a == b,
            (
                MemberValue::Enum { ty: ta, constant: ca },
                MemberValue::Enum { ty: tb, constant: cb },
            ) => ta == tb && ca == cb,
            (MemberValue::Annotation(a), MemberValue::Annotation(b)) => a == b,
            (MemberValue::Array(a), MemberValue::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for MemberValue {}

impl Hash for MemberValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.discriminant().hash(state);
        match self {
            MemberValue::Bool(v) => v.hash(state),
            MemberValue::Byte(v) => v.hash(state),
            MemberValue::Char(v) => v.hash(state),
            MemberValue::Short(v) => v.hash(state),
            MemberValue::Int(v) => v.hash(state),
            MemberValue::Long(v) => v.hash(state),
            MemberValue::Float(v) => v.to_bits().hash(state),
            MemberValue::Double(v) => v.to_bits().hash(state),
            MemberValue::Str(v) => v.hash(state),
            MemberValue::Type(v) => v.hash(state),
            MemberValue::Enum { ty, constant } => {
                ty.hash(state);
                constant.hash(state);
            }
            MemberValue::Annotation(v) => v.hash(state),
            MemberValue::Array(v) => v.hash(state),
        }
    }
}

impl fmt::Display for MemberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberValue::Bool(v) => write!(f, "{}", v),
            MemberValue::Byte(v) => write!(f, "{}", v),
            MemberValue::Char(v) => write!(f, "'{}'", v),
            MemberValue::Short(v) => write!(f, "{}", v),
            MemberValue::Int(v) => write!(f, "{}", v),
            MemberValue::Long(v) => write!(f, "{}L", v),
            MemberValue::Float(v) => write!(f, "{}f", v),
            MemberValue::Double(v) => write!(f, "{}", v),
            MemberValue::Str(v) => write!(f, "{:?}", v),
            MemberValue::Type(v) => write!(f, "{}.class", v),
            MemberValue::Enum { ty, constant } => write!(f, "{}.{}", ty, constant),
            MemberValue::Annotation(v) => write!(f, "{}", v),
            MemberValue::Array(v) => {
                f.write_str("{")?;
                for i in 0..v.len() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if let Some(element) = v.element(i) {
                        write!(f, "{}", element)?;
                    }
                }
                f.write_str("}")
            }
        }
    }
}

/// Array member value.
///
/// Primitive element types keep their own spelling. The same logical array may
/// also arrive as `Object` holding boxed primitives; equality and hashing treat
/// both spellings alike.
#[derive(Debug, Clone)]
pub enum ArrayValue {
    Bool(Vec<bool>),
    Byte(Vec<i8>),
    Char(Vec<char>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Object(Vec<MemberValue>),
}

impl ArrayValue {
    pub fn len(&self) -> usize {
        match self {
            ArrayValue::Bool(v) => v.len(),
            ArrayValue::Byte(v) => v.len(),
            ArrayValue::Char(v) => v.len(),
            ArrayValue::Short(v) => v.len(),
            ArrayValue::Int(v) => v.len(),
            ArrayValue::Long(v) => v.len(),
            ArrayValue::Float(v) => v.len(),
            ArrayValue::Double(v) => v.len(),
            ArrayValue::Object(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element `index` as a standalone member value.
    pub fn element(&self, index: usize) -> Option<MemberValue> {
        match self {
            ArrayValue::Bool(v) => v.get(index).copied().map(MemberValue::Bool),
            ArrayValue::Byte(v) => v.get(index).copied().map(MemberValue::Byte),
            ArrayValue::Char(v) => v.get(index).copied().map(MemberValue::Char),
            ArrayValue::Short(v) => v.get(index).copied().map(MemberValue::Short),
            ArrayValue::Int(v) => v.get(index).copied().map(MemberValue::Int),
            ArrayValue::Long(v) => v.get(index).copied().map(MemberValue::Long),
            ArrayValue::Float(v) => v.get(index).copied().map(MemberValue::Float),
            ArrayValue::Double(v) => v.get(index).copied().map(MemberValue::Double),
            ArrayValue::Object(v) => v.get(index).cloned(),
        }
    }
}

impl PartialEq for ArrayValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ArrayValue::Bool(a), ArrayValue::Bool(b)) => a == b,
            (ArrayValue::Byte(a), ArrayValue::Byte(b)) => a == b,
            (ArrayValue::Char(a), ArrayValue::Char(b)) => a == b,
            (ArrayValue::Short(a), ArrayValue::Short(b)) => a == b,
            (ArrayValue::Int(a), ArrayValue::Int(b)) => a == b,
            (ArrayValue::Long(a), ArrayValue::Long(b)) => a == b,
            (ArrayValue::Float(a), ArrayValue::Float(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (ArrayValue::Double(a), ArrayValue::Double(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.to_bits() == y.to_bits())
            }
            (ArrayValue::Object(a), ArrayValue::Object(b)) => a == b,
            // Mixed spellings: compare element by element
            (a, b) => a.len() == b.len() && (0..a.len()).all(|i| a.element(i) == b.element(i)),
        }
    }
}

impl Eq for ArrayValue {}

impl Hash for ArrayValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Must agree across spellings, so hash the element view.
        self.len().hash(state);
        for i in 0..self.len() {
            self.element(i).hash(state);
        }
    }
}

/// An annotation instance used as a qualifier.
///
/// Identity is the annotation type name plus the effective member map, that is
/// the explicit values laid over the declared defaults.
///
/// # Examples
///
/// ```
/// use saber_di::{AnnotationType, AnnotationValue, ArrayValue, MemberValue};
///
/// let ty = std::sync::Arc::new(AnnotationType::new("Ports").member("value"));
/// let a = AnnotationValue::builder(ty.clone())
///     .member("value", MemberValue::Array(ArrayValue::Int(vec![42])))
///     .build()
///     .unwrap();
/// let b = AnnotationValue::builder(ty)
///     .member("value", MemberValue::Array(ArrayValue::Int(vec![42])))
///     .build()
///     .unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone)]
pub struct AnnotationValue {
    ty: Arc<AnnotationType>,
    explicit: BTreeMap<Arc<str>, MemberValue>,
}

impl AnnotationValue {
    pub fn builder(ty: Arc<AnnotationType>) -> AnnotationBuilder {
        AnnotationBuilder {
            ty,
            explicit: BTreeMap::new(),
            unknown: None,
        }
    }

    /// Annotation with every member taken from its defaults.
    pub fn marker(ty: Arc<AnnotationType>) -> Self {
        Self {
            ty,
            explicit: BTreeMap::new(),
        }
    }

    /// `@Named(value = name)`
    pub fn named(name: &str) -> Self {
        let mut explicit = BTreeMap::new();
        explicit.insert(Arc::from("value"), MemberValue::str(name));
        Self {
            ty: AnnotationType::named(),
            explicit,
        }
    }

    pub fn annotation_type(&self) -> &AnnotationType {
        &self.ty
    }

    /// Reads a member, falling back to its default.
    ///
    /// The returned value is a copy; arrays handed out here never alias the
    /// stored ones.
    pub fn get(&self, member: &str) -> DiResult<MemberValue> {
        if let Some(value) = self.explicit.get(member) {
            return Ok(value.clone());
        }
        match self.ty.members.get(member) {
            Some(Some(default)) => Ok(default.clone()),
            Some(None) => Err(DiError::IncompleteAnnotation {
                annotation: self.ty.name.to_string(),
                member: member.to_string(),
            }),
            None => Err(DiError::UnknownAnnotationMember {
                annotation: self.ty.name.to_string(),
                member: member.to_string(),
            }),
        }
    }

    /// Explicitly supplied members, in name order.
    pub fn explicit(&self) -> impl Iterator<Item = (&str, &MemberValue)> {
        self.explicit.iter().map(|(k, v)| (&**k, v))
    }

    fn effective(&self) -> BTreeMap<&str, Option<&MemberValue>> {
        let mut members: BTreeMap<&str, Option<&MemberValue>> = self
            .ty
            .members
            .iter()
            .map(|(name, default)| (&**name, default.as_ref()))
            .collect();
        for (name, value) in &self.explicit {
            members.insert(&**name, Some(value));
        }
        members
    }
}

impl PartialEq for AnnotationValue {
    fn eq(&self, other: &Self) -> bool {
        self.ty.name == other.ty.name && self.effective() == other.effective()
    }
}

impl Eq for AnnotationValue {}

impl Hash for AnnotationValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty.name.hash(state);
        for (name, value) in self.effective() {
            name.hash(state);
            value.hash(state);
        }
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.ty.name)?;
        if self.explicit.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, (name, value)) in self.explicit.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        f.write_str(")")
    }
}

/// Builder for [`AnnotationValue`] that checks member names against the
/// annotation type.
pub struct AnnotationBuilder {
    ty: Arc<AnnotationType>,
    explicit: BTreeMap<Arc<str>, MemberValue>,
    unknown: Option<String>,
}

impl AnnotationBuilder {
    pub fn member(mut self, name: &str, value: MemberValue) -> Self {
        if !self.ty.declares(name) && self.unknown.is_none() {
            self.unknown = Some(name.to_string());
        }
        self.explicit.insert(Arc::from(name), value);
        self
    }

    pub fn build(self) -> DiResult<AnnotationValue> {
        if let Some(member) = self.unknown {
            return Err(DiError::UnknownAnnotationMember {
                annotation: self.ty.name.to_string(),
                member,
            });
        }
        Ok(AnnotationValue {
            ty: self.ty,
            explicit: self.explicit,
        })
    }
}
