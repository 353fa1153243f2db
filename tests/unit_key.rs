/// Unit tests for key and qualifier identity

use saber_di::{AnnotationType, AnnotationValue, ArrayValue, DiError, Key, MemberValue, TypeRef};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn config_type() -> Arc<AnnotationType> {
    Arc::new(
        AnnotationType::new("app::Config")
            .member("name")
            .member_with_default("retries", MemberValue::Int(3))
            .member_with_default("ports", MemberValue::Array(ArrayValue::Int(vec![80]))),
    )
}

// ===== Key identity =====

#[test]
fn test_keys_from_independent_type_refs_are_equal() {
    let build = || TypeRef::parameterized(TypeRef::plain("List"), vec![TypeRef::plain("String")]);
    let a = Key::of(build());
    let b = Key::of(build());

    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
}

#[test]
fn test_qualified_and_unqualified_keys_differ() {
    let plain = Key::of(TypeRef::plain("Database"));
    let qualified = Key::qualified(TypeRef::plain("Database"), AnnotationValue::named("primary"));

    assert_ne!(plain, qualified);
    assert!(qualified.is_qualified());
    assert!(!plain.is_qualified());
}

#[test]
fn test_absent_and_none_qualifier_are_the_same_state() {
    let ty = TypeRef::plain("Database");
    assert_eq!(Key::of(ty.clone()), Key::with_qualifier(ty, None));
}

#[test]
fn test_keys_work_as_set_members() {
    let mut keys = HashSet::new();
    keys.insert(Key::named::<String>("a"));
    keys.insert(Key::named::<String>("a"));
    keys.insert(Key::named::<String>("b"));
    keys.insert(Key::of_type::<String>());
    assert_eq!(keys.len(), 3);
}

#[test]
fn test_deferred_key_unwraps_with_qualifier() {
    let qualifier = AnnotationValue::named("fast");
    let lazy = Key::qualified(TypeRef::lazy_of(TypeRef::plain("Engine")), qualifier.clone());

    assert_eq!(lazy.unwrap_deferred(), Some(Key::qualified(TypeRef::plain("Engine"), qualifier)));
    assert_eq!(Key::of(TypeRef::plain("Engine")).unwrap_deferred(), None);
}

// ===== Annotation values =====

#[test]
fn test_annotation_values_with_equal_arrays_are_equal() {
    let ty = config_type();
    let build = |port: i32| {
        AnnotationValue::builder(ty.clone())
            .member("name", MemberValue::str("svc"))
            .member("ports", MemberValue::Array(ArrayValue::Int(vec![port])))
            .build()
            .unwrap()
    };

    assert_eq!(build(42), build(42));
    assert_eq!(hash_of(&build(42)), hash_of(&build(42)));
    assert_ne!(build(42), build(43));
}

#[test]
fn test_primitive_and_boxed_arrays_compare_equal() {
    let ty = config_type();
    let primitive = AnnotationValue::builder(ty.clone())
        .member("name", MemberValue::str("svc"))
        .member("ports", MemberValue::Array(ArrayValue::Int(vec![1, 2])))
        .build()
        .unwrap();
    let boxed = AnnotationValue::builder(ty)
        .member("name", MemberValue::str("svc"))
        .member(
            "ports",
            MemberValue::Array(ArrayValue::Object(vec![MemberValue::Int(1), MemberValue::Int(2)])),
        )
        .build()
        .unwrap();

    assert_eq!(primitive, boxed);
    assert_eq!(hash_of(&primitive), hash_of(&boxed));
}

#[test]
fn test_explicit_default_does_not_change_identity() {
    let ty = config_type();
    let implicit = AnnotationValue::builder(ty.clone())
        .member("name", MemberValue::str("svc"))
        .build()
        .unwrap();
    let explicit = AnnotationValue::builder(ty)
        .member("name", MemberValue::str("svc"))
        .member("retries", MemberValue::Int(3))
        .build()
        .unwrap();

    assert_eq!(implicit, explicit);
    assert_eq!(hash_of(&implicit), hash_of(&explicit));
}

#[test]
fn test_reading_a_member_falls_back_to_default() {
    let value = AnnotationValue::builder(config_type())
        .member("name", MemberValue::str("svc"))
        .build()
        .unwrap();

    assert_eq!(value.get("retries").unwrap(), MemberValue::Int(3));
    assert_eq!(value.get("name").unwrap().as_str(), Some("svc"));
}

#[test]
fn test_reading_a_member_without_value_or_default_fails() {
    let value = AnnotationValue::marker(config_type());
    match value.get("name") {
        Err(DiError::IncompleteAnnotation { annotation, member }) => {
            assert_eq!(annotation, "app::Config");
            assert_eq!(member, "name");
        }
        other => panic!("expected an incomplete annotation, got {:?}", other),
    }
}

#[test]
fn test_unknown_members_are_rejected() {
    let result = AnnotationValue::builder(config_type())
        .member("colour", MemberValue::str("red"))
        .build();
    assert!(matches!(result, Err(DiError::UnknownAnnotationMember { .. })));

    let value = AnnotationValue::marker(config_type());
    assert!(matches!(value.get("colour"), Err(DiError::UnknownAnnotationMember { .. })));
}

#[test]
fn test_array_reads_are_copies() {
    let value = AnnotationValue::marker(config_type());
    let mut first = value.get("ports").unwrap();
    if let MemberValue::Array(ArrayValue::Int(ports)) = &mut first {
        ports.push(8080);
    }
    assert_eq!(value.get("ports").unwrap(), MemberValue::Array(ArrayValue::Int(vec![80])));
}

#[test]
fn test_float_members_compare_by_bits() {
    let ty = Arc::new(AnnotationType::new("app::Weight").member("value"));
    let build = |v: f64| {
        AnnotationValue::builder(ty.clone())
            .member("value", MemberValue::Double(v))
            .build()
            .unwrap()
    };

    assert_eq!(build(f64::NAN), build(f64::NAN));
    assert_ne!(build(0.0), build(-0.0));
}
