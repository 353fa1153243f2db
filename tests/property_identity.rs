/// Property-based tests for key identity
///
/// Keys built independently from the same description must be equal and hash
/// alike, whatever the description is.

use proptest::prelude::*;
use saber_di::{AnnotationValue, Key, TypeRef};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn type_ref() -> impl Strategy<Value = TypeRef> {
    let leaf = prop_oneof![
        "[A-Z][a-z]{0,8}".prop_map(TypeRef::plain),
        "[A-Z]".prop_map(TypeRef::variable),
    ];
    leaf.prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            (inner.clone(), prop::collection::vec(inner.clone(), 1..4))
                .prop_map(|(raw, args)| TypeRef::parameterized(raw, args)),
            inner.clone().prop_map(TypeRef::array),
            prop::collection::vec(inner.clone(), 0..3).prop_map(TypeRef::wildcard_extends),
            inner.prop_map(TypeRef::wildcard_super),
        ]
    })
}

proptest! {
    #[test]
    fn cloned_type_refs_give_equal_keys(ty in type_ref(), name in proptest::option::of("[a-z]{1,6}")) {
        let qualifier = name.as_deref().map(AnnotationValue::named);
        let a = Key::with_qualifier(ty.clone(), qualifier.clone());
        let b = Key::with_qualifier(ty, qualifier);

        prop_assert_eq!(&a, &b);
        prop_assert_eq!(hash_of(&a), hash_of(&b));
    }
}

proptest! {
    #[test]
    fn qualifier_always_changes_identity(ty in type_ref(), name in "[a-z]{1,6}") {
        let plain = Key::of(ty.clone());
        let qualified = Key::qualified(ty, AnnotationValue::named(&name));
        prop_assert_ne!(plain, qualified);
    }
}

proptest! {
    #[test]
    fn different_names_give_different_qualifiers(a in "[a-z]{1,6}", b in "[a-z]{1,6}") {
        prop_assume!(a != b);
        prop_assert_ne!(Key::named::<String>(&a), Key::named::<String>(&b));
    }
}

proptest! {
    #[test]
    fn display_is_stable_across_clones(ty in type_ref()) {
        let key = Key::of(ty.clone());
        prop_assert_eq!(key.to_string(), ty.to_string());
    }
}
