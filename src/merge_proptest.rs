//! Property-based tests for the merge engine.
//!
//! These tests generate random attribute definitions and check the laws the
//! field-update policy promises: idempotence, gap filling, and that allow-
//! and deny-lists shield the fields they exclude.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeMap;

    use crate::definitions::{AttrDefn, AttrEntry, EnumMemberDefn, ObjectDefn};
    use crate::merge::{merge, FieldMatcher, FieldPath, MergeOptions};
    use proptest::prelude::*;

    fn word() -> impl Strategy<Value = String> {
        "[a-z]{1,6}"
    }

    fn enum_values() -> impl Strategy<Value = Option<BTreeMap<String, EnumMemberDefn>>> {
        proptest::option::of(proptest::collection::btree_map(
            "[0-9]{1,2}",
            proptest::option::of(word()).prop_map(|caption| EnumMemberDefn {
                caption,
                ..Default::default()
            }),
            0..4,
        ))
    }

    prop_compose! {
        fn attr_defn()(
            caption in proptest::option::of(word()),
            requirement in proptest::option::of(prop_oneof![
                Just("required".to_string()),
                Just("recommended".to_string()),
                Just("optional".to_string()),
            ]),
            type_ in proptest::option::of(word()),
            group in proptest::option::of(word()),
            is_array in proptest::option::of(any::<bool>()),
            enum_values in enum_values(),
        ) -> AttrDefn {
            AttrDefn {
                caption,
                requirement,
                type_,
                group,
                is_array,
                enum_values,
                ..Default::default()
            }
        }
    }

    fn object_defn() -> impl Strategy<Value = ObjectDefn> {
        proptest::collection::btree_map(word(), attr_defn(), 0..5).prop_map(|attrs| ObjectDefn {
            attributes: Some(
                attrs
                    .into_iter()
                    .map(|(name, attr)| (name, AttrEntry::Attribute(attr)))
                    .collect(),
            ),
            ..Default::default()
        })
    }

    fn without_caption(attr: &AttrDefn) -> AttrDefn {
        AttrDefn {
            caption: None,
            ..attr.clone()
        }
    }

    proptest! {
        /// Property: a second gap-fill merge of the same right side changes nothing
        #[test]
        fn gap_fill_is_idempotent(mut left in attr_defn(), right in attr_defn()) {
            let options = MergeOptions::gap_fill();
            merge(&mut left, &right, &options);
            let after_first = left.clone();

            let changes = merge(&mut left, &right, &options);
            prop_assert!(changes.is_empty());
            prop_assert_eq!(left, after_first);
        }

        /// Property: object merges are idempotent too, attribute maps included
        #[test]
        fn object_merge_is_idempotent(mut left in object_defn(), right in object_defn()) {
            let options = MergeOptions::gap_fill();
            merge(&mut left, &right, &options);
            prop_assert!(merge(&mut left, &right, &options).is_empty());
        }

        /// Property: an undefined leaf is filled from the right and reported once
        #[test]
        fn gap_fill_fills_undefined_leaves(mut left in attr_defn(), right in attr_defn()) {
            let original = left.clone();
            let changes = merge(&mut left, &right, &MergeOptions::gap_fill());

            let reported = |field: &str| {
                changes.iter().filter(|c| **c == FieldPath::new([field])).count()
            };
            if original.caption.is_none() && right.caption.is_some() {
                prop_assert_eq!(&left.caption, &right.caption);
                prop_assert_eq!(reported("caption"), 1);
            } else {
                prop_assert_eq!(&left.caption, &original.caption);
                prop_assert_eq!(reported("caption"), 0);
            }
            if original.requirement.is_none() && right.requirement.is_some() {
                prop_assert_eq!(&left.requirement, &right.requirement);
                prop_assert_eq!(reported("requirement"), 1);
            } else {
                prop_assert_eq!(&left.requirement, &original.requirement);
            }
        }

        /// Property: fields outside the allow-list survive even an overwrite
        #[test]
        fn allow_list_shields_other_fields(mut left in attr_defn(), right in attr_defn()) {
            let original = left.clone();
            let options = MergeOptions::overwrite().allow([FieldMatcher::name("requirement")]);
            let changes = merge(&mut left, &right, &options);

            prop_assert_eq!(&left.caption, &original.caption);
            prop_assert_eq!(&left.type_, &original.type_);
            prop_assert_eq!(&left.group, &original.group);
            prop_assert_eq!(&left.is_array, &original.is_array);
            prop_assert_eq!(&left.enum_values, &original.enum_values);
            prop_assert!(changes.iter().all(|c| *c == FieldPath::new(["requirement"])));
        }

        /// Property: ignored fields survive an overwrite, everything else is replaced
        #[test]
        fn deny_list_shields_ignored_fields(mut left in attr_defn(), right in attr_defn()) {
            let original = left.clone();
            let options = MergeOptions::overwrite().ignore([FieldMatcher::name("caption")]);
            merge(&mut left, &right, &options);

            prop_assert_eq!(&left.caption, &original.caption);
            if right.type_.is_some() {
                prop_assert_eq!(&left.type_, &right.type_);
            }
            if right.group.is_some() {
                prop_assert_eq!(&left.group, &right.group);
            }
        }

        /// Property: merging with existing_keys_only never adds attributes
        #[test]
        fn existing_keys_only_never_inserts(mut left in object_defn(), right in object_defn()) {
            let keys = |o: &ObjectDefn| -> Vec<String> {
                o.attributes.iter().flatten().map(|(k, _)| k.clone()).collect()
            };
            let before = keys(&left);
            let options = MergeOptions::gap_fill().existing_keys_only();
            merge(&mut left, &right, &options);

            let after = keys(&left);
            if !before.is_empty() {
                prop_assert_eq!(after, before);
            }
        }

        /// Property: stripping the caption first makes a deny-list merge equal a plain one
        #[test]
        fn deny_list_only_differs_on_ignored_field(left in attr_defn(), right in attr_defn()) {
            let options = MergeOptions::overwrite();
            let mut plain = without_caption(&left);
            merge(&mut plain, &without_caption(&right), &options);

            let mut denied = left.clone();
            merge(&mut denied, &right, &options.clone().ignore([FieldMatcher::name("caption")]));

            prop_assert_eq!(without_caption(&denied).requirement, plain.requirement);
            prop_assert_eq!(without_caption(&denied).type_, plain.type_);
            prop_assert_eq!(without_caption(&denied).group, plain.group);
        }
    }
}
