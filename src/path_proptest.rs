//! Property-based tests for the repository path grammar.
//!
//! These tests use proptest to generate random repository paths and verify
//! that the grammar helpers agree with each other.

#[cfg(test)]
mod proptest_tests {
    use crate::definitions::DefinitionKind;
    use crate::path::{
        ancestors, category, extension, extensionless, kind_of, sanitize_path, short_name,
    };
    use proptest::prelude::*;

    fn segment() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,8}"
    }

    fn core_dir() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("objects"), Just("events"), Just("includes"), Just("profiles")]
    }

    proptest! {
        /// Property: sanitizing a sanitized path is a no-op
        #[test]
        fn sanitize_is_idempotent(
            host in proptest::collection::vec(segment(), 0..3),
            dir in core_dir(),
            name in segment(),
        ) {
            let raw = format!("/{}/{}/{}.json", host.join("/"), dir, name);
            let once = sanitize_path(&raw).unwrap();
            let twice = sanitize_path(&once).unwrap();
            prop_assert_eq!(once, twice);
        }

        /// Property: an extension path and its extensionless form agree on shape and name
        #[test]
        fn extension_paths_mirror_core(
            ext in segment(),
            dir in core_dir(),
            name in segment(),
        ) {
            let core = format!("{}/{}.json", dir, name);
            let ext_path = format!("extensions/{}/{}", ext, core);
            prop_assert!(sanitize_path(&ext_path).is_ok());
            prop_assert_eq!(extension(&ext_path), Some(ext.as_str()));
            prop_assert_eq!(extensionless(&ext_path), core.clone());
            prop_assert_eq!(kind_of(&ext_path).unwrap(), kind_of(&core).unwrap());
            prop_assert_eq!(short_name(&ext_path), name.as_str());
        }

        /// Property: events nested one directory deep always have a category
        #[test]
        fn nested_events_have_category(cat in segment(), name in segment()) {
            let path = format!("events/{}/{}.json", cat, name);
            prop_assert_eq!(kind_of(&path).unwrap(), DefinitionKind::Event);
            prop_assert_eq!(category(&path), Some(cat));
        }

        /// Property: ancestors always end at the repository root
        #[test]
        fn ancestors_end_at_root(parts in proptest::collection::vec(segment(), 1..6)) {
            let path = parts.join("/");
            let dirs = ancestors(&path);
            prop_assert_eq!(dirs.len(), parts.len());
            prop_assert_eq!(dirs.last().map(String::as_str), Some(""));
        }
    }
}
