//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a small schema repository used across test files,
//! builders for in-memory and on-disk repositories, and helpers for running
//! the `ocsf-compile` binary.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let repo = RepoBuilder::core().build();
//!     // ... test code
//! }
//! ```

use std::path::Path;

use assert_fs::prelude::*;
use ocsf_compile::repository::Repository;

/// Re-export commonly used test dependencies for convenience.
#[allow(unused_imports)]
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    pub use super::fragments;
    pub use super::{RepoBuilder, TestFixture};
}

/// Definition files of a small core schema.
#[allow(dead_code)]
pub mod fragments {
    pub const VERSION: &str = r#"{"version": "1.1.0"}"#;

    pub const DICTIONARY: &str = r#"{
        "caption": "Attribute Dictionary",
        "attributes": {
            "name": {"caption": "Name", "type": "string_t"},
            "time": {"caption": "Event Time", "type": "timestamp_t", "requirement": "required"},
            "device": {"caption": "Device", "type": "device"},
            "activity_id": {"caption": "Activity ID", "type": "integer_t"},
            "category_uid": {"caption": "Category ID", "type": "integer_t"},
            "class_uid": {"caption": "Class ID", "type": "integer_t"},
            "type_uid": {"caption": "Type ID", "type": "long_t"}
        },
        "types": {"attributes": {
            "string_t": {"caption": "String"},
            "integer_t": {"caption": "Integer"},
            "long_t": {"caption": "Long"},
            "timestamp_t": {"caption": "Timestamp", "type": "long_t"},
            "datetime_t": {"caption": "Datetime", "type": "string_t"}
        }}
    }"#;

    pub const CATEGORIES: &str = r#"{
        "attributes": {
            "system": {"caption": "System Activity", "uid": 1},
            "network": {"caption": "Network Activity", "uid": 4}
        }
    }"#;

    pub const ENTITY: &str = r#"{
        "name": "_entity",
        "caption": "Entity",
        "attributes": {"name": {}}
    }"#;

    pub const DEVICE: &str = r#"{
        "name": "device",
        "caption": "Device",
        "extends": "_entity",
        "attributes": {"hostname": {"type": "string_t"}}
    }"#;

    pub const BASE_EVENT: &str = r#"{
        "name": "base_event",
        "caption": "Base Event",
        "attributes": {
            "time": {},
            "category_uid": {"enum": {"0": {"caption": "Uncategorized"}}},
            "class_uid": {"enum": {"0": {"caption": "Base Event"}}}
        }
    }"#;

    pub const FILE_ACTIVITY: &str = r#"{
        "name": "file_activity",
        "caption": "File Activity",
        "uid": 1,
        "extends": "base_event",
        "attributes": {
            "device": {},
            "activity_id": {"enum": {"1": {"caption": "Create"}, "2": {"caption": "Read"}}}
        }
    }"#;
}

/// Builder for in-memory repositories.
pub struct RepoBuilder {
    repo: Repository,
}

#[allow(dead_code)]
impl RepoBuilder {
    pub fn new() -> Self {
        Self {
            repo: Repository::new(),
        }
    }

    /// A repository holding the core fragments of [`fragments`].
    pub fn core() -> Self {
        Self::new()
            .file("version.json", fragments::VERSION)
            .file("dictionary.json", fragments::DICTIONARY)
            .file("categories.json", fragments::CATEGORIES)
            .file("objects/_entity.json", fragments::ENTITY)
            .file("objects/device.json", fragments::DEVICE)
            .file("events/base_event.json", fragments::BASE_EVENT)
            .file("events/system/file_activity.json", fragments::FILE_ACTIVITY)
    }

    /// Add a definition file; panics on a malformed path or document.
    pub fn file(mut self, path: &str, json: &str) -> Self {
        self.repo
            .add_json(path, json)
            .unwrap_or_else(|e| panic!("Failed to add {}: {}", path, e));
        self
    }

    pub fn build(self) -> Repository {
        self.repo
    }
}

impl Default for RepoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A test fixture that provides a temporary directory holding a repository.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = TestFixture::new().with_core();
///
/// fixture.command()
///     .arg("compile")
///     .arg(fixture.path())
///     .assert()
///     .success();
/// ```
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write the core fragments of [`fragments`] to disk.
    pub fn with_core(self) -> Self {
        self.with_file("version.json", fragments::VERSION)
            .with_file("dictionary.json", fragments::DICTIONARY)
            .with_file("categories.json", fragments::CATEGORIES)
            .with_file("objects/_entity.json", fragments::ENTITY)
            .with_file("objects/device.json", fragments::DEVICE)
            .with_file("events/base_event.json", fragments::BASE_EVENT)
            .with_file("events/system/file_activity.json", fragments::FILE_ACTIVITY)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Create a command for the `ocsf-compile` binary with colors off.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("ocsf-compile");
        cmd.current_dir(self.path()).env("NO_COLOR", "1").env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
