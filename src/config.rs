//! # Compilation Options
//!
//! This module defines the options that select which optional parts of a
//! repository take part in a compilation, and the logic for loading them from
//! a YAML file.
//!
//! ## Key Components
//!
//! - **`CompilationOptions`**: The four recognised options. Each one is a list
//!   of names; an absent `profiles` or `extensions` list means "all of them".
//!
//! - **`Selection`**: Options resolved against a concrete [`Repository`] into
//!   the sets of active profile names and active extension directories.
//!
//! ## File Format
//!
//! ```yaml
//! profiles: [cloud, host, datetime]
//! ignoreExtensions: [windows]
//! ```
//!
//! Keys are accepted in camelCase and snake_case.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::repository::Repository;

/// Options that select profiles and extensions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompilationOptions {
    /// Profiles to apply. `None` applies every profile in the repository.
    #[serde(default)]
    pub profiles: Option<Vec<String>>,
    /// Extensions to merge. `None` merges every extension in the repository.
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
    /// Profiles to leave out, even when listed in `profiles`.
    #[serde(default, alias = "ignore_profiles")]
    pub ignore_profiles: Vec<String>,
    /// Extensions to leave out, even when listed in `extensions`.
    #[serde(default, alias = "ignore_extensions")]
    pub ignore_extensions: Vec<String>,
}

impl CompilationOptions {
    /// Overlay another set of options on top of this one.
    ///
    /// Lists given in `other` replace the corresponding lists here.
    pub fn override_with(mut self, other: CompilationOptions) -> Self {
        if other.profiles.is_some() {
            self.profiles = other.profiles;
        }
        if other.extensions.is_some() {
            self.extensions = other.extensions;
        }
        if !other.ignore_profiles.is_empty() {
            self.ignore_profiles = other.ignore_profiles;
        }
        if !other.ignore_extensions.is_empty() {
            self.ignore_extensions = other.ignore_extensions;
        }
        self
    }
}

/// Parse compilation options from YAML
pub fn parse(yaml_content: &str) -> Result<CompilationOptions> {
    if yaml_content.trim().is_empty() {
        return Ok(CompilationOptions::default());
    }
    serde_yaml::from_str(yaml_content).map_err(|e| Error::ConfigParse {
        message: e.to_string(),
        hint: Some(
            "Recognised keys are profiles, extensions, ignoreProfiles and ignoreExtensions"
                .to_string(),
        ),
    })
}

/// Load compilation options from a YAML file
pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<CompilationOptions> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

/// Active profiles and extensions of one compilation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub profiles: BTreeSet<String>,
    pub extensions: BTreeSet<String>,
}

impl Selection {
    /// Resolve options against the profiles and extensions `repo` provides
    pub fn resolve(options: &CompilationOptions, repo: &Repository) -> Self {
        fn pick(
            explicit: &Option<Vec<String>>,
            ignored: &[String],
            available: BTreeSet<String>,
        ) -> BTreeSet<String> {
            let chosen = match explicit {
                Some(names) => names.iter().cloned().collect(),
                None => available,
            };
            chosen
                .into_iter()
                .filter(|name| !ignored.contains(name))
                .collect()
        }

        Self {
            profiles: pick(&options.profiles, &options.ignore_profiles, repo.profiles()),
            extensions: pick(
                &options.extensions,
                &options.ignore_extensions,
                repo.extensions(),
            ),
        }
    }

    pub fn profile_selected(&self, name: &str) -> bool {
        self.profiles.contains(name)
    }

    pub fn extension_active(&self, dir: &str) -> bool {
        self.extensions.contains(dir)
    }
}
