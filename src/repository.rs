//! # Definition Repository
//!
//! The `Repository` is the immutable baseline of a compilation: every
//! definition file as it was read from disk (or built in memory), keyed by
//! its sanitized path. Compilation never mutates it; all changes go through
//! an [`Overlay`](crate::overlay::Overlay) layered on top.
//!
//! Iteration order is the lexical order of paths, which keeps planning and
//! rendering deterministic.

use std::collections::{BTreeMap, BTreeSet};

use crate::definitions::{Definition, DefinitionFile, DefinitionKind};
use crate::error::Result;
use crate::path::{self, RepoPath};

/// A set of definition files keyed by path
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Repository {
    files: BTreeMap<RepoPath, DefinitionFile>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition file, replacing any file at the same path
    pub fn insert(&mut self, file: DefinitionFile) {
        self.files.insert(file.path.clone(), file);
    }

    /// Add a definition after validating its path and shape
    pub fn add(&mut self, path: &str, data: Definition) -> Result<()> {
        self.insert(DefinitionFile::new(path, data)?);
        Ok(())
    }

    /// Parse JSON text and add it at `path`
    pub fn add_json(&mut self, path: &str, text: &str) -> Result<()> {
        self.insert(DefinitionFile::from_json(path, text)?);
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&DefinitionFile> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &RepoPath> {
        self.files.keys()
    }

    pub fn files(&self) -> impl Iterator<Item = &DefinitionFile> {
        self.files.values()
    }

    /// Directory names of all extensions with at least one file
    pub fn extensions(&self) -> BTreeSet<String> {
        self.files
            .keys()
            .filter_map(|p| path::extension(p))
            .map(str::to_string)
            .collect()
    }

    /// Names (file stems) of all profiles, core and extension-provided
    pub fn profiles(&self) -> BTreeSet<String> {
        self.files
            .values()
            .filter(|file| file.data.kind() == DefinitionKind::Profile)
            .map(|file| path::short_name(&file.path).to_string())
            .collect()
    }
}

impl FromIterator<DefinitionFile> for Repository {
    fn from_iter<I: IntoIterator<Item = DefinitionFile>>(iter: I) -> Self {
        let mut repo = Repository::new();
        for file in iter {
            repo.insert(file);
        }
        repo
    }
}
