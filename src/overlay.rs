//! # Overlay Store
//!
//! A mutable, copy-on-first-access view over an immutable [`Repository`].
//!
//! Reads through [`Overlay::peek`] see the working copy when one exists and
//! the baseline otherwise, without copying anything. The first mutable access
//! to a path ([`Overlay::get_mut`]) clones the baseline definition into the
//! working set; from then on all reads and writes see the working copy. New
//! paths (extension copies) are created with [`Overlay::insert`] and listed
//! after the baseline paths, in creation order.
//!
//! The baseline is only ever borrowed, so it is observably unchanged after a
//! compilation.

use std::collections::BTreeMap;

use crate::definitions::{
    CategoriesDefn, Definition, DefinitionFile, DictionaryDefn, ExtensionDefn,
};
use crate::error::{Error, Result};
use crate::path::{self, RepoPath, CATEGORIES_FILE, DICTIONARY_FILE};
use crate::repository::Repository;

#[derive(Debug)]
pub struct Overlay<'r> {
    baseline: &'r Repository,
    working: BTreeMap<RepoPath, DefinitionFile>,
    created: Vec<RepoPath>,
}

impl<'r> Overlay<'r> {
    pub fn new(baseline: &'r Repository) -> Self {
        Self {
            baseline,
            working: BTreeMap::new(),
            created: Vec::new(),
        }
    }

    pub fn baseline(&self) -> &'r Repository {
        self.baseline
    }

    pub fn contains(&self, path: &str) -> bool {
        self.working.contains_key(path) || self.baseline.contains(path)
    }

    /// Current definition at `path`, without hydrating it
    pub fn peek(&self, path: &str) -> Option<&DefinitionFile> {
        self.working.get(path).or_else(|| self.baseline.get(path))
    }

    /// Current definition at `path`, or `MissingReference`
    pub fn get(&self, path: &str) -> Result<&DefinitionFile> {
        self.peek(path).ok_or_else(|| Error::MissingReference {
            path: path.to_string(),
            reference: path.to_string(),
        })
    }

    /// Whether `path` has been copied into (or created in) the working set
    pub fn is_hydrated(&self, path: &str) -> bool {
        self.working.contains_key(path)
    }

    /// Mutable definition at `path`, copying it from the baseline on first access
    pub fn get_mut(&mut self, path: &str) -> Result<&mut DefinitionFile> {
        if !self.working.contains_key(path) {
            let file = self
                .baseline
                .get(path)
                .ok_or_else(|| Error::MissingReference {
                    path: path.to_string(),
                    reference: path.to_string(),
                })?;
            self.working.insert(path.to_string(), file.clone());
        }
        self.working
            .get_mut(path)
            .ok_or_else(|| Error::MissingReference {
                path: path.to_string(),
                reference: path.to_string(),
            })
    }

    /// Store a definition, creating the path if it is new
    pub fn insert(&mut self, file: DefinitionFile) {
        if !self.contains(&file.path) {
            self.created.push(file.path.clone());
        }
        self.working.insert(file.path.clone(), file);
    }

    /// All visible paths: baseline paths in order, then created paths
    pub fn paths(&self) -> Vec<RepoPath> {
        self.baseline
            .paths()
            .cloned()
            .chain(self.created.iter().cloned())
            .collect()
    }

    /// All visible definitions, in [`Overlay::paths`] order
    pub fn files(&self) -> impl Iterator<Item = &DefinitionFile> {
        self.baseline
            .paths()
            .chain(self.created.iter())
            .filter_map(|p| self.peek(p))
    }

    /// The core category table, if present
    pub fn categories(&self) -> Option<&CategoriesDefn> {
        match self.peek(CATEGORIES_FILE).map(|f| &f.data) {
            Some(Definition::Categories(categories)) => Some(categories),
            _ => None,
        }
    }

    /// The core dictionary, if present
    pub fn dictionary(&self) -> Option<&DictionaryDefn> {
        match self.peek(DICTIONARY_FILE).map(|f| &f.data) {
            Some(Definition::Dictionary(dictionary)) => Some(dictionary),
            _ => None,
        }
    }

    /// Manifest of the extension in directory `dir`
    pub fn extension_manifest(&self, dir: &str) -> Option<&ExtensionDefn> {
        match self
            .peek(&path::extension_manifest_path(dir))
            .map(|f| &f.data)
        {
            Some(Definition::Extension(manifest)) => Some(manifest),
            _ => None,
        }
    }

    /// Manifest whose declared name is `name`
    pub fn extension_by_name(&self, name: &str) -> Option<&ExtensionDefn> {
        self.baseline.extensions().into_iter().find_map(|dir| {
            self.extension_manifest(&dir)
                .filter(|manifest| manifest.name.as_deref() == Some(name))
        })
    }

    /// Declared name of the extension in `dir`, falling back to the directory name
    pub fn extension_name(&self, dir: &str) -> String {
        self.extension_manifest(dir)
            .and_then(|m| m.name.clone())
            .unwrap_or_else(|| dir.to_string())
    }
}
