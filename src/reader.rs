//! # Repository Reader
//!
//! Loads a schema repository from a directory on disk.
//!
//! ## Process
//!
//! 1.  **Walk**: Traverse the directory with `walkdir`, entering only the
//!     recognised top-level definition directories (`objects`, `events`,
//!     `includes`, `profiles`, `extensions`). At the root only the special
//!     files are considered.
//! 2.  **Parse**: Parse every `.json` file into the shape its path implies.
//!     Parsing runs in parallel with `rayon`.
//! 3.  **Collect**: Gather the parsed files into a [`Repository`]. The first
//!     grammar or parse error aborts the load.

use std::fs;
use std::path::Path;

use log::debug;
use rayon::prelude::*;
use walkdir::{DirEntry, WalkDir};

use crate::definitions::DefinitionFile;
use crate::error::{Error, Result};
use crate::path::{REPO_DIRS, SPECIAL_FILES};
use crate::repository::Repository;

/// Whether a directory entry may hold definitions
fn is_definition_entry(entry: &DirEntry) -> bool {
    match entry.depth() {
        0 => true,
        1 => {
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_dir() {
                REPO_DIRS.contains(&name.as_ref())
            } else {
                SPECIAL_FILES.contains(&name.as_ref())
            }
        }
        _ => true,
    }
}

fn relative_path(root: &Path, file: &Path) -> Result<String> {
    let relative = file.strip_prefix(root).map_err(|_| {
        Error::structure(
            &file.to_string_lossy(),
            format!("not inside {}", root.display()),
        )
    })?;
    Ok(relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

/// Read every definition below `root` into a repository
pub fn read_repo(root: &Path) -> Result<Repository> {
    if !root.is_dir() {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("repository directory not found: {}", root.display()),
        )));
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(is_definition_entry)
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|e| e.to_str()) != Some("json") {
            debug!("Skipping non-definition file {}", entry.path().display());
            continue;
        }
        sources.push(relative_path(root, entry.path())?);
    }

    let files = sources
        .par_iter()
        .map(|relative| {
            let text = fs::read_to_string(root.join(relative))?;
            DefinitionFile::from_json(relative, &text)
        })
        .collect::<Result<Vec<_>>>()?;

    debug!("Read {} definitions from {}", files.len(), root.display());
    Ok(files.into_iter().collect())
}
