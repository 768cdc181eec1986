//! Repository path grammar and path helpers
//!
//! Every definition in a repository is addressed by a relative, `/`-separated
//! path. The grammar is:
//!
//! - `dictionary.json`, `categories.json`, `version.json` at the root;
//! - `objects/…`, `events/…`, `includes/…`, `profiles/…` for core definitions;
//! - `extensions/<name>/extension.json` for an extension manifest, plus the
//!   same special files and directories nested under `extensions/<name>/`.
//!
//! Paths are plain strings so they can be used directly as map keys.

use crate::definitions::DefinitionKind;
use crate::error::{Error, Result};

/// Relative path of a definition inside a repository
pub type RepoPath = String;

pub const OBJECTS: &str = "objects";
pub const EVENTS: &str = "events";
pub const EXTENSIONS: &str = "extensions";
pub const INCLUDES: &str = "includes";
pub const PROFILES: &str = "profiles";

pub const DICTIONARY_FILE: &str = "dictionary.json";
pub const CATEGORIES_FILE: &str = "categories.json";
pub const VERSION_FILE: &str = "version.json";
pub const EXTENSION_FILE: &str = "extension.json";

/// Directories that may hold definitions
pub const REPO_DIRS: [&str; 5] = [OBJECTS, EVENTS, EXTENSIONS, INCLUDES, PROFILES];

/// Files with a fixed name and meaning
pub const SPECIAL_FILES: [&str; 4] = [DICTIONARY_FILE, CATEGORIES_FILE, VERSION_FILE, EXTENSION_FILE];

fn is_repo_dir(part: &str) -> bool {
    REPO_DIRS.contains(&part)
}

fn is_special_file(part: &str) -> bool {
    SPECIAL_FILES.contains(&part)
}

fn parts(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .collect()
}

/// Normalize a path and validate it against the repository grammar.
///
/// Leading components before the first recognised directory or special file
/// are dropped, so absolute host paths may be passed directly. Backslashes are
/// treated as separators.
pub fn sanitize_path(path: &str) -> Result<RepoPath> {
    let normalized = path.replace('\\', "/");
    let all = parts(&normalized);

    let start = all
        .iter()
        .position(|p| is_repo_dir(p) || is_special_file(p))
        .ok_or_else(|| Error::structure(path, "no recognised repository directory or file"))?;
    let parts = &all[start..];

    if parts[0] == EXTENSIONS {
        if parts.len() < 3 {
            return Err(Error::structure(path, "extension path is too short"));
        }
        if parts.len() > 3 && !is_repo_dir(parts[2]) {
            return Err(Error::structure(
                path,
                format!("`{}` is not a definition directory", parts[2]),
            ));
        }
        if parts.len() == 3 && !is_special_file(parts[2]) {
            return Err(Error::structure(
                path,
                format!("`{}` is not a recognised extension file", parts[2]),
            ));
        }
    }

    Ok(parts.join("/"))
}

/// Join path components, ignoring empty components.
pub fn as_path<S: AsRef<str>>(components: &[S]) -> RepoPath {
    components
        .iter()
        .map(AsRef::as_ref)
        .flat_map(parts)
        .collect::<Vec<_>>()
        .join("/")
}

/// Final component of a path
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// File name without its `.json` suffix
pub fn short_name(path: &str) -> &str {
    let name = file_name(path);
    name.strip_suffix(".json").unwrap_or(name)
}

/// Name of the extension directory owning `path`, if any
pub fn extension(path: &str) -> Option<&str> {
    let parts = parts(path);
    if parts.len() >= 2 && parts[0] == EXTENSIONS {
        // Index into the original string to hand back a borrowed slice
        path.split('/').filter(|p| !p.is_empty() && *p != ".").nth(1)
    } else {
        None
    }
}

/// The path with its `extensions/<name>/` prefix removed
pub fn extensionless(path: &str) -> RepoPath {
    let parts = parts(path);
    if parts.len() >= 2 && parts[0] == EXTENSIONS {
        parts[2..].join("/")
    } else {
        parts.join("/")
    }
}

/// Category directory of an event path (`events/<category>/<file>`)
pub fn category(path: &str) -> Option<String> {
    let stripped = extensionless(path);
    let parts = parts(&stripped);
    if parts.len() > 2 && parts[0] == EVENTS {
        Some(parts[1..parts.len() - 1].join("/"))
    } else {
        None
    }
}

/// Directory containing `path`, or `None` at the repository root
pub fn parent(path: &str) -> Option<RepoPath> {
    let parts = parts(path);
    if parts.is_empty() {
        None
    } else {
        Some(parts[..parts.len() - 1].join("/"))
    }
}

/// Enclosing directories of `path`, innermost first, ending with the root (`""`)
pub fn ancestors(path: &str) -> Vec<RepoPath> {
    let mut dirs = Vec::new();
    let mut current = parent(path);
    while let Some(dir) = current {
        current = parent(&dir);
        dirs.push(dir);
    }
    dirs
}

/// Path of the manifest for the extension directory `dir`
pub fn extension_manifest_path(dir: &str) -> RepoPath {
    as_path(&[EXTENSIONS, dir, EXTENSION_FILE])
}

/// Definition shape implied by a (sanitized) path
pub fn kind_of(path: &str) -> Result<DefinitionKind> {
    let stripped = extensionless(path);
    let parts = parts(&stripped);

    if parts.len() == 1 {
        return match parts[0] {
            DICTIONARY_FILE => Ok(DefinitionKind::Dictionary),
            CATEGORIES_FILE => Ok(DefinitionKind::Categories),
            VERSION_FILE => Ok(DefinitionKind::Version),
            EXTENSION_FILE if extension(path).is_some() => Ok(DefinitionKind::Extension),
            _ => Err(Error::structure(path, "unrecognised special file")),
        };
    }

    match parts.first() {
        Some(&OBJECTS) => Ok(DefinitionKind::Object),
        Some(&EVENTS) => Ok(DefinitionKind::Event),
        Some(&INCLUDES) => Ok(DefinitionKind::Include),
        Some(&PROFILES) => Ok(DefinitionKind::Profile),
        _ => Err(Error::structure(path, "path does not name a definition")),
    }
}
