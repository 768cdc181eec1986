//! Resolution of path-like references between definitions
//!
//! Include directives and profile references name other files loosely: with
//! or without the `.json` suffix, relative to any enclosing directory, and
//! from inside an extension possibly meaning a core file.

use crate::overlay::Overlay;
use crate::path::{self, RepoPath, EXTENSIONS, PROFILES};

/// Locate the file an include directive refers to.
///
/// Candidate names are the subject as written and, without a `.json`
/// suffix, the subject plus `.json`. Candidates are tried in each enclosing
/// directory of `relative_to`, innermost first; for a file inside an
/// extension the enclosing directories of its core path follow. The first
/// existing path wins.
pub fn find_dependency(overlay: &Overlay<'_>, subject: &str, relative_to: &str) -> Option<RepoPath> {
    let mut names = vec![subject.to_string()];
    if !subject.ends_with(".json") {
        names.push(format!("{}.json", subject));
    }

    let mut dirs = path::ancestors(relative_to);
    if path::extension(relative_to).is_some() {
        dirs.extend(path::ancestors(&path::extensionless(relative_to)));
    }

    dirs.iter()
        .flat_map(|dir| names.iter().map(move |name| path::as_path(&[dir.as_str(), name.as_str()])))
        .find(|candidate| overlay.contains(candidate))
}

/// Locate the profile a `profiles` entry refers to.
///
/// A reference may be a path, a bare profile name, or `<extension>/<name>`.
/// The most specific match wins: the referencing file's own extension, then
/// the core `profiles/` directory, then the reference as written.
pub fn find_profile(overlay: &Overlay<'_>, reference: &str, relative_to: &str) -> Option<RepoPath> {
    let stem = path::short_name(reference);
    let file = format!("{}.json", stem);

    let mut search = Vec::new();
    if let Some(dir) = path::extension(relative_to) {
        search.push(path::as_path(&[EXTENSIONS, dir, PROFILES, file.as_str()]));
    }
    search.push(path::as_path(&[PROFILES, file.as_str()]));
    if let Some((dir, _)) = reference.split_once('/') {
        search.push(path::as_path(&[EXTENSIONS, dir, PROFILES, file.as_str()]));
    }
    search.push(reference.to_string());
    if !reference.ends_with(".json") {
        search.push(format!("{}.json", reference));
    }

    search.into_iter().find(|candidate| overlay.contains(candidate))
}
