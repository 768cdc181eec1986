//! # OCSF Schema Compiler
//!
//! This library compiles a repository of layered schema fragments (objects,
//! events, includes, profiles, extensions, a shared dictionary and a category
//! table) into one fully resolved schema. It is used by the `ocsf-compile`
//! command-line tool but works equally well embedded in other programs.
//!
//! ## Quick Example
//!
//! ```
//! use ocsf_compile::config::CompilationOptions;
//! use ocsf_compile::phases::orchestrator::Compilation;
//! use ocsf_compile::repository::Repository;
//!
//! let mut repo = Repository::new();
//! repo.add_json("version.json", r#"{"version": "1.0.0"}"#).unwrap();
//! repo.add_json(
//!     "dictionary.json",
//!     r#"{"attributes": {"name": {"caption": "Name", "type": "string_t"}},
//!         "types": {"attributes": {"string_t": {"caption": "String"}}}}"#,
//! )
//! .unwrap();
//! repo.add_json("objects/user.json", r#"{"name": "user", "attributes": {"name": {}}}"#)
//!     .unwrap();
//!
//! let mut compilation = Compilation::new(&repo, &CompilationOptions::default());
//! let schema = compilation.build().unwrap();
//!
//! let name = &schema.objects["user"].attributes["name"];
//! assert_eq!(name.caption.as_deref(), Some("Name"));
//! assert_eq!(name.type_name.as_deref(), Some("String"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Repository (`repository`, `reader`)**: The immutable set of parsed
//!   definition files, keyed by repository path. `reader` loads one from disk.
//! - **Overlay (`overlay`)**: A copy-on-write view over the repository that
//!   every compilation step reads and mutates.
//! - **Merge Engine (`merge`)**: A recursive structural merge governed by a
//!   small field-update policy, reporting every changed field.
//! - **Operations and Planners (`operations`, `planners`)**: Planners inspect
//!   one file and propose operations; operations mutate one target file.
//! - **Phases (`phases`)**: Ordered rounds of planning, ordering and
//!   application, driven by the orchestrator.
//! - **Rendering (`render`, `schema`)**: Projection of the compiled overlay
//!   into the serializable [`schema::Schema`].
//!
//! ## Execution Flow
//!
//! [`phases::orchestrator::Compilation`] executes these steps:
//!
//! 1.  **Selection**: Resolve the compilation options into the active
//!     profiles and extensions.
//! 2.  **Phase 0**: Annotate provenance, resolve includes and inheritance,
//!     merge extensions and apply or exclude profiles.
//! 3.  **Phase 1**: Fix each event's category from its path.
//! 4.  **Phase 2**: Derive identifier enums and fill attributes from the
//!     dictionary.
//! 5.  **Phase 3**: Prefix extension identifiers, tag object attributes,
//!     add sibling and datetime attributes, and copy extension-only files
//!     into the core.
//! 6.  **Render**: Build the schema snapshot from the core files.

pub mod config;
pub mod definitions;
pub mod error;
pub mod merge;
pub mod operations;
pub mod overlay;
pub mod path;
pub mod phases;
pub mod planners;
pub mod reader;
pub mod render;
pub mod repository;
pub mod schema;

#[cfg(test)]
mod merge_proptest;
#[cfg(test)]
mod path_proptest;
