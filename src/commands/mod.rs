//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `ocsf-compile` command-line tool, one file per subcommand.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments, derived
//!   using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic by calling into the `ocsf_compile` library.
//!
//! Both commands read a repository and a selection the same way; that
//! shared part lives here.

pub mod compile;
pub mod plan;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use ocsf_compile::config::{self, CompilationOptions};
use ocsf_compile::reader;
use ocsf_compile::repository::Repository;

/// Repository location and the profiles and extensions to compile with
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Root directory of the schema repository
    #[arg(value_name = "REPO")]
    pub repo: PathBuf,

    /// YAML file with compilation options
    #[arg(short, long, value_name = "PATH", env = "OCSF_COMPILE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Profile to apply (repeatable; default: all profiles)
    #[arg(long = "profile", value_name = "NAME")]
    pub profiles: Vec<String>,

    /// Extension to merge (repeatable; default: all extensions)
    #[arg(long = "extension", value_name = "DIR")]
    pub extensions: Vec<String>,

    /// Profile to leave out (repeatable)
    #[arg(long = "ignore-profile", value_name = "NAME")]
    pub ignore_profiles: Vec<String>,

    /// Extension to leave out (repeatable)
    #[arg(long = "ignore-extension", value_name = "DIR")]
    pub ignore_extensions: Vec<String>,
}

impl SourceArgs {
    /// Options from the config file, overridden by the selection flags
    pub fn options(&self) -> Result<CompilationOptions> {
        let base = match &self.config {
            Some(path) => config::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => CompilationOptions::default(),
        };
        Ok(base.override_with(self.flag_options()))
    }

    fn flag_options(&self) -> CompilationOptions {
        let listed = |names: &Vec<String>| (!names.is_empty()).then(|| names.clone());
        CompilationOptions {
            profiles: listed(&self.profiles),
            extensions: listed(&self.extensions),
            ignore_profiles: self.ignore_profiles.clone(),
            ignore_extensions: self.ignore_extensions.clone(),
        }
    }

    pub fn read(&self) -> Result<Repository> {
        read_repository(&self.repo)
    }
}

fn read_repository(root: &Path) -> Result<Repository> {
    if !root.is_dir() {
        anyhow::bail!("Schema repository not found: {}", root.display());
    }
    reader::read_repo(root).with_context(|| format!("Failed to read {}", root.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("options.yaml");
        std::fs::write(&config_path, "profiles: [host]\nignoreExtensions: [win]\n").unwrap();

        let args = SourceArgs {
            repo: dir.path().to_path_buf(),
            config: Some(config_path),
            profiles: vec!["cloud".to_string()],
            ..Default::default()
        };

        let options = args.options().unwrap();
        assert_eq!(options.profiles, Some(vec!["cloud".to_string()]));
        assert_eq!(options.ignore_extensions, vec!["win".to_string()]);
        assert_eq!(options.extensions, None);
    }

    #[test]
    fn test_missing_config_is_reported() {
        let args = SourceArgs {
            config: Some(PathBuf::from("/nonexistent/options.yaml")),
            ..Default::default()
        };
        let err = args.options().unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn test_missing_repository_is_reported() {
        let args = SourceArgs {
            repo: PathBuf::from("/nonexistent/schema"),
            ..Default::default()
        };
        let err = args.read().unwrap_err();
        assert!(err.to_string().contains("Schema repository not found"));
    }
}
