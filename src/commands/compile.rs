//! Compile command implementation
//!
//! Reads a schema repository from disk, runs every compilation phase and
//! writes the rendered schema as JSON, to stdout or to a file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;

use ocsf_compile::phases::orchestrator::Compilation;
use ocsf_compile::schema::Schema;

use super::SourceArgs;
use crate::output::Output;

/// Arguments for the compile command
#[derive(Args, Debug, Clone, Default)]
pub struct CompileArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Write the schema to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Emit compact JSON instead of pretty-printed JSON
    #[arg(long)]
    pub compact: bool,
}

/// Execute the compile command
pub fn execute(args: CompileArgs, out: Output) -> Result<()> {
    let start_time = Instant::now();

    let repo = args.source.read()?;
    let options = args.source.options()?;
    let mut compilation = Compilation::new(&repo, &options);
    let schema = compilation
        .build()
        .with_context(|| format!("Failed to compile {}", args.source.repo.display()))?;

    let json = to_json(schema, args.compact)?;
    let (classes, objects) = (schema.classes.len(), schema.objects.len());

    match &args.output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            let selection = compilation.selection();
            println!(
                "{} Compiled {} classes and {} objects into {}",
                out.marker("✅", "[OK]"),
                classes,
                objects,
                out.strong(&path.display().to_string())
            );
            println!(
                "   {} profiles: {}, extensions: {}",
                out.marker("📋", "-"),
                join_or_none(&selection.profiles),
                join_or_none(&selection.extensions)
            );
            println!(
                "   {} {} operations in {:.2?}",
                out.marker("⏱️", "-"),
                compilation.plan().len(),
                start_time.elapsed()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn to_json(schema: &Schema, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(schema)
    } else {
        serde_json::to_string_pretty(schema)
    };
    json.context("Failed to serialize schema")
}

fn join_or_none<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    let names: Vec<_> = names.into_iter().map(String::as_str).collect();
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}
