//! Plan command implementation
//!
//! This module implements the `plan` subcommand, which compiles a schema
//! repository and displays the operations every phase applied as a tree:
//!
//! ```text
//! schema
//! ├─ phase 0 (2 operations)
//! │  ├─ annotate objects/device.json (3 changes)
//! │  └─ extends objects/device.json <- objects/_entity.json (4 changes)
//! └─ phase 1 (0 operations)
//! ```
//!
//! `--target` narrows the listing to operations whose target matches a glob.

use std::borrow::Cow;
use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use ptree::{print_tree, TreeItem};

use ocsf_compile::phases::orchestrator::{Compilation, Mutation, PhaseRecord};

use super::SourceArgs;
use crate::output::Output;

/// Arguments for the plan command
#[derive(Args, Debug, Clone, Default)]
pub struct PlanArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only list operations whose target matches this glob
    #[arg(short, long, value_name = "PATTERN")]
    pub target: Option<String>,
}

/// Execute the plan command
pub fn execute(args: PlanArgs, out: Output) -> Result<()> {
    let filter = args
        .target
        .as_deref()
        .map(glob::Pattern::new)
        .transpose()
        .context("Invalid --target pattern")?;

    let repo = args.source.read()?;
    let options = args.source.options()?;
    let mut compilation = Compilation::new(&repo, &options);
    let records = compilation
        .compile()
        .with_context(|| format!("Failed to compile {}", args.source.repo.display()))?;

    let keep = |m: &Mutation| filter.as_ref().is_none_or(|p| p.matches(&m.operation.target));
    let root = build_tree(
        &args.source.repo.display().to_string(),
        records,
        keep,
        &out,
    );
    print_tree(&root).map_err(|e| anyhow::anyhow!("Failed to display plan: {}", e))?;

    Ok(())
}

/// Build the plan tree: one node per phase, one leaf per kept operation
fn build_tree(
    label: &str,
    records: &[PhaseRecord],
    keep: impl Fn(&Mutation) -> bool,
    out: &Output,
) -> TreeNode {
    let children = records
        .iter()
        .map(|record| {
            let operations: Vec<_> = record
                .applied
                .iter()
                .filter(|m| keep(m))
                .map(|m| TreeNode::leaf(operation_label(m, out)))
                .collect();
            let noun = if operations.len() == 1 { "operation" } else { "operations" };
            TreeNode {
                label: format!(
                    "{} ({} {})",
                    out.strong(&format!("phase {}", record.number)),
                    operations.len(),
                    noun
                ),
                children: operations,
            }
        })
        .collect();

    TreeNode {
        label: label.to_string(),
        children,
    }
}

fn operation_label(mutation: &Mutation, out: &Output) -> String {
    let count = mutation.changes.len();
    let noun = if count == 1 { "change" } else { "changes" };
    format!(
        "{} {}",
        mutation.operation,
        out.dim(&format!("({} {})", count, noun))
    )
}

/// Tree node structure for ptree visualization
#[derive(Clone, Debug)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(label: String) -> Self {
        Self {
            label,
            children: vec![],
        }
    }
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: Write>(&self, f: &mut W, _style: &ptree::Style) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Borrowed(&self.children)
    }
}
