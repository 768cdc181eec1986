//! Inheritance through `extends`
//!
//! An object or event naming a base in `extends` receives every field of the
//! base it does not define itself. The base is looked up among definitions of
//! the same shape, first inside the same extension and then in the core,
//! matching either its file stem or its declared name. Identity fields
//! (`name` and `uid`) are never inherited.

use log::debug;

use super::{merge_from, PlanContext, Planner};
use crate::definitions::{DefinitionFile, DefinitionKind};
use crate::error::{Error, Result};
use crate::merge::{ChangeList, FieldMatcher, MergeOptions};
use crate::operations::{Action, Operation};
use crate::overlay::Overlay;
use crate::path::{self, RepoPath};

pub struct ExtendsPlanner;

/// Find the definition `file` extends
pub fn find_base(file: &DefinitionFile, base: &str, ctx: &PlanContext<'_>) -> Option<RepoPath> {
    let kind = file.data.kind();
    let own_extension = path::extension(&file.path);

    let matches = |candidate: &DefinitionFile, extension: Option<&str>| {
        candidate.path != file.path
            && candidate.data.kind() == kind
            && path::extension(&candidate.path) == extension
            && (path::short_name(&candidate.path) == base || candidate.data.name() == Some(base))
    };

    let mut scopes = vec![own_extension];
    if own_extension.is_some() {
        scopes.push(None);
    }

    scopes.into_iter().find_map(|scope| {
        ctx.overlay
            .files()
            .find(|candidate| matches(*candidate, scope))
            .map(|candidate| candidate.path.clone())
    })
}

impl Planner for ExtendsPlanner {
    fn name(&self) -> &'static str {
        "extends"
    }

    fn accepts(&self) -> &'static [DefinitionKind] {
        &[DefinitionKind::Object, DefinitionKind::Event]
    }

    fn analyze(&self, file: &DefinitionFile, ctx: &PlanContext<'_>) -> Vec<Operation> {
        let Some(base) = file.data.extends() else {
            return Vec::new();
        };
        match find_base(file, base, ctx) {
            Some(base_path) => vec![Operation::new(&file.path, Some(base_path), Action::Extends)],
            None => {
                debug!("Base `{}` of {} not found", base, file.path);
                Vec::new()
            }
        }
    }
}

pub fn apply(op: &Operation, overlay: &mut Overlay<'_>) -> Result<ChangeList> {
    let base = op.prerequisite.as_deref().ok_or_else(|| Error::MissingReference {
        path: op.target.clone(),
        reference: "base definition".to_string(),
    })?;
    let base_kind = overlay.get(base)?.data.kind();
    let target_kind = overlay.get(&op.target)?.data.kind();
    if base_kind != target_kind {
        return Err(Error::shape(&op.target, base_kind, target_kind));
    }

    let options = MergeOptions::gap_fill().ignore([
        FieldMatcher::prefix(["name"]),
        FieldMatcher::prefix(["uid"]),
    ]);
    merge_from(overlay, &op.target, base, &options)
}
