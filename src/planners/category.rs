//! Event categories
//!
//! An event stored under `events/<category>/` belongs to that category,
//! whatever it may have inherited from its base.

use super::{PlanContext, Planner};
use crate::definitions::{Definition, DefinitionFile, DefinitionKind};
use crate::error::{Error, Result};
use crate::merge::{ChangeList, FieldPath};
use crate::operations::{Action, Operation};
use crate::overlay::Overlay;
use crate::path;

pub struct SetCategoryPlanner;

impl Planner for SetCategoryPlanner {
    fn name(&self) -> &'static str {
        "category"
    }

    fn accepts(&self) -> &'static [DefinitionKind] {
        &[DefinitionKind::Event]
    }

    fn analyze(&self, file: &DefinitionFile, _ctx: &PlanContext<'_>) -> Vec<Operation> {
        let Some(category) = path::category(&file.path) else {
            return Vec::new();
        };
        let Definition::Event(event) = &file.data else {
            return Vec::new();
        };
        if event.category.as_deref() == Some(category.as_str()) {
            return Vec::new();
        }
        vec![Operation::new(&file.path, None, Action::SetCategory { category })]
    }
}

pub fn apply(op: &Operation, category: &str, overlay: &mut Overlay<'_>) -> Result<ChangeList> {
    let file = overlay.get_mut(&op.target)?;
    let Definition::Event(event) = &mut file.data else {
        return Err(Error::shape(&op.target, DefinitionKind::Event, file.data.kind()));
    };
    if event.category.as_deref() == Some(category) {
        return Ok(Vec::new());
    }
    event.category = Some(category.to_string());
    Ok(vec![FieldPath::new(["category"])])
}
