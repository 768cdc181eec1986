//! Dictionary enrichment
//!
//! The dictionary holds the canonical definition of every attribute name.
//! Objects and events fill in whatever their own attribute entries leave
//! undefined from it. Attributes missing from the definition are not added,
//! and nothing outside the attribute map changes.

use super::{merge_from, PlanContext, Planner};
use crate::definitions::{DefinitionFile, DefinitionKind};
use crate::error::Result;
use crate::merge::{ChangeList, FieldMatcher, MergeOptions};
use crate::operations::{Action, Operation};
use crate::overlay::Overlay;
use crate::path::DICTIONARY_FILE;

pub struct DictionaryPlanner;

impl Planner for DictionaryPlanner {
    fn name(&self) -> &'static str {
        "dictionary"
    }

    fn accepts(&self) -> &'static [DefinitionKind] {
        &[DefinitionKind::Object, DefinitionKind::Event]
    }

    fn analyze(&self, file: &DefinitionFile, ctx: &PlanContext<'_>) -> Vec<Operation> {
        let prerequisite = ctx
            .overlay
            .contains(DICTIONARY_FILE)
            .then(|| DICTIONARY_FILE.to_string());
        vec![Operation::new(&file.path, prerequisite, Action::Dictionary)]
    }
}

pub fn apply(op: &Operation, overlay: &mut Overlay<'_>) -> Result<ChangeList> {
    let Some(dictionary) = op.prerequisite.as_deref() else {
        return Ok(Vec::new());
    };
    super::require_kind(overlay.get(dictionary)?, DefinitionKind::Dictionary)?;

    let target = overlay.get(&op.target)?;
    super::require_attributes(target)?;
    if target.data.attributes().is_none() {
        return Ok(Vec::new());
    }

    let options = MergeOptions::gap_fill()
        .allow([FieldMatcher::prefix(["attributes"])])
        .existing_keys_only();
    merge_from(overlay, &op.target, dictionary, &options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Selection;
    use crate::merge::FieldPath;
    use crate::repository::Repository;

    fn repo() -> Repository {
        let mut repo = Repository::new();
        repo.add_json(
            "dictionary.json",
            r#"{"caption": "Attribute Dictionary", "attributes": {
                "time": {"caption": "Event Time", "type": "timestamp_t", "description": "When"},
                "message": {"caption": "Message", "type": "string_t"},
                "unused": {"caption": "Unused", "type": "string_t"}
            }}"#,
        )
        .unwrap();
        repo.add_json(
            "events/base_event.json",
            r#"{"name": "base_event", "attributes": {
                "time": {"requirement": "required", "description": "Local"},
                "message": {}
            }}"#,
        )
        .unwrap();
        repo.add_json("objects/empty.json", r#"{"name": "empty"}"#).unwrap();
        repo
    }

    #[test]
    fn test_planner_depends_on_dictionary() {
        let repo = repo();
        let overlay = Overlay::new(&repo);
        let selection = Selection::default();
        let ctx = PlanContext::new(&overlay, &selection);

        let ops = DictionaryPlanner.analyze(repo.get("objects/empty.json").unwrap(), &ctx);
        assert_eq!(ops[0].prerequisite.as_deref(), Some(DICTIONARY_FILE));
    }

    #[test]
    fn test_fills_existing_attributes_only() {
        let repo = repo();
        let mut overlay = Overlay::new(&repo);
        let op = Operation::new(
            "events/base_event.json",
            Some(DICTIONARY_FILE.to_string()),
            Action::Dictionary,
        );

        let changes = op.apply(&mut overlay).unwrap();

        assert!(changes.contains(&FieldPath::new(["attributes", "time", "type"])));
        assert!(changes.contains(&FieldPath::new(["attributes", "message", "caption"])));
        assert!(!changes.iter().any(|c| c.segments()[0] != "attributes"));

        let event = overlay.peek("events/base_event.json").unwrap();
        let attrs = event.data.attributes().unwrap();
        assert!(!attrs.contains_key("unused"));
        let time = attrs["time"].attribute().unwrap();
        assert_eq!(time.description.as_deref(), Some("Local"));
        assert_eq!(time.caption.as_deref(), Some("Event Time"));
        assert_eq!(time.requirement.as_deref(), Some("required"));
    }

    #[test]
    fn test_definition_without_attributes_is_untouched() {
        let repo = repo();
        let mut overlay = Overlay::new(&repo);
        let op = Operation::new(
            "objects/empty.json",
            Some(DICTIONARY_FILE.to_string()),
            Action::Dictionary,
        );

        assert!(op.apply(&mut overlay).unwrap().is_empty());
        assert!(overlay.peek("objects/empty.json").unwrap().data.attributes().is_none());
    }
}
