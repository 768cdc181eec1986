//! Orchestrator for a complete compilation
//!
//! [`Compilation`] ties the pipeline together:
//!
//! 1. Resolve the compilation options against the repository
//! 2. For each phase: analyze every file on the overlay as left by the
//!    previous phases, order the proposed operations, apply them in order
//! 3. Render the overlay into a [`Schema`]
//!
//! Each planned operation is applied exactly once. Compiling again returns
//! the recorded result; rendering is memoised the same way. A compilation
//! that fails part-way resets its overlay to the repository baseline.

use std::collections::BTreeMap;

use log::{info, trace};

use super::ordering::order_phase;
use super::{phases, Phase, PhaseOperations};
use crate::config::{CompilationOptions, Selection};
use crate::error::Result;
use crate::merge::ChangeList;
use crate::operations::Operation;
use crate::overlay::Overlay;
use crate::planners::PlanContext;
use crate::render;
use crate::repository::Repository;
use crate::schema::Schema;

/// An applied operation and the fields it changed
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    pub operation: Operation,
    pub changes: ChangeList,
}

/// Operations applied during one phase, in application order
#[derive(Debug, Clone, Default)]
pub struct PhaseRecord {
    pub number: usize,
    pub planned: PhaseOperations,
    pub applied: Vec<Mutation>,
}

pub struct Compilation<'r> {
    selection: Selection,
    overlay: Overlay<'r>,
    record: Option<Vec<PhaseRecord>>,
    schema: Option<Schema>,
}

impl<'r> Compilation<'r> {
    pub fn new(repo: &'r Repository, options: &CompilationOptions) -> Self {
        Self {
            selection: Selection::resolve(options, repo),
            overlay: Overlay::new(repo),
            record: None,
            schema: None,
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The working overlay
    pub fn overlay(&self) -> &Overlay<'r> {
        &self.overlay
    }

    /// Run every phase, once
    ///
    /// A failed phase discards the partial overlay, so a later call starts
    /// again from the repository.
    pub fn compile(&mut self) -> Result<&[PhaseRecord]> {
        self.run_phases(phases())
    }

    fn run_phases(&mut self, phases: Vec<Phase>) -> Result<&[PhaseRecord]> {
        if self.record.is_none() {
            let mut record = Vec::new();
            for phase in phases {
                match self.run_phase(&phase) {
                    Ok(phase_record) => record.push(phase_record),
                    Err(e) => {
                        self.overlay = Overlay::new(self.overlay.baseline());
                        return Err(e);
                    }
                }
            }
            self.record = Some(record);
        }
        Ok(self.record.as_deref().unwrap_or_default())
    }

    fn analyze(&self, phase: &Phase) -> PhaseOperations {
        let ctx = PlanContext::new(&self.overlay, &self.selection);
        let mut planned = PhaseOperations::new();

        for planner in &phase.planners {
            for file in self.overlay.files() {
                if !planner.accepts().contains(&file.data.kind()) {
                    continue;
                }
                if ctx.is_inactive_extension(&file.path) {
                    continue;
                }
                for op in planner.analyze(file, &ctx) {
                    planned.push(op);
                }
            }
        }
        planned
    }

    fn run_phase(&mut self, phase: &Phase) -> Result<PhaseRecord> {
        let planned = self.analyze(phase);
        let ordered = order_phase(&planned);
        info!(
            "Phase {}: {} operations on {} definitions",
            phase.number,
            ordered.len(),
            planned.targets().len()
        );

        let mut applied = Vec::with_capacity(ordered.len());
        for operation in ordered {
            let changes = operation.apply(&mut self.overlay)?;
            trace!("{} ({} changes)", operation, changes.len());
            applied.push(Mutation { operation, changes });
        }

        Ok(PhaseRecord {
            number: phase.number,
            planned,
            applied,
        })
    }

    /// Operations proposed per phase, grouped by target
    pub fn operations(&self) -> Vec<&PhaseOperations> {
        self.phase_records().iter().map(|r| &r.planned).collect()
    }

    /// The executed plan: every phase's ordered operations, concatenated
    pub fn plan(&self) -> Vec<&Operation> {
        self.phase_records()
            .iter()
            .flat_map(|r| r.applied.iter().map(|m| &m.operation))
            .collect()
    }

    /// Applied operations and their changes, per target
    pub fn mutations(&self) -> BTreeMap<&str, Vec<&Mutation>> {
        let mut by_target: BTreeMap<&str, Vec<&Mutation>> = BTreeMap::new();
        for mutation in self.phase_records().iter().flat_map(|r| &r.applied) {
            by_target
                .entry(mutation.operation.target.as_str())
                .or_default()
                .push(mutation);
        }
        by_target
    }

    pub fn phase_records(&self) -> &[PhaseRecord] {
        self.record.as_deref().unwrap_or_default()
    }

    /// Compile if needed, then render the schema (once)
    pub fn build(&mut self) -> Result<&Schema> {
        self.compile()?;
        let schema = match self.schema.take() {
            Some(schema) => schema,
            None => render::render(&self.overlay)?,
        };
        Ok(self.schema.insert(schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{Definition, DefinitionFile, DefinitionKind};
    use crate::error::Error;
    use crate::operations::Action;
    use crate::planners::category::SetCategoryPlanner;
    use crate::planners::Planner;

    /// Proposes an inheritance without a base, which fails when applied
    struct BrokenExtendsPlanner;

    impl Planner for BrokenExtendsPlanner {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn accepts(&self) -> &'static [DefinitionKind] {
            &[DefinitionKind::Event]
        }

        fn analyze(&self, file: &DefinitionFile, _ctx: &PlanContext<'_>) -> Vec<Operation> {
            vec![Operation::new(&file.path, None, Action::Extends)]
        }
    }

    fn repo() -> Repository {
        let mut repo = Repository::new();
        repo.add_json("version.json", r#"{"version": "1.0.0"}"#).unwrap();
        repo.add_json(
            "dictionary.json",
            r#"{"attributes": {"time": {"caption": "Time", "type": "timestamp_t"}},
                "types": {"attributes": {"timestamp_t": {}, "string_t": {}}}}"#,
        )
        .unwrap();
        repo.add_json(
            "categories.json",
            r#"{"attributes": {"system": {"caption": "System", "uid": 1}}}"#,
        )
        .unwrap();
        repo.add_json(
            "events/base_event.json",
            r#"{"name": "base_event", "caption": "Base", "attributes": {"time": {}}}"#,
        )
        .unwrap();
        repo.add_json(
            "events/system/file_activity.json",
            r#"{"name": "file_activity", "caption": "File Activity", "uid": 1,
                "extends": "base_event", "attributes": {"path": {"type": "string_t"}}}"#,
        )
        .unwrap();
        repo.add_json(
            "extensions/off/events/system/ignored.json",
            r#"{"name": "ignored", "uid": 4}"#,
        )
        .unwrap();
        repo
    }

    fn options() -> CompilationOptions {
        CompilationOptions {
            ignore_extensions: vec!["off".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_compile_runs_each_phase_once() {
        let repo = repo();
        let mut compilation = Compilation::new(&repo, &options());

        let numbers: Vec<_> = compilation
            .compile()
            .unwrap()
            .iter()
            .map(|r| r.number)
            .collect();
        assert_eq!(numbers, vec![0, 1, 2, 3]);

        let plan_len = compilation.plan().len();
        compilation.compile().unwrap();
        assert_eq!(compilation.plan().len(), plan_len);
    }

    #[test]
    fn test_later_phases_see_earlier_effects() {
        let repo = repo();
        let mut compilation = Compilation::new(&repo, &options());
        compilation.compile().unwrap();

        let Definition::Event(event) = &compilation
            .overlay()
            .peek("events/system/file_activity.json")
            .unwrap()
            .data
        else {
            panic!("expected an event");
        };
        assert_eq!(event.category.as_deref(), Some("system"));
        let attrs = event.attributes.as_ref().unwrap();
        let time = attrs["time"].attribute().unwrap();
        assert_eq!(time.caption.as_deref(), Some("Time"));
        let class_uid = attrs["class_uid"].attribute().unwrap();
        assert!(class_uid.enum_values.as_ref().unwrap().contains_key("1001"));
    }

    #[test]
    fn test_inactive_extension_is_not_planned() {
        let repo = repo();
        let mut compilation = Compilation::new(&repo, &options());
        compilation.compile().unwrap();

        assert!(compilation
            .plan()
            .iter()
            .all(|op| !op.target.starts_with("extensions/off/")));
        assert!(!compilation.overlay().contains("events/system/ignored.json"));
    }

    #[test]
    fn test_mutations_are_grouped_by_target() {
        let repo = repo();
        let mut compilation = Compilation::new(&repo, &options());
        compilation.compile().unwrap();

        let mutations = compilation.mutations();
        let actions: Vec<_> = mutations["events/system/file_activity.json"]
            .iter()
            .map(|m| m.operation.action.label())
            .collect();
        assert_eq!(actions.first(), Some(&Action::Extends.label()));
        assert!(actions.contains(&"uid"));
    }

    #[test]
    fn test_build_is_memoised() {
        let repo = repo();
        let mut compilation = Compilation::new(&repo, &options());

        let first = compilation.build().unwrap().clone();
        let second = compilation.build().unwrap();
        assert_eq!(&first, second);
        assert!(first.classes.contains_key("file_activity"));
    }

    #[test]
    fn test_failed_phase_resets_the_overlay() {
        let repo = repo();
        let mut compilation = Compilation::new(&repo, &options());
        let target = "events/system/file_activity.json";

        let result = compilation.run_phases(vec![
            Phase::new(0, vec![Box::new(SetCategoryPlanner)]),
            Phase::new(1, vec![Box::new(BrokenExtendsPlanner)]),
        ]);

        assert!(matches!(result, Err(Error::MissingReference { .. })));
        assert!(!compilation.overlay().is_hydrated(target));
        assert!(compilation.phase_records().is_empty());

        let numbers: Vec<_> = compilation
            .compile()
            .unwrap()
            .iter()
            .map(|r| r.number)
            .collect();
        assert_eq!(numbers, vec![0, 1, 2, 3]);
    }
}
