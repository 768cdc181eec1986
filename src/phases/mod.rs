//! The four phases of a compilation.
//!
//! ## Overview
//!
//! A compilation runs a fixed sequence of phases. Each phase is a list of
//! planners; the orchestrator analyzes every file with the planners of the
//! phase, orders the resulting operations, and applies them before moving on.
//!
//! 0. Structure - annotations, extension and profile marks, includes,
//!    inheritance, extension overlays, profile selection
//! 1. Categories - category assignment from event paths
//! 2. Identifiers - derived UIDs, dictionary metadata
//! 3. Finishing - extension name prefixes, object references, enum siblings,
//!    datetime companions, extension-only copies
//!
//! A phase only sees the overlay as left by the phases before it: planners
//! of a phase never observe the effects of operations of the same phase.

use std::collections::HashMap;

use crate::operations::Operation;
use crate::path::RepoPath;
use crate::planners::annotations::AnnotationPlanner;
use crate::planners::category::SetCategoryPlanner;
use crate::planners::datetime::DateTimePlanner;
use crate::planners::dictionary::DictionaryPlanner;
use crate::planners::extends::ExtendsPlanner;
use crate::planners::extension::{
    ExtensionCopyPlanner, ExtensionMergePlanner, ExtensionPrefixPlanner, MarkExtensionPlanner,
};
use crate::planners::id_sibling::IdSiblingPlanner;
use crate::planners::include::IncludePlanner;
use crate::planners::object_type::ObjectTypePlanner;
use crate::planners::profile::{MarkProfilePlanner, ProfilePlanner};
use crate::planners::uid::UidPlanner;
use crate::planners::Planner;

pub mod orchestrator;
pub mod ordering;

/// One phase: its number and its planners, in the order they run
pub struct Phase {
    pub number: usize,
    pub planners: Vec<Box<dyn Planner>>,
}

impl Phase {
    fn new(number: usize, planners: Vec<Box<dyn Planner>>) -> Self {
        Self { number, planners }
    }
}

/// The phases of a compilation, in order
pub fn phases() -> Vec<Phase> {
    vec![
        Phase::new(
            0,
            vec![
                Box::new(AnnotationPlanner),
                Box::new(MarkExtensionPlanner),
                Box::new(MarkProfilePlanner),
                Box::new(IncludePlanner),
                Box::new(ExtendsPlanner),
                Box::new(ExtensionMergePlanner),
                Box::new(ProfilePlanner),
            ],
        ),
        Phase::new(1, vec![Box::new(SetCategoryPlanner)]),
        Phase::new(2, vec![Box::new(UidPlanner), Box::new(DictionaryPlanner)]),
        Phase::new(
            3,
            vec![
                Box::new(ExtensionPrefixPlanner),
                Box::new(ObjectTypePlanner),
                Box::new(IdSiblingPlanner),
                Box::new(DateTimePlanner),
                Box::new(ExtensionCopyPlanner),
            ],
        ),
    ]
}

/// Operations proposed during one phase, grouped by target
///
/// Targets keep the order in which they first received an operation, and
/// each target's operations keep the order they were proposed in.
#[derive(Debug, Clone, Default)]
pub struct PhaseOperations {
    order: Vec<RepoPath>,
    by_target: HashMap<RepoPath, Vec<Operation>>,
}

impl PhaseOperations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: Operation) {
        if !self.by_target.contains_key(&op.target) {
            self.order.push(op.target.clone());
        }
        self.by_target.entry(op.target.clone()).or_default().push(op);
    }

    /// Operations targeting `path`
    pub fn get(&self, path: &str) -> Option<&[Operation]> {
        self.by_target.get(path).map(Vec::as_slice)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.by_target.contains_key(path)
    }

    /// Targets in first-proposed order
    pub fn targets(&self) -> &[RepoPath] {
        &self.order
    }

    /// All operations, target by target
    pub fn iter(&self) -> impl Iterator<Item = &Operation> {
        self.order
            .iter()
            .filter_map(|target| self.by_target.get(target))
            .flatten()
    }

    pub fn len(&self) -> usize {
        self.by_target.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl FromIterator<Operation> for PhaseOperations {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        let mut ops = PhaseOperations::new();
        for op in iter {
            ops.push(op);
        }
        ops
    }
}
