//! Operation ordering within a phase
//!
//! Operations are applied one target at a time. Before any operation of a
//! target runs, every operation targeting its prerequisite in the same phase
//! must have run.
//!
//! ## Process
//!
//! 1.  **Target Order**: Targets are visited in the order they first
//!     received an operation during analysis.
//!
//! 2.  **Depth-First Prerequisites**: For each operation of a target, a
//!     prerequisite with operations of its own in this phase is resolved
//!     first, recursively, and then the operation itself is emitted.
//!
//! 3.  **Visited Tracking**: A `HashSet` ensures each target is resolved
//!     once. A prerequisite chain that loops back onto a target still being
//!     resolved is cut at that point: the loop is reported with a warning
//!     and the remaining operations keep their depth-first order.
//!
//! Prerequisites planned in other phases impose no order here; phases run
//! strictly one after the other.

use std::collections::HashSet;

use log::warn;

use super::PhaseOperations;
use crate::operations::Operation;

/// Order the operations of one phase so prerequisites run first
pub fn order_phase(ops: &PhaseOperations) -> Vec<Operation> {
    let mut order = Vec::with_capacity(ops.len());
    let mut visited = HashSet::new();
    let mut resolving = HashSet::new();

    for target in ops.targets() {
        follow(ops, target, &mut order, &mut visited, &mut resolving);
    }
    order
}

fn follow(
    ops: &PhaseOperations,
    target: &str,
    order: &mut Vec<Operation>,
    visited: &mut HashSet<String>,
    resolving: &mut HashSet<String>,
) {
    if !visited.insert(target.to_string()) {
        return;
    }
    let Some(target_ops) = ops.get(target) else {
        return;
    };
    resolving.insert(target.to_string());

    for op in target_ops {
        if let Some(prerequisite) = op.prerequisite.as_deref() {
            if resolving.contains(prerequisite) && prerequisite != target {
                warn!(
                    "Cyclic prerequisite: {} needs {}, which is still being resolved",
                    target, prerequisite
                );
            } else if ops.contains(prerequisite) {
                follow(ops, prerequisite, order, visited, resolving);
            }
        }
        order.push(op.clone());
    }

    resolving.remove(target);
}
