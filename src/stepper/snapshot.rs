//! Step Snapshot
//!
//! The read-only view the stepper hands out after every call. A presentation
//! layer renders this and nothing else; it never reaches into the run state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The stepper's position in the algorithm's macro state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Initialization,
    Relaxation,
    CycleCheck,
    Complete,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Initialization => write!(f, "initialization"),
            Phase::Relaxation => write!(f, "relaxation"),
            Phase::CycleCheck => write!(f, "cycle-check"),
            Phase::Complete => write!(f, "complete"),
        }
    }
}

/// A distance estimate: a finite value or the unreachable sentinel.
///
/// Variant order gives the ordering the relaxation test needs for free:
/// any finite distance compares below `Unreachable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Distance {
    Finite(i64),
    Unreachable,
}

impl Distance {
    pub fn finite(self) -> Option<i64> {
        match self {
            Distance::Finite(d) => Some(d),
            Distance::Unreachable => None,
        }
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Finite(d) => write!(f, "{}", d),
            Distance::Unreachable => write!(f, "∞"),
        }
    }
}

/// The edge relaxed by the most recent step, for highlighting only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEdge {
    pub from: String,
    pub to: String,
    pub weight: i64,
}

/// Observable run state after an `initialize()`/`step()`/`reset()` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSnapshot {
    pub phase: Phase,

    /// Completed full passes over the edge list, 0-based.
    pub iteration: usize,

    /// |V| − 1, the number of passes the algorithm runs.
    pub iteration_bound: usize,

    /// Distance estimate per node, in declaration order.
    pub distances: Vec<(String, Distance)>,

    pub active_edge: Option<ActiveEdge>,

    /// Node whose distance changed in the most recent step, if any.
    /// Lets a renderer flash the updated entry without diffing.
    pub changed_node: Option<String>,

    /// Meaningful only once `phase` is [`Phase::Complete`].
    pub has_negative_cycle: bool,
}

impl StepSnapshot {
    pub fn distance_of(&self, label: &str) -> Option<Distance> {
        self.distances
            .iter()
            .find(|(node, _)| node == label)
            .map(|&(_, d)| d)
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }
}
