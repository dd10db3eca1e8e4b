//! Search resource constraints.

use std::fmt;
use std::time::Duration;

/// Budget for one root search. Everything is optional; an empty
/// constraint searches until the depth ceiling.
///
/// The search polls [`Constraint::exhausted`] every couple of thousand
/// nodes (cooperative cancellation — no frame ever blocks): the clock,
/// the node cap, the caller's early-exit predicate, and the controller
/// input hook each end the search at the next boundary.
#[derive(Default)]
pub struct Constraint {
    /// Wall-clock budget for this move.
    pub max_time: Option<Duration>,
    /// Cap on visited nodes (search plus quiescence).
    pub max_nodes: Option<u64>,
    /// Iterative-deepening depth ceiling.
    pub max_depth: Option<u32>,
    /// Custom early-exit predicate, also checked between iterations.
    pub condition: Option<Box<dyn Fn() -> bool>>,
    /// `true` when a controller command is waiting to be read.
    pub input: Option<Box<dyn Fn() -> bool>>,
}

impl Constraint {
    /// Should the search stop now?
    pub fn exhausted(&self, elapsed: Duration, nodes: u64) -> bool {
        if let Some(limit) = self.max_time {
            if elapsed >= limit {
                return true;
            }
        }
        if let Some(cap) = self.max_nodes {
            if nodes > cap {
                return true;
            }
        }
        if let Some(condition) = &self.condition {
            if condition() {
                return true;
            }
        }
        if let Some(input) = &self.input {
            if input() {
                return true;
            }
        }
        false
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("max_time", &self.max_time)
            .field("max_nodes", &self.max_nodes)
            .field("max_depth", &self.max_depth)
            .field("condition", &self.condition.is_some())
            .field("input", &self.input.is_some())
            .finish()
    }
}
