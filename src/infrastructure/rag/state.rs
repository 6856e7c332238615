//! Per-query lifecycle
//!
//! `Idle -> Retrieving -> Assembling -> GeneratingAndScoring -> Done`, with
//! `Failed` reachable from `Retrieving` and `GeneratingAndScoring`, plus
//! `Idle` for queries rejected or cancelled before retrieval starts.
//! Assembling is a pure data transformation and cannot fail.

use std::fmt;

use tracing::{trace, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Idle,
    Retrieving,
    Assembling,
    GeneratingAndScoring,
    Done,
    Failed,
}

impl QueryState {
    pub fn can_transition_to(&self, next: QueryState) -> bool {
        use QueryState::*;

        matches!(
            (*self, next),
            (Idle, Retrieving)
                | (Retrieving, Assembling)
                | (Assembling, GeneratingAndScoring)
                | (GeneratingAndScoring, Done)
                | (Idle | Retrieving | GeneratingAndScoring, Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for QueryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Retrieving => "retrieving",
            Self::Assembling => "assembling",
            Self::GeneratingAndScoring => "generating_and_scoring",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks one query through its states. Never reused across queries.
#[derive(Debug)]
pub struct QueryLifecycle {
    correlation_id: Uuid,
    state: QueryState,
    history: Vec<QueryState>,
}

impl QueryLifecycle {
    pub fn new(correlation_id: Uuid) -> Self {
        Self {
            correlation_id,
            state: QueryState::Idle,
            history: vec![QueryState::Idle],
        }
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn history(&self) -> &[QueryState] {
        &self.history
    }

    /// Returns false and leaves the state untouched on an illegal move
    pub fn advance(&mut self, next: QueryState) -> bool {
        if !self.state.can_transition_to(next) {
            warn!(
                correlation_id = %self.correlation_id,
                from = %self.state,
                to = %next,
                "Ignoring illegal query state transition"
            );
            return false;
        }

        trace!(
            correlation_id = %self.correlation_id,
            from = %self.state,
            to = %next,
            "Query state transition"
        );
        self.state = next;
        self.history.push(next);
        true
    }

    pub fn fail(&mut self) {
        self.advance(QueryState::Failed);
    }
}
