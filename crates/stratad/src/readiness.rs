//! The two suspension points of a launched node: the readiness race and the
//! final wait for termination.

use std::fmt;
use std::time::{Duration, Instant};

use crate::signals::{EngineError, EngineSignals};

/// Which engine signal fired first after launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceOutcome {
    /// The engine joined its cluster and is serving.
    ReadyFirst,
    /// The engine stopped before it became ready.
    StoppedFirst,
}

impl fmt::Display for RaceOutcome {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ReadyFirst => "ready",
            Self::StoppedFirst => "stopped",
        };
        formatter.write_str(label)
    }
}

/// How a running engine ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The termination notification fired with no pending error.
    Stopped,
    /// The engine surfaced an asynchronous error.
    Failed(EngineError),
}

/// Blocks until the engine is ready or has stopped, without a bound.
pub fn race(signals: &EngineSignals) -> RaceOutcome {
    signals
        .wait_for(None, |state| first_fired(state.ready_at(), state.stopped_at()))
        .unwrap_or(RaceOutcome::StoppedFirst)
}

/// Like [`race`], but gives up once `timeout` has elapsed.
pub fn race_within(signals: &EngineSignals, timeout: Duration) -> Option<RaceOutcome> {
    let deadline = Instant::now().checked_add(timeout);
    signals.wait_for(deadline, |state| {
        first_fired(state.ready_at(), state.stopped_at())
    })
}

/// Blocks until the engine stops or reports an error.
///
/// A pending error takes precedence over the termination notification when
/// both are visible.
pub fn await_termination(signals: &EngineSignals) -> Termination {
    signals
        .wait_for(None, |state| {
            if let Some(error) = state.take_error() {
                return Some(Termination::Failed(error));
            }
            state.stopped_at().map(|_| Termination::Stopped)
        })
        .unwrap_or(Termination::Stopped)
}

fn first_fired(ready_at: Option<u64>, stopped_at: Option<u64>) -> Option<RaceOutcome> {
    match (ready_at, stopped_at) {
        (Some(ready), Some(stopped)) if stopped < ready => Some(RaceOutcome::StoppedFirst),
        (Some(_), _) => Some(RaceOutcome::ReadyFirst),
        (None, Some(_)) => Some(RaceOutcome::StoppedFirst),
        (None, None) => None,
    }
}
