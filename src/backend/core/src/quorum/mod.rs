//! Quorum resolution over container event histories.
//!
//! Two read paths derive trust from the event log:
//!
//! - [`QuorumResolver`] counts events per state for one container and
//!   returns the first state, in first-seen order, whose count reaches
//!   [`QUORUM_THRESHOLD`].
//! - [`VerifiedSetAggregator`] lists every container whose *total* event
//!   count reaches the threshold and reports the state of its first event.
//!
//! The two can disagree for containers with mixed observations. That
//! divergence is kept as-is; reconciling them is a behavior change.

mod resolver;
mod verified;

pub use resolver::QuorumResolver;
pub use verified::VerifiedSetAggregator;

use crate::events::{ContainerEvent, ContainerState};

/// Minimum number of matching observations for a state to be trusted.
pub const QUORUM_THRESHOLD: usize = 3;

/// Count events per state, keeping buckets in the order their state was
/// first encountered.
pub fn tally_states(events: &[ContainerEvent]) -> Vec<(ContainerState, usize)> {
    let mut tally: Vec<(ContainerState, usize)> = Vec::with_capacity(ContainerState::ALL.len());
    for event in events {
        match tally.iter_mut().find(|(state, _)| *state == event.state) {
            Some((_, count)) => *count += 1,
            None => tally.push((event.state, 1)),
        }
    }
    tally
}

/// Apply the quorum rule to a non-empty history.
///
/// Returns the first bucket (in first-seen order) with at least
/// [`QUORUM_THRESHOLD`] events, or `Unknown` when none qualifies.
/// Timestamps play no part: every event counts equally.
pub fn resolve_events(events: &[ContainerEvent]) -> ContainerState {
    tally_states(events)
        .into_iter()
        .find(|(_, count)| *count >= QUORUM_THRESHOLD)
        .map(|(state, _)| state)
        .unwrap_or(ContainerState::Unknown)
}
