//! Readiness evaluation: pure functions over the epoch state.

use lfm_types::{CongestionId, ParticipantId};

use crate::{EpochState, OfferCounter};

/// Every configured producer has reported on every open need.
///
/// False when no need is open: an epoch without needs is never
/// producer-ready.
#[must_use]
pub fn producers_ready(state: &EpochState) -> bool {
    if state.needs().is_empty() {
        return false;
    }
    state.needs().iter().all(|need| {
        state.registry().producers().iter().all(|producer| {
            state
                .counters()
                .get(&need.congestion_id, producer)
                .is_some_and(OfferCounter::is_complete)
        })
    })
}

/// Every configured procurer has signaled readiness this epoch.
#[must_use]
pub fn procurers_ready(state: &EpochState) -> bool {
    state.procurer_flags().all(|(_, ready)| ready)
}

/// (congestion, producer, counter) triples still waiting on reports.
#[must_use]
pub fn pending_producers(state: &EpochState) -> Vec<(CongestionId, ParticipantId, OfferCounter)> {
    let mut pending = Vec::new();
    for need in state.needs() {
        for producer in state.registry().producers() {
            let counter = state
                .counters()
                .get(&need.congestion_id, producer)
                .copied()
                .unwrap_or_default();
            if !counter.is_complete() {
                pending.push((need.congestion_id.clone(), producer.clone(), counter));
            }
        }
    }
    pending
}
