//! Offer matcher: folds a procurer's selection into the epoch results.
//!
//! ```text
//! apply_selection(state, [o1, o2])   open {o1, o2, o3} -> open {o3}, results {o1, o2}
//! apply_selection(state, [o1])       no-op, o1 is no longer open
//! ```
//!
//! Selections may name offers that were already consumed or never existed;
//! those ids are skipped without error. Unselected offers stay open until
//! the epoch reset.

use lfm_types::OfferId;

use crate::EpochState;

/// Move every selected open offer into the results, in selection order.
///
/// Returns the number of offers accepted by this call.
pub fn apply_selection(state: &mut EpochState, selected: &[OfferId]) -> usize {
    let mut accepted = 0;
    for offer_id in selected {
        let Some(pos) = state.offers.iter().position(|o| &o.offer_id == offer_id) else {
            tracing::debug!(offer_id = %offer_id, "Selected offer is not open, skipping");
            continue;
        };
        let offer = state.offers.remove(pos);
        tracing::debug!(
            offer_id = %offer.offer_id,
            congestion_id = %offer.congestion_id,
            producer = %offer.producer_id,
            "Offer accepted"
        );
        state.results.push(offer);
        accepted += 1;
    }
    accepted
}
