//! Batch valuation passes over the player collection
//!
//! Both passes walk the active partition through the repository, mutate rows
//! in place, and commit once at the end. They never toggle deletion flags
//! and never reassign `spesa`; the basis walk always starts from the stored
//! acquisition value.

use crate::bands::step_basis;
use crate::error::{Result, ValuationError};
use roster_store::Store;
use std::collections::HashMap;

/// Externally observed market prices, keyed by exact player display name
pub type PriceMap = HashMap<String, i64>;

/// Summary of one valuation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassOutcome {
    /// Players whose fields were recomputed
    pub updated: usize,

    /// Players on loan: quotation moved, basis and release value untouched
    pub loan_bypassed: usize,

    /// Players absent from the feed, flagged as out of the top division
    pub left_feed: usize,
}

/// Full recompute: quotation, cumulative delta, and release value.
///
/// For every active player present in the feed and not on loan, the signed
/// distance between the observed price and the current quotation is
/// accumulated into `dq` and then consumed by the band-stepping walk from
/// `spesa`; the floored final basis becomes the new release value. Loaned
/// players only have their quotation refreshed; players missing from the
/// feed are flagged out of the top division and otherwise left untouched.
pub fn recompute_full(store: &mut Store, prices: &PriceMap) -> Result<PassOutcome> {
    let mut outcome = PassOutcome::default();

    {
        let mut players = store.players();
        for player in players.iter_active_mut() {
            let Some(&price) = prices.get(&player.nome) else {
                player.in_serie_a = false;
                outcome.left_feed += 1;
                continue;
            };
            player.in_serie_a = true;

            if player.in_prestito_a.is_some() {
                player.quotazione = price;
                outcome.loan_bypassed += 1;
                continue;
            }

            let delta = price - player.quotazione;
            player.dq += delta;

            let walk = step_basis(player.spesa, delta);
            if walk.clamped {
                tracing::warn!(
                    player = %player.nome,
                    spesa = player.spesa,
                    delta,
                    "basis walk saturated at the lowest band floor"
                );
            }

            player.valore_svincolo = walk.basis.floor() as i64;
            player.quotazione = price;
            outcome.updated += 1;
        }
    }

    store.commit().map_err(|source| ValuationError::FullRecompute { source })?;

    tracing::info!(
        updated = outcome.updated,
        loan_bypassed = outcome.loan_bypassed,
        left_feed = outcome.left_feed,
        "full valuation recompute committed"
    );

    Ok(outcome)
}

/// Quotes-only recompute: refreshes `quotazione` and the top-division flag,
/// never touches `spesa`, `dq`, or `valore_svincolo`, loaned or not.
pub fn recompute_quotes_only(store: &mut Store, prices: &PriceMap) -> Result<PassOutcome> {
    let mut outcome = PassOutcome::default();

    {
        let mut players = store.players();
        for player in players.iter_active_mut() {
            match prices.get(&player.nome) {
                None => {
                    player.in_serie_a = false;
                    outcome.left_feed += 1;
                }
                Some(&price) => {
                    player.in_serie_a = true;
                    player.quotazione = price;
                    outcome.updated += 1;
                }
            }
        }
    }

    store.commit().map_err(|source| ValuationError::QuotesOnly { source })?;

    tracing::info!(
        updated = outcome.updated,
        left_feed = outcome.left_feed,
        "quotes-only recompute committed"
    );

    Ok(outcome)
}
