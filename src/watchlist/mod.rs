mod ledger;
mod watchlist_store;

pub use ledger::WatchlistLedger;
pub use watchlist_store::{WatchlistAddOutcome, WatchlistRemoveOutcome, WatchlistStore};
