use anyhow::Result;

use crate::catalog_store::Movie;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchlistAddOutcome {
    Added,
    /// The movie was already a member, nothing was written.
    AlreadyPresent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchlistRemoveOutcome {
    Removed,
    /// The movie was not a member (or the user has no watchlist at all).
    NotPresent,
}

pub trait WatchlistStore: Send + Sync {
    /// Adds a movie to the user's watchlist, creating the watchlist on
    /// first use. The membership insert and the duplicate check are a
    /// single atomic operation backed by a UNIQUE constraint.
    fn add_watchlist_entry(&self, user_id: i64, movie_id: i64) -> Result<WatchlistAddOutcome>;

    /// Removes a movie from the user's watchlist. Idempotence is reported,
    /// not assumed: removing a non-member yields NotPresent.
    fn remove_watchlist_entry(&self, user_id: i64, movie_id: i64)
        -> Result<WatchlistRemoveOutcome>;

    /// Returns the movies on the user's watchlist in insertion order.
    /// Returns Ok(None) if the user never created a watchlist.
    fn get_watchlist_movies(&self, user_id: i64) -> Result<Option<Vec<Movie>>>;
}
