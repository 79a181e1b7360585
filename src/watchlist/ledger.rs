use std::sync::Arc;

use crate::catalog_store::Movie;
use crate::error::{ApiError, ApiResult};
use crate::user::{FullStore, User};

use super::watchlist_store::{WatchlistAddOutcome, WatchlistRemoveOutcome};

/// Watchlist operations on behalf of an already-authenticated user. The
/// owning user id always comes from the verified session, callers cannot
/// name somebody else's list.
pub struct WatchlistLedger {
    store: Arc<dyn FullStore>,
}

impl WatchlistLedger {
    pub fn new(store: Arc<dyn FullStore>) -> WatchlistLedger {
        WatchlistLedger { store }
    }

    fn resolve_user(&self, user_id: i64) -> ApiResult<User> {
        self.store
            .get_user(user_id)?
            .ok_or_else(|| ApiError::not_found("User not found."))
    }

    fn resolve_movie(&self, movie_id: i64) -> ApiResult<Movie> {
        self.store
            .get_movie(movie_id)?
            .ok_or_else(|| ApiError::not_found("Movie not found."))
    }

    /// Adds a movie to the user's watchlist. Duplicates are rejected by the
    /// store's unique constraint, there is no read-check-write window.
    pub fn add(&self, user_id: i64, movie_id: i64) -> ApiResult<Movie> {
        self.resolve_user(user_id)?;
        let movie = self.resolve_movie(movie_id)?;
        match self.store.add_watchlist_entry(user_id, movie_id)? {
            WatchlistAddOutcome::Added => Ok(movie),
            WatchlistAddOutcome::AlreadyPresent => {
                Err(ApiError::conflict("Movie already in watchlist."))
            }
        }
    }

    /// Removes a movie from the user's watchlist and returns its id.
    pub fn remove(&self, user_id: i64, movie_id: i64) -> ApiResult<i64> {
        self.resolve_user(user_id)?;
        self.resolve_movie(movie_id)?;
        match self.store.remove_watchlist_entry(user_id, movie_id)? {
            WatchlistRemoveOutcome::Removed => Ok(movie_id),
            WatchlistRemoveOutcome::NotPresent => {
                Err(ApiError::conflict("Movie not in watchlist."))
            }
        }
    }

    /// Returns the user's watchlist in insertion order. A user who never
    /// added anything has no watchlist yet, which is its own error.
    pub fn fetch(&self, user_id: i64) -> ApiResult<Vec<Movie>> {
        self.resolve_user(user_id)?;
        self.store
            .get_watchlist_movies(user_id)?
            .ok_or_else(|| ApiError::not_found("Watchlist not found."))
    }
}
