use anyhow::Result;

use super::models::{Movie, MovieDraft, NewMovie};

pub trait MovieStore: Send + Sync {
    /// Inserts a movie into the catalog and returns it with its id.
    fn create_movie(&self, movie: NewMovie) -> Result<Movie>;

    /// Returns the movie with the given id.
    /// Returns Ok(None) if it does not exist.
    fn get_movie(&self, movie_id: i64) -> Result<Option<Movie>>;

    /// Returns all movies, most recently created first.
    fn get_all_movies(&self) -> Result<Vec<Movie>>;

    /// Applies the fields present in the patch to the movie, leaving absent
    /// fields untouched. Returns the updated movie, or Ok(None) if the
    /// movie does not exist.
    fn update_movie(&self, movie_id: i64, patch: MovieDraft) -> Result<Option<Movie>>;

    /// Removes a movie from the catalog. Watchlist entries referencing it
    /// are removed with it.
    /// Returns the deleted movie, or Ok(None) if it does not exist.
    fn delete_movie(&self, movie_id: i64) -> Result<Option<Movie>>;
}
