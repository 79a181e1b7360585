//! Movie Catalog Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod catalog_store;
pub mod error;
pub mod server;
pub mod sqlite_persistence;
pub mod user;
pub mod watchlist;

// Re-export commonly used types for convenience
pub use error::{ApiError, ApiResult};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
pub use sqlite_persistence::SqliteStore;
pub use user::{TokenSigner, UserManager, UserRole};
pub use watchlist::WatchlistLedger;
