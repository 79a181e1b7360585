use axum::extract::FromRef;

use crate::user::{FullStore, UserManager};
use crate::watchlist::WatchlistLedger;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedStore = Arc<dyn FullStore>;
pub type GuardedUserManager = Arc<UserManager>;
pub type GuardedWatchlistLedger = Arc<WatchlistLedger>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub store: GuardedStore,
    pub user_manager: GuardedUserManager,
    pub watchlist_ledger: GuardedWatchlistLedger,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        store: GuardedStore,
        user_manager: GuardedUserManager,
        watchlist_ledger: GuardedWatchlistLedger,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            store,
            user_manager,
            watchlist_ledger,
        }
    }
}

impl FromRef<ServerState> for GuardedStore {
    fn from_ref(input: &ServerState) -> Self {
        input.store.clone()
    }
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedWatchlistLedger {
    fn from_ref(input: &ServerState) -> Self {
        input.watchlist_ledger.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
