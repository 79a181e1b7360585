use anyhow::Result;
use std::{sync::Arc, time::Duration};

use tower_http::services::ServeDir;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::catalog_store::MovieDraft;
use crate::error::{ApiError, ApiResult};
use crate::server::session::Session;
use crate::user::{FullStore, Permission, TokenSigner, UserManager, UserResponse};
use crate::watchlist::WatchlistLedger;

use super::{log_requests, state::*, RequestsLoggingLevel, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct CredentialsBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ChangeRoleBody {
    pub role: Option<String>,
}

#[derive(Serialize)]
struct SignupSuccessResponse {
    email: String,
    token: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    email: String,
    token: String,
    role: &'static str,
}

/// Ids arrive as path strings and a malformed one gets the same domain
/// error body a vanished entity would, not a framework rejection.
fn parse_id(raw: &str, message: &'static str) -> ApiResult<i64> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::not_found(message))
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
    };
    Json(stats)
}

async fn signup(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<CredentialsBody>,
) -> ApiResult<Response> {
    let (user, token) = user_manager.signup(body.email, body.password)?;
    let response = SignupSuccessResponse {
        email: user.email,
        token,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    Json(body): Json<CredentialsBody>,
) -> ApiResult<Response> {
    let (user, token) = user_manager.login(body.email, body.password)?;
    let response = LoginSuccessResponse {
        email: user.email,
        token,
        role: user.role.as_str(),
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

async fn get_users(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
) -> ApiResult<Response> {
    session.require(Permission::ManageUsers)?;
    let users: Vec<UserResponse> = user_manager
        .all_users()?
        .iter()
        .map(UserResponse::from)
        .collect();
    Ok(Json(users).into_response())
}

async fn change_user_role(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path(id): Path<String>,
    Json(body): Json<ChangeRoleBody>,
) -> ApiResult<Response> {
    session.require(Permission::ManageUsers)?;
    let user_id = parse_id(&id, "no such user")?;
    let user = user_manager.change_user_role(user_id, body.role)?;
    Ok(Json(UserResponse::from(&user)).into_response())
}

async fn delete_user(
    session: Session,
    State(user_manager): State<GuardedUserManager>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    session.require(Permission::ManageUsers)?;
    let user_id = parse_id(&id, "no such user")?;
    let user = user_manager.delete_user(user_id)?;
    Ok(Json(UserResponse::from(&user)).into_response())
}

async fn get_movies(session: Session, State(store): State<GuardedStore>) -> ApiResult<Response> {
    session.require(Permission::BrowseCatalog)?;
    Ok(Json(store.get_all_movies()?).into_response())
}

async fn get_movie(
    session: Session,
    State(store): State<GuardedStore>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    session.require(Permission::BrowseCatalog)?;
    let movie_id = parse_id(&id, "no such movie")?;
    let movie = store
        .get_movie(movie_id)?
        .ok_or_else(|| ApiError::not_found("Movie not found"))?;
    Ok(Json(movie).into_response())
}

async fn post_movie(
    session: Session,
    State(store): State<GuardedStore>,
    Json(draft): Json<MovieDraft>,
) -> ApiResult<Response> {
    session.require(Permission::EditCatalog)?;
    let new_movie = draft.into_new_movie().map_err(|empty_fields| {
        ApiError::Validation {
            message: "Please fill in all fields".to_string(),
            empty_fields,
        }
    })?;
    let movie = store.create_movie(new_movie)?;
    Ok((StatusCode::CREATED, Json(movie)).into_response())
}

async fn patch_movie(
    session: Session,
    State(store): State<GuardedStore>,
    Path(id): Path<String>,
    Json(patch): Json<MovieDraft>,
) -> ApiResult<Response> {
    session.require(Permission::EditCatalog)?;
    let movie_id = parse_id(&id, "no such movie")?;
    let movie = store
        .update_movie(movie_id, patch)?
        .ok_or_else(|| ApiError::not_found("Movie not found"))?;
    Ok(Json(movie).into_response())
}

async fn delete_movie(
    session: Session,
    State(store): State<GuardedStore>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    session.require(Permission::EditCatalog)?;
    let movie_id = parse_id(&id, "no such movie")?;
    let movie = store
        .delete_movie(movie_id)?
        .ok_or_else(|| ApiError::not_found("Movie not found"))?;
    Ok(Json(movie).into_response())
}

async fn get_watchlist(
    session: Session,
    State(ledger): State<GuardedWatchlistLedger>,
) -> ApiResult<Response> {
    session.require(Permission::OwnWatchlist)?;
    Ok(Json(ledger.fetch(session.user_id)?).into_response())
}

async fn add_to_watchlist(
    session: Session,
    State(ledger): State<GuardedWatchlistLedger>,
    Path(movie_id): Path<String>,
) -> ApiResult<Response> {
    session.require(Permission::OwnWatchlist)?;
    let movie_id = parse_id(&movie_id, "Movie not found.")?;
    ledger.add(session.user_id, movie_id)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Movie added to watchlist successfully" })),
    )
        .into_response())
}

async fn remove_from_watchlist(
    session: Session,
    State(ledger): State<GuardedWatchlistLedger>,
    Path(movie_id): Path<String>,
) -> ApiResult<Response> {
    session.require(Permission::OwnWatchlist)?;
    let movie_id = parse_id(&movie_id, "Movie not found.")?;
    let removed_id = ledger.remove(session.user_id, movie_id)?;
    Ok((StatusCode::CREATED, Json(removed_id)).into_response())
}

pub fn make_app(
    config: ServerConfig,
    jwt_secret: &str,
    store: Arc<dyn FullStore>,
) -> Router {
    let user_manager = Arc::new(UserManager::new(store.clone(), TokenSigner::new(jwt_secret)));
    let watchlist_ledger = Arc::new(WatchlistLedger::new(store.clone()));
    let state = ServerState::new(config.clone(), store, user_manager, watchlist_ledger);

    let user_routes: Router = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/getUsers", get(get_users))
        .route("/changeUserRole/{id}", post(change_user_role))
        .route("/{id}", delete(delete_user))
        .with_state(state.clone());

    let movie_routes: Router = Router::new()
        .route("/", get(get_movies).post(post_movie))
        .route(
            "/{id}",
            get(get_movie).patch(patch_movie).delete(delete_movie),
        )
        .with_state(state.clone());

    let watchlist_routes: Router = Router::new()
        .route("/", get(get_watchlist))
        .route(
            "/{movie_id}",
            post(add_to_watchlist).delete(remove_from_watchlist),
        )
        .with_state(state.clone());

    let home_router: Router = match &config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    home_router
        .nest("/api/user", user_routes)
        .nest("/api/movies", movie_routes)
        .nest("/api/watchlist", watchlist_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub async fn run_server(
    store: Arc<dyn FullStore>,
    jwt_secret: String,
    requests_logging_level: RequestsLoggingLevel,
    port: u16,
    frontend_dir_path: Option<String>,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
        frontend_dir_path,
    };
    let app = make_app(config, &jwt_secret, store);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
