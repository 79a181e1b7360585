//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all movie-catalog-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::{RequestBuilder, Response};
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client with bearer-token session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
    /// Session token attached to every request when present
    pub token: Option<String>,
}

impl TestClient {
    /// Creates a new unauthenticated client
    ///
    /// Use this for testing authentication flows.
    /// For most tests, use `authenticated()` or `authenticated_admin()` instead.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self {
            client,
            base_url,
            token: None,
        }
    }

    /// Creates a client pre-authenticated as the regular test user
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated(base_url: String) -> Self {
        Self::authenticated_as(base_url, TEST_USER_EMAIL, TEST_USER_PASS).await
    }

    /// Creates a client pre-authenticated as the admin test user
    ///
    /// Use this for testing admin-only endpoints.
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated_admin(base_url: String) -> Self {
        Self::authenticated_as(base_url, ADMIN_EMAIL, ADMIN_PASS).await
    }

    /// Creates a client pre-authenticated with arbitrary credentials
    pub async fn authenticated_as(base_url: String, email: &str, password: &str) -> Self {
        let mut client = Self::new(base_url);

        let response = client.login(email, password).await;
        let status = response.status();
        let body: Value = response.json().await.expect("Login response is not JSON");
        assert_eq!(
            status,
            reqwest::StatusCode::CREATED,
            "Authentication as {} failed: {:?}",
            email,
            body
        );

        client.token = Some(
            body["token"]
                .as_str()
                .expect("Login response has no token")
                .to_string(),
        );
        client
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /api/user/signup
    pub async fn signup(&self, email: &str, password: &str) -> Response {
        self.signup_raw(&json!({ "email": email, "password": password }))
            .await
    }

    /// POST /api/user/signup with an arbitrary body
    ///
    /// Useful for testing missing-field validation.
    pub async fn signup_raw(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/api/user/signup", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Signup request failed")
    }

    /// POST /api/user/login
    pub async fn login(&self, email: &str, password: &str) -> Response {
        self.login_raw(&json!({ "email": email, "password": password }))
            .await
    }

    /// POST /api/user/login with an arbitrary body
    pub async fn login_raw(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/api/user/login", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Login request failed")
    }

    // ========================================================================
    // User Administration Endpoints
    // ========================================================================

    /// GET /api/user/getUsers
    pub async fn get_users(&self) -> Response {
        self.with_auth(
            self.client
                .get(format!("{}/api/user/getUsers", self.base_url)),
        )
        .send()
        .await
        .expect("Get users request failed")
    }

    /// POST /api/user/changeUserRole/{id}
    pub async fn change_user_role(&self, user_id: i64, role: &str) -> Response {
        self.with_auth(self.client.post(format!(
            "{}/api/user/changeUserRole/{}",
            self.base_url, user_id
        )))
        .json(&json!({ "role": role }))
        .send()
        .await
        .expect("Change user role request failed")
    }

    /// DELETE /api/user/{id}
    pub async fn delete_user(&self, user_id: i64) -> Response {
        self.with_auth(
            self.client
                .delete(format!("{}/api/user/{}", self.base_url, user_id)),
        )
        .send()
        .await
        .expect("Delete user request failed")
    }

    // ========================================================================
    // Movie Endpoints
    // ========================================================================

    /// GET /api/movies
    pub async fn get_movies(&self) -> Response {
        self.with_auth(self.client.get(format!("{}/api/movies", self.base_url)))
            .send()
            .await
            .expect("Get movies request failed")
    }

    /// GET /api/movies/{id}
    pub async fn get_movie(&self, movie_id: i64) -> Response {
        self.with_auth(
            self.client
                .get(format!("{}/api/movies/{}", self.base_url, movie_id)),
        )
        .send()
        .await
        .expect("Get movie request failed")
    }

    /// POST /api/movies
    pub async fn post_movie(&self, body: &Value) -> Response {
        self.with_auth(self.client.post(format!("{}/api/movies", self.base_url)))
            .json(body)
            .send()
            .await
            .expect("Post movie request failed")
    }

    /// PATCH /api/movies/{id}
    pub async fn patch_movie(&self, movie_id: i64, body: &Value) -> Response {
        self.with_auth(
            self.client
                .patch(format!("{}/api/movies/{}", self.base_url, movie_id)),
        )
        .json(body)
        .send()
        .await
        .expect("Patch movie request failed")
    }

    /// DELETE /api/movies/{id}
    pub async fn delete_movie(&self, movie_id: i64) -> Response {
        self.with_auth(
            self.client
                .delete(format!("{}/api/movies/{}", self.base_url, movie_id)),
        )
        .send()
        .await
        .expect("Delete movie request failed")
    }

    // ========================================================================
    // Watchlist Endpoints
    // ========================================================================

    /// GET /api/watchlist
    pub async fn get_watchlist(&self) -> Response {
        self.with_auth(self.client.get(format!("{}/api/watchlist", self.base_url)))
            .send()
            .await
            .expect("Get watchlist request failed")
    }

    /// POST /api/watchlist/{movie_id}
    pub async fn add_to_watchlist(&self, movie_id: i64) -> Response {
        self.with_auth(
            self.client
                .post(format!("{}/api/watchlist/{}", self.base_url, movie_id)),
        )
        .send()
        .await
        .expect("Add to watchlist request failed")
    }

    /// DELETE /api/watchlist/{movie_id}
    pub async fn remove_from_watchlist(&self, movie_id: i64) -> Response {
        self.with_auth(
            self.client
                .delete(format!("{}/api/watchlist/{}", self.base_url, movie_id)),
        )
        .send()
        .await
        .expect("Remove from watchlist request failed")
    }
}
