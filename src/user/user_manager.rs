//! Account lifecycle: signup, login, token authentication and the
//! administrative user operations.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ApiError, ApiResult};

use super::auth::{CatalogHasher, PasswordDigest, TokenSigner};
use super::permissions::UserRole;
use super::user_models::User;
use super::user_store::FullStore;

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

const MIN_PASSWORD_LEN: usize = 6;

pub struct UserManager {
    store: Arc<dyn FullStore>,
    signer: TokenSigner,
    hasher: CatalogHasher,
}

impl UserManager {
    pub fn new(store: Arc<dyn FullStore>, signer: TokenSigner) -> UserManager {
        UserManager {
            store,
            signer,
            hasher: CatalogHasher::default_hasher(),
        }
    }

    /// Registers a new account with the Regular role and hands out a token.
    pub fn signup(
        &self,
        email: Option<String>,
        password: Option<String>,
    ) -> ApiResult<(User, String)> {
        let (email, password) = require_both(email, password)?;
        if !EMAIL_RE.is_match(&email) {
            return Err(ApiError::validation("Email not valid"));
        }
        if password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::validation("Password not strong enough"));
        }
        // User and credentials land in one transaction; the email UNIQUE
        // constraint is the only duplicate check, so two racing signups
        // cannot both get through.
        let digest = PasswordDigest::generate(&self.hasher, &password)?;
        let user_id = self
            .store
            .create_user_with_credentials(&email, UserRole::Regular, &digest)?
            .ok_or_else(|| ApiError::conflict("Email already in use"))?;

        let user = self
            .store
            .get_user(user_id)?
            .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("User vanished after signup")))?;
        let token = self.signer.issue(user_id)?;
        tracing::info!("New signup: {}", user.email);
        Ok((user, token))
    }

    pub fn login(
        &self,
        email: Option<String>,
        password: Option<String>,
    ) -> ApiResult<(User, String)> {
        let (email, password) = require_both(email, password)?;
        let user = self
            .store
            .get_user_by_email(&email)?
            .ok_or_else(|| ApiError::auth("Incorrect email"))?;
        let credentials = self
            .store
            .get_password_credentials(user.id)?
            .ok_or_else(|| ApiError::auth("Incorrect password"))?;
        let verified = credentials.hasher.verify(
            password.as_str(),
            credentials.hash.as_str(),
            credentials.salt.as_str(),
        )?;
        if !verified {
            return Err(ApiError::auth("Incorrect password"));
        }
        let token = self.signer.issue(user.id)?;
        Ok((user, token))
    }

    /// Resolves a bearer token to the user it belongs to. Any failure,
    /// bad signature, expiry or a user deleted since issuance, is the
    /// same opaque rejection.
    pub fn authenticate(&self, token: &str) -> ApiResult<User> {
        let user_id = self
            .signer
            .verify(token)
            .map_err(|_| ApiError::auth("Request is not authorized"))?;
        self.store
            .get_user(user_id)?
            .ok_or_else(|| ApiError::auth("Request is not authorized"))
    }

    pub fn all_users(&self) -> ApiResult<Vec<User>> {
        Ok(self.store.get_all_users()?)
    }

    pub fn change_user_role(&self, user_id: i64, role: Option<String>) -> ApiResult<User> {
        let role = role
            .as_deref()
            .and_then(UserRole::from_str)
            .ok_or_else(|| ApiError::validation("no such role"))?;
        self.store
            .set_user_role(user_id, role)?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub fn delete_user(&self, user_id: i64) -> ApiResult<User> {
        let user = self
            .store
            .delete_user(user_id)?
            .ok_or_else(|| ApiError::not_found("User not found"))?;
        tracing::info!("Deleted user {}", user.email);
        Ok(user)
    }
}

fn require_both(
    email: Option<String>,
    password: Option<String>,
) -> ApiResult<(String, String)> {
    match (email, password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            Ok((email, password))
        }
        _ => Err(ApiError::validation("All fields must be filled")),
    }
}
