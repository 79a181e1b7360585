use super::auth::{PasswordCredentials, PasswordDigest};
use super::permissions::UserRole;
use super::user_models::User;
use crate::catalog_store::MovieStore;
use crate::watchlist::WatchlistStore;
use anyhow::Result;

pub trait UserStore: Send + Sync {
    /// Creates a user and stores their credentials in a single transaction,
    /// returning the new user's id. The email UNIQUE constraint is the
    /// duplicate check: Ok(None) means the email is already taken and
    /// nothing was written.
    fn create_user_with_credentials(
        &self,
        email: &str,
        role: UserRole,
        digest: &PasswordDigest,
    ) -> Result<Option<i64>>;

    /// Returns the user with the given id.
    /// Returns Ok(None) if the user does not exist.
    fn get_user(&self, user_id: i64) -> Result<Option<User>>;

    /// Returns the user with the given email.
    /// Returns Ok(None) if the user does not exist.
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Returns all users, most recently created first.
    fn get_all_users(&self) -> Result<Vec<User>>;

    /// Changes a user's role.
    /// Returns the updated user, or Ok(None) if the user does not exist.
    fn set_user_role(&self, user_id: i64, role: UserRole) -> Result<Option<User>>;

    /// Deletes a user. Credentials and the user's watchlist go with it.
    /// Returns the deleted user, or Ok(None) if the user does not exist.
    fn delete_user(&self, user_id: i64) -> Result<Option<User>>;

    /// Returns the user's password credentials.
    /// Returns Ok(None) if the user has none.
    fn get_password_credentials(&self, user_id: i64) -> Result<Option<PasswordCredentials>>;
}

/// Combined trait for the single backing store shared by all managers.
pub trait FullStore: UserStore + MovieStore + WatchlistStore {}

// Blanket implementation for any type that implements all three store traits
impl<T: UserStore + MovieStore + WatchlistStore> FullStore for T {}
