//! User data models

use serde::Serialize;

use super::permissions::UserRole;

/// A registered account. Password material never lives here, it stays in
/// [`super::auth::PasswordCredentials`] and is only loaded for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub role: UserRole,
    /// Unix timestamp of account creation
    pub created: i64,
}

/// The shape users take on the wire, for admin listings and mutations.
#[derive(Serialize, Debug, Clone)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub role: &'static str,
    pub created: i64,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email.clone(),
            role: user.role.as_str(),
            created: user.created,
        }
    }
}
