pub mod auth;
pub mod permissions;
pub mod user_manager;
pub mod user_models;
pub mod user_store;

pub use auth::{CatalogHasher, PasswordCredentials, PasswordDigest, TokenSigner};
pub use permissions::{Permission, UserRole};
pub use user_manager::UserManager;
pub use user_models::{User, UserResponse};
pub use user_store::{FullStore, UserStore};
