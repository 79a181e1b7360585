//! Test fixture creation for the server database
//!
//! Each test server gets a fresh SQLite file seeded with two users
//! (one regular, one admin) and two movies.

use super::constants::*;
use anyhow::{anyhow, Result};
use movie_catalog_server::catalog_store::{MovieStore, NewMovie};
use movie_catalog_server::user::{CatalogHasher, PasswordDigest, UserRole, UserStore};
use movie_catalog_server::SqliteStore;
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary database with the test users and seeded movies.
/// Returns (temp_dir, db_path).
pub fn create_test_db() -> Result<(TempDir, PathBuf)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");

    {
        let store = SqliteStore::new(&db_path)?;

        let user_id = create_user_with_password_and_role(
            &store,
            TEST_USER_EMAIL,
            TEST_USER_PASS,
            UserRole::Regular,
        )?;
        eprintln!("Created test user {} with id {}", TEST_USER_EMAIL, user_id);

        let admin_id =
            create_user_with_password_and_role(&store, ADMIN_EMAIL, ADMIN_PASS, UserRole::Admin)?;
        eprintln!("Created admin user {} with id {}", ADMIN_EMAIL, admin_id);

        seed_movies(&store)?;
    }

    Ok((temp_dir, db_path))
}

/// Creates a user with the given credentials and role
pub fn create_user_with_password_and_role(
    store: &SqliteStore,
    email: &str,
    password: &str,
    role: UserRole,
) -> Result<i64> {
    let hasher = CatalogHasher::default_hasher();
    let digest = PasswordDigest::generate(&hasher, password)?;
    store
        .create_user_with_credentials(email, role, &digest)?
        .ok_or_else(|| anyhow!("Test user {} already exists", email))
}

/// Inserts the two seeded movies. Their rowids end up as MOVIE_1_ID and
/// MOVIE_2_ID because the movie table is empty at this point.
fn seed_movies(store: &SqliteStore) -> Result<()> {
    let movie_1 = store.create_movie(NewMovie {
        title: MOVIE_1_TITLE.to_string(),
        genre: "Noir".to_string(),
        summary: "A private eye drifts through a case nobody wants solved.".to_string(),
        director: "Robert Altman".to_string(),
        year: "1973".to_string(),
        image: "https://example.com/posters/long-goodbye.jpg".to_string(),
    })?;
    assert_eq!(movie_1.id, MOVIE_1_ID);

    let movie_2 = store.create_movie(NewMovie {
        title: MOVIE_2_TITLE.to_string(),
        genre: "Sci-Fi".to_string(),
        summary: "A guide leads two men into a forbidden zone.".to_string(),
        director: "Andrei Tarkovsky".to_string(),
        year: "1979".to_string(),
        image: "https://example.com/posters/stalker.jpg".to_string(),
    })?;
    assert_eq!(movie_2.id, MOVIE_2_ID);

    Ok(())
}
