use crate::catalog_store::{Movie, MovieDraft, MovieStore, NewMovie};
use crate::sqlite_column;
use crate::sqlite_persistence::{
    is_unique_violation, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    BASE_DB_VERSION, DEFAULT_TIMESTAMP,
};
use crate::user::auth::{PasswordCredentials, PasswordDigest};
use crate::user::{CatalogHasher, User, UserRole, UserStore};
use crate::watchlist::{WatchlistAddOutcome, WatchlistRemoveOutcome, WatchlistStore};
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::{
    path::Path,
    str::FromStr,
    sync::{Arc, Mutex},
};
use tracing::info;

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("email", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!("role", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[("idx_user_email", "email")],
};
const USER_PASSWORD_CREDENTIALS_TABLE_V_0: Table = Table {
    name: "user_password_credentials",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!("salt", &SqlType::Text, non_null = true),
        sqlite_column!("hash", &SqlType::Text, non_null = true),
        sqlite_column!("hasher", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[],
};
const MOVIE_TABLE_V_0: Table = Table {
    name: "movie",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("genre", &SqlType::Text, non_null = true),
        sqlite_column!("summary", &SqlType::Text, non_null = true),
        sqlite_column!("director", &SqlType::Text, non_null = true),
        sqlite_column!("year", &SqlType::Text, non_null = true),
        sqlite_column!("image", &SqlType::Text, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[],
};
const WATCHLIST_TABLE_V_0: Table = Table {
    name: "watchlist",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            is_unique = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "user",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[],
    indices: &[],
};
const WATCHLIST_MOVIE_TABLE_V_0: Table = Table {
    name: "watchlist_movie",
    columns: &[
        sqlite_column!(
            "id",
            &SqlType::Integer,
            is_primary_key = true,
            is_unique = true
        ),
        sqlite_column!(
            "watchlist_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "watchlist",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!(
            "movie_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "movie",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Cascade,
            })
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    unique_constraints: &[&["watchlist_id", "movie_id"]],
    indices: &[("idx_watchlist_movie_watchlist_id", "watchlist_id")],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[
        USER_TABLE_V_0,
        USER_PASSWORD_CREDENTIALS_TABLE_V_0,
        MOVIE_TABLE_V_0,
        WATCHLIST_TABLE_V_0,
        WATCHLIST_MOVIE_TABLE_V_0,
    ],
    migration: None,
}];

#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let conn = if db_path.as_ref().exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?
        } else {
            let conn = Connection::open(db_path)?;
            VERSIONED_SCHEMAS.last().unwrap().create(&conn)?;
            conn
        };
        // Foreign keys are off by default, and the cascades depend on them
        conn.execute("PRAGMA foreign_keys = ON;", [])?;

        let db_version = conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
            .context("Failed to read database version")?
            - BASE_DB_VERSION as i64;

        if db_version < 0 {
            bail!(
                "Database version {} is too old, does not contain base db version {}",
                db_version,
                BASE_DB_VERSION
            );
        }
        let version = db_version as usize;

        if db_version >= VERSIONED_SCHEMAS.len() as i64 {
            bail!("Database version {} is too new", db_version);
        } else {
            VERSIONED_SCHEMAS
                .get(version)
                .context("Failed to get schema")?
                .validate(&conn)?;
        }

        Self::migrate_if_needed(&conn, version)?;

        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<()> {
        let mut latest_from = version;
        for schema in VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating db from version {} to {}",
                    latest_from, schema.version
                );
                migration_fn(conn)?;
                latest_from = schema.version;
            }
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;

        Ok(())
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let role_str: String = row.get(2)?;
    let role = UserRole::from_str(&role_str).ok_or_else(|| {
        rusqlite::Error::InvalidColumnType(2, "role".to_string(), rusqlite::types::Type::Text)
    })?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        role,
        created: row.get(3)?,
    })
}

fn movie_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: row.get(0)?,
        title: row.get(1)?,
        genre: row.get(2)?,
        summary: row.get(3)?,
        director: row.get(4)?,
        year: row.get(5)?,
        image: row.get(6)?,
        created: row.get(7)?,
    })
}

const USER_COLUMNS: &str = "id, email, role, created";
const MOVIE_COLUMNS: &str = "id, title, genre, summary, director, year, image, created";

impl UserStore for SqliteStore {
    fn create_user_with_credentials(
        &self,
        email: &str,
        role: UserRole,
        digest: &PasswordDigest,
    ) -> Result<Option<i64>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        // The UNIQUE constraint on email does the duplicate check, not us
        let user_id = match tx.execute(
            &format!(
                "INSERT INTO {} (email, role) VALUES (?1, ?2)",
                USER_TABLE_V_0.name
            ),
            params![email, role.as_str()],
        ) {
            Ok(_) => tx.last_insert_rowid(),
            Err(err) if is_unique_violation(&err) => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to create user {}", email))
            }
        };
        tx.execute(
            &format!(
                "INSERT INTO {} (user_id, salt, hash, hasher) VALUES (?1, ?2, ?3, ?4)",
                USER_PASSWORD_CREDENTIALS_TABLE_V_0.name
            ),
            params![user_id, digest.salt, digest.hash, digest.hasher.to_string()],
        )?;
        tx.commit()?;
        Ok(Some(user_id))
    }

    fn get_user(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let user = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE id = ?1",
                    USER_COLUMNS, USER_TABLE_V_0.name
                ),
                params![user_id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn.lock().unwrap();
        let user = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE email = ?1",
                    USER_COLUMNS, USER_TABLE_V_0.name
                ),
                params![email],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_all_users(&self) -> Result<Vec<User>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY created DESC, id DESC",
            USER_COLUMNS, USER_TABLE_V_0.name
        ))?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<User>, _>>()?;
        Ok(users)
    }

    fn set_user_role(&self, user_id: i64, role: UserRole) -> Result<Option<User>> {
        let changed = {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                &format!(
                    "UPDATE {} SET role = ?1 WHERE id = ?2",
                    USER_TABLE_V_0.name
                ),
                params![role.as_str(), user_id],
            )?
        };
        if changed == 0 {
            return Ok(None);
        }
        self.get_user(user_id)
    }

    fn delete_user(&self, user_id: i64) -> Result<Option<User>> {
        let Some(user) = self.get_user(user_id)? else {
            return Ok(None);
        };
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", USER_TABLE_V_0.name),
            params![user_id],
        )?;
        Ok(Some(user))
    }

    fn get_password_credentials(&self, user_id: i64) -> Result<Option<PasswordCredentials>> {
        let conn = self.conn.lock().unwrap();
        let credentials = conn
            .query_row(
                &format!(
                    "SELECT user_id, salt, hash, hasher, created FROM {} WHERE user_id = ?1",
                    USER_PASSWORD_CREDENTIALS_TABLE_V_0.name
                ),
                params![user_id],
                |row| {
                    let hasher_str: String = row.get(3)?;
                    let hasher = CatalogHasher::from_str(&hasher_str).map_err(|_| {
                        rusqlite::Error::InvalidColumnType(
                            3,
                            "hasher".to_string(),
                            rusqlite::types::Type::Text,
                        )
                    })?;
                    Ok(PasswordCredentials {
                        user_id: row.get(0)?,
                        salt: row.get(1)?,
                        hash: row.get(2)?,
                        hasher,
                        created: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(credentials)
    }
}

impl MovieStore for SqliteStore {
    fn create_movie(&self, movie: NewMovie) -> Result<Movie> {
        let movie_id = {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                &format!(
                    "INSERT INTO {} (title, genre, summary, director, year, image) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    MOVIE_TABLE_V_0.name
                ),
                params![
                    movie.title,
                    movie.genre,
                    movie.summary,
                    movie.director,
                    movie.year,
                    movie.image
                ],
            )
            .with_context(|| format!("Failed to create movie {}", movie.title))?;
            conn.last_insert_rowid()
        };
        self.get_movie(movie_id)?
            .context("Movie vanished right after insertion")
    }

    fn get_movie(&self, movie_id: i64) -> Result<Option<Movie>> {
        let conn = self.conn.lock().unwrap();
        let movie = conn
            .query_row(
                &format!(
                    "SELECT {} FROM {} WHERE id = ?1",
                    MOVIE_COLUMNS, MOVIE_TABLE_V_0.name
                ),
                params![movie_id],
                movie_from_row,
            )
            .optional()?;
        Ok(movie)
    }

    fn get_all_movies(&self) -> Result<Vec<Movie>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY created DESC, id DESC",
            MOVIE_COLUMNS, MOVIE_TABLE_V_0.name
        ))?;
        let movies = stmt
            .query_map([], movie_from_row)?
            .collect::<Result<Vec<Movie>, _>>()?;
        Ok(movies)
    }

    fn update_movie(&self, movie_id: i64, patch: MovieDraft) -> Result<Option<Movie>> {
        let Some(existing) = self.get_movie(movie_id)? else {
            return Ok(None);
        };
        // Permissive merge: absent fields keep their current value
        let merged = Movie {
            id: existing.id,
            title: patch.title.unwrap_or(existing.title),
            genre: patch.genre.unwrap_or(existing.genre),
            summary: patch.summary.unwrap_or(existing.summary),
            director: patch.director.unwrap_or(existing.director),
            year: patch.year.unwrap_or(existing.year),
            image: patch.image.unwrap_or(existing.image),
            created: existing.created,
        };
        {
            let conn = self.conn.lock().unwrap();
            conn.execute(
                &format!(
                    "UPDATE {} SET title = ?1, genre = ?2, summary = ?3, director = ?4, \
                     year = ?5, image = ?6 WHERE id = ?7",
                    MOVIE_TABLE_V_0.name
                ),
                params![
                    merged.title,
                    merged.genre,
                    merged.summary,
                    merged.director,
                    merged.year,
                    merged.image,
                    movie_id
                ],
            )?;
        }
        Ok(Some(merged))
    }

    fn delete_movie(&self, movie_id: i64) -> Result<Option<Movie>> {
        let Some(movie) = self.get_movie(movie_id)? else {
            return Ok(None);
        };
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", MOVIE_TABLE_V_0.name),
            params![movie_id],
        )?;
        Ok(Some(movie))
    }
}

impl WatchlistStore for SqliteStore {
    fn add_watchlist_entry(&self, user_id: i64, movie_id: i64) -> Result<WatchlistAddOutcome> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        tx.execute(
            &format!(
                "INSERT OR IGNORE INTO {} (user_id) VALUES (?1)",
                WATCHLIST_TABLE_V_0.name
            ),
            params![user_id],
        )?;
        let watchlist_id: i64 = tx.query_row(
            &format!(
                "SELECT id FROM {} WHERE user_id = ?1",
                WATCHLIST_TABLE_V_0.name
            ),
            params![user_id],
            |row| row.get(0),
        )?;
        // The UNIQUE constraint does the membership check, not us
        let outcome = match tx.execute(
            &format!(
                "INSERT INTO {} (watchlist_id, movie_id) VALUES (?1, ?2)",
                WATCHLIST_MOVIE_TABLE_V_0.name
            ),
            params![watchlist_id, movie_id],
        ) {
            Ok(_) => WatchlistAddOutcome::Added,
            Err(err) if is_unique_violation(&err) => WatchlistAddOutcome::AlreadyPresent,
            Err(err) => return Err(err.into()),
        };
        tx.commit()?;
        Ok(outcome)
    }

    fn remove_watchlist_entry(
        &self,
        user_id: i64,
        movie_id: i64,
    ) -> Result<WatchlistRemoveOutcome> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute(
            &format!(
                "DELETE FROM {} WHERE movie_id = ?1 AND watchlist_id = \
                 (SELECT id FROM {} WHERE user_id = ?2)",
                WATCHLIST_MOVIE_TABLE_V_0.name, WATCHLIST_TABLE_V_0.name
            ),
            params![movie_id, user_id],
        )?;
        Ok(if deleted > 0 {
            WatchlistRemoveOutcome::Removed
        } else {
            WatchlistRemoveOutcome::NotPresent
        })
    }

    fn get_watchlist_movies(&self, user_id: i64) -> Result<Option<Vec<Movie>>> {
        let conn = self.conn.lock().unwrap();
        let watchlist_id: Option<i64> = conn
            .query_row(
                &format!(
                    "SELECT id FROM {} WHERE user_id = ?1",
                    WATCHLIST_TABLE_V_0.name
                ),
                params![user_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(watchlist_id) = watchlist_id else {
            return Ok(None);
        };
        let mut stmt = conn.prepare(&format!(
            "SELECT m.id, m.title, m.genre, m.summary, m.director, m.year, m.image, m.created \
             FROM {} m JOIN {} wm ON wm.movie_id = m.id \
             WHERE wm.watchlist_id = ?1 ORDER BY wm.id ASC",
            MOVIE_TABLE_V_0.name, WATCHLIST_MOVIE_TABLE_V_0.name
        ))?;
        let movies = stmt
            .query_map(params![watchlist_id], movie_from_row)?
            .collect::<Result<Vec<Movie>, _>>()?;
        Ok(Some(movies))
    }
}
