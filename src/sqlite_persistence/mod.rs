mod sqlite_store;
mod versioned_schema;

pub use sqlite_store::SqliteStore;
pub use versioned_schema::{
    is_unique_violation, Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
    BASE_DB_VERSION, DEFAULT_TIMESTAMP,
};
