//! Storable trait for database-agnostic storage operations.
//!
//! Types implementing `Storable` can be stored in any supported database
//! backend. The store holds exactly two record types, so the implementations
//! live next to the types instead of behind a derive macro.

/// Trait for types that can be stored in a database.
///
/// # Column Naming
///
/// Database columns use snake_case (Rust field names). JSON serialization
/// uses camelCase; `json_keys()` maps between the two.
pub trait Storable: serde::Serialize + serde::de::DeserializeOwned + Clone + Send + Sync {
    /// The database table name for this type.
    fn table_name() -> &'static str;

    /// Column names in order (snake_case for DB).
    fn columns() -> &'static [&'static str];

    /// Column types in order (database-agnostic).
    /// Used by executors to bind null values with the correct type.
    /// Values: "text", "datetime", "bigint", "integer", "boolean", "json"
    fn column_types() -> &'static [&'static str];

    /// JSON key names in order (camelCase for serde).
    /// Corresponds 1:1 with columns().
    fn json_keys() -> &'static [&'static str];

    /// Number of columns.
    fn column_count() -> usize {
        Self::columns().len()
    }

    /// Get the primary key value as text.
    fn id(&self) -> String;
}
