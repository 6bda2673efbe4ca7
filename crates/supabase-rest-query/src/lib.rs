//! PostgREST query construction and table accessors.
//!
//! - [`QueryBuilder`]: value-type builder for select/join/filter/order/limit/range.
//! - [`CustomQuery`]: declarative (and JSON) form of the same, validated eagerly.
//! - [`Database`]: accessor bound to one table with CRUD and filtered fetches.

pub mod builder;
pub mod clause;
pub mod custom;
pub mod database;
pub mod postgrest;

pub use builder::{BuiltQuery, QueryBuilder};
pub use clause::{Filter, FilterOperator, JoinSpec, OrderDirection};
pub use custom::CustomQuery;
pub use database::{Database, RETURN_REPRESENTATION};

use supabase_rest_core::{SupabaseClient, SupabaseResult};

/// Extension trait adding table accessors to SupabaseClient.
pub trait SupabaseClientQueryExt {
    /// Accessor for `table`, keyed by `primary_key`, with its own executor.
    fn database(&self, table: &str, primary_key: &str) -> SupabaseResult<Database>;
}

impl SupabaseClientQueryExt for SupabaseClient {
    fn database(&self, table: &str, primary_key: &str) -> SupabaseResult<Database> {
        Ok(Database::new(self.rest_executor()?, table, primary_key))
    }
}
