// Re-export core (always available)
pub use supabase_rest_core::*;

// Re-export query builder and table accessor (feature-gated)
#[cfg(feature = "query")]
pub use supabase_rest_query::*;

// Re-export auth crate
#[cfg(feature = "auth")]
pub use supabase_rest_auth;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use supabase_rest::prelude::*;
/// ```
pub mod prelude {
    pub use supabase_rest_core::{
        EndpointConfig, HttpMethod, RequestExecutor, SupabaseClient, SupabaseConfig,
        SupabaseError, SupabaseResult,
    };

    #[cfg(feature = "query")]
    pub use supabase_rest_query::{
        CustomQuery, Database, Filter, FilterOperator, JoinSpec, OrderDirection, QueryBuilder,
        SupabaseClientQueryExt,
    };

    #[cfg(feature = "auth")]
    pub use supabase_rest_auth::{AuthClient, Session, SupabaseClientAuthExt, User};
}
