//! Supabase Auth (GoTrue) client.
//!
//! Thin wrappers over fixed auth endpoints (`signup`, `token`, `magiclink`,
//! `otp`, `recover`, `logout`, `user`), all sent through the core
//! request executor.
//!
//! # Usage
//!
//! ```ignore
//! use supabase_rest::prelude::*;
//!
//! let client = SupabaseClient::new(config)?;
//! let mut auth = client.auth()?;
//!
//! auth.sign_up_with_email("user@example.com", "password123").await?;
//! let session = auth.sign_in_with_email("user@example.com", "password123").await?;
//! let user = auth.get_user(&session.access_token).await?;
//! ```

pub mod client;
pub mod types;

pub use client::AuthClient;
pub use types::*;

use supabase_rest_core::{SupabaseClient, SupabaseResult};

/// Extension trait to create an [`AuthClient`] from a [`SupabaseClient`].
pub trait SupabaseClientAuthExt {
    /// Create an [`AuthClient`] sharing the client's HTTP connection pool.
    fn auth(&self) -> SupabaseResult<AuthClient>;
}

impl SupabaseClientAuthExt for SupabaseClient {
    fn auth(&self) -> SupabaseResult<AuthClient> {
        Ok(AuthClient::from_executor(self.auth_executor()?))
    }
}
