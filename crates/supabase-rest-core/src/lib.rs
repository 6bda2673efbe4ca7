//! Core pieces shared by the supabase-rest crates: configuration, the error
//! type, and the [`RequestExecutor`] through which every HTTP call passes.

pub mod client;
pub mod config;
pub mod error;
pub mod executor;

pub use client::SupabaseClient;
pub use config::{EndpointConfig, SupabaseConfig, AUTH_PATH, REST_PATH};
pub use error::{SupabaseError, SupabaseResult};
pub use executor::{error_message, HttpMethod, RawResponse, RequestExecutor};
