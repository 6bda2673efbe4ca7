//! Email/password auth flow.
//!
//! Run with: cargo run --example auth -p supabase-rest
//!
//! Reads `SUPABASE_URL` and `SUPABASE_KEY` from the environment.

use supabase_rest::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = SupabaseClient::new(SupabaseConfig::from_env()?)?;
    let mut auth = client.auth()?;

    let email = "example-user@example.com";
    let password = "example-password-123";

    if let Err(e) = auth.sign_up_with_email(email, password).await {
        // Already registered is fine for a rerun.
        println!("Sign up failed: {} (stored: {:?})", e, auth.error());
    }

    let session = auth.sign_in_with_email(email, password).await?;
    println!("Signed in, token expires in {}s", session.expires_in);

    let user = auth.get_user(&session.access_token).await?;
    println!("User {} ({:?})", user.id, user.email);
    println!("Authenticated: {}", auth.is_authenticated(&session.access_token).await?);

    let refreshed = auth.refresh_session(&session.refresh_token).await?;
    auth.logout(&refreshed.access_token).await?;
    println!("Logged out");

    Ok(())
}
