//! Basic table accessor and query builder usage.
//!
//! Run with: cargo run --example query_basics -p supabase-rest
//!
//! Reads `SUPABASE_URL` and `SUPABASE_KEY` from the environment.

use serde_json::json;
use supabase_rest::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = SupabaseClient::new(SupabaseConfig::from_env()?)?;
    let mut cities = client.database("cities", "id")?;

    // ── INSERT ──
    let created = cities
        .insert(&json!({"name": "Auckland", "country_id": 554}))
        .await?;
    println!("Inserted: {}", created);

    // ── SELECT all rows ──
    println!("=== All cities ===");
    for row in cities.fetch_all().await?.result().as_array().into_iter().flatten() {
        println!("  {}", row);
    }

    // ── Filters ──
    if let Some(city) = cities.find_by("name", "Auckland").await?.first_result() {
        println!("\nFound: {}", city);
    }
    let matches = cities.find_by_like("name", "uck").await?.result().clone();
    println!("Like 'uck': {}", matches);

    // ── Embedded join ──
    println!("\nWith countries: {}", cities.join("countries", "country_id").await?.result());

    // ── Declarative query with Range pagination ──
    let query = CustomQuery::new()
        .select("id,name")
        .join(JoinSpec::new("countries", "country_id").select("name"))
        .filter("population", "gt.100000")
        .order("name.asc")
        .range("0-9");
    cities.create_custom_query(query).await?;
    println!("\nFirst page: {}", cities.result());

    // ── UPDATE / DELETE ──
    if let Some(id) = created.get(0).and_then(|row| row.get("id")).and_then(|id| id.as_i64()) {
        cities.update(id, &json!({"name": "Tāmaki Makaurau"})).await?;
        cities.delete(id).await?;
    }

    Ok(())
}
