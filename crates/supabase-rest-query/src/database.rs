use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value as JsonValue;

use supabase_rest_core::{HttpMethod, RequestExecutor, SupabaseResult};

use crate::custom::CustomQuery;
use crate::postgrest::{self, QueryParam};

/// `Prefer` value asking PostgREST to return affected rows.
pub const RETURN_REPRESENTATION: &str = "return=representation";

/// Accessor bound to one table and its primary key.
///
/// Owns its own [`RequestExecutor`], so headers and error state belong to
/// this accessor only. Fetch operations store their rows and return
/// `&mut Self` for chaining:
///
/// ```ignore
/// let mut cities = client.database("cities", "id")?;
/// let first = cities.find_by("name", "Auckland").await?.first_result().cloned();
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    executor: RequestExecutor,
    table: String,
    primary_key: String,
    result: JsonValue,
}

impl Database {
    pub fn new(executor: RequestExecutor, table: impl Into<String>, primary_key: impl Into<String>) -> Self {
        Self {
            executor,
            table: table.into(),
            primary_key: primary_key.into(),
            result: JsonValue::Array(Vec::new()),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Mutable access, e.g. to set `Authorization` or `Prefer` before a call.
    pub fn executor_mut(&mut self) -> &mut RequestExecutor {
        &mut self.executor
    }

    /// Message of the last failed call on this accessor.
    pub fn error(&self) -> Option<&str> {
        self.executor.last_error()
    }

    // ─── Results ──────────────────────────────────────────────

    /// The value stored by the most recent operation.
    pub fn result(&self) -> &JsonValue {
        &self.result
    }

    /// First row of the stored result; `None` when empty or not a list.
    pub fn first_result(&self) -> Option<&JsonValue> {
        self.result.as_array().and_then(|rows| rows.first())
    }

    /// Decode the stored rows into typed records.
    ///
    /// A single object is decoded as a one-element list and `null` as an empty one.
    pub fn result_as<T: DeserializeOwned>(&self) -> SupabaseResult<Vec<T>> {
        match &self.result {
            JsonValue::Null => Ok(Vec::new()),
            JsonValue::Array(_) => Ok(serde_json::from_value(self.result.clone())?),
            other => Ok(vec![serde_json::from_value(other.clone())?]),
        }
    }

    // ─── Mutations ────────────────────────────────────────────

    /// POST a new record. Returns the created row(s).
    pub async fn insert<R: Serialize + ?Sized>(&mut self, record: &R) -> SupabaseResult<JsonValue> {
        let body = self.encode_record(record)?;
        self.execute_dml(HttpMethod::Post, Some(body), None).await
    }

    /// PATCH the record whose primary key equals `id`.
    pub async fn update<R: Serialize + ?Sized>(
        &mut self,
        id: impl fmt::Display,
        record: &R,
    ) -> SupabaseResult<JsonValue> {
        let body = self.encode_record(record)?;
        let filter = postgrest::primary_key_param(&self.primary_key, id);
        self.execute_dml(HttpMethod::Patch, Some(body), Some(filter)).await
    }

    /// DELETE the record whose primary key equals `id`.
    pub async fn delete(&mut self, id: impl fmt::Display) -> SupabaseResult<JsonValue> {
        let filter = postgrest::primary_key_param(&self.primary_key, id);
        self.execute_dml(HttpMethod::Delete, None, Some(filter)).await
    }

    fn encode_record<R: Serialize + ?Sized>(&mut self, record: &R) -> SupabaseResult<JsonValue> {
        serde_json::to_value(record).map_err(|e| self.executor.record_error(e.into()))
    }

    async fn execute_dml(
        &mut self,
        method: HttpMethod,
        body: Option<JsonValue>,
        filter: Option<QueryParam>,
    ) -> SupabaseResult<JsonValue> {
        self.executor
            .set_header_if_absent("Prefer", RETURN_REPRESENTATION)?;

        let query = filter.map(|filter| postgrest::encode_params(&[filter]));
        let uri = self
            .executor
            .uri(&postgrest::table_endpoint(&self.table, query.as_deref()));
        let value = self.executor.execute(method, &uri, body).await?;
        self.result = value.clone();
        Ok(value)
    }

    // ─── Fetches ──────────────────────────────────────────────

    /// `select=*`
    pub async fn fetch_all(&mut self) -> SupabaseResult<&mut Self> {
        self.execute_query(postgrest::select_all_params()).await
    }

    /// `select=*&column=eq.value`
    pub async fn find_by(&mut self, column: &str, value: impl fmt::Display) -> SupabaseResult<&mut Self> {
        self.execute_query(postgrest::find_by_params(column, value)).await
    }

    /// `select=*&column=like.%value%`. Wildcards inside `value` are not escaped.
    pub async fn find_by_like(&mut self, column: &str, value: impl fmt::Display) -> SupabaseResult<&mut Self> {
        self.execute_query(postgrest::find_by_like_params(column, value)).await
    }

    /// `select=*,table(key,*)`
    pub async fn join(&mut self, foreign_table: &str, foreign_key: &str) -> SupabaseResult<&mut Self> {
        self.execute_query(postgrest::join_params(foreign_table, foreign_key)).await
    }

    /// Run a declarative query. `from` defaults to this accessor's table.
    pub async fn create_custom_query(&mut self, query: CustomQuery) -> SupabaseResult<&mut Self> {
        let builder = query.into_builder(&self.table)?;
        self.result = builder.execute(&mut self.executor).await?;
        Ok(self)
    }

    async fn execute_query(&mut self, params: Vec<QueryParam>) -> SupabaseResult<&mut Self> {
        let query = postgrest::encode_params(&params);
        let uri = self
            .executor
            .uri(&postgrest::table_endpoint(&self.table, Some(&query)));
        self.result = self.executor.execute(HttpMethod::Get, &uri, None).await?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;
    use supabase_rest_core::{EndpointConfig, SupabaseError};

    fn database() -> Database {
        let endpoint = EndpointConfig::new("https://example.supabase.co/rest/v1", "key").unwrap();
        Database::new(RequestExecutor::new(endpoint).unwrap(), "cities", "id")
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct City {
        id: i64,
        name: String,
    }

    #[test]
    fn new_database_has_empty_result() {
        let db = database();
        assert_eq!(db.result(), &json!([]));
        assert!(db.first_result().is_none());
        assert!(db.error().is_none());
        assert_eq!(db.table(), "cities");
        assert_eq!(db.primary_key(), "id");
    }

    #[test]
    fn first_result_of_non_list_is_none() {
        let mut db = database();
        db.result = json!({"id": 1});
        assert!(db.first_result().is_none());
        db.result = JsonValue::Null;
        assert!(db.first_result().is_none());
    }

    #[test]
    fn result_as_decodes_rows() {
        let mut db = database();
        db.result = json!([{"id": 1, "name": "Auckland"}, {"id": 2, "name": "Wellington"}]);
        let cities: Vec<City> = db.result_as().unwrap();
        assert_eq!(cities.len(), 2);
        assert_eq!(cities[1].name, "Wellington");

        db.result = json!({"id": 3, "name": "Tokyo"});
        let cities: Vec<City> = db.result_as().unwrap();
        assert_eq!(cities, vec![City { id: 3, name: "Tokyo".into() }]);

        db.result = JsonValue::Null;
        assert!(db.result_as::<City>().unwrap().is_empty());
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("record cannot be encoded"))
        }
    }

    #[tokio::test]
    async fn unencodable_record_is_stored_as_error() {
        let mut db = database();
        let err = db.insert(&Unencodable).await.unwrap_err();
        assert!(matches!(err, SupabaseError::Serialization(_)));
        assert_eq!(db.error(), Some("record cannot be encoded"));

        db.executor_mut().clear_error();
        db.update(1, &Unencodable).await.unwrap_err();
        assert_eq!(db.error(), Some("record cannot be encoded"));
        assert!(db.executor().last_response().is_none());
    }

    #[test]
    fn result_as_reports_shape_mismatch() {
        let mut db = database();
        db.result = json!([{"id": "not-a-number"}]);
        assert!(db.result_as::<City>().is_err());
    }
}
