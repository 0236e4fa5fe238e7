//! Typed row helpers keyed by bare string ids.
//!
//! Rows are stored as `table:id` records; every read projects `record::id(id)` back into a
//! plain `id` string so the domain structs never see engine record ids.

use crate::Database;
use crate::error::{DatabaseError, DatabaseErrorExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Write as _;
use tracing::instrument;

const ROW_PROJECTION: &str = "*, record::id(id) AS id";
const DEFAULT_ORDER: &str = "created_at";

/// Filter, ordering and paging for table reads.
///
/// Field names are interpolated into the statement, so they must be code constants;
/// values are always bound as parameters.
#[derive(Debug, Clone)]
pub struct Query {
    filters: Vec<(&'static str, Value)>,
    order_by: &'static str,
    descending: bool,
    limit: Option<u32>,
    offset: u32,
}

impl Default for Query {
    fn default() -> Self {
        Self { filters: Vec::new(), order_by: DEFAULT_ORDER, descending: true, limit: None, offset: 0 }
    }
}

impl Query {
    /// Newest rows first, no filter, no limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter; all filters are combined with `AND`.
    #[must_use]
    pub fn filter(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.filters.push((field, value.into()));
        self
    }

    #[must_use]
    pub const fn order_by(mut self, field: &'static str, descending: bool) -> Self {
        self.order_by = field;
        self.descending = descending;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    fn where_clause(&self) -> String {
        let mut clause = String::new();
        for (index, (field, _)) in self.filters.iter().enumerate() {
            let joiner = if index == 0 { " WHERE " } else { " AND " };
            let _ = write!(clause, "{joiner}{field} = $f{index}");
        }
        clause
    }

    fn select_statement(&self) -> String {
        let mut statement =
            format!("SELECT {ROW_PROJECTION} FROM type::table($table){}", self.where_clause());
        let direction = if self.descending { "DESC" } else { "ASC" };
        let _ = write!(statement, " ORDER BY {} {direction}", self.order_by);
        if self.limit.is_some() {
            statement.push_str(" LIMIT $limit");
        }
        if self.offset > 0 {
            statement.push_str(" START $offset");
        }
        statement
    }
}

/// One bucket of a `GROUP BY` count.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct GroupCount {
    #[serde(default)]
    pub key: Option<String>,
    pub count: u64,
}

#[derive(Debug, serde::Deserialize)]
struct Total {
    count: u64,
}

impl Database {
    /// Reads the rows of `table` matching `query`.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Surreal`] if the statement fails or rows do not deserialize.
    #[instrument(skip(self, query), fields(table = table))]
    pub async fn select_all<T: DeserializeOwned>(
        &self,
        table: &'static str,
        query: &Query,
    ) -> Result<Vec<T>, DatabaseError> {
        let mut request = self.query(query.select_statement()).bind(("table", table));
        for (index, (_, value)) in query.filters.iter().enumerate() {
            request = request.bind((format!("f{index}"), value.clone()));
        }
        if let Some(limit) = query.limit {
            request = request.bind(("limit", limit));
        }
        if query.offset > 0 {
            request = request.bind(("offset", query.offset));
        }

        request
            .await
            .context(format!("Selecting from {table}"))?
            .take::<Vec<T>>(0)
            .context(format!("Decoding rows of {table}"))
    }

    /// Reads a single row by id.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Surreal`] if the statement fails or the row does not deserialize.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &'static str,
        id: &str,
    ) -> Result<Option<T>, DatabaseError> {
        let rows = self
            .query(format!("SELECT {ROW_PROJECTION} FROM type::thing($table, $id)"))
            .bind(("table", table))
            .bind(("id", id.to_owned()))
            .await
            .context(format!("Fetching {table}:{id}"))?
            .take::<Vec<T>>(0)
            .context(format!("Decoding {table}:{id}"))?;
        Ok(rows.into_iter().next())
    }

    /// Returns the first row whose `field` equals `value`.
    ///
    /// # Errors
    /// See [`Database::select_all`].
    pub async fn find_first<T: DeserializeOwned>(
        &self,
        table: &'static str,
        field: &'static str,
        value: impl Into<Value>,
    ) -> Result<Option<T>, DatabaseError> {
        let query = Query::new().filter(field, value).limit(1);
        Ok(self.select_all(table, &query).await?.into_iter().next())
    }

    /// Inserts a new row under `id`. An `id` member of `content` is ignored.
    ///
    /// # Errors
    /// * [`DatabaseError::Conflict`] if the id or a unique index value is taken.
    /// * [`DatabaseError::Validation`] if `content` is not a JSON object.
    #[instrument(skip(self, content), fields(table = table))]
    pub async fn create<T: Serialize>(
        &self,
        table: &'static str,
        id: &str,
        content: &T,
    ) -> Result<(), DatabaseError> {
        let data = row_content(content)?;
        self.query("CREATE type::thing($table, $id) CONTENT $data RETURN NONE")
            .bind(("table", table))
            .bind(("id", id.to_owned()))
            .bind(("data", data))
            .await
            .context(format!("Creating {table}:{id}"))?
            .check()
            .map_err(|e| DatabaseError::classify(e, format!("Creating {table}:{id}")))?;
        Ok(())
    }

    /// Inserts or fully replaces the row under `id`.
    ///
    /// # Errors
    /// * [`DatabaseError::Conflict`] if a unique index value is taken by another row.
    /// * [`DatabaseError::Validation`] if `content` is not a JSON object.
    #[instrument(skip(self, content), fields(table = table))]
    pub async fn upsert<T: Serialize>(
        &self,
        table: &'static str,
        id: &str,
        content: &T,
    ) -> Result<(), DatabaseError> {
        let data = row_content(content)?;
        self.query("UPSERT type::thing($table, $id) CONTENT $data RETURN NONE")
            .bind(("table", table))
            .bind(("id", id.to_owned()))
            .bind(("data", data))
            .await
            .context(format!("Upserting {table}:{id}"))?
            .check()
            .map_err(|e| DatabaseError::classify(e, format!("Upserting {table}:{id}")))?;
        Ok(())
    }

    /// Merges `patch` into an existing row and returns the row afterwards.
    ///
    /// Returns `Ok(None)` when no row has this id; missing rows are never created.
    ///
    /// # Errors
    /// * [`DatabaseError::Conflict`] if the patch violates a unique index.
    /// * [`DatabaseError::Validation`] if `patch` is not a JSON object.
    #[instrument(skip(self, patch), fields(table = table))]
    pub async fn merge<T: DeserializeOwned>(
        &self,
        table: &'static str,
        id: &str,
        patch: impl Serialize,
    ) -> Result<Option<T>, DatabaseError> {
        let data = row_content(&patch)?;
        let mut response = self
            .query("UPDATE type::thing($table, $id) MERGE $data RETURN NONE")
            .query(format!("SELECT {ROW_PROJECTION} FROM type::thing($table, $id)"))
            .bind(("table", table))
            .bind(("id", id.to_owned()))
            .bind(("data", data))
            .await
            .context(format!("Merging into {table}:{id}"))?;

        if let Some(e) = response.take_errors().into_values().next() {
            return Err(DatabaseError::classify(e, format!("Merging into {table}:{id}")));
        }

        let rows = response.take::<Vec<T>>(1).context(format!("Decoding {table}:{id}"))?;
        Ok(rows.into_iter().next())
    }

    /// Deletes a row. Returns whether it existed.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Surreal`] if the lookup or the delete itself fails
    /// (e.g. a table event rejects it); the row is then still present.
    #[instrument(skip(self), fields(table = table))]
    pub async fn delete(&self, table: &'static str, id: &str) -> Result<bool, DatabaseError> {
        let mut response = self
            .query("SELECT VALUE record::id(id) FROM type::thing($table, $id)")
            .query("DELETE type::thing($table, $id)")
            .bind(("table", table))
            .bind(("id", id.to_owned()))
            .await
            .context(format!("Deleting {table}:{id}"))?;

        if let Some(e) = response.take_errors().into_values().next() {
            return Err(DatabaseError::classify(e, format!("Deleting {table}:{id}")));
        }

        let existing = response.take::<Vec<String>>(0).context(format!("Deleting {table}:{id}"))?;
        Ok(!existing.is_empty())
    }

    /// Counts the rows matching the filters of `query` (ordering and paging are ignored).
    ///
    /// # Errors
    /// Returns [`DatabaseError::Surreal`] if the statement fails.
    pub async fn count(&self, table: &'static str, query: &Query) -> Result<u64, DatabaseError> {
        let statement =
            format!("SELECT count() AS count FROM type::table($table){} GROUP ALL", query.where_clause());
        let mut request = self.query(statement).bind(("table", table));
        for (index, (_, value)) in query.filters.iter().enumerate() {
            request = request.bind((format!("f{index}"), value.clone()));
        }

        let total = request
            .await
            .context(format!("Counting {table}"))?
            .take::<Option<Total>>(0)
            .context(format!("Counting {table}"))?;
        Ok(total.map_or(0, |t| t.count))
    }

    /// Counts rows per distinct value of `field`.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Surreal`] if the statement fails.
    pub async fn count_by(
        &self,
        table: &'static str,
        field: &'static str,
    ) -> Result<Vec<GroupCount>, DatabaseError> {
        self.query(format!(
            "SELECT {field} AS key, count() AS count FROM type::table($table) GROUP BY key"
        ))
        .bind(("table", table))
        .await
        .context(format!("Grouping {table} by {field}"))?
        .take::<Vec<GroupCount>>(0)
        .context(format!("Grouping {table} by {field}"))
    }
}

/// Serializes row content as a JSON object without an `id` member.
fn row_content<T: Serialize + ?Sized>(content: &T) -> Result<Value, DatabaseError> {
    match serde_json::to_value(content).context("Serializing row content")? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(Value::Object(map))
        }
        other => Err(DatabaseError::Validation {
            message: format!("Row content must be an object, got {other}").into(),
            context: None,
        }),
    }
}
