use std::future::Future;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// One record as returned by the table service: column name to JSON value.
pub type Row = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("table store is not configured")]
    NotConfigured,

    #[error("{method} {table} failed with status {status}: {body}")]
    Status {
        method: &'static str,
        table: String,
        status: u16,
        body: String,
    },

    #[error("request to table {table} failed")]
    Transport {
        table: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("malformed rows from table {table}: {reason}")]
    Malformed { table: String, reason: String },
}

impl StoreError {
    pub fn malformed(table: &str, reason: impl std::fmt::Display) -> Self {
        StoreError::Malformed {
            table: table.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Equality filters plus an optional descending sort column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub filters: Vec<(String, String)>,
    pub order_desc: Option<String>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.filters.push((column.to_string(), value.into()));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order_desc = Some(column.to_string());
        self
    }
}

/// The remote table service. Every call is one request/response; no retries.
pub trait TableClient: Send + Sync {
    fn select(
        &self,
        table: &str,
        query: &Query,
    ) -> impl Future<Output = Result<Vec<Row>, StoreError>> + Send;

    fn insert(
        &self,
        table: &str,
        records: Vec<Row>,
    ) -> impl Future<Output = Result<Vec<Row>, StoreError>> + Send;
}

/// Stand-in used when no store is configured: reads come back empty and
/// writes are refused.
#[derive(Debug, Clone, Default)]
pub struct OfflineTableClient;

impl TableClient for OfflineTableClient {
    async fn select(&self, table: &str, _query: &Query) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(table, "offline store: returning no rows");
        Ok(Vec::new())
    }

    async fn insert(&self, table: &str, _records: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        tracing::debug!(table, "offline store: refusing insert");
        Err(StoreError::NotConfigured)
    }
}

pub fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Row>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(Value::Object(row)))
        .collect::<Result<Vec<T>, _>>()
        .map_err(|e| StoreError::malformed(table, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_builder_keeps_filter_order() {
        let q = Query::all()
            .eq("community_id", "7")
            .eq("is_new", "true")
            .order_desc("created_at");
        assert_eq!(
            q.filters,
            vec![
                ("community_id".to_string(), "7".to_string()),
                ("is_new".to_string(), "true".to_string()),
            ]
        );
        assert_eq!(q.order_desc.as_deref(), Some("created_at"));
    }

    #[tokio::test]
    async fn offline_client_reads_empty_and_refuses_writes() {
        let client = OfflineTableClient;
        let rows = client.select("topics", &Query::all()).await.unwrap();
        assert!(rows.is_empty());
        let err = client.insert("topics", vec![Row::new()]).await.unwrap_err();
        assert!(matches!(err, StoreError::NotConfigured));
    }

    #[test]
    fn decode_rows_reports_table_on_bad_shape() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Named {
            name: String,
        }

        let mut row = Row::new();
        row.insert("name".to_string(), Value::from(3));
        let err = decode_rows::<Named>("communities", vec![row]).unwrap_err();
        assert!(err.to_string().contains("communities"));
    }
}
