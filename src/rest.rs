use std::sync::Arc;

use anyhow::Context as _;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use url::Url;

use crate::progress::Progress;
use crate::store::{Query, Row, StoreError, TableClient};

/// Table client for a hosted PostgREST endpoint (`{base}/rest/v1/{table}`).
#[derive(Clone)]
pub struct RestTableClient {
    client: reqwest::Client,
    base_url: Url,
    progress: Option<Arc<Progress>>,
}

impl RestTableClient {
    pub fn new(
        base_url: Url,
        api_key: &str,
        user_agent: &str,
        progress: Option<Arc<Progress>>,
    ) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(api_key).context("api key is not a valid header value")?;
        headers.insert("apikey", key);
        let bearer = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .context("api key is not a valid header value")?;
        headers.insert(AUTHORIZATION, bearer);

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build reqwest client")?;
        Ok(Self {
            client,
            base_url,
            progress,
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::malformed(table, "store url cannot be a base"))?
            .pop_if_empty()
            .extend(["rest", "v1", table]);
        Ok(url)
    }

    fn select_url(&self, table: &str, query: &Query) -> Result<Url, StoreError> {
        let mut url = self.table_url(table)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            for (column, value) in &query.filters {
                pairs.append_pair(column, &format!("eq.{value}"));
            }
            if let Some(column) = &query.order_desc {
                pairs.append_pair("order", &format!("{column}.desc"));
            }
        }
        Ok(url)
    }

    async fn send(
        &self,
        method: &'static str,
        table: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<Row>, StoreError> {
        if let Some(p) = &self.progress {
            p.request_start(table);
        }
        let res = self.send_inner(method, table, request).await;
        if let Some(p) = &self.progress {
            match &res {
                Ok(rows) => p.request_ok(table, rows.len()),
                Err(_) => p.request_err(table),
            }
        }
        res
    }

    async fn send_inner(
        &self,
        method: &'static str,
        table: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<Vec<Row>, StoreError> {
        let transport = |source| StoreError::Transport {
            table: table.to_string(),
            source,
        };

        let resp = request.send().await.map_err(transport)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, table, method, "store request rejected");
            return Err(StoreError::Status {
                method,
                table: table.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await.map_err(transport)?;
        let rows: Vec<Row> =
            serde_json::from_slice(&bytes).map_err(|e| StoreError::malformed(table, e))?;
        tracing::debug!(table, method, rows = rows.len(), "store request ok");
        Ok(rows)
    }
}

impl TableClient for RestTableClient {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError> {
        let url = self.select_url(table, query)?;
        let request = self.client.get(url);
        self.send("GET", table, request).await
    }

    async fn insert(&self, table: &str, records: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        let url = self.table_url(table)?;
        let request = self
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .json(&records);
        self.send("POST", table, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> RestTableClient {
        RestTableClient::new(Url::parse(base).unwrap(), "anon", "test-agent", None).unwrap()
    }

    #[test]
    fn select_url_encodes_filters_and_order() {
        let c = client("https://abc.supabase.co");
        let url = c
            .select_url(
                "topics",
                &Query::all().eq("community_id", "42").order_desc("created_at"),
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc.supabase.co/rest/v1/topics?select=*&community_id=eq.42&order=created_at.desc"
        );
    }

    #[test]
    fn table_url_keeps_base_path() {
        let c = client("http://127.0.0.1:5000/proxy/");
        let url = c.table_url("communities").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/proxy/rest/v1/communities");
    }
}
