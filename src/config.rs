use std::sync::Arc;

use url::Url;

use crate::cli::Args;
use crate::progress::Progress;
use crate::rest::RestTableClient;
use crate::store::{OfflineTableClient, Query, Row, StoreError, TableClient};

/// Store settings resolved from arguments and environment.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub url: Option<Url>,
    pub key: Option<String>,
    pub user_agent: String,
}

impl StoreConfig {
    pub fn from_args(args: &Args) -> Self {
        Self {
            url: args.store_url.clone(),
            key: args.store_key.clone().filter(|k| !k.trim().is_empty()),
            user_agent: args.user_agent.clone(),
        }
    }
}

/// The table client picked once at startup.
#[derive(Clone)]
pub enum Backend {
    Rest(RestTableClient),
    Offline(OfflineTableClient),
}

impl Backend {
    pub fn from_config(config: &StoreConfig, progress: Option<Arc<Progress>>) -> anyhow::Result<Self> {
        match (&config.url, &config.key) {
            (Some(url), Some(key)) => {
                tracing::info!(store = %url, "using remote table store");
                Ok(Backend::Rest(RestTableClient::new(
                    url.clone(),
                    key,
                    &config.user_agent,
                    progress,
                )?))
            }
            _ => {
                tracing::warn!("store url or key not configured; using offline store");
                Ok(Backend::Offline(OfflineTableClient))
            }
        }
    }
}

impl TableClient for Backend {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Row>, StoreError> {
        match self {
            Backend::Rest(c) => c.select(table, query).await,
            Backend::Offline(c) => c.select(table, query).await,
        }
    }

    async fn insert(&self, table: &str, records: Vec<Row>) -> Result<Vec<Row>, StoreError> {
        match self {
            Backend::Rest(c) => c.insert(table, records).await,
            Backend::Offline(c) => c.insert(table, records).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: Option<&str>, key: Option<&str>) -> StoreConfig {
        StoreConfig {
            url: url.map(|u| Url::parse(u).unwrap()),
            key: key.map(str::to_string),
            user_agent: "test".to_string(),
        }
    }

    #[test]
    fn backend_needs_both_url_and_key() {
        let pick = |url, key| Backend::from_config(&config(url, key), None).unwrap();
        assert!(matches!(pick(Some("https://x.supabase.co"), Some("k")), Backend::Rest(_)));
        assert!(matches!(pick(Some("https://x.supabase.co"), None), Backend::Offline(_)));
        assert!(matches!(pick(None, Some("k")), Backend::Offline(_)));
    }
}
