//! Query client defaults
//!
//! The data-fetching client is an external collaborator; the site only fixes
//! its defaults and keeps one process-wide instance for future data needs.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Defaults applied to queries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDefaults {
    pub retry: u32,
    pub refetch_on_window_focus: bool,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            retry: 1,
            refetch_on_window_focus: false,
        }
    }
}

/// Defaults applied to mutations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationDefaults {
    pub retry: u32,
}

/// Client configuration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryClientConfig {
    #[serde(default)]
    pub queries: QueryDefaults,
    #[serde(default)]
    pub mutations: MutationDefaults,
}

/// Process-wide query client
#[derive(Debug)]
pub struct QueryClient {
    config: QueryClientConfig,
}

impl QueryClient {
    pub fn new(config: QueryClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QueryClientConfig {
        &self.config
    }
}

static QUERY_CLIENT: OnceLock<QueryClient> = OnceLock::new();

/// Get the process-wide client, creating it with the defaults on first use
pub fn query_client() -> &'static QueryClient {
    QUERY_CLIENT.get_or_init(|| {
        tracing::debug!("Creating query client with default options");
        QueryClient::new(QueryClientConfig::default())
    })
}
