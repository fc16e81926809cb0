use async_trait::async_trait;

use naviql_domain::ColumnDesc;

/// Read interface onto a live database catalog. The completer calls this
/// only during a catalog refresh, always under an open/close pairing;
/// close is guaranteed even when a fetch step fails.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn open(&self) -> Result<(), CatalogError>;
    async fn close(&self) -> Result<(), CatalogError>;

    async fn databases(&self) -> Result<Vec<String>, CatalogError>;
    async fn tables(&self) -> Result<Vec<String>, CatalogError>;
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnDesc>, CatalogError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    ConnectionFailed(String),
    QueryFailed(String),
    CloseFailed(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionFailed(msg) => write!(f, "Connection failed: {}", msg),
            Self::QueryFailed(msg) => write!(f, "Query failed: {}", msg),
            Self::CloseFailed(msg) => write!(f, "Close failed: {}", msg),
        }
    }
}

impl std::error::Error for CatalogError {}
