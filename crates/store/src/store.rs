use {async_trait::async_trait, serde_json::Value};

use crate::Result;

/// Collection names used by the core.
pub mod collections {
    pub const DEVICES: &str = "devices";
    pub const MEDIA: &str = "media";
    pub const MESSAGES: &str = "messages";
    pub const USERS: &str = "users";
}

/// Key→document persistence. The core only relies on per-document
/// get/set/update semantics; anything stronger (transactions, queries)
/// is deliberately out of reach.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` when it does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>>;

    /// Create or fully replace a document.
    async fn set(&self, collection: &str, id: &str, doc: Value) -> Result<()>;

    /// Shallow-merge `patch` into an existing document and return the merged
    /// result. Fails with [`crate::Error::NotFound`] when the document does
    /// not already exist; update never silently becomes create.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Value>;
}
