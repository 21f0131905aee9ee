pub mod local;

use async_trait::async_trait;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` at `path` inside `bucket` and returns a public URL for it.
    async fn upload(&self, bucket: &str, path: &str, bytes: &[u8]) -> anyhow::Result<String>;
}
