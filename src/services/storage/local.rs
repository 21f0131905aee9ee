use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context};
use async_trait::async_trait;

use super::BlobStore;

/// Keeps blobs on the local disk under `root/<bucket>/<path>`, served from
/// `<public_base_url>/files/<bucket>/<path>`.
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn resolve(&self, bucket: &str, path: &str) -> anyhow::Result<PathBuf> {
        let relative = Path::new(bucket).join(path);
        let only_normal = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if bucket.is_empty() || path.is_empty() || !only_normal {
            bail!("invalid blob path: {bucket}/{path}");
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, bucket: &str, path: &str, bytes: &[u8]) -> anyhow::Result<String> {
        let target = self.resolve(bucket, path)?;

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }

        tokio::fs::write(&target, bytes)
            .await
            .with_context(|| format!("failed to write blob {}", target.display()))?;

        tracing::debug!(bucket, path, size = bytes.len(), "stored blob");

        Ok(format!("{}/files/{bucket}/{path}", self.public_base_url))
    }
}
