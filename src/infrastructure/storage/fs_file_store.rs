use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;

use crate::application::ports::file_store::{
    FileArea, FileStore, StoredObject, Upload, object_file_name,
};
use crate::infrastructure::storage::{object_key, public_url, relative_key_path};

/// Stores uploads under a local directory that the HTTP layer serves read-only.
pub struct FsFileStore {
    root: PathBuf,
    url_base: String,
}

impl FsFileStore {
    /// `url_base` is what stored keys are appended to, e.g. `/api/uploads`.
    pub fn new(root: impl Into<PathBuf>, url_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            url_base: url_base.into(),
        }
    }
}

#[async_trait]
impl FileStore for FsFileStore {
    async fn put(&self, area: FileArea, upload: Upload) -> anyhow::Result<StoredObject> {
        let file_name = object_file_name(upload.file_name.as_deref(), upload.content_type.as_deref());
        let key = object_key(area.as_str(), &file_name);
        let path = self.root.join(relative_key_path(&key)?);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .with_context(|| format!("create upload dir {}", dir.display()))?;
        }
        tokio::fs::write(&path, &upload.bytes)
            .await
            .with_context(|| format!("write upload {}", path.display()))?;
        tracing::debug!(key = %key, bytes = upload.bytes.len(), "stored upload on disk");
        Ok(StoredObject {
            url: public_url(&self.url_base, &key),
            key,
        })
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let path = self.root.join(relative_key_path(key)?);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove upload {}", path.display())),
        }
    }
}
