//! Filesystem implementation of the `AssetStore` trait.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use taleweaver_core::collaborator::AssetStore;
use taleweaver_core::error::DomainError;

/// Stores generated assets under a base directory.
///
/// An asset put under `audio/u1/s1/narration-1.mp3` lands at
/// `{base_dir}/audio/u1/s1/narration-1.mp3` and is reachable at
/// `{public_base_url}/audio/u1/s1/narration-1.mp3`. Writes go to a temp file
/// first and are renamed into place, so a reader never sees a partial clip.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    base_dir: PathBuf,
    public_base_url: String,
}

impl FsAssetStore {
    /// Creates the store, creating `base_dir` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the directory cannot be
    /// created.
    #[tracing::instrument(skip(base_dir, public_base_url))]
    pub fn new(
        base_dir: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir).map_err(|e| {
            DomainError::Infrastructure(format!("create {}: {e}", base_dir.display()))
        })?;

        let public_base_url = public_base_url.into().trim_end_matches('/').to_owned();
        tracing::info!(path = %base_dir.display(), url = %public_base_url, "asset store ready");
        Ok(Self {
            base_dir,
            public_base_url,
        })
    }

    /// Directory assets are written to.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Resolves `key` below the base directory, rejecting keys that are
    /// empty, absolute, or climb out with `..`.
    fn resolve(&self, key: &str) -> Result<PathBuf, DomainError> {
        let relative = Path::new(key);
        let well_formed = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !well_formed {
            return Err(DomainError::Validation(format!("invalid asset key: {key}")));
        }
        Ok(self.base_dir.join(relative))
    }
}

#[async_trait]
impl AssetStore for FsAssetStore {
    #[tracing::instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn put(&self, bytes: &[u8], key: &str) -> Result<String, DomainError> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                DomainError::Infrastructure(format!("create {}: {e}", parent.display()))
            })?;
        }

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, bytes).await.map_err(|e| {
            DomainError::Infrastructure(format!("write {}: {e}", temp_path.display()))
        })?;
        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            DomainError::Infrastructure(format!(
                "rename {} to {}: {e}",
                temp_path.display(),
                path.display()
            ))
        })?;

        tracing::info!(path = %path.display(), "stored asset");
        Ok(format!("{}/{key}", self.public_base_url))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<(), DomainError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "deleted asset");
                Ok(())
            }
            // Already gone is as good as deleted.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DomainError::Infrastructure(format!(
                "delete {}: {e}",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_writes_file_and_returns_public_url() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let store = FsAssetStore::new(dir.path(), "https://cdn.example.com/assets/").unwrap();

        // Act
        let url = store
            .put(b"ID3audio", "audio/user_1/scene/narration-1.mp3")
            .await
            .unwrap();

        // Assert
        assert_eq!(
            url,
            "https://cdn.example.com/assets/audio/user_1/scene/narration-1.mp3"
        );
        let written = std::fs::read(dir.path().join("audio/user_1/scene/narration-1.mp3")).unwrap();
        assert_eq!(written, b"ID3audio");
    }

    #[tokio::test]
    async fn test_put_overwrites_existing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAssetStore::new(dir.path(), "/assets").unwrap();

        store.put(b"first", "audio/a.mp3").await.unwrap();
        store.put(b"second", "audio/a.mp3").await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("audio/a.mp3")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAssetStore::new(dir.path(), "/assets").unwrap();
        store.put(b"clip", "audio/b.mp3").await.unwrap();

        store.delete("audio/b.mp3").await.unwrap();
        store.delete("audio/b.mp3").await.unwrap();

        assert!(!dir.path().join("audio/b.mp3").exists());
    }

    #[tokio::test]
    async fn test_keys_escaping_the_base_dir_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsAssetStore::new(dir.path(), "/assets").unwrap();

        for key in ["../outside.mp3", "/etc/passwd", "", "audio/../../x.mp3"] {
            let result = store.put(b"x", key).await;
            assert!(
                matches!(result, Err(DomainError::Validation(_))),
                "key {key:?} should be rejected"
            );
        }
    }
}
