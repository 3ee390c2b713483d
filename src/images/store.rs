use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("image not found")]
    NotFound,
    #[error("image storage i/o error")]
    Io(#[from] std::io::Error),
}

/// Durable, per-user storage of uploaded mushroom images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores `content` under the user's namespace and returns the generated
    /// file name.
    async fn save(
        &self,
        user_id: i64,
        original_name: &str,
        content: Bytes,
    ) -> Result<String, StorageError>;

    /// Returns the raw bytes of a stored image, or `NotFound` if no such
    /// file exists.
    async fn read(&self, user_id: i64, name: &str) -> Result<Bytes, StorageError>;
}

/// Filesystem-backed store: `{root}/{user_id}/{uuid}_{original_name}`.
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn user_dir(&self, user_id: i64) -> PathBuf {
        self.root.join(user_id.to_string())
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(
        &self,
        user_id: i64,
        original_name: &str,
        content: Bytes,
    ) -> Result<String, StorageError> {
        // The random prefix makes the stored name unique across the system,
        // so concurrent uploads cannot collide.
        let name = format!("{}_{}", Uuid::new_v4(), original_name);
        let dir = self.user_dir(user_id);
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join(&name), &content).await?;
        debug!(user_id, name = %name, bytes = content.len(), "image stored");
        Ok(name)
    }

    async fn read(&self, user_id: i64, name: &str) -> Result<Bytes, StorageError> {
        match tokio::fs::read(self.user_dir(user_id).join(name)).await {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StorageError::NotFound),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_and_read_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsImageStore::new(dir.path());

        let content = Bytes::from_static(b"\x89PNG fake image bytes");
        let name = store
            .save(7, "amanita.png", content.clone())
            .await
            .expect("save");
        assert!(name.ends_with("_amanita.png"));

        let read_back = store.read(7, &name).await.expect("read");
        assert_eq!(read_back, content);
    }

    #[tokio::test]
    async fn read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsImageStore::new(dir.path());

        let err = store.read(7, "nothing.jpg").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }

    #[tokio::test]
    async fn repeated_saves_of_same_name_do_not_collide() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsImageStore::new(dir.path());

        let first = store
            .save(7, "same.jpg", Bytes::from_static(b"one"))
            .await
            .expect("save");
        let second = store
            .save(7, "same.jpg", Bytes::from_static(b"two"))
            .await
            .expect("save");
        assert_ne!(first, second);
        assert_eq!(store.read(7, &first).await.expect("read"), "one");
        assert_eq!(store.read(7, &second).await.expect("read"), "two");
    }

    #[tokio::test]
    async fn namespaces_are_per_user() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FsImageStore::new(dir.path());

        let name = store
            .save(1, "cap.jpg", Bytes::from_static(b"bytes"))
            .await
            .expect("save");
        let err = store.read(2, &name).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound));
    }
}
