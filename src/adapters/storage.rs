use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<String> {
        let full_path = self.base_path.join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&full_path, data).await?;
        Ok(full_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().join("nested").join("etl_output"));

        let path = storage.write_file("posts.json", b"[]").await.unwrap();

        assert_eq!(std::fs::read(Path::new(&path)).unwrap(), b"[]");
    }

    #[tokio::test]
    async fn test_write_under_a_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("etl_output");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let storage = LocalStorage::new(blocker.clone());

        let result = storage.write_file("posts.json", b"[]").await;
        assert!(matches!(
            result,
            Err(crate::utils::error::EtlError::IoError(_))
        ));
    }
}
