use std::io;
use std::path::{Component, Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};

/// Prefix under which option images are referenced.
pub const IMAGE_URL_PREFIX: &str = "/uploads/images/";

/// On-disk store for option images.
///
/// Options only hold a reference (`/uploads/images/<file>`); uploads are
/// handled elsewhere. This side only resolves and removes those files.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub async fn new(dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Image storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    /// Resolve a reference to a file inside the store. Anything that is not a
    /// plain file name (separators, `..`) resolves to `None`.
    pub fn path_for(&self, reference: &str) -> Option<PathBuf> {
        let name = reference.strip_prefix(IMAGE_URL_PREFIX).unwrap_or(reference);
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(file)), None) => Some(self.dir.join(file)),
            _ => None,
        }
    }

    /// Delete the file behind a reference. A missing file is not an error.
    pub async fn delete(&self, reference: &str) -> io::Result<()> {
        let Some(path) = self.path_for(reference) else {
            warn!("Ignoring image reference outside storage: {}", reference);
            return Ok(());
        };

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted image {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("Image {} already gone", path.display());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Delete after a committed row change. Failures are logged, never returned.
    pub async fn delete_best_effort(&self, reference: &str) {
        if let Err(e) = self.delete(reference).await {
            warn!("Failed to delete image {}: {}", reference, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolves_only_plain_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().to_path_buf()).await.unwrap();

        assert_eq!(
            store.path_for("/uploads/images/a.png"),
            Some(dir.path().join("a.png"))
        );
        assert_eq!(store.path_for("b.jpg"), Some(dir.path().join("b.jpg")));
        assert_eq!(store.path_for("/uploads/images/../secret"), None);
        assert_eq!(store.path_for("/etc/passwd"), None);
        assert_eq!(store.path_for(""), None);
    }

    #[tokio::test]
    async fn delete_removes_file_and_tolerates_missing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().to_path_buf()).await.unwrap();
        let file = dir.path().join("a.png");
        std::fs::write(&file, b"png").unwrap();

        store.delete("/uploads/images/a.png").await.unwrap();
        assert!(!file.exists());

        store.delete("/uploads/images/a.png").await.unwrap();
        store.delete("../outside").await.unwrap();
    }
}
