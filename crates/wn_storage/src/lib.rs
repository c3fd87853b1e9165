use std::path::Path;
use std::sync::Arc;
use tracing::info;
use wn_core::{ArticleStorage, Error, Result};

pub mod backends;

pub use backends::*;

/// Backend names accepted by [`create_storage`].
pub const STORAGE_KINDS: &[&str] = &["memory", "sqlite"];

/// Opens the named backend. `db_path` is only used by file-backed stores.
#[cfg_attr(not(feature = "sqlite"), allow(unused_variables))]
pub async fn create_storage(kind: &str, db_path: &Path) -> Result<Arc<dyn ArticleStorage>> {
    match kind.trim().to_lowercase().as_str() {
        "memory" => {
            info!("💾 Using in-memory storage");
            Ok(Arc::new(MemoryStorage::new()))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            info!("💾 Opening SQLite storage at {}", db_path.display());
            Ok(Arc::new(SqliteStorage::new_with_path(db_path).await?))
        }
        other => Err(Error::Config(format!(
            "unknown storage backend '{}', expected one of: {}",
            other,
            STORAGE_KINDS.join(", ")
        ))),
    }
}
