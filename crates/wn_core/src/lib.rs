pub mod error;
pub mod ident;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use ident::{article_id_from_url, normalize_url};
pub use storage::ArticleStorage;
pub use types::{ArticleQuery, NormalizedArticle, Provider, StoredArticle};
