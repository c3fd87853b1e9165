use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};
use std::path::Path;
use tracing::{debug, info};
use wn_core::{ArticleQuery, ArticleStorage, Error, Provider, Result, StoredArticle};

const MIGRATIONS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        article_id TEXT PRIMARY KEY,
        provider TEXT NOT NULL,
        provider_id TEXT,
        url TEXT NOT NULL,
        title TEXT NOT NULL,
        summary TEXT,
        body TEXT,
        image_url TEXT,
        published_at TEXT NOT NULL,
        source_name TEXT,
        source_domain TEXT,
        source_country TEXT,
        language TEXT,
        topics TEXT NOT NULL DEFAULT '[]'
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_published_at ON articles (published_at)",
    "CREATE INDEX IF NOT EXISTS idx_articles_provider ON articles (provider)",
];

const COLUMNS: &str = "article_id, provider, provider_id, url, title, summary, body, image_url, \
                       published_at, source_name, source_domain, source_country, language, topics";

/// Timestamps are stored in one fixed-width UTC form so text order is time order.
fn encode_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn db_error(context: &str) -> impl FnOnce(sqlx::Error) -> Error + '_ {
    move |e| Error::Database(format!("{}: {}", context, e))
}

pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub async fn new_with_path(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(db_error("Failed to open database"))?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            sqlx::query(migration)
                .execute(&pool)
                .await
                .map_err(|e| Error::Database(format!("Failed to run migration {}: {}", i, e)))?;
        }
        info!("✅ SQLite storage ready ({} migrations)", MIGRATIONS.len());

        Ok(Self { pool })
    }

    fn row_to_article(row: &SqliteRow) -> Result<StoredArticle> {
        let published_at: String = row.get("published_at");
        let published_at = DateTime::parse_from_rfc3339(&published_at)
            .map_err(|e| Error::InvalidTimestamp(format!("{}: {}", published_at, e)))?
            .with_timezone(&Utc);
        let topics: String = row.get("topics");

        Ok(StoredArticle {
            article_id: row.get("article_id"),
            provider: Provider::from(row.get::<String, _>("provider")),
            provider_id: row.get("provider_id"),
            url: row.get("url"),
            title: row.get("title"),
            summary: row.get("summary"),
            body: row.get("body"),
            image_url: row.get("image_url"),
            published_at,
            source_name: row.get("source_name"),
            source_domain: row.get("source_domain"),
            source_country: row.get("source_country"),
            language: row.get("language"),
            topics: serde_json::from_str(&topics)?,
        })
    }
}

#[async_trait]
impl ArticleStorage for SqliteStorage {
    async fn upsert_articles(&self, articles: &[StoredArticle]) -> Result<usize> {
        if articles.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await.map_err(db_error("Failed to begin transaction"))?;
        let mut inserted = 0u64;
        for article in articles {
            let topics = serde_json::to_string(&article.topics)?;
            let result = sqlx::query(&format!(
                "INSERT INTO articles ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT(article_id) DO NOTHING",
                COLUMNS
            ))
            .bind(&article.article_id)
            .bind(article.provider.as_str())
            .bind(article.provider_id.as_deref())
            .bind(&article.url)
            .bind(&article.title)
            .bind(article.summary.as_deref())
            .bind(article.body.as_deref())
            .bind(article.image_url.as_deref())
            .bind(encode_timestamp(&article.published_at))
            .bind(article.source_name.as_deref())
            .bind(article.source_domain.as_deref())
            .bind(article.source_country.as_deref())
            .bind(article.language.as_deref())
            .bind(topics)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to store article"))?;
            inserted += result.rows_affected();
        }
        tx.commit().await.map_err(db_error("Failed to commit articles"))?;

        debug!(offered = articles.len(), inserted, "Stored articles in SQLite");
        Ok(inserted as usize)
    }

    async fn query_window(&self, query: &ArticleQuery) -> Result<Vec<StoredArticle>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM articles WHERE 1 = 1", COLUMNS));
        if let Some(since) = &query.since {
            builder.push(" AND published_at >= ").push_bind(encode_timestamp(since));
        }
        if let Some(provider) = &query.provider {
            builder.push(" AND provider = ").push_bind(provider.as_str().to_string());
        }
        builder.push(" ORDER BY published_at DESC, article_id ASC");
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to query articles"))?;
        rows.iter().map(Self::row_to_article).collect()
    }

    async fn get_article(&self, article_id: &str) -> Result<Option<StoredArticle>> {
        let row = sqlx::query(&format!("SELECT {} FROM articles WHERE article_id = ?", COLUMNS))
            .bind(article_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to load article"))?;
        row.as_ref().map(Self::row_to_article).transpose()
    }

    async fn count(&self) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count articles"))?;
        Ok(count as usize)
    }
}
