use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use wn_analysis::{
    categorize_text, cluster_by_title, clustering, count_frames, normalize_language, normalize_topics,
    report, sort_by_size, taxonomy, ReportOptions,
};
use wn_core::{ArticleQuery, ArticleStorage, Error, Provider, Result};
use wn_ingest::fetchers::KNOWN_PROVIDERS;
use wn_ingest::{build_fetchers, init_logging, IngestConfig, Ingestor, ProviderKeys};
use wn_web::AppState;

mod duration;

use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "World news ingestion and analysis", long_about = None)]
pub struct Cli {
    /// Storage backend: memory or sqlite
    #[arg(long, env = "WN_STORAGE", default_value = "sqlite")]
    storage: String,
    #[arg(long, env = "WN_DB_PATH", default_value = "world_news.db")]
    db_path: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch from the news providers and store new articles
    Ingest {
        /// Comma-separated providers (gdelt, eventregistry, newsapi, guardian). Defaults to all.
        #[arg(long, value_delimiter = ',')]
        providers: Vec<String>,
        /// Repeat the ingestion with this interval (e.g. 8h, 30m, 1h15m)
        #[arg(long)]
        interval: Option<HumanDuration>,
        #[arg(long, env = "EVENTREGISTRY_API_KEY", hide_env_values = true)]
        eventregistry_key: Option<String>,
        #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
        newsapi_key: Option<String>,
        #[arg(long, env = "GUARDIAN_KEY", hide_env_values = true)]
        guardian_key: Option<String>,
    },
    /// Classify free text, or reconcile provider labels with --labels
    Topics {
        text: String,
        #[arg(long, value_delimiter = ',')]
        labels: Vec<String>,
    },
    /// Flag the narrative frames present in a text
    Frames { text: String },
    /// Normalize a language code or name
    Language { value: String },
    /// Group recent headlines into near-duplicate clusters
    Clusters {
        #[arg(long, default_value = "7d")]
        since: HumanDuration,
        #[arg(long, default_value_t = clustering::DEFAULT_LIMIT)]
        limit: usize,
        #[arg(long, default_value_t = clustering::DEFAULT_THRESHOLD)]
        threshold: f64,
        #[arg(long)]
        provider: Option<String>,
        /// Only print the largest clusters
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Topic, frame, cluster and country aggregates for a window
    Report {
        #[arg(long, default_value = "7d")]
        since: HumanDuration,
    },
    /// Serve the JSON API
    Serve {
        #[arg(long, env = "WN_ADDR", default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn open_storage(cli: &Cli) -> Result<Arc<dyn ArticleStorage>> {
    let mut retries = 3;
    loop {
        match wn_storage::create_storage(&cli.storage, &cli.db_path).await {
            Ok(storage) => {
                info!("💾 Checking storage connection...");
                let count = storage.count().await?;
                info!("✨ Storage initialized (using {}, {} articles)", cli.storage, count);
                return Ok(storage);
            }
            Err(e @ Error::Config(_)) => return Err(e),
            Err(e) => {
                retries -= 1;
                if retries == 0 {
                    return Err(e);
                }
                warn!("Storage initialization failed ({}), retrying {}/3...", e, 3 - retries);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    }
}

fn window(since: HumanDuration, provider: Option<&str>) -> Result<ArticleQuery> {
    let span = since.as_chrono().map_err(Error::Config)?;
    let cutoff = Utc::now()
        .checked_sub_signed(span)
        .ok_or_else(|| Error::Config(format!("window of {}s reaches before the calendar", since.0.as_secs())))?;
    let mut query = ArticleQuery::new().since(cutoff);
    if let Some(provider) = provider {
        query = query.provider(Provider::from(provider));
    }
    Ok(query)
}

fn select_providers(names: &[String]) -> Vec<Provider> {
    if names.is_empty() {
        return KNOWN_PROVIDERS.to_vec();
    }
    names.iter().map(|n| Provider::from(n.as_str())).collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    taxonomy::warm_up();

    match &cli.command {
        Commands::Topics { text, labels } => {
            if labels.is_empty() {
                print_json(&categorize_text(text))
            } else {
                print_json(&normalize_topics(labels.as_slice(), Some(text.as_str())))
            }
        }
        Commands::Frames { text } => print_json(&count_frames(text)),
        Commands::Language { value } => print_json(&normalize_language(Some(value.as_str()))),
        Commands::Ingest {
            providers,
            interval,
            eventregistry_key,
            newsapi_key,
            guardian_key,
        } => {
            let storage = open_storage(&cli).await?;
            let config = IngestConfig::default().with_keys(ProviderKeys {
                event_registry: eventregistry_key.clone(),
                newsapi: newsapi_key.clone(),
                guardian: guardian_key.clone(),
            });
            let fetchers = build_fetchers(&config, &select_providers(providers))?;
            if fetchers.is_empty() {
                return Err(Error::Config("no provider is available to ingest from".to_string()));
            }
            let ingestor = Ingestor::new(storage, fetchers);
            let names: Vec<String> = ingestor.providers().iter().map(|p| p.to_string()).collect();
            info!("🦗 Fetchers ready: {}", names.join(", "));

            match interval {
                Some(every) => {
                    info!("⏰ Running in periodic mode every {}s", every.0.as_secs());
                    tokio::select! {
                        result = ingestor.run_every(every.0) => result,
                        _ = tokio::signal::ctrl_c() => {
                            info!("👋 Stopping periodic ingestion");
                            Ok(())
                        }
                    }
                }
                None => print_json(&ingestor.run_once().await?),
            }
        }
        Commands::Clusters {
            since,
            limit,
            threshold,
            provider,
            top,
        } => {
            let storage = open_storage(&cli).await?;
            let articles = storage.query_window(&window(*since, provider.as_deref())?).await?;
            let mut clusters = cluster_by_title(&articles, *limit, *threshold);
            sort_by_size(&mut clusters);
            clusters.truncate(*top);
            info!("🔍 {} clusters among {} articles", clusters.len(), articles.len());
            print_json(&report::cluster_summaries(&clusters))
        }
        Commands::Report { since } => {
            let storage = open_storage(&cli).await?;
            let articles = storage.query_window(&window(*since, None)?).await?;
            print_json(&report::build_report(&articles, ReportOptions::default()))
        }
        Commands::Serve { addr } => {
            let storage = open_storage(&cli).await?;
            wn_web::serve(AppState::new(storage), *addr).await
        }
    }
}
