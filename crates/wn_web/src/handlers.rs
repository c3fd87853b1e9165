use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::error;
use wn_analysis::clustering::{cluster_by_title, sort_by_size};
use wn_analysis::report::{self, ClusterSummary, FrameTotal, WeeklyFrames};
use wn_core::{ArticleQuery, Provider, StoredArticle};

use crate::AppState;

const DEFAULT_ARTICLE_LIMIT: usize = 100;
const MAX_ARTICLE_LIMIT: usize = 1000;

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(wn_core::Error),
}

impl From<wn_core::Error> for ApiError {
    fn from(e: wn_core::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Internal(e) => {
                error!("Request failed: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

/// Time window shared by every listing endpoint. `since` wins over `days`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WindowParams {
    pub since: Option<String>,
    pub days: Option<i64>,
    pub provider: Option<String>,
}

impl WindowParams {
    fn to_query(&self) -> Result<ArticleQuery, ApiError> {
        let mut query = ArticleQuery::new();
        if let Some(since) = self.cutoff()? {
            query = query.since(since);
        }
        if let Some(provider) = self.provider.as_deref().filter(|p| !p.trim().is_empty()) {
            query = query.provider(Provider::from(provider));
        }
        Ok(query)
    }

    fn cutoff(&self) -> Result<Option<DateTime<Utc>>, ApiError> {
        if let Some(since) = &self.since {
            return DateTime::parse_from_rfc3339(since)
                .map(|dt| Some(dt.with_timezone(&Utc)))
                .map_err(|e| ApiError::BadRequest(format!("invalid since '{}': {}", since, e)));
        }
        match self.days {
            Some(days) if days < 0 => Err(ApiError::BadRequest("days must not be negative".to_string())),
            Some(days) => Duration::try_days(days)
                .and_then(|span| Utc::now().checked_sub_signed(span))
                .map(Some)
                .ok_or_else(|| ApiError::BadRequest(format!("days out of range: {}", days))),
            None => Ok(None),
        }
    }
}

async fn load_window(state: &AppState, window: &WindowParams) -> Result<Vec<StoredArticle>, ApiError> {
    let query = window.to_query()?;
    Ok(state.storage.query_window(&query).await?)
}

// Kept flat: numbers do not decode through `serde(flatten)` in query strings.
#[derive(Debug, Default, Deserialize)]
pub struct ArticleFilter {
    pub since: Option<String>,
    pub days: Option<i64>,
    pub provider: Option<String>,
    pub topic: Option<String>,
    pub country: Option<String>,
    pub language: Option<String>,
    /// Case-insensitive title search.
    pub q: Option<String>,
    pub limit: Option<usize>,
}

impl ArticleFilter {
    fn window(&self) -> WindowParams {
        WindowParams {
            since: self.since.clone(),
            days: self.days,
            provider: self.provider.clone(),
        }
    }

    fn matches(&self, article: &StoredArticle) -> bool {
        let eq = |want: &Option<String>, have: Option<&str>| match want {
            Some(want) => have.is_some_and(|h| h.eq_ignore_ascii_case(want)),
            None => true,
        };
        if let Some(topic) = &self.topic {
            if !article.topics.iter().any(|t| t.eq_ignore_ascii_case(topic)) {
                return false;
            }
        }
        if let Some(q) = &self.q {
            if !article.title.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        eq(&self.country, article.source_country.as_deref()) && eq(&self.language, article.language.as_deref())
    }
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ArticleFilter>,
) -> ApiResult<Vec<StoredArticle>> {
    let limit = filter.limit.unwrap_or(DEFAULT_ARTICLE_LIMIT).min(MAX_ARTICLE_LIMIT);
    let articles = load_window(&state, &filter.window())
        .await?
        .into_iter()
        .filter(|a| filter.matches(a))
        .take(limit)
        .collect();
    Ok(Json(articles))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StoredArticle> {
    match state.storage.get_article(&id).await? {
        Some(article) => Ok(Json(article)),
        None => Err(ApiError::NotFound(format!("no article with id {}", id))),
    }
}

pub async fn topic_counts(
    State(state): State<Arc<AppState>>,
    Query(window): Query<WindowParams>,
) -> ApiResult<Vec<report::TopicCount>> {
    let articles = load_window(&state, &window).await?;
    Ok(Json(report::topic_counts(&articles)))
}

#[derive(Debug, Serialize)]
pub struct FramesResponse {
    pub articles: usize,
    pub totals: Vec<FrameTotal>,
    pub weekly: Vec<WeeklyFrames>,
}

pub async fn frame_totals(
    State(state): State<Arc<AppState>>,
    Query(window): Query<WindowParams>,
) -> ApiResult<FramesResponse> {
    let articles = load_window(&state, &window).await?;
    Ok(Json(FramesResponse {
        articles: articles.len(),
        totals: report::frame_totals(&articles),
        weekly: report::weekly_frames(&articles),
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct ClusterParams {
    pub since: Option<String>,
    pub days: Option<i64>,
    pub provider: Option<String>,
    pub limit: Option<usize>,
    pub threshold: Option<f64>,
    pub top: Option<usize>,
}

pub async fn clusters(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ClusterParams>,
) -> ApiResult<Vec<ClusterSummary>> {
    let defaults = state.report_options;
    let threshold = params.threshold.unwrap_or(defaults.threshold);
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ApiError::BadRequest("threshold must be within 0..=1".to_string()));
    }

    let window = WindowParams {
        since: params.since,
        days: params.days,
        provider: params.provider,
    };
    let articles = load_window(&state, &window).await?;
    let mut groups = cluster_by_title(&articles, params.limit.unwrap_or(defaults.cluster_limit), threshold);
    sort_by_size(&mut groups);
    groups.truncate(params.top.unwrap_or(defaults.top_clusters));
    Ok(Json(report::cluster_summaries(&groups)))
}

pub async fn country_counts(
    State(state): State<Arc<AppState>>,
    Query(window): Query<WindowParams>,
) -> ApiResult<Vec<report::CountryCount>> {
    let articles = load_window(&state, &window).await?;
    Ok(Json(report::country_counts(&articles)))
}

pub async fn domain_counts(
    State(state): State<Arc<AppState>>,
    Query(window): Query<WindowParams>,
) -> ApiResult<Vec<report::DomainCount>> {
    let articles = load_window(&state, &window).await?;
    Ok(Json(report::domain_counts(&articles)))
}
