//! API handlers for the HTTP REST API

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::ResponseCache;
use crate::directory::{self, RestaurantPage, RestaurantParams, RestaurantQuery};
use crate::engine::TrendEngine;
use crate::error::Error;
use crate::models::{TrendParams, TrendQuery};

/// Header telling clients whether a response came from the cache
pub const CACHE_STATUS_HEADER: &str = "x-cache";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Trend engine over the loaded dataset
    pub engine: Arc<TrendEngine>,
    /// Response cache for `/api/metrics`
    pub cache: Arc<dyn ResponseCache>,
    /// Lifetime of cached responses
    pub cache_ttl: Duration,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    /// Always true
    pub ok: bool,
    /// Server time, RFC 3339
    pub time: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        time: chrono::Utc::now().to_rfc3339(),
    })
}

/// Search, filter and paginate the restaurant directory
pub async fn list_restaurants(
    State(state): State<AppState>,
    params: Result<Query<RestaurantParams>, QueryRejection>,
) -> Result<Json<RestaurantPage>, Error> {
    let Query(params) = params?;
    let query = RestaurantQuery::parse(&params)?;
    let page = directory::search(state.engine.dataset().restaurants(), &query);
    Ok(Json(page))
}

/// Daily order trends and top restaurants by revenue
pub async fn get_metrics(
    State(state): State<AppState>,
    params: Result<Query<TrendParams>, QueryRejection>,
) -> Result<Response, Error> {
    let Query(params) = params?;
    let query = TrendQuery::parse(&params)?;
    let key = query.cache_key(&state.engine.cache_scope());

    match state.cache.get(&key).await {
        Ok(Some(body)) => {
            debug!(key = %key, "Metrics cache hit");
            return Ok(json_response(body, "HIT"));
        }
        Ok(None) => debug!(key = %key, "Metrics cache miss"),
        Err(e) => warn!(error = %e, "Metrics cache read failed"),
    }

    // Filtering and grouping scan the whole order log
    let engine = Arc::clone(&state.engine);
    let result = tokio::task::spawn_blocking(move || engine.compute(&query))
        .await
        .map_err(|e| Error::internal(format!("trend computation failed: {e}")))??;
    let body = serde_json::to_string(&result)?;

    if let Err(e) = state.cache.set(&key, body.clone(), state.cache_ttl).await {
        warn!(error = %e, "Metrics cache write failed");
    }

    Ok(json_response(body, "MISS"))
}

/// Fallback for unknown paths
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not found",
            "path": uri.path(),
        })),
    )
}

fn json_response(body: String, cache_status: &'static str) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (
                header::HeaderName::from_static(CACHE_STATUS_HEADER),
                HeaderValue::from_static(cache_status),
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::create_router;
    use crate::cache::{MemoryCache, NoopCache};
    use crate::dataset::Dataset;
    use crate::engine::TimeNormalizer;
    use crate::models::{Order, Restaurant};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::Router;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn dataset(orders: Vec<Order>) -> Arc<Dataset> {
        let restaurants = vec![
            Restaurant {
                id: 1,
                name: "Tandoori Treats".to_string(),
                cuisine: "North Indian".to_string(),
                location: "Bangalore".to_string(),
            },
            Restaurant {
                id: 2,
                name: "Sushi Bay".to_string(),
                cuisine: "Japanese".to_string(),
                location: "Mumbai".to_string(),
            },
        ];
        Arc::new(Dataset::new(restaurants, orders, &TimeNormalizer::default()).unwrap())
    }

    fn sample_orders() -> Vec<Order> {
        [
            (1, 100.0, "2025-06-22T09:00:00"),
            (1, 50.0, "2025-06-22T09:30:00"),
            (2, 200.0, "2025-06-23T14:00:00"),
        ]
        .into_iter()
        .map(|(restaurant_id, order_amount, time)| Order {
            restaurant_id,
            order_amount,
            order_time: time.to_string(),
        })
        .collect()
    }

    fn app_with(dataset: Arc<Dataset>, cache: Arc<dyn ResponseCache>) -> Router {
        let engine = TrendEngine::new(dataset, TimeNormalizer::default());
        create_router(AppState {
            engine: Arc::new(engine),
            cache,
            cache_ttl: Duration::from_secs(300),
        })
    }

    fn app() -> Router {
        app_with(dataset(sample_orders()), Arc::new(MemoryCache::new(100)))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let cache = response
            .headers()
            .get(CACHE_STATUS_HEADER)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, cache, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = get(app(), "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));
        assert!(body["time"].is_string());
    }

    #[tokio::test]
    async fn test_metrics_defaults() {
        let (status, cache, body) = get(app(), "/api/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("MISS"));
        assert_eq!(
            body,
            json!({
                "daily": [
                    {"date": "2025-06-22", "orders": 2, "revenue": 150.0, "avg_order_value": 75.0, "peak_order_hour": 9},
                    {"date": "2025-06-23", "orders": 1, "revenue": 200.0, "avg_order_value": 200.0, "peak_order_hour": 14}
                ],
                "top3": [
                    {"restaurant_id": 2, "revenue": 200.0},
                    {"restaurant_id": 1, "revenue": 150.0}
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_metrics_hour_filter() {
        let (status, _, body) = get(app(), "/api/metrics?hour_min=10&hour_max=23").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["daily"],
            json!([
                {"date": "2025-06-23", "orders": 1, "revenue": 200.0, "avg_order_value": 200.0, "peak_order_hour": 14}
            ])
        );
    }

    #[tokio::test]
    async fn test_metrics_second_request_hits_cache() {
        let app = app();
        let (_, first, body_a) = get(app.clone(), "/api/metrics?restaurant_id=1&amount_min=").await;
        let (_, second, body_b) = get(app, "/api/metrics?amount_min=&restaurant_id=1").await;
        assert_eq!(first.as_deref(), Some("MISS"));
        assert_eq!(second.as_deref(), Some("HIT"));
        assert_eq!(body_a, body_b);
    }

    #[tokio::test]
    async fn test_metrics_rejects_malformed_params() {
        let (status, _, body) = get(app(), "/api/metrics?hour_min=noon").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("hour_min"));
    }

    #[tokio::test]
    async fn test_repeated_param_is_json_bad_request() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/metrics?hour_min=1&hour_min=2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            HeaderValue::from_static("application/json")
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].as_str().unwrap().contains("hour_min"));

        let (status, _, body) = get(app(), "/api/restaurants?page=1&page=2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("page"));
    }

    #[tokio::test]
    async fn test_half_cent_order_rounds_up() {
        let orders = vec![Order {
            restaurant_id: 1,
            order_amount: 1.005,
            order_time: "2025-06-22T10:00:00".to_string(),
        }];
        let (status, _, body) = get(app_with(dataset(orders), Arc::new(NoopCache)), "/api/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["daily"][0]["revenue"], json!(1.01));
        assert_eq!(body["daily"][0]["avg_order_value"], json!(1.01));
        assert_eq!(body["top3"][0]["revenue"], json!(1.01));
    }

    #[tokio::test]
    async fn test_metrics_without_orders_is_unprocessable() {
        let app = app_with(dataset(vec![]), Arc::new(NoopCache));
        let (status, _, body) = get(app, "/api/metrics").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].is_string());
    }

    struct BrokenCache;

    #[async_trait]
    impl ResponseCache for BrokenCache {
        async fn get(&self, _key: &str) -> crate::error::Result<Option<String>> {
            Err(Error::Redis("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> crate::error::Result<()> {
            Err(Error::Redis("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_metrics_survive_cache_failures() {
        let app = app_with(dataset(sample_orders()), Arc::new(BrokenCache));
        let (status, cache, body) = get(app, "/api/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache.as_deref(), Some("MISS"));
        assert_eq!(body["top3"][0]["restaurant_id"], json!(2));
    }

    #[tokio::test]
    async fn test_restaurants() {
        let (status, _, body) = get(app(), "/api/restaurants?q=sushi").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], json!(1));
        assert_eq!(body["page"], json!(1));
        assert_eq!(body["limit"], json!(10));
        assert_eq!(body["data"][0]["name"], json!("Sushi Bay"));

        let (status, _, _) = get(app(), "/api/restaurants?sort=stars").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let (status, _, body) = get(app(), "/api/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "Not found", "path": "/api/nope"}));
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/api/metrics")
                    .header("origin", "http://localhost:5173")
                    .header("access-control-request-method", "GET")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            HeaderValue::from_static("*")
        );
    }
}
