//! REST API handlers for the usage snapshot and credential CRUD

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use quotawatch_core::error::{AggregateError, StoreError};
use quotawatch_core::usage::Snapshot;
use quotawatch_core::{Aggregator, CredentialStore};

/// Helper to create JSON error responses
fn json_error(status: StatusCode, message: &str) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(serde_json::json!({"error": message})))
}

/// Error shape shared by all handlers
type ApiError = (StatusCode, Json<serde_json::Value>);

/// Shared application state for API handlers
pub struct ApiState {
    pub store: Arc<dyn CredentialStore>,
    pub aggregator: Arc<Aggregator>,
}

/// Credential information for API responses (masked, never the raw secret)
#[derive(Debug, Serialize)]
pub struct CredentialInfo {
    pub id: String,
    pub masked_secret: String,
}

/// Add-credential request body
#[derive(Debug, Deserialize)]
pub struct AddCredentialRequest {
    pub id: String,
    pub secret: String,
}

/// GET /api/usage: run one aggregation cycle and return the snapshot
pub async fn get_usage(State(state): State<Arc<ApiState>>) -> Result<Json<Snapshot>, ApiError> {
    let credentials = state.store.list_all().map_err(store_error)?;
    match state.aggregator.aggregate(&credentials).await {
        Ok(snapshot) => Ok(Json(snapshot)),
        Err(AggregateError::NoCredentials) => Err(json_error(
            StatusCode::BAD_REQUEST,
            "no credentials configured",
        )),
    }
}

/// GET /api/credentials: list registered credentials, masked
pub async fn list_credentials(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<CredentialInfo>>, ApiError> {
    let credentials = state.store.list_all().map_err(store_error)?;
    let infos = credentials
        .iter()
        .map(|c| CredentialInfo {
            id: c.id.clone(),
            masked_secret: c.masked_secret(),
        })
        .collect();
    Ok(Json(infos))
}

/// POST /api/credentials: register a new credential
pub async fn add_credential(
    State(state): State<Arc<ApiState>>,
    Json(body): Json<AddCredentialRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .add(&body.id, &body.secret)
        .map_err(store_error)?;
    tracing::info!("credential '{}' registered via API", body.id);
    Ok(StatusCode::CREATED)
}

/// DELETE /api/credentials/{id}: remove a credential
pub async fn delete_credential(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.remove(&id).map_err(store_error)?;
    tracing::info!("credential '{}' removed via API", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Map store errors onto HTTP statuses
fn store_error(err: StoreError) -> ApiError {
    let status = match err {
        StoreError::EmptyId | StoreError::EmptySecret => StatusCode::BAD_REQUEST,
        StoreError::Duplicate(_) => StatusCode::CONFLICT,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Io(_) | StoreError::Corrupt(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    json_error(status, &err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::routing::{delete, get};
    use axum::Router;
    use http::Request;
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use quotawatch_core::report::NullBalanceSink;
    use quotawatch_core::{MemoryStore, UsageFetcher};
    use std::time::Duration;
    use tower::ServiceExt;

    /// Build a Router over a fresh in-memory store; the aggregator points at
    /// `endpoint` (unreachable by default, tests that need a live upstream
    /// spawn one).
    fn test_router_with_endpoint(store: Arc<MemoryStore>, endpoint: String) -> Router {
        let aggregator = Arc::new(Aggregator::new(
            UsageFetcher::new(endpoint, Duration::from_secs(2)),
            8,
            Arc::new(NullBalanceSink),
        ));
        let api_state = Arc::new(ApiState {
            store,
            aggregator,
        });
        Router::new()
            .route("/usage", get(get_usage))
            .route("/credentials", get(list_credentials).post(add_credential))
            .route("/credentials/{id}", delete(delete_credential))
            .with_state(api_state)
    }

    fn test_router(store: Arc<MemoryStore>) -> Router {
        test_router_with_endpoint(store, "http://127.0.0.1:9/usage".to_string())
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_credential(id: &str, secret: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/credentials")
            .header("content-type", "application/json")
            .body(Body::from(
                serde_json::json!({"id": id, "secret": secret}).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_credentials_empty() {
        let app = test_router(Arc::new(MemoryStore::new()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/credentials")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let list: Vec<serde_json::Value> = serde_json::from_value(body_json(response).await).unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_add_then_list_masks_secret() {
        let store = Arc::new(MemoryStore::new());
        let app = test_router(store.clone());

        let response = app
            .clone()
            .oneshot(post_credential("alpha", "sk-0123456789abcdef"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/credentials")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body[0]["id"], "alpha");
        assert_eq!(body[0]["masked_secret"], "sk-0...cdef");
        // Raw secret never appears in the listing
        assert!(!body.to_string().contains("sk-0123456789abcdef"));
    }

    #[tokio::test]
    async fn test_add_duplicate_conflicts() {
        let app = test_router(Arc::new(MemoryStore::new()));
        let response = app
            .clone()
            .oneshot(post_credential("alpha", "secret-1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(post_credential("alpha", "secret-2"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_add_empty_id_rejected() {
        let app = test_router(Arc::new(MemoryStore::new()));
        let response = app.oneshot(post_credential("", "secret")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_missing_not_found() {
        let app = test_router(Arc::new(MemoryStore::new()));
        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/credentials/ghost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_existing() {
        let store = Arc::new(MemoryStore::new());
        store.add("alpha", "secret").unwrap();
        let app = test_router(store.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/credentials/alpha")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(!store.exists("alpha"));
    }

    #[tokio::test]
    async fn test_usage_without_credentials_is_bad_request() {
        let app = test_router(Arc::new(MemoryStore::new()));
        let response = app
            .oneshot(Request::builder().uri("/usage").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "no credentials configured");
    }

    #[tokio::test]
    async fn test_usage_snapshot_with_live_upstream() {
        // Minimal upstream that answers every credential with the same body
        let upstream = Router::new().route(
            "/usage",
            get(|| async {
                Json(serde_json::json!({
                    "usage": {
                        "startDate": 1754006400000_i64,
                        "endDate": 1756684800000_i64,
                        "standard": {
                            "orgTotalTokensUsed": 40,
                            "totalAllowance": 100,
                            "usedRatio": 0.4
                        }
                    }
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/usage", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, upstream).await.unwrap();
        });

        let store = Arc::new(MemoryStore::new());
        store.add("alpha", "sk-0123456789abcdef").unwrap();
        let app = test_router_with_endpoint(store, endpoint);

        let response = app
            .oneshot(Request::builder().uri("/usage").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["credential_count"], 1);
        assert_eq!(body["totals"]["total_remaining"], 60.0);
        assert_eq!(body["outcomes"][0]["status"], "usage");
        assert_eq!(body["outcomes"][0]["id"], "alpha");
        assert_eq!(body["outcomes"][0]["masked_secret"], "sk-0...cdef");
    }
}
