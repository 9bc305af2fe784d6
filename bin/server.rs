// Flagged Transaction Index - Web Server
// REST API over one shared Coordinator with Axum

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{header, request::Parts, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::info;
use flagged_bst::{
    config::origin_matches, init_tracing, Coordinator, DeletionCase, FlaggedTransaction,
    SearchReport, ServerConfig,
};

/// Shared application state
///
/// One lock guards both containers: searches share the read side,
/// inserts and deletes take the write side.
#[derive(Clone)]
struct AppState {
    coordinator: Arc<RwLock<Coordinator>>,
}

impl AppState {
    fn new(coordinator: Coordinator) -> Self {
        Self {
            coordinator: Arc::new(RwLock::new(coordinator)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Coordinator> {
        self.coordinator.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Coordinator> {
        self.coordinator.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// POST body for flagging a transaction
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionRequest {
    transaction_id: Option<String>,
    amount: Option<f64>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
    transaction_id: Option<String>,
}

/// Search response: record plus BST vs list cost
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    transaction: Option<FlaggedTransaction>,
    found: bool,
    bst_comparisons: usize,
    list_comparisons: usize,
    list_size: usize,
    efficiency_note: String,
}

impl From<SearchReport> for SearchResponse {
    fn from(report: SearchReport) -> Self {
        let efficiency_note = if report.linear_store_size > 0 {
            format!(
                "BST used {} comparisons (O(log n) average, O(n) when skewed). \
                 Unordered list used {} comparisons (O(n)). \
                 The gap widens as the flagged set grows.",
                report.ordered_comparisons, report.linear_comparisons
            )
        } else {
            "No flagged transactions stored yet. Add some to compare search cost.".to_string()
        };

        Self {
            transaction: report.record,
            found: report.found,
            bst_comparisons: report.ordered_comparisons,
            list_comparisons: report.linear_comparisons,
            list_size: report.linear_store_size,
            efficiency_note,
        }
    }
}

/// Delete response: outcome plus what the removal did to the tree
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteResponse {
    deleted: bool,
    node_type: Option<&'static str>,
    impact_explanation: Option<&'static str>,
}

fn node_type(case: DeletionCase) -> &'static str {
    match case {
        DeletionCase::Leaf => "LEAF",
        DeletionCase::SingleChild => "ONE_CHILD",
        DeletionCase::TwoChildren => "TWO_CHILDREN",
    }
}

fn impact_explanation(case: DeletionCase) -> &'static str {
    match case {
        DeletionCase::Leaf => {
            "Leaf node: no children, so the parent's link was cleared. \
             No other node moved and nothing was rebalanced."
        }
        DeletionCase::SingleChild => {
            "Node with one child: the parent now links straight to that child. \
             The child's subtree is untouched, so search paths below it are unchanged."
        }
        DeletionCase::TwoChildren => {
            "Node with two children: its in-order successor (leftmost node of the right subtree) \
             moved into its place and the successor's old node was unlinked. Ordering is preserved."
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health, /actuator/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "UP" }))
}

/// 400 with the same body shape as a successful insert
fn rejected_insert(message: &str, size: usize) -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "success": false,
            "message": message,
            "size": size,
        })),
    )
        .into_response()
}

/// POST /api/flagged-transactions - Flag a transaction (BST insert)
async fn insert_transaction(
    State(state): State<AppState>,
    payload: Result<Json<TransactionRequest>, JsonRejection>,
) -> impl IntoResponse {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let message = format!("Invalid request body: {}", rejection.body_text());
            return rejected_insert(&message, state.read().size());
        }
    };

    let (Some(transaction_id), Some(amount)) = (request.transaction_id, request.amount) else {
        return rejected_insert("transactionId and amount are required.", state.read().size());
    };

    let mut coordinator = state.write();
    let inserted = coordinator.insert(&transaction_id, amount, request.reason);
    let size = coordinator.size();
    drop(coordinator);

    if !inserted {
        return rejected_insert("transactionId must not be blank.", size);
    }

    let location = format!(
        "/api/flagged-transactions/{}",
        urlencoding::encode(&transaction_id)
    );

    (
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(json!({
            "success": true,
            "message": "Flagged transaction added to BST.",
            "size": size,
        })),
    )
        .into_response()
}

/// GET /api/flagged-transactions/search?transactionId= - Lookup with cost comparison
async fn search_transaction(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let Some(transaction_id) = params.transaction_id else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "transactionId query parameter is required" })),
        )
            .into_response();
    };

    let report = state.read().search(&transaction_id);
    (StatusCode::OK, Json(SearchResponse::from(report))).into_response()
}

/// DELETE /api/flagged-transactions/:transactionId - Remove a reviewed transaction
async fn delete_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> impl IntoResponse {
    let outcome = state.write().delete(&transaction_id);

    Json(DeleteResponse {
        deleted: outcome.deleted,
        node_type: outcome.case.map(node_type),
        impact_explanation: outcome.case.map(impact_explanation),
    })
}

/// GET /api/flagged-transactions - All transactions, ascending by id
async fn list_transactions(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.read().list_all())
}

/// GET /api/flagged-transactions/size - Tree size
async fn tree_size(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "size": state.read().size() }))
}

/// GET /api/docs/bst-explanation - How the index behaves
async fn bst_explanation() -> impl IntoResponse {
    Json(json!({
        "title": "Flagged Transaction BST - Implementation Notes",
        "insertion": {
            "description": "Insertion adds a flagged transaction while keeping the tree ordered.",
            "behavior": "Ids are compared byte-wise: smaller ids go left, larger ids go right. \
                         Re-flagging an existing id replaces its payload in place."
        },
        "search": {
            "description": "Search finds a flagged transaction by id.",
            "bstEfficiency": "O(log n) on average; O(n) when ids arrive in sorted order and the tree degrades into a chain.",
            "listEfficiency": "O(n) always: the unordered list may check every element.",
            "comparison": "Every search reports the comparison count of both structures."
        },
        "deletion": {
            "description": "Deletion removes a reviewed transaction from the flagged set.",
            "leafNode": impact_explanation(DeletionCase::Leaf),
            "oneChild": impact_explanation(DeletionCase::SingleChild),
            "twoChildren": impact_explanation(DeletionCase::TwoChildren)
        },
        "fraudSystemImpact": "Every delete leaves a valid search tree, so later searches and inserts \
                              keep working on the remaining flagged transactions."
    }))
}

// ============================================================================
// Router
// ============================================================================

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let allow_origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let patterns = config.allowed_origins.clone();
        AllowOrigin::predicate(move |origin: &HeaderValue, _parts: &Parts| {
            origin
                .to_str()
                .map(|origin| patterns.iter().any(|p| origin_matches(p, origin)))
                .unwrap_or(false)
        })
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
            Method::HEAD,
        ])
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600))
}

fn app(state: AppState, config: &ServerConfig) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route(
            "/flagged-transactions",
            get(list_transactions).post(insert_transaction),
        )
        .route("/flagged-transactions/search", get(search_transaction))
        .route("/flagged-transactions/size", get(tree_size))
        .route(
            "/flagged-transactions/:transaction_id",
            axum::routing::delete(delete_transaction),
        )
        .route("/docs/bst-explanation", get(bst_explanation))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .route("/actuator/health", get(health_check))
        .layer(cors_layer(config))
}

// ============================================================================
// Main Server
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env().context("Failed to load server configuration")?;
    init_tracing(&config.log_filter);

    println!("🌐 Flagged Transaction Index - Web Server");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let coordinator = Coordinator::new();
    info!(session = %coordinator.session_id(), "session started");

    let app = app(AppState::new(coordinator), &config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, origins = ?config.allowed_origins, "server listening");
    println!("\n🚀 Server running on http://{}", config.bind_addr);
    println!("   API: http://{}/api/flagged-transactions", config.bind_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server terminated with an error")?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let config = ServerConfig::from_lookup(|_| None).unwrap();
        app(AppState::new(Coordinator::new()), &config)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post(body: Value) -> Request<Body> {
        Request::post("/api/flagged-transactions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_insert_search_delete_flow() {
        let app = test_app();

        for id in ["TXN100", "TXN050", "TXN150", "TXN120", "TXN180"] {
            let (status, body) = send(&app, post(json!({ "transactionId": id, "amount": 10.0 }))).await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["success"], true);
        }

        let (status, body) = send(&app, get_req("/api/flagged-transactions/search?transactionId=TXN180")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["found"], true);
        assert_eq!(body["bstComparisons"], 3);
        assert_eq!(body["listComparisons"], 5);
        assert_eq!(body["listSize"], 5);
        assert_eq!(body["transaction"]["transactionId"], "TXN180");

        let delete = Request::delete("/api/flagged-transactions/TXN100")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(&app, delete).await;
        assert_eq!(body["deleted"], true);
        assert_eq!(body["nodeType"], "TWO_CHILDREN");

        let (_, body) = send(&app, get_req("/api/flagged-transactions")).await;
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["transactionId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["TXN050", "TXN120", "TXN150", "TXN180"]);

        let (_, body) = send(&app, get_req("/api/flagged-transactions/size")).await;
        assert_eq!(body["size"], 4);
    }

    #[tokio::test]
    async fn test_blank_or_missing_fields_are_bad_requests() {
        let app = test_app();

        let (status, body) = send(&app, post(json!({ "transactionId": "  ", "amount": 1.0 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = send(&app, post(json!({ "transactionId": "TXN1" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Wrong JSON type for amount gets the same 400 body, not axum's 422
        let (status, body) = send(&app, post(json!({ "transactionId": "TXN1", "amount": "abc" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["size"], 0);
        assert!(body["message"].as_str().unwrap().starts_with("Invalid request body"));

        let malformed = Request::post("/api/flagged-transactions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(&app, malformed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);

        let (status, _) = send(&app, get_req("/api/flagged-transactions/search")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_delete_missing_reports_null_type() {
        let app = test_app();
        let delete = Request::delete("/api/flagged-transactions/TXN999")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(&app, delete).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], false);
        assert!(body["nodeType"].is_null());
        assert!(body["impactExplanation"].is_null());
    }

    #[tokio::test]
    async fn test_empty_store_note_and_health() {
        let app = test_app();

        let (_, body) = send(&app, get_req("/api/flagged-transactions/search?transactionId=TXN1")).await;
        assert_eq!(body["found"], false);
        assert!(body["efficiencyNote"].as_str().unwrap().starts_with("No flagged"));

        let (status, body) = send(&app, get_req("/actuator/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "UP");
    }

    #[tokio::test]
    async fn test_cors_allows_github_pages() {
        let app = test_app();
        let request = Request::get("/api/health")
            .header(header::ORIGIN, "https://someone.github.io")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://someone.github.io"
        );
    }
}
