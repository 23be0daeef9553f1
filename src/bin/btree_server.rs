//! HTTP server exposing an in-memory B-tree.
//!
//! Provides REST API endpoints for:
//! - Insert, delete and search of integer keys
//! - Running command scripts against the tree
//! - Tree visualization export
//! - Configuration management

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
    Router,
};
use btree_memory::{
    BTreeConfig, BTreeError, Script, ScriptReport, SharedBTree, TreeNode, TreeStats,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type SharedState = SharedBTree<i64>;

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<OperationResponse>)>;

/// Request to create or reset the tree
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateTreeRequest {
    key_capacity: Option<usize>,
}

/// Request to insert a key
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertRequest {
    key: i64,
}

/// Request to insert many keys
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BulkInsertRequest {
    keys: Vec<i64>,
}

/// Request to run a command script
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptRequest {
    script: String,
}

/// Response for search operations
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    key: i64,
    found: bool,
    /// Position of the key within its node
    index: Option<usize>,
}

/// Response for operations that return success/failure
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    success: bool,
    message: String,
}

/// Tree visualization response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TreeResponse {
    tree: TreeNode,
    stats: TreeStats,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "btree_server=info,btree_memory=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let state: SharedState = SharedBTree::default();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/api/tree", post(create_tree))
        .route("/api/tree", get(get_tree))
        .route("/api/config", get(get_config))
        .route("/api/keys", get(list_keys))
        .route("/api/keys", post(insert_key))
        .route("/api/keys/:key", get(search_key))
        .route("/api/keys/:key", delete(delete_key))
        .route("/api/stats", get(get_stats))
        .route("/api/clear", post(clear_tree))
        .route("/api/bulk", post(bulk_insert))
        .route("/api/script", post(run_script))
        .layer(cors)
        .with_state(state);

    let listener = match tokio::net::TcpListener::bind("0.0.0.0:3001").await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!("B-tree server running on http://localhost:3001");
    println!("API Endpoints:");
    println!("  POST   /api/tree       - Create/reset tree ({{\"keyCapacity\": n}})");
    println!("  GET    /api/tree       - Get tree structure for visualization");
    println!("  GET    /api/config     - Get B-tree config");
    println!("  GET    /api/keys       - List all keys in order");
    println!("  POST   /api/keys       - Insert a key");
    println!("  GET    /api/keys/:key  - Search for a key");
    println!("  DELETE /api/keys/:key  - Delete a key");
    println!("  GET    /api/stats      - Get tree stats");
    println!("  POST   /api/clear      - Remove all keys");
    println!("  POST   /api/bulk       - Bulk insert keys");
    println!("  POST   /api/script     - Run a command script");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}

fn error_response(e: BTreeError) -> (StatusCode, Json<OperationResponse>) {
    let status = match e {
        BTreeError::EmptyTree => StatusCode::CONFLICT,
        BTreeError::CapacityOutOfRange { .. } | BTreeError::Parse { .. } => {
            StatusCode::BAD_REQUEST
        }
        BTreeError::Corruption(_) | BTreeError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(OperationResponse {
            success: false,
            message: e.to_string(),
        }),
    )
}

async fn create_tree(
    State(state): State<SharedState>,
    Json(req): Json<CreateTreeRequest>,
) -> ApiResult<OperationResponse> {
    let config = match req.key_capacity {
        Some(capacity) => BTreeConfig::new(capacity).map_err(error_response)?,
        None => BTreeConfig::default(),
    };
    state.reset(config).map_err(error_response)?;
    tracing::info!(key_capacity = config.key_capacity, "tree reset");

    Ok(Json(OperationResponse {
        success: true,
        message: format!("Tree created with key capacity {}", config.key_capacity),
    }))
}

async fn get_tree(State(state): State<SharedState>) -> Json<TreeResponse> {
    let (tree, stats) = state.read(|tree| (tree.export(), tree.stats()));
    Json(TreeResponse { tree, stats })
}

async fn get_config(State(state): State<SharedState>) -> Json<BTreeConfig> {
    Json(state.config())
}

async fn list_keys(State(state): State<SharedState>) -> Json<Vec<i64>> {
    Json(state.keys())
}

async fn insert_key(
    State(state): State<SharedState>,
    Json(req): Json<InsertRequest>,
) -> Json<OperationResponse> {
    let inserted = state.insert(req.key);
    Json(OperationResponse {
        success: inserted,
        message: if inserted {
            format!("Inserted key {}", req.key)
        } else {
            format!("Key {} already present", req.key)
        },
    })
}

async fn search_key(
    State(state): State<SharedState>,
    Path(key): Path<i64>,
) -> ApiResult<SearchResponse> {
    let index = state.search(&key).map_err(error_response)?;
    Ok(Json(SearchResponse {
        key,
        found: index.is_some(),
        index,
    }))
}

async fn delete_key(
    State(state): State<SharedState>,
    Path(key): Path<i64>,
) -> ApiResult<OperationResponse> {
    let deleted = state.remove(&key).map_err(error_response)?;
    Ok(Json(OperationResponse {
        success: true,
        message: if deleted {
            format!("Deleted key {}", key)
        } else {
            format!("Key {} not found", key)
        },
    }))
}

async fn get_stats(State(state): State<SharedState>) -> Json<TreeStats> {
    Json(state.stats())
}

async fn clear_tree(State(state): State<SharedState>) -> Json<OperationResponse> {
    state.clear();
    Json(OperationResponse {
        success: true,
        message: "Tree cleared".to_string(),
    })
}

async fn bulk_insert(
    State(state): State<SharedState>,
    Json(req): Json<BulkInsertRequest>,
) -> Json<OperationResponse> {
    let total = req.keys.len();
    let inserted = state.write(|tree| req.keys.into_iter().filter(|&k| tree.insert(k)).count());
    Json(OperationResponse {
        success: true,
        message: format!(
            "Inserted {} keys ({} duplicates skipped)",
            inserted,
            total - inserted
        ),
    })
}

async fn run_script(
    State(state): State<SharedState>,
    Json(req): Json<ScriptRequest>,
) -> ApiResult<ScriptReport> {
    let script = Script::parse(&req.script).map_err(error_response)?;
    let report = state
        .write(|tree| script.run(tree))
        .map_err(error_response)?;
    Ok(Json(report))
}
