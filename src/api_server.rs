//! Tokenizer HTTP/WebSocket API
//!
//! Lets a browser front end (sliders, token chips, history table) call the
//! codec and keep an audit trail of tokenized examples.

use anyhow::{Context, Result};
use axum::{
    extract::{
        rejection::JsonRejection,
        ws::{Message, WebSocket},
        Path, Query, Request, State, WebSocketUpgrade,
    },
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::codec::workspace::MotionKind;
use crate::codec::{
    breakdown, decode, encode, BreakdownRow, CodecError, ContinuousAction, DecodedAction,
    DiscreteBins, TokenSequence,
};
use crate::core::state::{AppState, Rt2Config};
use crate::io::console::{Console, ConsoleEvent};
use crate::store::{ExampleStore, StoredExample, TokenizedExample};

// --- Errors ---

#[derive(Debug)]
pub enum ApiError {
    Codec(CodecError),
    Body(JsonRejection),
    NotFound(String),
    Internal(anyhow::Error),
}

impl From<CodecError> for ApiError {
    fn from(e: CodecError) -> Self {
        ApiError::Codec(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::Body(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Codec(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Body(e) => (e.status(), e.body_text()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(e) => {
                Console::emit(ConsoleEvent::Error(format!("{:#}", e)));
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        (
            status,
            Json(serde_json::json!({ "status": "error", "error": message })),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

// --- Request/Response Types ---

#[derive(Debug, Deserialize)]
pub struct TokenizeRequest {
    pub action: ContinuousAction,
    #[serde(default)]
    pub save: bool,
}

#[derive(Debug, Serialize)]
pub struct TokenizeResponse {
    pub action: ContinuousAction,
    pub bins: DiscreteBins,
    pub tokens: TokenSequence,
    pub breakdown: Vec<BreakdownRow>,
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct DetokenizeRequest {
    pub tokens: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct WorkspaceRequest {
    pub kind: MotionKind,
    pub position: [f64; 3],
    #[serde(default)]
    pub yaw: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkspaceResponse {
    pub tokens: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub stored_examples: usize,
}

// --- Handler Functions ---

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "rt2tok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn get_status(State(state): State<AppState>) -> ApiResult<StatusResponse> {
    Ok(Json(StatusResponse {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        stored_examples: state.store.count().await?,
    }))
}

async fn tokenize(
    State(state): State<AppState>,
    payload: std::result::Result<Json<TokenizeRequest>, JsonRejection>,
) -> ApiResult<TokenizeResponse> {
    let Json(request) = payload?;
    let action = request.action;
    let encoded = encode(&action)?;
    let rows = breakdown(&action)?;

    let id = if request.save {
        Some(
            state
                .store
                .insert(TokenizedExample::new(action, encoded))
                .await?,
        )
    } else {
        None
    };

    Ok(Json(TokenizeResponse {
        action,
        bins: encoded.bins,
        tokens: encoded.tokens,
        breakdown: rows,
        id,
    }))
}

async fn detokenize(
    payload: std::result::Result<Json<DetokenizeRequest>, JsonRejection>,
) -> ApiResult<DecodedAction> {
    let Json(request) = payload?;
    Ok(Json(decode(&request.tokens)?))
}

async fn workspace_tokens(
    State(state): State<AppState>,
    payload: std::result::Result<Json<WorkspaceRequest>, JsonRejection>,
) -> ApiResult<WorkspaceResponse> {
    let Json(request) = payload?;
    let tokens = state
        .workspace
        .action_to_tokens(request.kind, request.position, request.yaw)?;
    Ok(Json(WorkspaceResponse { tokens }))
}

async fn list_examples(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<StoredExample>> {
    let cap = state.config.history_limit;
    let limit = params.limit.unwrap_or(cap).min(cap);
    Ok(Json(state.store.list(limit).await?))
}

async fn get_example(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StoredExample> {
    match state.store.get(id).await? {
        Some(entry) => Ok(Json(entry)),
        None => Err(ApiError::NotFound(format!("No example with id {}", id))),
    }
}

async fn delete_example(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    if state.store.remove(id).await? {
        Ok(Json(serde_json::json!({ "status": "deleted", "id": id })))
    } else {
        Err(ApiError::NotFound(format!("No example with id {}", id)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WsCommand {
    Tokenize { action: ContinuousAction },
    Detokenize { tokens: Vec<i64> },
    Ping,
}

fn ws_reply(command: WsCommand) -> serde_json::Value {
    match command {
        WsCommand::Tokenize { action } => match encode(&action) {
            Ok(encoded) => serde_json::json!({
                "type": "tokens",
                "bins": encoded.bins,
                "tokens": encoded.tokens,
            }),
            Err(e) => serde_json::json!({ "type": "error", "message": e.to_string() }),
        },
        WsCommand::Detokenize { tokens } => match decode(&tokens) {
            Ok(decoded) => serde_json::json!({
                "type": "action",
                "action": decoded.action,
                "bins": decoded.bins,
            }),
            Err(e) => serde_json::json!({ "type": "error", "message": e.to_string() }),
        },
        WsCommand::Ping => serde_json::json!({ "type": "pong" }),
    }
}

async fn websocket_handler(ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(handle_websocket)
}

async fn handle_websocket(mut socket: WebSocket) {
    let welcome = serde_json::json!({ "type": "connected", "message": "rt2tok WebSocket API" });
    if socket
        .send(Message::Text(welcome.to_string().into()))
        .await
        .is_err()
    {
        return;
    }

    while let Some(Ok(msg)) = socket.recv().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        let reply = match serde_json::from_str::<WsCommand>(text.as_str()) {
            Ok(command) => ws_reply(command),
            Err(e) => serde_json::json!({ "type": "error", "message": format!("Bad command: {}", e) }),
        };
        if socket
            .send(Message::Text(reply.to_string().into()))
            .await
            .is_err()
        {
            break;
        }
    }
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let started = Instant::now();
    let response = next.run(request).await;
    Console::emit(ConsoleEvent::Request {
        method,
        path,
        status: response.status().as_u16(),
        micros: started.elapsed().as_micros(),
    });
    response
}

/// Build the API router
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(get_status))
        .route("/tokenize", post(tokenize))
        .route("/detokenize", post(detokenize))
        .route("/workspace/tokens", post(workspace_tokens))
        .route("/examples", get(list_examples))
        .route("/examples/{id}", get(get_example).delete(delete_example))
        .route("/ws", get(websocket_handler))
        .layer(middleware::from_fn(log_request))
        .layer(cors)
        .with_state(state)
}

/// Start the API server
pub async fn start_server(config: Rt2Config) -> Result<()> {
    let store = config.open_store().await?;
    let addr = format!("{}:{}", config.bind, config.port);
    let state = AppState::new(config, store)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    println!("🌐 rt2tok API server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            Console::emit(ConsoleEvent::Info("Shutting down".to_string()));
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_tokenize_reply() {
        let command: WsCommand = serde_json::from_str(
            r#"{"type":"tokenize","action":{"terminate":0,"x":0,"y":0,"z":0,"rx":0,"ry":0,"rz":0,"gripper":1}}"#,
        )
        .unwrap();
        let reply = ws_reply(command);
        assert_eq!(reply["type"], "tokens");
        assert_eq!(reply["tokens"][7], 255);
        assert_eq!(reply["bins"]["x"], 127);
    }

    #[test]
    fn test_ws_detokenize_error() {
        let command: WsCommand =
            serde_json::from_str(r#"{"type":"detokenize","tokens":[1,2]}"#).unwrap();
        let reply = ws_reply(command);
        assert_eq!(reply["type"], "error");
    }

    #[test]
    fn test_ws_ping() {
        let command: WsCommand = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(ws_reply(command)["type"], "pong");
    }
}
