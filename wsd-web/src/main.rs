//! Servidor web Axum com WebSocket para visualização da desambiguação de sentidos em tempo real

mod corpus;
mod evaluator;
mod extract;
mod pipeline;
mod tokenizer;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;
use wsd_core::encoder_by_name;

use crate::corpus::demo_texts;
use crate::pipeline::{DisambiguationEvent, WsdPipeline};

/// Estado compartilhado entre os handlers: o pipeline já treinado
struct AppState {
    pipeline: WsdPipeline,
}

#[derive(Deserialize)]
struct AnalyzeRequest {
    text: String,
}

/// Pedido de análise chegando pelo WebSocket
#[derive(Deserialize)]
struct WsRequest {
    text: String,
}

#[derive(Deserialize)]
struct EncodeRequest {
    lexelt: String,
    #[serde(default)]
    format: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .init();

    let pipeline = WsdPipeline::new();
    let state = Arc::new(AppState { pipeline });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // docs/ fica na raiz do workspace, um nível acima deste crate
    let docs_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("workspace root")
        .join("docs");

    let app = Router::new()
        .route("/", get(index_handler))
        .route("/analyze", post(analyze_handler))
        .route("/encode", post(encode_handler))
        .route("/ws", get(ws_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .route("/lexelts", get(lexelts_handler))
        .nest_service("/docs", ServeDir::new(docs_dir))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("🚀 Servidor WSD iniciado em http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}

/// Página única da demonstração, embutida no binário
async fn index_handler() -> impl IntoResponse {
    Html(include_str!("templates/index.html"))
}

/// Análise WSD via HTTP POST (sem streaming)
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Texto vazio"})),
        )
            .into_response();
    }

    match state.pipeline.analyze(&req.text) {
        Ok(analysis) => Json(analysis).into_response(),
        Err(error) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": error.to_string()})),
        )
            .into_response(),
    }
}

/// Problema de treino de um lexelt no formato do back-end pedido
async fn encode_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EncodeRequest>,
) -> impl IntoResponse {
    let format = req.format.as_deref().unwrap_or("liblinear");
    let Some(encoder) = encoder_by_name(format) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": format!("Formato desconhecido: {format}")})),
        )
            .into_response();
    };
    let Some(model) = state.pipeline.model(&req.lexelt) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": format!("Lexelt desconhecido: {}", req.lexelt)})),
        )
            .into_response();
    };

    let mut buffer = Vec::new();
    if let Err(error) = encoder.write_to(model.lexelt(), model.statistic(), &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": error.to_string()})),
        )
            .into_response();
    }

    Json(serde_json::json!({
        "lexelt": req.lexelt,
        "format": encoder.name(),
        "problem": String::from_utf8_lossy(&buffer).into_owned(),
    }))
    .into_response()
}

/// Textos de exemplo para os botões da interface
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(domain, text)| {
            serde_json::json!({
                "domain": domain,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

/// Lexelts treinados disponíveis para o endpoint de codificação
async fn lexelts_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ids: Vec<String> = state
        .pipeline
        .lexelt_ids()
        .into_iter()
        .map(str::to_owned)
        .collect();
    Json(ids)
}

/// Faz o upgrade da conexão para WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Lógica do WebSocket: recebe texto, roda o pipeline e envia os eventos passo a passo
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                // Tenta parsear como JSON {text}; senão usa como texto puro
                let text_str = if let Ok(req) = serde_json::from_str::<WsRequest>(&text) {
                    req.text.trim().to_string()
                } else {
                    text.trim().to_string()
                };

                if text_str.is_empty() {
                    continue;
                }

                info!("Analisando via WebSocket: {} chars", text_str.len());

                // Roda o pipeline em spawn_blocking para não bloquear o runtime
                let (tx_std, rx_std) = std::sync::mpsc::channel::<DisambiguationEvent>();
                let state_for_thread = Arc::clone(&state);
                let text_for_thread = text_str.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    state_for_thread
                        .pipeline
                        .analyze_streaming(&text_for_thread, tx_std);
                });
                handle.await.ok();

                // Coleta os eventos da fila após o pipeline concluir
                let events: Vec<DisambiguationEvent> = rx_std.try_iter().collect();
                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json.into())).await.is_err() {
                            return; // cliente desconectou
                        }
                        // Pequena pausa para animação visual (passo a passo)
                        tokio::time::sleep(tokio::time::Duration::from_millis(35)).await;
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
