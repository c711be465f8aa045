use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use ialab_rs_config::BackendConfig;
use ialab_rs_core::{ApiError, ChatApi, HttpChatApi, NetworkErrorKind};
use ialab_rs_protocol::{
    HistoryEntry, LoadModelRequest, Role, SaveHistoryRequest, UserInputRequest,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone, Default)]
struct Backend {
    received: Arc<Mutex<Vec<(&'static str, Value)>>>,
}

impl Backend {
    fn record(&self, endpoint: &'static str, body: Value) {
        self.received.lock().push((endpoint, body));
    }

    fn received(&self) -> Vec<(&'static str, Value)> {
        self.received.lock().clone()
    }
}

async fn user_input(State(backend): State<Backend>, Json(body): Json<Value>) -> StatusCode {
    backend.record("user_input", body);
    StatusCode::OK
}

async fn stop_response(State(backend): State<Backend>) -> StatusCode {
    backend.record("stop_response", Value::Null);
    StatusCode::OK
}

async fn recuperar_historial(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    match query.get("nombre_chat") {
        Some(name) => Json(json!([
            { "id": "1", "role": "user", "content": name, "timestamp": 1 },
            { "id": "2", "role": "assistant", "content": { "text": "hola" }, "timestamp": 2 },
        ])),
        None => Json(json!(["viaje", "recetas"])),
    }
}

async fn actualizar_historial(
    State(backend): State<Backend>,
    Json(body): Json<Value>,
) -> StatusCode {
    backend.record("actualizar_historial", body);
    StatusCode::OK
}

async fn eliminar_historial(
    State(backend): State<Backend>,
    Query(query): Query<HashMap<String, String>>,
) -> StatusCode {
    backend.record("eliminar_historial", json!(query));
    StatusCode::NO_CONTENT
}

async fn models_and_formats() -> Json<Value> {
    Json(json!({
        "models": ["llama.gguf", { "path": "mistral.gguf", "size": 4096 }],
        "formats": ["chatml", "llama-2"],
    }))
}

async fn load_model(State(backend): State<Backend>, mut multipart: Multipart) -> StatusCode {
    let mut fields = serde_json::Map::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        fields.insert(name, Value::String(value));
    }
    backend.record("load_model", Value::Object(fields));
    StatusCode::OK
}

async fn unload_model() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "No model is loaded")
}

async fn slow() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(3)).await;
    StatusCode::OK
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

async fn spawn_backend(backend: Backend) -> String {
    let app = Router::new()
        .route("/user_input", post(user_input))
        .route("/stop_response", post(stop_response))
        .route("/recuperar_historial", get(recuperar_historial))
        .route("/actualizar_historial", post(actualizar_historial))
        .route("/eliminar_historial", delete(eliminar_historial))
        .route("/api/models-and-formats", get(models_and_formats))
        .route("/load_model", post(load_model))
        .route("/unload_model", post(unload_model))
        .with_state(backend);
    serve(app).await
}

fn client(base_url: String) -> HttpChatApi {
    HttpChatApi::new(&BackendConfig {
        base_url,
        channel_url: None,
        request_timeout_secs: 1,
    })
    .expect("client")
}

#[tokio::test]
async fn user_input_posts_history_json() {
    let backend = Backend::default();
    let api = client(spawn_backend(backend.clone()).await);
    let request = UserInputRequest {
        content: vec![
            HistoryEntry::new(Role::System, "Be brief."),
            HistoryEntry::new(Role::User, "hola"),
        ],
        tools: true,
        rag: false,
        turn_id: None,
    };
    api.send_user_input(&request).await.expect("send");
    api.stop_response().await.expect("stop");

    let received = backend.received();
    assert_eq!(
        received,
        vec![
            (
                "user_input",
                json!({
                    "content": [
                        { "role": "system", "content": "Be brief." },
                        { "role": "user", "content": "hola" },
                    ],
                    "tools": true,
                    "rag": false,
                }),
            ),
            ("stop_response", Value::Null),
        ]
    );
}

#[tokio::test]
async fn history_endpoints_round_trip() {
    let backend = Backend::default();
    let api = client(spawn_backend(backend.clone()).await);

    assert_eq!(
        api.list_chats().await.expect("list"),
        vec!["viaje".to_string(), "recetas".to_string()]
    );
    let messages = api.load_chat("viaje").await.expect("load");
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content.text(), "viaje");
    assert_eq!(messages[1].role, Role::Assistant);

    api.save_chat(&SaveHistoryRequest {
        nombre_chat: "viaje".to_string(),
        historial: messages,
    })
    .await
    .expect("save");
    api.delete_chat("viaje").await.expect("delete");

    let received = backend.received();
    assert_eq!(received[0].0, "actualizar_historial");
    assert_eq!(received[0].1["nombre_chat"], "viaje");
    assert_eq!(received[0].1["historial"].as_array().map(Vec::len), Some(2));
    assert_eq!(
        received[1],
        ("eliminar_historial", json!({ "nombre_chat": "viaje" }))
    );
}

#[tokio::test]
async fn model_endpoints_use_json_and_multipart() {
    let backend = Backend::default();
    let api = client(spawn_backend(backend.clone()).await);

    let listing = api.models_and_formats().await.expect("models");
    assert_eq!(listing.models.len(), 2);
    assert_eq!(listing.models[1].size(), Some(4096));

    api.load_model(&LoadModelRequest {
        model_path: "llama.gguf".to_string(),
        format: "chatml".to_string(),
        temperature: 0.5,
        gpu_layers: 10,
        context: 4096,
        system_message: "Be brief.".to_string(),
    })
    .await
    .expect("load");
    assert_eq!(
        backend.received(),
        vec![(
            "load_model",
            json!({
                "model_path": "llama.gguf",
                "format": "chatml",
                "temperature": "0.5",
                "gpu_layers": "10",
                "context": "4096",
                "system_message": "Be brief.",
            })
        )]
    );
}

#[tokio::test]
async fn error_status_carries_body_and_kind() {
    let api = client(spawn_backend(Backend::default()).await);
    let err = api.unload_model().await.expect_err("500");
    match &err {
        ApiError::Status { status, body, .. } => {
            assert_eq!(*status, 500);
            assert_eq!(body, "No model is loaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), NetworkErrorKind::Model);
}

#[tokio::test]
async fn slow_backend_times_out() {
    let app = Router::new().route("/stop_response", post(slow));
    let api = client(serve(app).await);
    let err = api.stop_response().await.expect_err("timeout");
    assert!(matches!(err, ApiError::Transport { .. }));
    assert_eq!(err.kind(), NetworkErrorKind::Timeout);
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let api = client(format!("http://{addr}"));
    let err = api.list_chats().await.expect_err("refused");
    assert_eq!(err.kind(), NetworkErrorKind::Network);
}
