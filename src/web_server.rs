use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{delete, get, post},
    serve, Json, Router,
};
use minijinja::Environment;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::chat;
use crate::error::SageError;
use crate::models::{is_app_id, GameResult};
use crate::review_manager::ReviewManager;
use crate::session::Session;
use crate::{ChatMessage, Role};

// Shared application state
#[derive(Clone)]
pub struct AppState {
    manager: Arc<ReviewManager>,
    session: Arc<Mutex<Session>>,
    templates: Arc<Environment<'static>>,
}

impl AppState {
    pub fn new(manager: Arc<ReviewManager>) -> Result<Self> {
        Ok(Self {
            manager,
            session: Arc::new(Mutex::new(Session::new())),
            templates: Arc::new(create_minijinja_env()?),
        })
    }
}

fn create_minijinja_env() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.add_template("index.html", include_str!("../templates/index.html"))
        .context("Failed to load index template")?;
    Ok(env)
}

impl IntoResponse for SageError {
    fn into_response(self) -> Response {
        let status = match self {
            SageError::EmptyResult(_) => StatusCode::NOT_FOUND,
            SageError::MissingEnv(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SageError::Transport(_) | SageError::EmptyOutput | SageError::Format(_) => {
                StatusCode::BAD_GATEWAY
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

fn conflict(message: &str) -> Response {
    (StatusCode::CONFLICT, Json(json!({ "error": message }))).into_response()
}

async fn index_handler(
    State(state): State<AppState>,
) -> Result<Html<String>, (StatusCode, Html<String>)> {
    let session = state.session.lock().await;
    let context = minijinja::context! {
        title => "Steam Sage",
        selection => session.selection.games(),
        summaries => &session.summaries,
        suggestions => &session.suggestions,
        messages => session.chat.messages(),
    };

    state
        .templates
        .get_template("index.html")
        .and_then(|tmpl| tmpl.render(context))
        .map(Html)
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Internal Server Error: {}", e)),
            )
        })
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    term: String,
}

async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<GameResult>>, SageError> {
    let games = state.manager.store().fetch_games(&params.term).await?;
    Ok(Json(games))
}

async fn get_selection(State(state): State<AppState>) -> Json<Vec<GameResult>> {
    let session = state.session.lock().await;
    Json(session.selection.games().to_vec())
}

async fn add_to_selection(State(state): State<AppState>, Json(game): Json<GameResult>) -> Response {
    if !is_app_id(&game.app_id) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid app id" })),
        )
            .into_response();
    }
    let mut session = state.session.lock().await;
    if session.selection.contains(&game.app_id) {
        return conflict("Game is already selected");
    }
    if !session.selection.add(game) {
        return conflict("Selection is full");
    }
    (StatusCode::CREATED, Json(session.selection.games().to_vec())).into_response()
}

async fn remove_from_selection(
    State(state): State<AppState>,
    Path(app_id): Path<String>,
) -> Response {
    let mut session = state.session.lock().await;
    if !session.selection.remove(&app_id) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Game is not selected" })),
        )
            .into_response();
    }
    Json(session.selection.games().to_vec()).into_response()
}

async fn reviews_handler(State(state): State<AppState>) -> Response {
    let games = state.session.lock().await.selection.games().to_vec();

    let digest = match state.manager.try_digest(&games).await {
        None => return conflict("Reviews are already being fetched"),
        Some(Err(e)) => {
            error!("Error fetching data: {}", e);
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": "Error fetching reviews or AI summaries.",
                    "detail": e.to_string(),
                })),
            )
                .into_response();
        }
        Some(Ok(digest)) => digest,
    };

    let summaries = digest.summaries.clone();
    state.session.lock().await.apply_digest(digest);

    let manager = &state.manager;
    let suggestions = chat::load_suggestions(manager.ai(), manager.config(), &summaries).await;
    let mut session = state.session.lock().await;
    if let Some(suggestions) = suggestions {
        session.set_suggestions(suggestions);
    }

    Json(json!({
        "summaries": summaries,
        "suggestions": session.suggestions,
    }))
    .into_response()
}

async fn get_summaries(State(state): State<AppState>) -> Response {
    let session = state.session.lock().await;
    Json(&session.summaries).into_response()
}

async fn get_suggestions(State(state): State<AppState>) -> Response {
    let session = state.session.lock().await;
    Json(&session.suggestions).into_response()
}

async fn get_chat(State(state): State<AppState>) -> Json<Vec<ChatMessage>> {
    let session = state.session.lock().await;
    Json(session.chat.messages().to_vec())
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    content: String,
}

async fn post_chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    if request.content.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Message is empty" })),
        )
            .into_response();
    }

    // The lock is not held across the model call.
    let (history, summaries) = {
        let mut session = state.session.lock().await;
        session
            .chat
            .add_message(ChatMessage::new(Role::User, request.content));
        (session.chat.messages().to_vec(), session.summaries.clone())
    };

    let manager = &state.manager;
    let reply = chat::respond(manager.ai(), manager.config(), &history, &summaries).await;
    state.session.lock().await.chat.add_message(reply.clone());

    Json(reply).into_response()
}

async fn clear_chat(State(state): State<AppState>) -> StatusCode {
    state.session.lock().await.chat.clear();
    StatusCode::NO_CONTENT
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/search", get(search_handler))
        .route("/api/selection", get(get_selection).post(add_to_selection))
        .route("/api/selection/:app_id", delete(remove_from_selection))
        .route("/api/reviews", post(reviews_handler))
        .route("/api/summaries", get(get_summaries))
        .route("/api/suggestions", get(get_suggestions))
        .route("/api/chat", get(get_chat).post(post_chat).delete(clear_chat))
        .with_state(state)
        .layer(TraceLayer::new_for_http()) // Add request logging
}

pub async fn start_web_server(port: u16, manager: Arc<ReviewManager>) -> Result<()> {
    let state = AppState::new(manager).context("Failed to initialize web state")?;
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind to address {}", addr))?;

    serve(listener, app.into_make_service())
        .await
        .context("Web server failed")?;

    warn!("Web server stopped");
    Ok(())
}
