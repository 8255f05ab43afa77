//! Web session: a single embedded page over the same pipeline the CLI
//! drives, answering through `POST /api/ask`.

use application::rag_service::RagService;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use shared::types::{RagError, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
struct AppState {
    // Single in-flight request per session is the usage contract, so one
    // lock over the whole service is enough.
    service: Arc<Mutex<RagService>>,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct SourceView {
    source_id: String,
    page: u32,
    preview: String,
}

#[derive(Serialize)]
struct AskResponse {
    question: String,
    answer: String,
    figures_supported: bool,
    sources: Vec<SourceView>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    retryable: bool,
}

pub async fn serve(service: RagService, port: u16) -> Result<()> {
    let state = AppState {
        service: Arc::new(Mutex::new(service)),
    };
    let app = Router::new()
        .route("/", get(index))
        .route("/api/ask", post(ask))
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("Web interface listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| RagError::Other(e.into()))
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn ask(State(state): State<AppState>, Json(request): Json<AskRequest>) -> Response {
    let question = request.question.trim().to_string();
    if question.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "question must not be empty", false);
    }

    let service = state.service.lock().await;
    match service.ask(&question).await {
        Ok(answer) => {
            let figures_supported = service.is_answer_supported(&answer);
            let sources = answer
                .sources
                .iter()
                .map(|p| SourceView {
                    source_id: p.source_id.clone(),
                    page: p.page,
                    preview: p.text.chars().take(300).collect(),
                })
                .collect();
            Json(AskResponse {
                question: answer.question,
                answer: answer.text,
                figures_supported,
                sources,
            })
            .into_response()
        }
        Err(e) => {
            let status = match &e {
                RagError::NotInitialized => StatusCode::CONFLICT,
                RagError::ExternalService { kind, .. } if kind.is_retryable() => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error_response(status, &e.to_string(), e.is_retryable())
        }
    }
}

fn error_response(status: StatusCode, message: &str, retryable: bool) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
            retryable,
        }),
    )
        .into_response()
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Annual Report Analyzer</title>
<style>
  body { font-family: sans-serif; max-width: 56rem; margin: 2rem auto; padding: 0 1rem; }
  textarea { width: 100%; height: 4rem; font-size: 1rem; }
  button { padding: 0.5rem 1.5rem; font-size: 1rem; }
  #answer { white-space: pre-wrap; background: #f6f6f6; padding: 1rem; border-radius: 4px; }
  .source { border-left: 3px solid #888; margin: 0.5rem 0; padding: 0.25rem 0.75rem; color: #444; }
  .warning { color: #a66a00; }
</style>
</head>
<body>
<h1>Annual Report Analyzer</h1>
<p>Ask questions about the indexed annual report. Answers quote figures exactly as they appear in the document.</p>
<textarea id="question" placeholder="e.g., What was the total revenue in 2024?"></textarea>
<p><button onclick="ask()">Ask</button></p>
<div id="status"></div>
<div id="answer"></div>
<div id="sources"></div>
<script>
async function ask() {
  const question = document.getElementById('question').value;
  const status = document.getElementById('status');
  const answer = document.getElementById('answer');
  const sources = document.getElementById('sources');
  status.textContent = 'Searching for an answer...';
  answer.textContent = '';
  sources.innerHTML = '';
  try {
    const res = await fetch('/api/ask', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ question })
    });
    const body = await res.json();
    if (!res.ok) {
      status.textContent = 'Error: ' + body.error;
      return;
    }
    status.textContent = body.figures_supported
      ? ''
      : 'Warning: some figures were not found verbatim in the retrieved context.';
    status.className = 'warning';
    answer.textContent = body.answer;
    for (const s of body.sources) {
      const div = document.createElement('div');
      div.className = 'source';
      div.textContent = s.source_id + ' page ' + s.page + ': ' + s.preview + '...';
      sources.appendChild(div);
    }
  } catch (e) {
    status.textContent = 'Request failed: ' + e;
  }
}
</script>
</body>
</html>
"#;
