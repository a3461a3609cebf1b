//! Route handlers.

use axum::{
    Json,
    extract::{Path, State},
    response::Html,
};
use serde_json::{Value, json};

use crate::{
    base::{
        prompts::required_fields,
        types::{AnswerResponse, Category, QuestionRequest},
    },
    interaction::{
        ask::{answer_question, answer_topic},
        feedback::{FEEDBACK_THANKS, submit_feedback},
    },
    runtime::Runtime,
};

use super::{error::ServerError, extract::JsonObject};

const INDEX_HTML: &str = include_str!("index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn healthz(State(runtime): State<Runtime>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "ai_provider": "vertex_ai_gemini",
        "vertex_configured": runtime.llm.is_available().await,
        "project": runtime.config.project(),
        "location": runtime.config.vertex_location,
        "model": runtime.config.gemini_model,
    }))
}

pub async fn ask(State(runtime): State<Runtime>, body: JsonObject) -> Result<Json<AnswerResponse>, ServerError> {
    body.require(&["question"])?;
    let request: QuestionRequest = body.parse()?;

    Ok(Json(answer_question(&request, &runtime.content, &runtime.llm).await))
}

pub async fn topic(State(runtime): State<Runtime>, Path(category): Path<String>, body: JsonObject) -> Result<Json<AnswerResponse>, ServerError> {
    let category: Category = category.parse().map_err(|_| ServerError::NotFound(format!("Unknown topic `{category}`.")))?;
    body.require(required_fields(category))?;

    Ok(Json(answer_topic(category, &body.0, &runtime.content, &runtime.llm).await))
}

pub async fn post_feedback(State(runtime): State<Runtime>, body: JsonObject) -> Result<Json<Value>, ServerError> {
    body.require(&["message"])?;

    let message = body.str("message").ok_or_else(|| ServerError::BadRequest("Field `message` must be a string.".to_string()))?;
    let total = submit_feedback(message, body.str("contact"), &runtime.feedback).await?;

    Ok(Json(json!({ "result": FEEDBACK_THANKS, "total_feedback": total })))
}

pub async fn list_feedback(State(runtime): State<Runtime>) -> Result<Json<Value>, ServerError> {
    let entries = runtime.feedback.list().await?;

    Ok(Json(json!({ "count": entries.len(), "data": entries })))
}
