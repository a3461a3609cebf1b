//! Answering questions: fetch context, assemble the prompt, call the model, fall back on failure.

use serde_json::{Map, Value};
use tracing::{info, instrument, warn};

use crate::{
    base::{
        prompts::{FALLBACK_CONTEXT, assemble_prompt, fallback_reply, render_topic_question, sanitize_answer, system_directive, user_message},
        types::{AnswerResponse, Category, QuestionRequest},
    },
    service::{content::ContentClient, llm::LlmClient},
};

/// Answer a question.
///
/// This never fails: a content fetch error substitutes the static reference data, and a
/// model error (or empty answer) yields the deterministic fallback reply.
#[instrument(skip_all, fields(category = %request.category))]
pub async fn answer_question(request: &QuestionRequest, content: &ContentClient, llm: &LlmClient) -> AnswerResponse {
    let context = match content.fetch_context().await {
        Ok(context) => context,
        Err(err) => {
            warn!("Content fetch failed; using fallback content: {err}");
            FALLBACK_CONTEXT.to_string()
        }
    };

    let prompt = assemble_prompt(system_directive(request.category), &context, &user_message(request));

    match llm.generate(&prompt).await {
        Ok(text) => {
            let text = sanitize_answer(&text);

            if text.is_empty() {
                warn!("Model returned an empty answer; using fallback reply.");
                return AnswerResponse::fallback(fallback_reply(&request.question, &context));
            }

            info!("Answered with model output.");
            AnswerResponse::ai(text)
        }
        Err(err) => {
            warn!("Model unavailable; using fallback reply: {err}");
            AnswerResponse::fallback(fallback_reply(&request.question, &context))
        }
    }
}

/// Answer a category form (e.g. `{ "type": "F-1", "state": "NJ" }` for visas).
///
/// Optional `follow_up` and `previous_answer` fields are carried through.
pub async fn answer_topic(category: Category, fields: &Map<String, Value>, content: &ContentClient, llm: &LlmClient) -> AnswerResponse {
    let text = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);

    let request = QuestionRequest {
        category,
        question: render_topic_question(category, fields),
        follow_up: text("follow_up"),
        previous_answer: text("previous_answer"),
    };

    answer_question(&request, content, llm).await
}
