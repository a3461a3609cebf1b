//! Prompt templates and text shaping for the Gemini model.

use serde_json::{Map, Value};

use crate::base::types::{Category, QuestionRequest};

/// Directive appended to every system prompt.
pub const USA_DIRECTIVE: &str = r#####"
🇺🇸 ONLY ANSWER ABOUT USA-RELATED TOPICS
✅ USA VISA / SSN / BANK / HOUSING / UBER / TAX / HEALTH
• Add emoji to each step: ✅ 🚀 💰 📱 🏠 🪪 ✈️ 🏥 💳
• CAPITALIZE important words
• Short paragraphs, long lists
• USE OUTPUT TEMPLATE:
  1) Quick Summary (3 items)
  2) Step-by-Step Checklist
  3) Common Mistakes / Risks
  4) Official Links (if available)
  5) Next Step (one clear recommendation)
⚠️ USA / NJ / NY ONLY!
"#####;

/// Static reference data used whenever the blog cannot be fetched.
pub const FALLBACK_CONTEXT: &str = r#####"
[TAX] Rideshare tax forms are released at the end of January. 1099-K, 1099-NEC required.
Don't write "exempt" on W-4, you'll lose your refund.
[VISA] F-1 holders can travel to neighboring countries (Automatic Visa Revalidation).
J-1 visa application: Get DS-2019, pay SEVIS, schedule consulate appointment.
[PHONE] You can get a free line through the Lifeline program.
Get a US number without SSN using Google Voice.
[HEALTH] NJ Medicaid is free for low income. Free clinics available in NY.
[BANK] Chase and BofA open accounts with passport. Start credit score with a secured card.
[RIDESHARE] Uber/Lyft requires SSN + driver's license + car insurance. Expect 1099 form in January.
[HOUSING] NJ Newark/Paterson 1BR $900-1200. Try Craigslist, Zillow, Facebook Marketplace.
[WISE] International transfer limits $50k/year. Wise > Western Union.
[LICENSE] NJ has 6 Points of ID system. Even undocumented can get a license.
[FLIGHTS] International flights from NJ $400-700. Pay excess baggage 24 hours before flight for cheaper rate.
"#####;

/// Number of context lines quoted in a fallback reply.
const FALLBACK_SAMPLE_LINES: usize = 8;

/// The "expert" persona for a category.
pub fn system_directive(category: Category) -> &'static str {
    match category {
        Category::General => "You are a practical guide expert for people living in the USA. Give clear, step-by-step, safe answers in English.",
        Category::Visa => "You are a US immigration expert. Provide practical English guidance.",
        Category::Tax => "You are a US tax expert. Explain clearly in English.",
        Category::Rideshare => "You are a rideshare and gig economy expert. Write in English.",
        Category::Housing => "You are a US real estate expert. Write in English.",
        Category::Health => "You are a US healthcare system expert. Write practical English guidance.",
        Category::License => "You are a US DMV expert. Explain in English.",
        Category::Ssn => "You are a US SSN expert. Provide practical English guidance focused on NJ.",
        Category::Bank => "You are a US banking expert. Write in English.",
        Category::Phone => "You are a US telecom expert. Provide an English guide.",
        Category::Car => "You are a US automotive expert. Write in English.",
        Category::Transfer => "You are a money transfer expert. Explain in English.",
        Category::Flights => "You are an aviation expert. Provide a practical English guide.",
    }
}

/// Form fields that must be present (and non-blank) for a category form.
pub fn required_fields(category: Category) -> &'static [&'static str] {
    match category {
        Category::General => &["question"],
        Category::Visa => &["type"],
        Category::Tax => &["form"],
        Category::Rideshare => &["app"],
        Category::Ssn => &["visa"],
        _ => &[],
    }
}

/// Render a category form into the question text sent to the model.
pub fn render_topic_question(category: Category, fields: &Map<String, Value>) -> String {
    let f = |key: &str| field(fields, key, "");

    match category {
        Category::General => f("question"),
        Category::Visa => format!(
            "{} visa. State: {}. Situation: {}. Documents, forms, fees, common mistakes, links.",
            f("type"),
            f("state"),
            f("situation")
        ),
        Category::Tax => format!(
            "Form: {}. Income: ${}. Visa: {}. State: {}. Filing guide, refund estimate, deadlines.",
            f("form"),
            field(fields, "income", "0"),
            f("visa"),
            f("state")
        ),
        Category::Rideshare => format!("{} - {}. Topic: {}. Documents, earnings, tax, tips.", f("app"), f("state"), f("topic")),
        Category::Housing => format!(
            "{} ${} budget. Situation: {}. Websites, documents, negotiation tips.",
            f("city"),
            f("budget"),
            f("situation")
        ),
        Category::Health => format!("{} - {}. Addresses, documents, Medicaid, free clinics.", f("state"), f("situation")),
        Category::License => format!(
            "{} driver's license: {}. 6 Points documents, exam, appointment, fees.",
            f("state"),
            f("situation")
        ),
        Category::Ssn => format!(
            "Visa: {}. State: {}. Situation: {}. Required documents for SSN, application steps, NJ SSA office addresses, \
             CPT/OPT requirements for F-1/J-1, ITIN alternative, common mistakes.",
            f("visa"),
            field(fields, "state", "NJ"),
            f("situation")
        ),
        Category::Bank => format!("Topic: {}. Which bank, documents, credit score, secured card.", f("situation")),
        Category::Phone => format!("Topic: {}. Step-by-step setup, prices, alternatives.", f("topic")),
        Category::Car => format!("{} - {}. Documents, insurance, pricing, CarMax/Carvana.", f("state"), f("topic")),
        Category::Transfer => format!("Topic: {}. Steps, fees, limits, alternatives.", f("topic")),
        Category::Flights => format!("{} - {}. Detailed info, fees, tips.", f("airline"), f("topic")),
    }
}

/// Read a form field as display text, substituting `default` when it is absent.
fn field(fields: &Map<String, Value>, key: &str, default: &str) -> String {
    match fields.get(key) {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// The user-facing part of the prompt: the question, or the follow-up framed by the prior exchange.
pub fn user_message(request: &QuestionRequest) -> String {
    let follow_up = request.follow_up.as_deref().map(str::trim).filter(|f| !f.is_empty());

    let Some(follow_up) = follow_up else {
        return request.question.trim().to_string();
    };

    let mut message = format!("Original question:\n{}\n\n", request.question.trim());

    if let Some(previous) = request.previous_answer.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
        message.push_str(&format!("Previous answer:\n{previous}\n\n"));
    }

    message.push_str(&format!("Follow-up question:\n{follow_up}\n\nPlease explain more clearly, step by step, with examples."));

    message
}

/// Merge the system directive, reference context, and user message into one prompt.
pub fn assemble_prompt(system: &str, context: &str, user: &str) -> String {
    format!("{system}\n\n{USA_DIRECTIVE}\n\nReference data:\n{context}\n\nUser question:\n{user}")
}

/// The deterministic reply used when the model is unavailable.
pub fn fallback_reply(question: &str, context: &str) -> String {
    let question = question.trim();
    let question = if question.is_empty() { "General question" } else { question };

    let sample = context
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && *line != "---")
        .take(FALLBACK_SAMPLE_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "⚠️ Vertex AI configuration is missing, so showing a quick guide summary instead of an AI response.\n\n\
         📌 Question: {question}\n\
         ✅ Full AI answers will return once you add GOOGLE_CLOUD_PROJECT and VERTEX_LOCATION to Cloud Run env variables.\n\
         ✅ Grant the Vertex AI User (roles/aiplatform.user) role to the service account.\n\
         \nQuick Info:\n\
         {sample}"
    )
}

/// Strip markdown bold markers and any characters outside ASCII and the common emoji blocks.
pub fn sanitize_answer(text: &str) -> String {
    text.replace("**", "")
        .chars()
        .filter(|c| {
            let code = *c as u32;
            code < 128 || (0x1F600..=0x1F64F).contains(&code) || (0x1F300..=0x1F5FF).contains(&code)
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn prompt_contains_every_section_in_order() {
        let prompt = assemble_prompt("SYSTEM", "CONTEXT", "How do I open a bank account?");

        let system = prompt.find("SYSTEM").unwrap();
        let directive = prompt.find("ONLY ANSWER ABOUT USA-RELATED TOPICS").unwrap();
        let context = prompt.find("Reference data:\nCONTEXT").unwrap();
        let user = prompt.find("User question:\nHow do I open a bank account?").unwrap();

        assert!(system < directive && directive < context && context < user);
    }

    #[test]
    fn user_message_without_follow_up_is_the_question() {
        let request = QuestionRequest::new(Category::General, "  What is a W-4?  ");
        assert_eq!(user_message(&request), "What is a W-4?");
    }

    #[test]
    fn user_message_frames_follow_up() {
        let request = QuestionRequest {
            category: Category::Tax,
            question: "What is a W-4?".to_string(),
            follow_up: Some("What about exemptions?".to_string()),
            previous_answer: Some("A W-4 sets withholding.".to_string()),
        };

        let message = user_message(&request);

        assert!(message.starts_with("Original question:\nWhat is a W-4?"));
        assert!(message.contains("Previous answer:\nA W-4 sets withholding."));
        assert!(message.contains("Follow-up question:\nWhat about exemptions?"));
        assert!(message.ends_with("with examples."));
    }

    #[test]
    fn blank_follow_up_is_ignored() {
        let request = QuestionRequest {
            follow_up: Some("   ".to_string()),
            ..QuestionRequest::new(Category::General, "Question")
        };

        assert_eq!(user_message(&request), "Question");
    }

    #[test]
    fn fallback_reply_quotes_first_context_lines() {
        let reply = fallback_reply("", "line one\n---\n\nline two\n");

        assert!(reply.contains("📌 Question: General question"));
        assert!(reply.ends_with("Quick Info:\nline one\nline two"));
    }

    #[test]
    fn fallback_reply_caps_sample_at_eight_lines() {
        let reply = fallback_reply("q", FALLBACK_CONTEXT);
        let sample = reply.split("Quick Info:\n").nth(1).unwrap();

        assert_eq!(sample.lines().count(), 8);
        assert!(sample.starts_with("[TAX]"));
    }

    #[test]
    fn sanitize_strips_bold_and_foreign_characters() {
        let text = "  **Step 1** ✅ open account 😀 🏠 ção  ";
        assert_eq!(sanitize_answer(text), "Step 1  open account 😀 🏠 o");
    }

    #[test]
    fn topic_questions_use_form_fields() {
        let fields = json!({ "type": "F-1", "state": "NJ", "situation": "student" });
        let question = render_topic_question(Category::Visa, fields.as_object().unwrap());
        assert_eq!(question, "F-1 visa. State: NJ. Situation: student. Documents, forms, fees, common mistakes, links.");

        let fields = json!({ "form": "1040", "income": 52000 });
        let question = render_topic_question(Category::Tax, fields.as_object().unwrap());
        assert!(question.starts_with("Form: 1040. Income: $52000. Visa: . State: ."));

        let fields = json!({ "visa": "J-1" });
        let question = render_topic_question(Category::Ssn, fields.as_object().unwrap());
        assert!(question.starts_with("Visa: J-1. State: NJ."));
    }
}
