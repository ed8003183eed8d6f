//! Google Forms Handler

use serde_json::{json, Map, Value};

use super::common::{
    bool_with_default, list_response, optional_string, optional_u32, optional_usize, require_string, string_array, string_with_default,
};
use crate::commands::schema::{CommandSpec, ParamSpec};
use crate::common::{AppError, AppResult};
use crate::context::AppContext;
use crate::google::common::extract_array;
use crate::google::forms::{create_question, QuestionKind};
use crate::google::FormsApi;

const FORM_ID: ParamSpec = ParamSpec::arg("id", "Form ID");

pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        namespace: "forms",
        action: "get",
        about: "Show a form and its questions",
        params: &[FORM_ID],
    },
    CommandSpec {
        namespace: "forms",
        action: "create",
        about: "Create an empty form",
        params: &[
            ParamSpec::arg("title", "Form title"),
            ParamSpec::text("document-title", "Drive file name (default: the title)"),
        ],
    },
    CommandSpec {
        namespace: "forms",
        action: "add-question",
        about: "Add a question",
        params: &[
            FORM_ID,
            ParamSpec::arg("title", "Question text"),
            ParamSpec::text("kind", "text, paragraph, choice or checkbox").default("text"),
            ParamSpec::list("options", "Choices for choice/checkbox questions"),
            ParamSpec::flag("required", "Answer required"),
            ParamSpec::number("index", "Position (default: end of form)"),
        ],
    },
    CommandSpec {
        namespace: "forms",
        action: "responses",
        about: "List submitted responses",
        params: &[FORM_ID, ParamSpec::number("max-results", "Maximum number of responses")],
    },
];

/// Handle Google Forms commands
pub async fn handle(ctx: &AppContext, action: &str, params: &Value) -> AppResult<Value> {
    let forms = FormsApi::new(ctx.google().await?);

    match action {
        "get" => {
            let form = forms.get_form(require_string(params, "id")?).await?;
            Ok(summarize_form(&form))
        }
        "create" => {
            let title = require_string(params, "title")?;
            let form = forms
                .create_form(title, optional_string(params, "document-title"))
                .await?;
            Ok(json!({
                "formId": form.get("formId"),
                "title": form.pointer("/info/title"),
                "responderUri": form.get("responderUri"),
            }))
        }
        "add-question" => {
            let id = require_string(params, "id")?;
            let title = require_string(params, "title")?;
            let kind = QuestionKind::parse(string_with_default(params, "kind", "text"))?;

            let index = match optional_u32(params, "index")? {
                Some(index) => index,
                None => {
                    let form = forms.get_form(id).await?;
                    u32::try_from(extract_array(&form, "items").len())
                        .map_err(|_| AppError::invalid_input("form has too many items"))?
                }
            };

            let request = create_question(
                title,
                kind,
                &string_array(params, "options"),
                bool_with_default(params, "required", false),
                index,
            )?;
            let response = forms.batch_update(id, vec![request]).await?;
            Ok(json!({
                "formId": id,
                "index": index,
                "itemId": response.pointer("/replies/0/createItem/itemId"),
                "questionIds": response.pointer("/replies/0/createItem/questionId"),
            }))
        }
        "responses" => {
            let id = require_string(params, "id")?;
            let responses = forms
                .list_responses(id, optional_usize(params, "max-results"))
                .await?;
            Ok(list_response("responses", responses.iter().map(flatten_response).collect()))
        }
        _ => Err(AppError::not_found(format!("unknown command: forms {}", action))),
    }
}

fn summarize_form(form: &Value) -> Value {
    let items: Vec<Value> = extract_array(form, "items")
        .iter()
        .map(|item| {
            json!({
                "itemId": item.get("itemId"),
                "title": item.get("title"),
                "kind": item_kind(item),
                "questionId": item.pointer("/questionItem/question/questionId"),
                "required": item
                    .pointer("/questionItem/question/required")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(false),
            })
        })
        .collect();

    json!({
        "formId": form.get("formId"),
        "title": form.pointer("/info/title"),
        "description": form.pointer("/info/description"),
        "responderUri": form.get("responderUri"),
        "items": items,
    })
}

/// Short name for what an item is
fn item_kind(item: &Value) -> &'static str {
    if let Some(question) = item.pointer("/questionItem/question") {
        if let Some(text) = question.get("textQuestion") {
            return if text.get("paragraph").and_then(|v| v.as_bool()).unwrap_or(false) {
                "paragraph"
            } else {
                "text"
            };
        }
        if let Some(choice) = question.get("choiceQuestion") {
            return match choice.get("type").and_then(|v| v.as_str()) {
                Some("CHECKBOX") => "checkbox",
                Some("DROP_DOWN") => "dropdown",
                _ => "choice",
            };
        }
        return [
            ("scaleQuestion", "scale"),
            ("dateQuestion", "date"),
            ("timeQuestion", "time"),
            ("fileUploadQuestion", "file-upload"),
            ("ratingQuestion", "rating"),
        ]
        .iter()
        .find(|(key, _)| question.get(*key).is_some())
        .map(|(_, kind)| *kind)
        .unwrap_or("question");
    }

    [
        ("questionGroupItem", "grid"),
        ("pageBreakItem", "page-break"),
        ("textItem", "text-item"),
        ("imageItem", "image"),
        ("videoItem", "video"),
    ]
    .iter()
    .find(|(key, _)| item.get(*key).is_some())
    .map(|(_, kind)| *kind)
    .unwrap_or("unknown")
}

/// Answers flattened to `questionId -> text`; multiple answers are joined
fn flatten_response(response: &Value) -> Value {
    let mut answers = Map::new();
    if let Some(raw) = response.get("answers").and_then(|v| v.as_object()) {
        for (question_id, answer) in raw {
            let values: Vec<&str> = answer
                .pointer("/textAnswers/answers")
                .and_then(|v| v.as_array())
                .map(|arr| arr.iter().filter_map(|a| a.get("value").and_then(|v| v.as_str())).collect())
                .unwrap_or_default();
            let text = if values.is_empty() && answer.get("fileUploadAnswers").is_some() {
                "[file upload]".to_string()
            } else {
                values.join(", ")
            };
            answers.insert(question_id.clone(), Value::String(text));
        }
    }

    json!({
        "responseId": response.get("responseId"),
        "submitted": response.get("lastSubmittedTime"),
        "respondentEmail": response.get("respondentEmail"),
        "answers": answers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_kind() {
        let paragraph = json!({"questionItem": {"question": {"textQuestion": {"paragraph": true}}}});
        assert_eq!(item_kind(&paragraph), "paragraph");
        let checkbox = json!({"questionItem": {"question": {"choiceQuestion": {"type": "CHECKBOX"}}}});
        assert_eq!(item_kind(&checkbox), "checkbox");
        let scale = json!({"questionItem": {"question": {"scaleQuestion": {"low": 1, "high": 5}}}});
        assert_eq!(item_kind(&scale), "scale");
        assert_eq!(item_kind(&json!({"pageBreakItem": {}})), "page-break");
        assert_eq!(item_kind(&json!({})), "unknown");
    }

    #[test]
    fn test_flatten_response() {
        let response = json!({
            "responseId": "r1",
            "lastSubmittedTime": "2026-01-05T10:00:00Z",
            "answers": {
                "q1": {"questionId": "q1", "textAnswers": {"answers": [{"value": "Ada"}]}},
                "q2": {"questionId": "q2", "textAnswers": {"answers": [{"value": "Red"}, {"value": "Blue"}]}},
                "q3": {"questionId": "q3", "fileUploadAnswers": {"answers": [{"fileId": "f"}]}}
            }
        });
        let flat = flatten_response(&response);
        assert_eq!(flat["answers"]["q1"], "Ada");
        assert_eq!(flat["answers"]["q2"], "Red, Blue");
        assert_eq!(flat["answers"]["q3"], "[file upload]");
        assert_eq!(flat["submitted"], "2026-01-05T10:00:00Z");
    }

    #[test]
    fn test_summarize_form() {
        let form = json!({
            "formId": "f1",
            "info": {"title": "Survey"},
            "items": [{"itemId": "i1", "title": "Name", "questionItem": {"question": {"questionId": "q1", "required": true, "textQuestion": {}}}}]
        });
        let summary = summarize_form(&form);
        assert_eq!(summary["title"], "Survey");
        assert_eq!(summary["items"][0]["kind"], "text");
        assert_eq!(summary["items"][0]["required"], true);
        assert_eq!(summary["items"][0]["questionId"], "q1");
    }
}
