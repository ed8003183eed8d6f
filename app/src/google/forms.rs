//! Google Forms API v1 Client

use serde_json::{json, Value};
use tracing::{debug, info};

use super::client::{GoogleClient, ListField};
use super::common::segment;
use crate::common::{AppError, AppResult};

const FORMS_API_BASE: &str = "https://forms.googleapis.com/v1/forms";
const RESPONSES: ListField = ListField::new("responses", "pageSize");

pub struct FormsApi {
    client: GoogleClient,
}

super::google_api_wrapper!(FormsApi);

/// Kinds of question `add-question` can create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    Text,
    Paragraph,
    Choice,
    Checkbox,
}

impl QuestionKind {
    pub fn parse(s: &str) -> AppResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(QuestionKind::Text),
            "paragraph" => Ok(QuestionKind::Paragraph),
            "choice" | "radio" => Ok(QuestionKind::Choice),
            "checkbox" => Ok(QuestionKind::Checkbox),
            other => Err(AppError::invalid_input(format!(
                "invalid question kind {:?} (expected text, paragraph, choice or checkbox)",
                other
            ))),
        }
    }
}

impl FormsApi {
    pub async fn get_form(&self, form_id: &str) -> AppResult<Value> {
        info!("Fetching form: {}", form_id);

        self.client.get(&form_url(form_id), &[]).await
    }

    /// Create an empty form; only the title can be set at creation time
    pub async fn create_form(&self, title: &str, document_title: Option<&str>) -> AppResult<Value> {
        info!("Creating form: {}", title);

        let mut info = json!({ "title": title });
        if let Some(doc_title) = document_title {
            info["documentTitle"] = json!(doc_title);
        }
        self.client.post(FORMS_API_BASE, &json!({ "info": info })).await
    }

    pub async fn batch_update(&self, form_id: &str, requests: Vec<Value>) -> AppResult<Value> {
        info!("Applying {} request(s) to form {}", requests.len(), form_id);

        let url = format!("{}:batchUpdate", form_url(form_id));
        self.client.post(&url, &json!({ "requests": requests })).await
    }

    pub async fn list_responses(&self, form_id: &str, max_results: Option<usize>) -> AppResult<Vec<Value>> {
        info!("Listing responses for form: {}", form_id);

        let url = format!("{}/responses", form_url(form_id));
        let responses = self
            .client
            .get_paginated(&url, &[], RESPONSES, max_results)
            .await?;

        debug!("Retrieved {} responses", responses.len());
        Ok(responses)
    }
}

fn form_url(form_id: &str) -> String {
    format!("{}/{}", FORMS_API_BASE, segment(form_id))
}

/// `createItem` request for a new question at `index`
pub fn create_question(
    title: &str,
    kind: QuestionKind,
    options: &[String],
    required: bool,
    index: u32,
) -> AppResult<Value> {
    let mut question = json!({ "required": required });
    match kind {
        QuestionKind::Text => question["textQuestion"] = json!({ "paragraph": false }),
        QuestionKind::Paragraph => question["textQuestion"] = json!({ "paragraph": true }),
        QuestionKind::Choice | QuestionKind::Checkbox => {
            if options.is_empty() {
                return Err(AppError::invalid_input("choice questions need --options"));
            }
            let choice_type = if kind == QuestionKind::Choice { "RADIO" } else { "CHECKBOX" };
            question["choiceQuestion"] = json!({
                "type": choice_type,
                "options": options.iter().map(|o| json!({ "value": o })).collect::<Vec<_>>(),
            });
        }
    }

    Ok(json!({
        "createItem": {
            "item": { "title": title, "questionItem": { "question": question } },
            "location": { "index": index }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_text_question() {
        let req = create_question("Name", QuestionKind::Text, &[], true, 0).unwrap();
        let question = &req["createItem"]["item"]["questionItem"]["question"];
        assert_eq!(question["required"], true);
        assert_eq!(question["textQuestion"]["paragraph"], false);
        assert_eq!(req["createItem"]["location"]["index"], 0);
    }

    #[test]
    fn test_create_choice_question() {
        let options = vec!["Red".to_string(), "Blue".to_string()];
        let req = create_question("Colour", QuestionKind::parse("checkbox").unwrap(), &options, false, 2).unwrap();
        let choice = &req["createItem"]["item"]["questionItem"]["question"]["choiceQuestion"];
        assert_eq!(choice["type"], "CHECKBOX");
        assert_eq!(choice["options"][1]["value"], "Blue");

        assert!(create_question("Colour", QuestionKind::Choice, &[], false, 0).is_err());
        assert!(QuestionKind::parse("scale").is_err());
    }
}
