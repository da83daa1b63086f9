use color_eyre::eyre::{bail, eyre};

use crate::*;

#[derive(Serialize, Deserialize)]
struct ChatCompletionBody {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
pub(crate) struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

/// Sends the conversation to the configured model and returns the first reply.
#[instrument(skip(client, config, messages), fields(model = %config.model), err)]
pub async fn complete_chat(
    client: &reqwest::Client,
    config: &OpenAiConfig,
    messages: Vec<ChatMessage>,
    temperature: Option<f64>,
) -> Result<ChatMessage> {
    let body = ChatCompletionBody {
        model: config.model.clone(),
        messages,
        temperature,
        max_tokens: None,
    };

    let res = client
        .post(config.chat_completions_url())
        .bearer_auth(&config.api_key)
        .json(&body)
        .send()
        .await
        .wrap_err("Failed to reach the chat completions API")?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        tracing::warn!(%status, body, "Chat completion request failed");

        bail!("Failed to complete chat: {status}");
    }

    let body = res
        .json::<CompletionResponse>()
        .await
        .wrap_err("Failed to parse chat completion response")?;

    body.choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| eyre!("Chat completion returned no choices"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_omits_unset_sampling_fields() {
        let body = ChatCompletionBody {
            model: "gpt-4o".to_string(),
            messages: vec![ChatMessage::user("Plan dinner")],
            temperature: None,
            max_tokens: None,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["messages"][0]["role"], "user");
        assert!(value.get("temperature").is_none());
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn test_response_takes_first_choice_shape() {
        let response: CompletionResponse = serde_json::from_value(serde_json::json!({
            "id": "chatcmpl-1",
            "choices": [
                { "index": 0, "finish_reason": "stop",
                  "message": { "role": "assistant", "content": "Tacos" } }
            ]
        }))
        .unwrap();

        assert_eq!(response.choices[0].message.content, "Tacos");
        assert_eq!(response.choices[0].message.role, ChatRole::Assistant);
    }
}
