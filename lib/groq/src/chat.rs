use bytes::Bytes;
use framework::http_client::HTTP_CLIENT;
use framework::json;
use framework::json::from_json;
use reqwest::Response;
use tracing::debug;
use tracing::warn;

use crate::api_key;
use crate::chat_api::ChatRequest;
use crate::chat_api::ChatRequestMessage;
use crate::chat_api::ChatResponse;
use crate::chat_api::Role;
use crate::error::ChatError;

pub struct Chat {
    pub config: ChatConfig,
}

#[derive(Default, Clone)]
pub struct ChatConfig {
    url: String,
    model: String,
    api_key: String,

    pub system_message: Option<String>,
    pub top_p: Option<f32>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl Chat {
    pub fn new(url: String, api_key: String, model: String) -> Self {
        Chat {
            config: ChatConfig {
                url,
                model,
                api_key,
                ..ChatConfig::default()
            },
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub async fn generate(&self, messages: Vec<ChatRequestMessage>) -> Result<String, ChatError> {
        let http_response = call_api(&self.config, messages).await?;
        let response: ChatResponse = from_json(&http_response.text().await?)?;
        debug!(
            "usage, prompt_tokens={}, completion_tokens={}",
            response.usage.prompt_tokens, response.usage.completion_tokens
        );

        let choice = response.choices.into_iter().next().ok_or(ChatError::EmptyResponse)?;
        if choice.finish_reason.as_deref() == Some("length") {
            warn!("completion cut off by max_tokens, max_tokens={:?}", self.config.max_tokens);
        }
        choice.message.content.ok_or(ChatError::EmptyResponse)
    }
}

async fn call_api(config: &ChatConfig, messages: Vec<ChatRequestMessage>) -> Result<Response, ChatError> {
    let request = ChatRequest {
        model: config.model.clone(),
        messages: request_messages(messages, config),
        temperature: config.temperature.unwrap_or(1.0),
        top_p: config.top_p.unwrap_or(1.0),
        stream: false,
        max_tokens: config.max_tokens,
    };

    let body = Bytes::from(json::to_json(&request)?);
    let api_key = api_key(&config.api_key)?;
    let http_request = HTTP_CLIENT
        .post(&config.url)
        .header("Content-Type", "application/json")
        .bearer_auth(api_key)
        .body(body);
    let response = http_request.send().await?;

    let status = response.status();
    if status != 200 {
        debug!("request={}", json::to_json(&request)?);
        let response_text = response.text().await?;
        return Err(ChatError::Api {
            status: status.as_u16(),
            body: response_text,
        });
    }

    Ok(response)
}

fn request_messages(messages: Vec<ChatRequestMessage>, config: &ChatConfig) -> Vec<ChatRequestMessage> {
    if let Some(ref system_message) = config.system_message {
        let mut request_messages = Vec::with_capacity(messages.len() + 1);
        request_messages.push(ChatRequestMessage::new_message(Role::System, system_message.clone()));
        request_messages.extend(messages);
        request_messages
    } else {
        messages
    }
}
