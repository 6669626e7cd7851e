use std::env;

use anyhow::Context;
use anyhow::Result;

pub mod chat;
pub mod chat_api;
pub mod error;

pub const CHAT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

// "env:NAME" defers the key lookup to the environment
fn api_key(api_key: &str) -> Result<String> {
    if let Some(env) = api_key.strip_prefix("env:") {
        Ok(env::var(env).context(format!("can not find env, name={env}"))?)
    } else {
        Ok(api_key.to_string())
    }
}
