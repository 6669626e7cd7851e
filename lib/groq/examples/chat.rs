use std::env;

use anyhow::Result;
use groq::CHAT_COMPLETIONS_URL;
use groq::chat::Chat;
use groq::chat_api::ChatRequestMessage;

#[tokio::main]
async fn main() -> Result<()> {
    let model = env::args().nth(1).unwrap_or_else(|| "llama-3.3-70b-versatile".to_string());

    let mut chat = Chat::new(CHAT_COMPLETIONS_URL.to_string(), "env:GROQ_API_KEY".to_string(), model);
    chat.config.system_message = Some("answer in one sentence".to_string());

    let content = chat
        .generate(vec![ChatRequestMessage::new_user_message("hello".to_string())])
        .await?;
    println!("{content}");

    Ok(())
}
