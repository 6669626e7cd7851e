use std::time::Duration;

use anyhow::Result;
use framework::json::from_json;
use groq::chat::Chat;
use groq::chat_api::ChatRequestMessage;
use groq::error::ChatError;
use thiserror::Error;
use tokio::time;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use super::model::PrContext;
use super::model::PullRequest;
use super::model::truncate_chars;
use super::prompt::build_analysis_prompt;

const SYSTEM_MESSAGE: &str = "You are an expert code reviewer. Respond only with valid JSON.";

#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error(
        "Groq API rate limit exceeded. Please try again in a few minutes. Free tier: 80,000 tokens/day, 30 requests/minute."
    )]
    RateLimited,
    #[error("AI analysis failed after {attempts} attempts: {source}")]
    Failed { attempts: u32, source: ChatError },
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    // attempt is zero based, rate limits back off harder
    pub fn delay(&self, attempt: u32, rate_limited: bool) -> Duration {
        let factor = if rate_limited {
            2u32.saturating_pow(attempt + 2).min(30)
        } else {
            2u32.saturating_pow(attempt).min(10)
        };
        self.base_delay * factor
    }
}

pub struct Analyzer {
    chat: Chat,
    retry: RetryPolicy,
}

impl Analyzer {
    pub fn new(mut chat: Chat) -> Self {
        chat.config.system_message = Some(SYSTEM_MESSAGE.to_string());
        chat.config.temperature = Some(0.3);
        chat.config.top_p = Some(0.9);
        chat.config.max_tokens = Some(2000);
        info!("analyzer initialized, model={}", chat.model());
        Analyzer {
            chat,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn analyze(&self, pr: &PullRequest) -> Result<PrContext, AnalyzeError> {
        let prompt = build_analysis_prompt(pr);
        let attempts = self.retry.max_attempts.max(1);

        for attempt in 0..attempts {
            let last_attempt = attempt + 1 == attempts;
            info!("analyze pull request, attempt={}/{attempts}, title={}", attempt + 1, pr.title);
            debug!("prompt length={}", prompt.len());

            let messages = vec![ChatRequestMessage::new_user_message(prompt.clone())];
            match self.chat.generate(messages).await {
                Ok(content) => match parse_context(&content) {
                    Ok(context) => {
                        info!("analysis completed, attempt={}", attempt + 1);
                        return Ok(context);
                    }
                    Err(err) => {
                        warn!("failed to parse analysis, attempt={}, error={err:#}", attempt + 1);
                        if last_attempt {
                            warn!("all attempts returned unparsable content, use fallback context");
                            return Ok(fallback_context(pr));
                        }
                    }
                },
                Err(err) => {
                    let rate_limited = err.is_rate_limited();
                    error!("groq call failed, attempt={}, rate_limited={rate_limited}, error={err}", attempt + 1);
                    if last_attempt {
                        return Err(if rate_limited {
                            AnalyzeError::RateLimited
                        } else {
                            AnalyzeError::Failed { attempts, source: err }
                        });
                    }
                    let delay = self.retry.delay(attempt, rate_limited);
                    info!("wait before retry, delay={delay:?}, next_attempt={}", attempt + 2);
                    time::sleep(delay).await;
                }
            }
        }
        unreachable!("last attempt always returns")
    }
}

pub fn parse_context(content: &str) -> Result<PrContext> {
    let content = content.trim();
    let content = content.strip_prefix("```json").unwrap_or(content);
    let content = content.strip_prefix("```").unwrap_or(content);
    let content = content.strip_suffix("```").unwrap_or(content);
    from_json(content.trim())
}

pub fn fallback_context(pr: &PullRequest) -> PrContext {
    let total_changes: u64 = pr.files.iter().map(|file| file.changed_lines()).sum();

    let (review_priority, estimated_review_time) = match total_changes {
        0..50 => ("low", "5-10 minutes"),
        50..200 => ("medium", "15-25 minutes"),
        200..500 => ("high", "30-45 minutes"),
        _ => ("critical", "1+ hours"),
    };

    let purpose = if pr.description.is_empty() {
        "No description provided".to_string()
    } else {
        truncate_chars(&pr.description, 200).to_string()
    };

    PrContext {
        summary: format!(
            "This PR modifies {} files with {} total changes.",
            pr.files.len(),
            total_changes
        ),
        purpose,
        testing_focus: vec![
            "Test the modified functionality".to_string(),
            "Check for breaking changes".to_string(),
            "Verify edge cases".to_string(),
        ],
        potential_risks: vec![
            "Changes may affect existing functionality".to_string(),
            "Review for potential bugs".to_string(),
        ],
        affected_areas: pr
            .files
            .iter()
            .take(5)
            .map(|file| file.filename.split('/').next().unwrap_or_default().to_string())
            .collect(),
        review_priority: review_priority.to_string(),
        estimated_review_time: estimated_review_time.to_string(),
        key_changes: pr
            .files
            .iter()
            .take(5)
            .map(|file| format!("{} ({})", file.filename, file.status))
            .collect(),
    }
}
