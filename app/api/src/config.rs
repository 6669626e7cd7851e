use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use anyhow::Result;

const API_KEY_PLACEHOLDER: &str = "your_groq_api_key_here";

pub struct Settings {
    pub groq_api_key: String,
    pub groq_model: String,
    pub groq_api_url: String,

    pub host: String,
    pub port: u16,
    pub debug: bool,

    pub allowed_origins: Vec<String>,
    pub rate_limit: u32,
    pub cache_ttl: Duration,
}

impl Settings {
    // process env wins over .env
    pub fn load() -> Result<Settings> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(err) if err.not_found() => {}
            Err(err) => return Err(err).context("failed to load .env"),
        }
        Settings::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Settings {
            groq_api_key: lookup("GROQ_API_KEY").unwrap_or_default(),
            groq_model: lookup("GROQ_MODEL").unwrap_or_else(|| "llama-3.3-70b-versatile".to_string()),
            groq_api_url: lookup("GROQ_API_URL").unwrap_or_else(|| groq::CHAT_COMPLETIONS_URL.to_string()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&lookup, "PORT", 8000)?,
            debug: lookup("DEBUG").map(|value| parse_bool(&value)).unwrap_or(true),
            allowed_origins: parse_list(
                &lookup("ALLOWED_ORIGINS").unwrap_or_else(|| "chrome-extension://*,http://localhost:*".to_string()),
            ),
            rate_limit: parse(&lookup, "RATE_LIMIT", 30)?,
            cache_ttl: Duration::from_secs(parse(&lookup, "CACHE_TTL", 3600)?),
        })
    }

    pub fn groq_configured(&self) -> bool {
        !self.groq_api_key.is_empty() && self.groq_api_key != API_KEY_PLACEHOLDER
    }
}

fn parse<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("invalid env, name={name}, value={value}")),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let settings = settings(&[]).unwrap();
        assert_eq!(settings.groq_model, "llama-3.3-70b-versatile");
        assert_eq!(settings.groq_api_url, "https://api.groq.com/openai/v1/chat/completions");
        assert_eq!(settings.host, "0.0.0.0");
        assert_eq!(settings.port, 8000);
        assert!(settings.debug);
        assert_eq!(settings.allowed_origins, vec!["chrome-extension://*", "http://localhost:*"]);
        assert_eq!(settings.rate_limit, 30);
        assert_eq!(settings.cache_ttl, Duration::from_secs(3600));
        assert!(!settings.groq_configured());
    }

    #[test]
    fn production_values_are_read() {
        let settings = settings(&[
            ("GROQ_API_KEY", "gsk_live"),
            ("GROQ_MODEL", "llama-3.1-8b-instant"),
            ("ALLOWED_ORIGINS", "chrome-extension://*"),
            ("DEBUG", "false"),
        ])
        .unwrap();
        assert!(settings.groq_configured());
        assert_eq!(settings.groq_model, "llama-3.1-8b-instant");
        assert_eq!(settings.allowed_origins, vec!["chrome-extension://*"]);
        assert!(!settings.debug);
    }

    #[test]
    fn debug_accepts_truthy_words() {
        for value in ["true", "TRUE", "1", "yes", "On"] {
            assert!(settings(&[("DEBUG", value)]).unwrap().debug, "value={value}");
        }
        for value in ["false", "0", "no", "off", "", "enabled", " true", "true "] {
            assert!(!settings(&[("DEBUG", value)]).unwrap().debug, "value={value}");
        }
    }

    #[test]
    fn origins_are_trimmed_and_empty_items_dropped() {
        let settings = settings(&[("ALLOWED_ORIGINS", " https://a.dev , ,https://b.dev,")]).unwrap();
        assert_eq!(settings.allowed_origins, vec!["https://a.dev", "https://b.dev"]);
    }

    #[test]
    fn placeholder_key_is_not_configured() {
        assert!(!settings(&[("GROQ_API_KEY", "your_groq_api_key_here")]).unwrap().groq_configured());
        assert!(!settings(&[("GROQ_API_KEY", "")]).unwrap().groq_configured());
    }

    #[test]
    fn invalid_port_names_variable() {
        let error = settings(&[("PORT", "eighty")]).err().unwrap();
        assert_eq!(error.to_string(), "invalid env, name=PORT, value=eighty");
    }
}
