use crate::app_config::{AppConfig, Environment, FetchMode};
use crate::ConfigError;

pub const DEFAULT_MAX_ITEMS: usize = 5;
pub const DEFAULT_PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";
pub const DEFAULT_PERPLEXITY_MODEL: &str = "sonar";
/// 07:00 UTC, Monday to Friday (seconds-resolution cron).
pub const DEFAULT_CRON: &str = "0 0 7 * * MON-FRI";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_positive = |var: &str, default: usize| -> Result<usize, ConfigError> {
        let Ok(raw) = lookup(var) else {
            return Ok(default);
        };
        let value = raw
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be a positive integer".to_string()));
        }
        Ok(value)
    };

    let perplexity_api_key = require("PERPLEXITY_API_KEY")?;
    let slack_webhook_url = require("SLACK_WEBHOOK_URL")?;

    let max_items = parse_positive("MAX_NEWS_ITEMS", DEFAULT_MAX_ITEMS)?;
    let perplexity_base_url = or_default("PERPLEXITY_BASE_URL", DEFAULT_PERPLEXITY_BASE_URL);
    let perplexity_model = or_default("PERPLEXITY_MODEL", DEFAULT_PERPLEXITY_MODEL);

    let fetch_mode_raw = or_default("SECNEWS_FETCH_MODE", "search");
    let fetch_mode = parse_fetch_mode(&fetch_mode_raw)
        .ok_or_else(|| invalid("SECNEWS_FETCH_MODE", format!("unknown mode '{fetch_mode_raw}'")))?;

    let summarize_raw = or_default("SECNEWS_SUMMARIZE", "true");
    let summarize = parse_bool(&summarize_raw)
        .ok_or_else(|| invalid("SECNEWS_SUMMARIZE", format!("not a boolean: '{summarize_raw}'")))?;

    let summary_concurrency = parse_positive("SECNEWS_SUMMARY_CONCURRENCY", 1)?;

    let http_timeout_secs = match lookup("SECNEWS_HTTP_TIMEOUT_SECS") {
        Ok(raw) => {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|e| invalid("SECNEWS_HTTP_TIMEOUT_SECS", e.to_string()))?;
            if secs == 0 {
                return Err(invalid(
                    "SECNEWS_HTTP_TIMEOUT_SECS",
                    "must be a positive integer".to_string(),
                ));
            }
            Some(secs)
        }
        Err(_) => None,
    };

    let env = parse_environment(&or_default("SECNEWS_ENV", "development"));

    let bind_addr = or_default("SECNEWS_BIND_ADDR", "0.0.0.0:8787")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("SECNEWS_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("SECNEWS_LOG_LEVEL", "info");
    let cron = or_default("SECNEWS_CRON", DEFAULT_CRON);

    let trigger_tokens = or_default("SECNEWS_TRIGGER_TOKENS", "")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    Ok(AppConfig {
        perplexity_api_key,
        slack_webhook_url,
        max_items,
        perplexity_base_url,
        perplexity_model,
        fetch_mode,
        summarize,
        summary_concurrency,
        http_timeout_secs,
        env,
        bind_addr,
        log_level,
        cron,
        trigger_tokens,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

fn parse_fetch_mode(s: &str) -> Option<FetchMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "search" => Some(FetchMode::Search),
        "chat" => Some(FetchMode::Chat),
        _ => None,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
