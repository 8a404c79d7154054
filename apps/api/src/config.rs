use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::catalog::CatalogOptions;
use crate::chat::replies::ReplyStrategyKind;
use crate::matching::filters::ResultPolicy;
use crate::matching::recommend::{AiMode, ScoringPolicy};
use crate::session::SessionBackend;

/// Application configuration loaded from environment variables.
/// Every value has a default except `REDIS_URL`, which the redis session backend needs.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,

    pub catalog_path: PathBuf,
    pub catalog_seed: u64,
    pub synthetic_passengers: usize,

    pub session_backend: SessionBackend,
    pub session_dir: PathBuf,
    pub session_clear_on_start: bool,
    pub session_ttl_minutes: i64,
    pub redis_url: Option<String>,

    pub music_results: ResultPolicy,
    pub interest_results: ResultPolicy,
    pub purpose_results: ResultPolicy,

    pub ai_mode: AiMode,
    pub ai_min_score: u32,
    pub ai_max_results: Option<usize>,

    pub reply_strategy: ReplyStrategyKind,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let session_backend: SessionBackend = env_or("SESSION_BACKEND", "memory")?;
        let redis_url = match session_backend {
            SessionBackend::Redis => Some(require_env("REDIS_URL")?),
            _ => std::env::var("REDIS_URL").ok(),
        };

        Ok(Config {
            port: env_or("PORT", "8080")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),

            catalog_path: env_or("CATALOG_PATH", "data/people.json")?,
            catalog_seed: env_or("CATALOG_SEED", "42")?,
            synthetic_passengers: env_or("SYNTHETIC_PASSENGERS", "100")?,

            session_backend,
            session_dir: env_or("SESSION_DIR", "flask_session")?,
            session_clear_on_start: env_or("SESSION_CLEAR_ON_START", "true")?,
            session_ttl_minutes: env_or("SESSION_TTL_MINUTES", "1440")?,
            redis_url,

            music_results: env_or("MUSIC_RESULTS", "padded:5")?,
            interest_results: env_or("INTEREST_RESULTS", "padded:7-10")?,
            purpose_results: env_or("PURPOSE_RESULTS", "unbounded")?,

            ai_mode: env_or("AI_MODE", "scored")?,
            ai_min_score: env_or("AI_MIN_SCORE", "3")?,
            ai_max_results: optional_env("AI_MAX_RESULTS")?,

            reply_strategy: env_or("REPLY_STRATEGY", "keyword")?,
        })
    }

    pub fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions {
            seed_path: self.catalog_path.clone(),
            synthetic_count: self.synthetic_passengers,
            rng_seed: self.catalog_seed,
        }
    }

    pub fn scoring_policy(&self) -> ScoringPolicy {
        ScoringPolicy {
            min_score: self.ai_min_score,
            max_results: self.ai_max_results,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or<T>(key: &str, default: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_string());
    parse_value(key, &raw)
}

fn optional_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => parse_value(key, &raw).map(Some),
        _ => Ok(None),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| anyhow!("{key} has an invalid value '{raw}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_reports_key() {
        let err = parse_value::<u16>("PORT", "eighty").unwrap_err();
        assert!(err.to_string().contains("PORT"));
        assert_eq!(parse_value::<u16>("PORT", " 8080 ").unwrap(), 8080);
    }

    #[test]
    fn test_parse_value_handles_domain_types() {
        assert_eq!(
            parse_value::<ResultPolicy>("MUSIC_RESULTS", "padded:5").unwrap(),
            ResultPolicy::Padded { min: 5, max: None }
        );
        assert_eq!(
            parse_value::<AiMode>("AI_MODE", "rotating").unwrap(),
            AiMode::Rotating
        );
        assert!(parse_value::<bool>("SESSION_CLEAR_ON_START", "yes").is_err());
    }

    #[test]
    fn test_unset_optional_env_is_none() {
        let value: Option<usize> =
            optional_env("FLIGHTMATE_TEST_SURELY_UNSET_VARIABLE").unwrap();
        assert!(value.is_none());
    }
}
