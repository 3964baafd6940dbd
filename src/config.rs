use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::sync::OnceLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    /// Provider used for projective grading: "anthropic" or "google".
    pub ai_provider: String,
    pub anthropic_api_key: String,
    pub anthropic_model: String,
    pub google_api_key: String,
    pub google_model: String,
    /// Profile applied when an evaluation carries none. Resolved at verdict
    /// time; with neither this nor a per-evaluation profile, the automatic
    /// verdict falls back to REVISION.
    pub default_profile_id: Option<Uuid>,
    pub evaluation_ttl_hours: i64,
    pub max_verification_attempts: u32,
    pub public_rps: u32,
    pub seed_demo_data: bool,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let default_profile_id = match env::var("DEFAULT_PROFILE_ID") {
            Ok(raw) if !raw.is_empty() => Some(raw.parse().map_err(|e| {
                Error::Config(format!("Invalid value for DEFAULT_PROFILE_ID: {}", e))
            })?),
            _ => None,
        };

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            ai_provider: env::var("AI_PROVIDER").unwrap_or_else(|_| "anthropic".to_string()),
            anthropic_api_key: env::var("ANTHROPIC_API_KEY").unwrap_or_default(),
            anthropic_model: env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-20250514".to_string()),
            google_api_key: env::var("GOOGLE_API_KEY").unwrap_or_default(),
            google_model: env::var("GOOGLE_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
            default_profile_id,
            evaluation_ttl_hours: get_env_parse_or("EVALUATION_TTL_HOURS", 48)?,
            max_verification_attempts: get_env_parse_or("MAX_VERIFICATION_ATTEMPTS", 5)?,
            public_rps: get_env_parse_or("PUBLIC_RPS", 20)?,
            seed_demo_data: get_env_parse_or("SEED_DEMO_DATA", false)?,
        })
    }
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> &'static Config {
    CONFIG
        .get()
        .expect("Configuration has not been initialized")
}
