use anyhow::{Context, Result};

const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub s3_region: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub llm: LlmConfig,
    pub jwt: JwtConfig,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// `None` runs every AI feature on its deterministic fallback.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub fallback_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            s3_region: env_or("S3_REGION", "us-east-1"),
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            llm: LlmConfig {
                api_key: std::env::var("LLM_API_KEY")
                    .ok()
                    .filter(|k| !k.trim().is_empty()),
                base_url: env_or("LLM_BASE_URL", DEFAULT_LLM_BASE_URL),
                model: env_or("LLM_MODEL", DEFAULT_LLM_MODEL),
                fallback_enabled: parse_bool(&env_or("AI_FALLBACK_ENABLED", "true")),
            },
            jwt: JwtConfig {
                secret: require_env("JWT_SECRET")?,
                issuer: env_or("JWT_ISSUER", "mentorpath"),
                audience: env_or("JWT_AUDIENCE", "mentorpath-web"),
                ttl_minutes: env_or("JWT_TTL_MINUTES", "10080")
                    .parse::<i64>()
                    .context("JWT_TTL_MINUTES must be an integer")?,
            },
            max_upload_bytes: match std::env::var("MAX_UPLOAD_BYTES") {
                Ok(v) => v
                    .parse::<usize>()
                    .context("MAX_UPLOAD_BYTES must be a byte count")?,
                Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
            },
            port: env_or("PORT", "3001")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_bool(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
