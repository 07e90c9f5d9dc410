use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: IpAddr,
    pub port: u16,
    pub registration: RegistrationMode,
    pub max_body_size: usize,
    /// Upper bound on how long a single report may take to assemble.
    pub report_timeout: Duration,
    pub log_level: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegistrationMode {
    Open,
    Closed,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;
        let jwt_secret = env_required("JWT_SECRET")?;

        let host: IpAddr = env_or("BUILDTRACK_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid BUILDTRACK_HOST: {e}"))?;

        let port: u16 = env_or("BUILDTRACK_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid BUILDTRACK_PORT: {e}"))?;

        let registration = match env_or("BUILDTRACK_REGISTRATION", "open").as_str() {
            "closed" => RegistrationMode::Closed,
            _ => RegistrationMode::Open,
        };

        let max_body_size: usize = env_or("BUILDTRACK_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid BUILDTRACK_MAX_BODY_SIZE: {e}"))?;

        let report_timeout_secs: u64 = env_or("BUILDTRACK_REPORT_TIMEOUT_SECS", "30")
            .parse()
            .map_err(|e| format!("Invalid BUILDTRACK_REPORT_TIMEOUT_SECS: {e}"))?;
        if report_timeout_secs == 0 {
            return Err("BUILDTRACK_REPORT_TIMEOUT_SECS must be greater than 0".to_string());
        }

        let log_level = env_or("BUILDTRACK_LOG_LEVEL", "info");

        Ok(Config {
            database_url,
            jwt_secret,
            host,
            port,
            registration,
            max_body_size,
            report_timeout: Duration::from_secs(report_timeout_secs),
            log_level,
        })
    }
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
