use std::time::Duration;

/// Collaborator origin used when `PORTAL_API_BASE_URL` is not set.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
/// Listen port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 5173;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_base_url: String,
    /// `None` means collaborator calls wait indefinitely.
    pub http_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout: None,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self {
            port: var("PORT")
                .unwrap_or_else(|| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            api_base_url: validate_base_url(
                var("PORTAL_API_BASE_URL")
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            )?,
            http_timeout: match var("PORTAL_HTTP_TIMEOUT_SECS").filter(|s| !s.trim().is_empty()) {
                None => None,
                Some(raw) => {
                    let secs: u64 = raw.trim().parse().map_err(|_| {
                        anyhow::anyhow!("PORTAL_HTTP_TIMEOUT_SECS must be a positive integer")
                    })?;
                    if secs == 0 {
                        anyhow::bail!("PORTAL_HTTP_TIMEOUT_SECS must be a positive integer");
                    }
                    Some(Duration::from_secs(secs))
                }
            },
        };

        tracing::debug!("Portal API base URL: {}", config.api_base_url);
        tracing::debug!("Server Port: {}", config.port);
        match config.http_timeout {
            Some(timeout) => tracing::debug!("HTTP timeout: {:?}", timeout),
            None => tracing::debug!("HTTP timeout: none"),
        }

        Ok(config)
    }
}

fn validate_base_url(url: String) -> anyhow::Result<String> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("PORTAL_API_BASE_URL must start with http:// or https://");
    }
    Ok(url)
}
