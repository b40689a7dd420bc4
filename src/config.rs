use std::env;

// Process configuration, read once at startup and carried in AppState.
#[derive(Debug, Clone)]
pub struct Config {
    pub second_level_domain: String,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        let second_level_domain =
            env::var("SECOND_LEVEL_DOMAIN").expect("SECOND_LEVEL_DOMAIN must be set");
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("SERVER_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Self {
            second_level_domain,
            host,
            port,
        }
    }

    /// A connection counts as coming through a custom domain unless the
    /// hostname is a direct subdomain of the configured root domain.
    pub fn is_custom_domain(&self, full_domain: &str) -> bool {
        !full_domain.ends_with(&format!(".{}", self.second_level_domain))
    }
}
