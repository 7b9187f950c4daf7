use dotenv::dotenv;
use std::env;
use tracing::{info, warn};

const DEFAULT_JWT_SECRET: &str = "un segreto meno bello";

#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    pub app_env: String,
    pub log_level: String,
    pub gazetteer_path: Option<String>,
    pub cors_allow_any: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_ttl_hours: 24,
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            app_env: "development".to_string(),
            log_level: "info".to_string(),
            gazetteer_path: None,
            cors_allow_any: true,
        }
    }
}

impl Config {
    /// Carica la configurazione dalle variabili d'ambiente
    /// Chiama dotenv() automaticamente
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Costruisce la configurazione da una sorgente di variabili qualsiasi
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let defaults = Self::default();

        let jwt_secret = lookup("JWT_SECRET").unwrap_or(defaults.jwt_secret);

        let jwt_ttl_hours = match lookup("JWT_TTL_HOURS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|h| *h > 0)
                .ok_or_else(|| "Invalid JWT_TTL_HOURS: must be a positive number".to_string())?,
            None => defaults.jwt_ttl_hours,
        };

        let server_host = lookup("SERVER_HOST").unwrap_or(defaults.server_host);

        let server_port = match lookup("SERVER_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| "Invalid SERVER_PORT: must be a number between 0-65535".to_string())?,
            None => defaults.server_port,
        };

        let app_env = lookup("APP_ENV").unwrap_or(defaults.app_env);

        let log_level = lookup("LOG_LEVEL").unwrap_or(defaults.log_level);

        let gazetteer_path = lookup("GAZETTEER_PATH").filter(|p| !p.trim().is_empty());

        let cors_allow_any = match lookup("CORS_ALLOW_ANY") {
            Some(raw) => raw
                .parse::<bool>()
                .map_err(|_| "Invalid CORS_ALLOW_ANY: must be true or false".to_string())?,
            None => app_env == "development",
        };

        Ok(Config {
            jwt_secret,
            jwt_ttl_hours,
            server_host,
            server_port,
            app_env,
            log_level,
            gazetteer_path,
            cors_allow_any,
        })
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }

    /// Logga la configurazione (nascondendo i segreti)
    pub fn print_info(&self) {
        info!("Server Configuration:");
        info!("   Environment: {}", self.app_env);
        info!("   Server Address: {}:{}", self.server_host, self.server_port);
        info!("   Token lifetime: {}h", self.jwt_ttl_hours);
        info!(
            "   Gazetteer: {}",
            self.gazetteer_path.as_deref().unwrap_or("none (empty search index)")
        );
        info!("   CORS allow any origin: {}", self.cors_allow_any);
        if self.uses_default_secret() {
            warn!("   JWT Secret: USING DEFAULT (INSECURE!)");
        } else {
            info!("   JWT Secret: custom secret configured");
        }
    }
}
