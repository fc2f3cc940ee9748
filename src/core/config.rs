use chrono::TimeDelta;
use dotenv::dotenv;
use jsonwebtoken::Algorithm;
use std::env;
use std::str::FromStr;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub auth_issuer: String,
    pub auth_audience: String,
    pub jwks_url: String,
    pub auth_algorithms: Vec<Algorithm>,
    pub jwks_cache_ttl: TimeDelta,
    pub server_host: String,
    pub server_port: u16,
    pub max_connections: u32,
    pub reset_database: bool,
    pub app_env: String,
}

impl Config {
    /// Carica la configurazione dalle variabili d'ambiente
    /// Chiama dotenv() automaticamente
    pub fn from_env() -> Result<Self, String> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Costruisce la configurazione da una sorgente chiave/valore qualsiasi
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let database_url = lookup("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://database.db?mode=rwc".to_string());

        let auth_issuer = lookup("AUTH_ISSUER")
            .map(|issuer| normalize_issuer(&issuer))
            .ok_or_else(|| "AUTH_ISSUER must be set in .env file".to_string())?;

        let auth_audience = lookup("AUTH_AUDIENCE")
            .ok_or_else(|| "AUTH_AUDIENCE must be set in .env file".to_string())?;

        let jwks_url = lookup("AUTH_JWKS_URL")
            .unwrap_or_else(|| format!("{}.well-known/jwks.json", auth_issuer));

        let auth_algorithms = parse_algorithms(
            &lookup("AUTH_ALGORITHMS").unwrap_or_else(|| "RS256".to_string()),
        )?;

        let jwks_cache_ttl = lookup("JWKS_CACHE_TTL_SECS")
            .unwrap_or_else(|| "600".to_string())
            .parse::<i64>()
            .ok()
            .filter(|secs| *secs >= 0)
            .and_then(TimeDelta::try_seconds)
            .ok_or_else(|| "Invalid JWKS_CACHE_TTL_SECS: must be a positive number of seconds".to_string())?;

        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());

        let server_port = lookup("SERVER_PORT")
            .unwrap_or_else(|| "5000".to_string())
            .parse::<u16>()
            .map_err(|_| "Invalid SERVER_PORT: must be a number between 0-65535".to_string())?;

        let max_connections = lookup("MAX_DB_CONNECTIONS")
            .unwrap_or_else(|| "5".to_string())
            .parse::<u32>()
            .map_err(|_| "Invalid MAX_DB_CONNECTIONS: must be a positive number".to_string())?;

        let reset_database = lookup("RESET_DATABASE")
            .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let app_env = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());

        Ok(Config {
            database_url,
            auth_issuer,
            auth_audience,
            jwks_url,
            auth_algorithms,
            jwks_cache_ttl,
            server_host,
            server_port,
            max_connections,
            reset_database,
            app_env,
        })
    }

    /// Logga la configurazione (nascondendo le credenziali)
    pub fn log_info(&self) {
        info!("Environment: {}", self.app_env);
        info!("Server Address: {}:{}", self.server_host, self.server_port);
        info!("Database: {}", Self::mask_url(&self.database_url));
        info!("Max DB Connections: {}", self.max_connections);
        info!("Token issuer: {} (audience {})", self.auth_issuer, self.auth_audience);
        info!("JWKS: {} (cache TTL {}s)", self.jwks_url, self.jwks_cache_ttl.num_seconds());
        if self.reset_database {
            info!("RESET_DATABASE enabled: existing drinks will be dropped on startup");
        }
    }

    /// Maschera le credenziali dell'URL del database per il logging
    fn mask_url(url: &str) -> String {
        if let Some(at_pos) = url.find('@') {
            if let Some(scheme_end) = url.find("://") {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos..];
                return format!("{}***{}", scheme, after_at);
            }
        }
        url.to_string()
    }
}

fn normalize_issuer(issuer: &str) -> String {
    let issuer = issuer.trim();
    let issuer = if issuer.contains("://") {
        issuer.to_string()
    } else {
        // solo il dominio del tenant, come AUTH0_DOMAIN
        format!("https://{}", issuer)
    };
    if issuer.ends_with('/') {
        issuer
    } else {
        format!("{}/", issuer)
    }
}

fn parse_algorithms(raw: &str) -> Result<Vec<Algorithm>, String> {
    let algorithms = raw
        .split(',')
        .map(str::trim)
        .filter(|alg| !alg.is_empty())
        .map(|alg| {
            Algorithm::from_str(alg).map_err(|_| format!("Invalid AUTH_ALGORITHMS entry: {}", alg))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if algorithms.is_empty() {
        return Err("AUTH_ALGORITHMS must list at least one algorithm".to_string());
    }
    Ok(algorithms)
}
