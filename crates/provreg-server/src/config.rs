//! Server configuration loaded from the environment.

use std::env;

use provreg_db::DbConfig;

/// Runtime configuration for the registry server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener.
    pub http_addr: String,
    pub db: DbConfig,
    /// Shared secret for bearer authentication; unset disables it.
    pub auth_token: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:8080".into(),
            db: DbConfig::default(),
            auth_token: None,
        }
    }
}

impl ServerConfig {
    /// Build a configuration from `PROVREG_*` environment variables,
    /// falling back to defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = env::var("PROVREG_HTTP_ADDR") {
            config.http_addr = addr;
        }
        if let Ok(url) = env::var("PROVREG_DB_URL") {
            config.db.url = url;
        }
        if let Ok(ns) = env::var("PROVREG_DB_NS") {
            config.db.namespace = ns;
        }
        if let Ok(name) = env::var("PROVREG_DB_NAME") {
            config.db.database = name;
        }
        if let Ok(user) = env::var("PROVREG_DB_USER") {
            config.db.username = user;
        }
        if let Ok(pass) = env::var("PROVREG_DB_PASS") {
            config.db.password = pass;
        }
        config.auth_token = env::var("PROVREG_AUTH_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());
        config
    }
}
