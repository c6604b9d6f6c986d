use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Lifetime of an issued CSRF token.
    pub csrf_ttl_minutes: i64,
    /// Add `Secure` to issued cookies (behind TLS only).
    pub cookie_secure: bool,
    /// Credential pair accepted by the login endpoint. Empty password means
    /// login is disabled until configured.
    pub admin_user: String,
    pub admin_password: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment-keyed defaults first, specific env vars on top.
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("ERP_BIND") {
            self.server.bind = v;
        }
        if let Ok(v) = env::var("ERP_PORT").or_else(|_| env::var("PORT")) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        if let Ok(v) = env::var("ERP_CSRF_TTL_MINUTES") {
            self.security.csrf_ttl_minutes = v.parse().unwrap_or(self.security.csrf_ttl_minutes);
        }
        if let Ok(v) = env::var("ERP_COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Ok(v) = env::var("ERP_ADMIN_USER") {
            self.security.admin_user = v;
        }
        if let Ok(v) = env::var("ERP_ADMIN_PASSWORD") {
            self.security.admin_password = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { bind: "0.0.0.0".to_string(), port: 3000 },
            security: SecurityConfig {
                csrf_ttl_minutes: 120,
                cookie_secure: false,
                admin_user: "admin".to_string(),
                admin_password: "roteiro-dev".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { bind: "0.0.0.0".to_string(), port: 3000 },
            security: SecurityConfig {
                csrf_ttl_minutes: 60,
                cookie_secure: true,
                admin_user: "admin".to_string(),
                admin_password: String::new(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { bind: "0.0.0.0".to_string(), port: 3000 },
            security: SecurityConfig {
                csrf_ttl_minutes: 30,
                cookie_secure: true,
                admin_user: String::new(),
                admin_password: String::new(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.security.csrf_ttl_minutes, 120);
        assert!(!config.security.cookie_secure);
        assert!(!config.security.admin_password.is_empty());
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.security.csrf_ttl_minutes, 30);
        assert!(config.security.cookie_secure);
        // Login stays disabled until credentials are provisioned.
        assert!(config.security.admin_password.is_empty());
    }
}
