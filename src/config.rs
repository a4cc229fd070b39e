//! Runtime configuration read from the environment (and `.env` via dotenvy).

use std::path::PathBuf;

/// Where page content documents live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentBackend {
    /// One `<page>.json` file per page key under `content_dir`.
    Files,
    /// `page_content` table in the Postgres database at `DATABASE_URL`.
    Postgres,
}

impl ContentBackend {
    fn from_env_value(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "db" => ContentBackend::Postgres,
            _ => ContentBackend::Files,
        }
    }
}

/// An operator allowed to sign in to the admin panel.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub email: String,
    pub password_hash: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub content_backend: ContentBackend,
    pub content_dir: PathBuf,
    /// Shared secret required as a bearer credential on content writes.
    /// `None` leaves writes open (development mode).
    pub content_api_secret: Option<String>,
    pub admin_accounts: Vec<AdminAccount>,
    /// Static build of the admin panel served behind the gate.
    pub admin_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3001,
            content_backend: ContentBackend::Files,
            content_dir: PathBuf::from("data/content"),
            content_api_secret: None,
            admin_accounts: Vec::new(),
            admin_dir: PathBuf::from("admin"),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            content_backend: std::env::var("CONTENT_BACKEND")
                .map(|v| ContentBackend::from_env_value(&v))
                .unwrap_or(defaults.content_backend),
            content_dir: std::env::var("CONTENT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.content_dir),
            content_api_secret: std::env::var("CONTENT_API_SECRET")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            admin_accounts: std::env::var("ADMIN_CREDENTIALS")
                .map(|v| parse_admin_credentials(&v))
                .unwrap_or_default(),
            admin_dir: std::env::var("ADMIN_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.admin_dir),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Emails of every configured operator; the session allow-list.
    pub fn admin_emails(&self) -> Vec<String> {
        self.admin_accounts.iter().map(|a| a.email.clone()).collect()
    }
}

/// Parse `email:hash;email:hash`. Bcrypt hashes contain `$` but never `:` or `;`.
pub fn parse_admin_credentials(raw: &str) -> Vec<AdminAccount> {
    raw.split(';')
        .filter_map(|pair| {
            let (email, hash) = pair.trim().split_once(':')?;
            let (email, hash) = (email.trim(), hash.trim());
            if email.is_empty() || hash.is_empty() {
                tracing::warn!(entry = %email, "ignoring malformed ADMIN_CREDENTIALS entry");
                return None;
            }
            Some(AdminAccount {
                email: email.to_string(),
                password_hash: hash.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_admin_credentials_splits_pairs() {
        let accounts = parse_admin_credentials(
            "ops@firm.example:$2b$04$abc; editor@firm.example:$2b$04$def ;",
        );
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].email, "ops@firm.example");
        assert_eq!(accounts[0].password_hash, "$2b$04$abc");
        assert_eq!(accounts[1].email, "editor@firm.example");
    }

    #[test]
    fn test_parse_admin_credentials_skips_malformed() {
        let accounts = parse_admin_credentials("no-separator;:onlyhash;email@x.example:");
        assert!(accounts.is_empty());
    }

    #[test]
    fn test_content_backend_from_env_value() {
        assert_eq!(
            ContentBackend::from_env_value("Postgres"),
            ContentBackend::Postgres
        );
        assert_eq!(ContentBackend::from_env_value("files"), ContentBackend::Files);
        assert_eq!(ContentBackend::from_env_value("anything"), ContentBackend::Files);
    }

    #[test]
    fn test_default_config_has_open_writes() {
        let config = AppConfig::default();
        assert!(config.content_api_secret.is_none());
        assert!(!config.is_production());
    }
}
