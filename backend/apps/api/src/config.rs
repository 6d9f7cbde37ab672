//! Command line and environment configuration

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use access::AccessConfig;
use anyhow::{Context, bail};
use catalog::CatalogConfig;
use clap::{Args, Parser, Subcommand};
use platform::password::HashedPassword;
use platform::rate_limit::RateLimitConfig;

/// Shortest accepted CSRF secret after decoding
const MIN_SECRET_BYTES: usize = 16;

#[derive(Debug, Parser)]
#[command(name = "api", version, about = "Creator catalog API server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print the PBKDF2 hash for an admin password
    HashPassword {
        #[arg(value_name = "PASSWORD")]
        password: String,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Listen address
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8787")]
    pub bind_addr: SocketAddr,

    /// Encoded PBKDF2 hash of the admin password
    #[arg(long, env = "ADMIN_PASSWORD_HASH", hide_env_values = true)]
    pub admin_password_hash: Option<String>,

    /// Token signing secret, base64 or plain text; random in debug builds when absent
    #[arg(long, env = "CSRF_SECRET_KEY", hide_env_values = true)]
    pub csrf_secret_key: Option<String>,

    #[arg(long, env = "CSRF_MAX_AGE_MS", default_value_t = 3_600_000)]
    pub csrf_max_age_ms: u64,

    #[arg(long, env = "RATE_LIMIT_MAX_ATTEMPTS", default_value_t = 3)]
    pub rate_limit_max_attempts: u32,

    #[arg(long, env = "RATE_LIMIT_WINDOW_MS", default_value_t = 900_000)]
    pub rate_limit_window_ms: u64,

    /// Extra comma-separated CORS origins
    #[arg(long, env = "CORS_ORIGINS", default_value = "")]
    pub cors_origins: String,

    /// PostgreSQL URL; in-memory stores when absent
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Root directory of the image store
    #[arg(long, env = "IMAGES_DIR", default_value = "./data/images")]
    pub images_dir: PathBuf,

    #[arg(long, env = "ENVIRONMENT", default_value = "production")]
    pub environment: String,
}

impl ServeArgs {
    pub fn access_config(&self) -> anyhow::Result<AccessConfig> {
        let admin_password_hash = match self.admin_password_hash.as_deref() {
            Some(encoded) if !encoded.is_empty() => Some(
                HashedPassword::from_encoded(encoded)
                    .context("ADMIN_PASSWORD_HASH is not a valid password hash")?,
            ),
            _ => {
                tracing::warn!("ADMIN_PASSWORD_HASH is not set, every login will fail");
                None
            }
        };

        let csrf_secret = match self.csrf_secret_key.as_deref() {
            Some(raw) if !raw.is_empty() => {
                // Base64 when it decodes, otherwise the plain string bytes
                let secret = platform::crypto::from_base64(raw)
                    .unwrap_or_else(|_| raw.as_bytes().to_vec());
                if secret.len() < MIN_SECRET_BYTES {
                    bail!("CSRF_SECRET_KEY must decode to at least {MIN_SECRET_BYTES} bytes");
                }
                secret
            }
            _ if cfg!(debug_assertions) => {
                tracing::warn!("CSRF_SECRET_KEY is not set, using a random secret");
                platform::crypto::random_bytes(32)
            }
            _ => bail!("CSRF_SECRET_KEY must be set in production"),
        };

        Ok(AccessConfig {
            admin_password_hash,
            csrf_secret,
            csrf_max_age: Duration::from_millis(self.csrf_max_age_ms),
            rate_limit: RateLimitConfig::new(
                self.rate_limit_max_attempts,
                self.rate_limit_window_ms,
            ),
        })
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        if cfg!(debug_assertions) {
            CatalogConfig::development()
        } else {
            CatalogConfig::default()
        }
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("api").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&[]);
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.bind_addr.port(), 8787);
        assert_eq!(cli.serve.rate_limit_max_attempts, 3);
        assert_eq!(cli.serve.rate_limit_window_ms, 900_000);
    }

    #[test]
    fn test_hash_password_subcommand() {
        let cli = parse(&["hash-password", "Secret-Pass-123"]);
        match cli.command {
            Some(Command::HashPassword { password }) => assert_eq!(password, "Secret-Pass-123"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cors_origins_split() {
        let cli = parse(&["--cors-origins", "https://a.example, ,https://b.example"]);
        assert_eq!(
            cli.serve.cors_origins(),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let cli = parse(&["--csrf-secret-key", "c2hvcnQ="]);
        assert!(cli.serve.access_config().is_err());
    }

    #[test]
    fn test_plain_text_secret_is_used_as_bytes() {
        let cli = parse(&["--csrf-secret-key", "change-me-in-production!"]);
        let config = cli.serve.access_config().unwrap();
        assert_eq!(config.csrf_secret, b"change-me-in-production!".to_vec());
    }

    #[test]
    fn test_short_plain_text_secret_is_rejected() {
        let cli = parse(&["--csrf-secret-key", "too-short!"]);
        assert!(cli.serve.access_config().is_err());
    }

    #[test]
    fn test_secret_is_base64_decoded() {
        let secret = platform::crypto::to_base64(&[7u8; 32]);
        let cli = parse(&["--csrf-secret-key", &secret]);
        let config = cli.serve.access_config().unwrap();
        assert_eq!(config.csrf_secret, vec![7u8; 32]);
        assert_eq!(config.csrf_max_age, Duration::from_secs(3600));
    }
}
