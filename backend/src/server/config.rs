//! Server settings loaded via OrthoConfig and the runtime configuration
//! built from them.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use blog_backend::outbound::persistence::DbPool;
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Settings read from the command line, `BLOG_*` environment variables and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BLOG")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL URL. Without one the server keeps everything in memory.
    pub database_url: Option<String>,
    /// Directory uploaded images are written under.
    pub media_root: Option<PathBuf>,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`.
    #[ortho_config(default = true)]
    pub cookie_secure: bool,
    /// Fall back to a random session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub allow_ephemeral_session_key: bool,
    /// Upper bound on pooled database connections.
    #[ortho_config(default = 10)]
    pub db_pool_max_size: u32,
}

impl ServerSettings {
    /// Return the configured bind address, falling back to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)))
    }

    /// Return the configured media root, falling back to `media`.
    pub fn media_root(&self) -> PathBuf {
        self.media_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_ROOT))
    }

    /// Return the configured session key path, falling back to the secrets
    /// mount.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) media_root: PathBuf,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a server configuration backed by the in-memory store.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, bind_addr: SocketAddr, media_root: &Path) -> Self {
        Self {
            key,
            cookie_secure,
            same_site: SameSite::Lax,
            bind_addr,
            media_root: media_root.to_path_buf(),
            db_pool: None,
        }
    }

    /// Attach a database connection pool, selecting the PostgreSQL
    /// repositories.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}
