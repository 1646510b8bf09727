use std::path::PathBuf;

/// File server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct FileServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8385`).
    pub port: u16,
    /// Storage root all categories live under.
    pub root: PathBuf,
}

impl FileServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var     | Default     |
    /// |-------------|-------------|
    /// | `HOST`      | `0.0.0.0`   |
    /// | `PORT`      | `8385`      |
    /// | `FILE_ROOT` | `./storage` |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8385".into())
            .parse()
            .expect("PORT must be a valid u16");

        let root = PathBuf::from(std::env::var("FILE_ROOT").unwrap_or_else(|_| "./storage".into()));

        Self { host, port, root }
    }
}
