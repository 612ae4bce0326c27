use std::net::SocketAddr;
use std::path::PathBuf;

/// Process configuration, read once from the environment at startup and
/// passed down explicitly.
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub front_url: String,
    pub public_base_url: String,
    pub upload_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let bind_addr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
            .parse()
            .expect("BIND_ADDR must be a valid socket address");

        let front_url =
            std::env::var("FRONT_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        let upload_dir = std::env::var("UPLOAD_DIR")
            .unwrap_or_else(|_| "uploads".to_string())
            .into();

        Self {
            database_url,
            bind_addr,
            front_url,
            public_base_url,
            upload_dir,
        }
    }
}
