use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DB_PATH: &str = "shopfloor.db";
pub const DEFAULT_IMAGE_DIR: &str = "images";

/// Server settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// SQLite database file.
    pub db_path: String,
    /// Directory holding uploaded and embedded images.
    pub image_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            db_path: DEFAULT_DB_PATH.to_string(),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
        }
    }
}

impl AppConfig {
    /// Reads `PORT`, `SHOPFLOOR_DB` and `SHOPFLOOR_IMAGE_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let port = match lookup("PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid PORT, using {DEFAULT_PORT}");
                DEFAULT_PORT
            }),
            None => defaults.port,
        };
        Self {
            port,
            db_path: lookup("SHOPFLOOR_DB")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.db_path),
            image_dir: lookup("SHOPFLOOR_IMAGE_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.image_dir),
        }
    }
}
