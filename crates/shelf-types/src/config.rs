use clap::Parser;
use std::{fs, path::PathBuf};

/// Location of persistent data, shared by server and CLI
#[derive(Debug, Clone, Parser)]
pub struct BackendConfig {
    #[arg(
        long,
        env = "SHELF_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/shelf.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "SHELF_DATA_DIR",
        help = "Data directory (database, token secret), default is system default like ~/.local/share/shelf",
        default_value_t = default_data_dir()
    )]
    data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("shelf"))
        .unwrap_or_else(|| PathBuf::from("shelf"))
        .to_string_lossy()
        .to_string()
}

impl BackendConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    /// Creates data directory if it does not exist yet
    pub fn ensure_data_dir(&self) -> std::io::Result<PathBuf> {
        let dir = self.data_dir();
        if !fs::exists(&dir)? {
            fs::create_dir_all(&dir)?;
        } else if !dir.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                format!("Data path {} is not a directory", dir.display()),
            ));
        }
        Ok(dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/shelf.db", self.data_dir))
    }
}
