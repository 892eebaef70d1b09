pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] shelf_dal::Error),

    #[error("Token manager error: {0}")]
    Token(#[from] shelf_auth::Error),

    #[error("Invalid listen address: {0}")]
    Address(#[from] std::net::AddrParseError),

    #[error("Invalid arguments: {0}")]
    Arguments(#[from] clap::Error),

    #[error("Invalid secret file: {0}")]
    InvalidSecret(String),
}
