use clap::Parser;
use shelf_dal::validation::password_length;
use shelf_types::{config::BackendConfig, general::ValidEmail};
use tracing::info;

use crate::commands::{create_user_repository, Executor};

#[derive(Parser, Debug)]
pub struct ChangePasswordCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "User email, used as login")]
    pub email: ValidEmail,
    #[arg(short, long, help = "New user password")]
    pub password: String,
}

impl Executor for ChangePasswordCmd {
    async fn run(self) -> anyhow::Result<()> {
        password_length(&self.password, &()).map_err(|e| anyhow::anyhow!("password {e}"))?;
        let repository = create_user_repository(&self.backend.database_url()).await?;
        repository
            .change_password(self.email.as_ref(), &self.password)
            .await?;
        info!("Password changed for {}", self.email);
        Ok(())
    }
}
