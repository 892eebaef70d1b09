use clap::Parser;
use garde::Validate as _;
use shelf_dal::user::CreateUser;
use shelf_types::{claim::Role, config::BackendConfig, general::ValidEmail};
use tracing::info;

use crate::commands::{create_user_repository, Executor};

#[derive(Parser, Debug)]
pub struct CreateUserCmd {
    #[command(flatten)]
    backend: BackendConfig,
    #[arg(short, long, help = "Given (first) name")]
    pub given_name: String,
    #[arg(short, long, help = "Family (last) name")]
    pub family_name: String,
    #[arg(short, long, help = "User email, used as login")]
    pub email: ValidEmail,
    #[arg(short, long, help = "User password")]
    pub password: String,
    #[arg(long, help = "Create user with admin role")]
    pub admin: bool,
}

impl Executor for CreateUserCmd {
    async fn run(self) -> anyhow::Result<()> {
        self.backend.ensure_data_dir()?;
        let repository = create_user_repository(&self.backend.database_url()).await?;
        let role = if self.admin { Role::Admin } else { Role::User };
        let new_user = CreateUser {
            email: self.email.into_inner(),
            given_name: self.given_name,
            family_name: self.family_name,
            password: self.password,
        };
        new_user.validate()?;
        let user = repository.create_with_role(new_user, role).await?;
        info!("Created user {} with role {}", user.id, user.role);

        Ok(())
    }
}
