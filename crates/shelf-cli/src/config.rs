use clap::{Parser, Subcommand};

use crate::commands::{change_password::ChangePasswordCmd, create_user::CreateUserCmd};

#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "CLI for shelf - administrative commands working directly with server database."
)]
pub struct CliConfig {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Creates new user, use --admin to bootstrap first administrator
    CreateUser(CreateUserCmd),
    ChangePassword(ChangePasswordCmd),
}

impl crate::commands::Executor for Command {
    async fn run(self) -> anyhow::Result<()> {
        match self {
            Command::CreateUser(cmd) => cmd.run().await,
            Command::ChangePassword(cmd) => cmd.run().await,
        }
    }
}
