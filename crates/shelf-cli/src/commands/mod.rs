use shelf_dal::user::UserRepository;

pub mod change_password;
pub mod create_user;

#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn run(self) -> anyhow::Result<()>;
}

/// Opens database, applying pending migrations
pub async fn create_user_repository(db_url: &str) -> anyhow::Result<UserRepository> {
    let pool = shelf_dal::new_pool(db_url).await?;
    shelf_dal::migrate(&pool).await?;
    Ok(UserRepository::new(pool))
}
