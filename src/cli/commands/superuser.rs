use crate::config::Config;
use crate::db::{Store, WriteOutcome};
use crate::domain::validation;

pub async fn cmd_create_superuser(
    config: &Config,
    username: &str,
    email: &str,
) -> anyhow::Result<()> {
    let username = username.trim();
    let email = email.trim();

    validation::username(username).map_err(|e| anyhow::anyhow!(e))?;
    validation::email(email).map_err(|e| anyhow::anyhow!(e))?;

    let store = Store::with_pool_options(
        &config.general.database_path,
        config.general.max_db_connections,
        config.general.min_db_connections,
    )
    .await?;

    match store.upsert_superuser(username, email).await? {
        WriteOutcome::Written(user) => {
            println!("Administrator ready:");
            println!("{:-<70}", "");
            println!("  ID:       {}", user.id);
            println!("  Username: {}", user.username);
            println!("  Email:    {}", user.email);
            println!();
            println!("Request a confirmation code via POST /api/v1/auth/signup");
            println!("with the same username and email to obtain a token.");
        }
        WriteOutcome::Duplicate => {
            anyhow::bail!("Username or email '{username}' / '{email}' is already taken");
        }
    }

    Ok(())
}
