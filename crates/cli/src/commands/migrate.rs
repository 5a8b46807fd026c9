//! Schema setup against `DATABASE_URL`.
//!
//! Idempotent: every statement is `IF NOT EXISTS`, so rerunning is safe.

use pixelpost_storage::PgStorage;

pub(crate) async fn run() -> anyhow::Result<()> {
    let url = crate::get_database_url()?;
    PgStorage::new(&url).await?;
    println!("Schema is up to date");
    Ok(())
}
