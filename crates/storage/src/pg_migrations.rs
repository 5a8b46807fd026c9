//! PostgreSQL schema migrations for pixelpost storage.

use sqlx::PgPool;

/// Run all PostgreSQL migrations. Idempotent.
pub async fn run_pg_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS email_messages (
            id BIGSERIAL PRIMARY KEY,
            recipient TEXT NOT NULL,
            subject TEXT NOT NULL,
            body_html TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            sent_at TIMESTAMPTZ,
            delivered_at TIMESTAMPTZ,
            read_at TIMESTAMPTZ,
            failed_at TIMESTAMPTZ,
            last_error TEXT,
            tracking_token TEXT NOT NULL,
            provider_message_id TEXT,
            CONSTRAINT email_messages_status_check CHECK (
                status IN ('pending', 'sent', 'delivered', 'read', 'failed')
            )
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_email_tracking_token
           ON email_messages (tracking_token)",
    )
    .execute(pool)
    .await?;

    // Pending cursor: WHERE status = 'pending' ORDER BY id
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_email_status_id ON email_messages (status, id)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_email_created ON email_messages (created_at DESC)",
    )
    .execute(pool)
    .await?;

    tracing::debug!("PostgreSQL migrations applied");
    Ok(())
}
