use sqlx::SqlitePool;

const NOW_MICROS: &str = "(CAST((julianday('now') - 2440587.5) * 86400000000 AS INTEGER))";

struct Migration {
    version: i64,
    name: &'static str,
    statements: fn() -> Vec<String>,
}

fn init() -> Vec<String> {
    vec![
        "CREATE TABLE IF NOT EXISTS users (
            id BLOB PRIMARY KEY NOT NULL,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        )"
        .to_string(),
        format!(
            "CREATE TABLE IF NOT EXISTS issues (
                id BLOB PRIMARY KEY NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                customer_name TEXT NOT NULL,
                customer_email TEXT NOT NULL,
                priority TEXT NOT NULL DEFAULT 'medium',
                status TEXT NOT NULL DEFAULT 'open',
                assigned_to TEXT,
                created_at INTEGER NOT NULL DEFAULT {now},
                updated_at INTEGER NOT NULL DEFAULT {now}
            )",
            now = NOW_MICROS
        ),
        // no ON DELETE clause: issues are never deleted
        format!(
            "CREATE TABLE IF NOT EXISTS comments (
                id BLOB PRIMARY KEY NOT NULL,
                issue_id BLOB NOT NULL REFERENCES issues(id),
                author_name TEXT NOT NULL,
                content TEXT NOT NULL,
                is_internal INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL DEFAULT {now}
            )",
            now = NOW_MICROS
        ),
        "CREATE INDEX IF NOT EXISTS idx_issues_created_at ON issues(created_at)".to_string(),
        "CREATE INDEX IF NOT EXISTS idx_issues_customer_email ON issues(customer_email)".to_string(),
        "CREATE INDEX IF NOT EXISTS idx_comments_issue ON comments(issue_id, created_at)".to_string(),
    ]
}

fn migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        name: "init",
        statements: init,
    }]
}

/// Brings the schema up to date. The applied version lives in
/// `PRAGMA user_version`, so reopening an existing database is a no-op.
pub async fn up_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let current: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;

    for migration in migrations().into_iter().filter(|m| m.version > current) {
        log::info!(
            "Issue store migrator: applying {} (v{})",
            migration.name,
            migration.version
        );

        let mut tx = pool.begin().await?;
        for statement in (migration.statements)() {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }
        let bump = format!("PRAGMA user_version = {}", migration.version);
        sqlx::query(&bump).execute(&mut *tx).await?;
        tx.commit().await?;
    }

    Ok(())
}
