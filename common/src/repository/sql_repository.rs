use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, SqlitePool,
};
use uuid::Uuid;

use crate::{
    entities::{
        comment::{Comment, NewComment},
        issue::{Issue, IssueChange, NewIssue},
        stats::{IssueStats, LocalDay},
        user::{NewUser, User},
    },
    error::{self, AddCode, ServiceError},
};

use super::{migrations::up_migrations, Clock, IssueRepository, SystemClock};

const ISSUE_COLUMNS: &str = "id, title, description, customer_name, customer_email, \
     priority, status, assigned_to, created_at, updated_at";

const COMMENT_COLUMNS: &str = "id, issue_id, author_name, content, is_internal, created_at";

/// Durable backend on SQLite. Timestamps are stored as UTC microseconds.
pub struct SqlRepository {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl SqlRepository {
    pub async fn connect(url: &str, max_connections: u32) -> error::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// A private in-memory database. The pool is pinned to a single
    /// connection that is never recycled, otherwise the data would vanish.
    pub async fn in_memory() -> error::Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> error::Result<Self> {
        up_migrations(&pool).await?;
        Ok(Self {
            pool,
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn to_micros(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_micros()
}

fn from_micros(micros: i64) -> anyhow::Result<DateTime<Utc>> {
    let secs = micros.div_euclid(1_000_000);
    let nanos = (micros.rem_euclid(1_000_000) * 1_000) as u32;
    DateTime::<Utc>::from_timestamp(secs, nanos).ok_or(anyhow!("Timestamp out of range: {}", micros))
}

#[derive(FromRow)]
struct IssueRow {
    id: Uuid,
    title: String,
    description: String,
    customer_name: String,
    customer_email: String,
    priority: String,
    status: String,
    assigned_to: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<IssueRow> for Issue {
    type Error = anyhow::Error;

    fn try_from(row: IssueRow) -> anyhow::Result<Self> {
        Ok(Issue {
            id: row.id,
            title: row.title,
            description: row.description,
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            priority: row.priority.parse()?,
            status: row.status.parse()?,
            assigned_to: row.assigned_to,
            created_at: from_micros(row.created_at)?,
            updated_at: from_micros(row.updated_at)?,
        })
    }
}

#[derive(FromRow)]
struct CommentRow {
    id: Uuid,
    issue_id: Uuid,
    author_name: String,
    content: String,
    is_internal: bool,
    created_at: i64,
}

impl TryFrom<CommentRow> for Comment {
    type Error = anyhow::Error;

    fn try_from(row: CommentRow) -> anyhow::Result<Self> {
        Ok(Comment {
            id: row.id,
            issue_id: row.issue_id,
            author_name: row.author_name,
            content: row.content,
            is_internal: row.is_internal,
            created_at: from_micros(row.created_at)?,
        })
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password: row.password,
        }
    }
}

fn issues_from_rows(rows: Vec<IssueRow>) -> error::Result<Vec<Issue>> {
    Ok(rows
        .into_iter()
        .map(Issue::try_from)
        .collect::<anyhow::Result<_>>()?)
}

impl SqlRepository {
    async fn write_issue(&self, issue: &Issue) -> error::Result<()> {
        sqlx::query(
            "UPDATE issues SET title = ?, description = ?, customer_name = ?, \
             customer_email = ?, priority = ?, status = ?, assigned_to = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&issue.title)
        .bind(&issue.description)
        .bind(&issue.customer_name)
        .bind(&issue.customer_email)
        .bind(issue.priority.as_str())
        .bind(issue.status.as_str())
        .bind(&issue.assigned_to)
        .bind(to_micros(issue.updated_at))
        .bind(issue.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl IssueRepository for SqlRepository {
    async fn create_issue(&self, issue: NewIssue) -> error::Result<Issue> {
        let issue = Issue::new(issue, self.clock.now());

        let statement = format!(
            "INSERT INTO issues ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            ISSUE_COLUMNS
        );
        sqlx::query(&statement)
            .bind(issue.id)
            .bind(&issue.title)
            .bind(&issue.description)
            .bind(&issue.customer_name)
            .bind(&issue.customer_email)
            .bind(issue.priority.as_str())
            .bind(issue.status.as_str())
            .bind(&issue.assigned_to)
            .bind(to_micros(issue.created_at))
            .bind(to_micros(issue.updated_at))
            .execute(&self.pool)
            .await?;

        Ok(issue)
    }

    async fn get_issue(&self, id: Uuid) -> error::Result<Option<Issue>> {
        let statement = format!("SELECT {} FROM issues WHERE id = ?", ISSUE_COLUMNS);
        let row = sqlx::query_as::<_, IssueRow>(&statement)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Issue::try_from).transpose()?)
    }

    async fn get_all_issues(&self) -> error::Result<Vec<Issue>> {
        let statement = format!(
            "SELECT {} FROM issues ORDER BY created_at DESC, rowid DESC",
            ISSUE_COLUMNS
        );
        let rows = sqlx::query_as::<_, IssueRow>(&statement)
            .fetch_all(&self.pool)
            .await?;
        issues_from_rows(rows)
    }

    async fn get_issues_by_customer_email(&self, email: &str) -> error::Result<Vec<Issue>> {
        let statement = format!(
            "SELECT {} FROM issues WHERE customer_email = ? \
             ORDER BY created_at DESC, rowid DESC",
            ISSUE_COLUMNS
        );
        let rows = sqlx::query_as::<_, IssueRow>(&statement)
            .bind(email)
            .fetch_all(&self.pool)
            .await?;
        issues_from_rows(rows)
    }

    async fn update_issue(&self, id: Uuid, change: IssueChange) -> error::Result<Option<Issue>> {
        let Some(mut issue) = self.get_issue(id).await? else {
            return Ok(None);
        };
        issue.apply(change, self.clock.now());
        self.write_issue(&issue).await?;
        Ok(Some(issue))
    }

    async fn get_comments_by_issue_id(&self, issue_id: Uuid) -> error::Result<Vec<Comment>> {
        let statement = format!(
            "SELECT {} FROM comments WHERE issue_id = ? \
             ORDER BY created_at ASC, rowid ASC",
            COMMENT_COLUMNS
        );
        let rows = sqlx::query_as::<_, CommentRow>(&statement)
            .bind(issue_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(Comment::try_from)
            .collect::<anyhow::Result<_>>()?)
    }

    async fn create_comment(&self, comment: NewComment) -> error::Result<Comment> {
        let comment = Comment::new(comment, self.clock.now());

        let statement = format!(
            "INSERT INTO comments ({}) VALUES (?, ?, ?, ?, ?, ?)",
            COMMENT_COLUMNS
        );
        sqlx::query(&statement)
            .bind(comment.id)
            .bind(comment.issue_id)
            .bind(&comment.author_name)
            .bind(&comment.content)
            .bind(comment.is_internal)
            .bind(to_micros(comment.created_at))
            .execute(&self.pool)
            .await?;

        Ok(comment)
    }

    async fn get_issue_stats(&self) -> error::Result<IssueStats> {
        let today = LocalDay::containing(self.clock.now());

        let (open_issues, in_progress, resolved_today, urgent): (i64, i64, i64, i64) =
            sqlx::query_as(
                "SELECT \
                    COALESCE(SUM(status = 'open'), 0), \
                    COALESCE(SUM(status = 'in-progress'), 0), \
                    COALESCE(SUM(status = 'resolved' AND updated_at >= ? AND updated_at < ?), 0), \
                    COALESCE(SUM(priority = 'urgent'), 0) \
                 FROM issues",
            )
            .bind(to_micros(today.start))
            .bind(to_micros(today.end))
            .fetch_one(&self.pool)
            .await?;

        Ok(IssueStats {
            open_issues: u64::try_from(open_issues)?,
            in_progress: u64::try_from(in_progress)?,
            resolved_today: u64::try_from(resolved_today)?,
            urgent: u64::try_from(urgent)?,
        })
    }

    async fn get_user(&self, id: Uuid) -> error::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, username, password FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn get_user_by_username(&self, username: &str) -> error::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn create_user(&self, user: NewUser) -> error::Result<User> {
        let user = User::new(user);

        sqlx::query("INSERT INTO users (id, username, password) VALUES (?, ?, ?)")
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.password)
            .execute(&self.pool)
            .await
            .map_err(|err| match err {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    anyhow!("Username {} is already taken", user.username).code(409)
                }
                err => ServiceError::from(err),
            })?;

        Ok(user)
    }
}
