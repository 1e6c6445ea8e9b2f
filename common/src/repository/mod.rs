pub mod memory_repository;
pub mod migrations;
pub mod sql_repository;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, DurationRound, Utc};
use uuid::Uuid;

use crate::{
    entities::{
        comment::{Comment, NewComment},
        issue::{Issue, IssueChange, NewIssue},
        stats::IssueStats,
        user::{NewUser, User},
    },
    error,
};

pub use memory_repository::MemoryRepository;
pub use sql_repository::SqlRepository;

/// Storage contract shared by every backend. Implementations must be
/// observably identical: same defaults, same orderings, same counts.
#[async_trait]
pub trait IssueRepository: Send + Sync {
    async fn create_issue(&self, issue: NewIssue) -> error::Result<Issue>;
    async fn get_issue(&self, id: Uuid) -> error::Result<Option<Issue>>;
    /// Newest first.
    async fn get_all_issues(&self) -> error::Result<Vec<Issue>>;
    /// Exact match on the email string, newest first.
    async fn get_issues_by_customer_email(&self, email: &str) -> error::Result<Vec<Issue>>;
    async fn update_issue(&self, id: Uuid, change: IssueChange) -> error::Result<Option<Issue>>;

    /// Oldest first. Callers check that the issue exists.
    async fn get_comments_by_issue_id(&self, issue_id: Uuid) -> error::Result<Vec<Comment>>;
    async fn create_comment(&self, comment: NewComment) -> error::Result<Comment>;

    async fn get_issue_stats(&self) -> error::Result<IssueStats>;

    async fn get_user(&self, id: Uuid) -> error::Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> error::Result<Option<User>>;
    async fn create_user(&self, user: NewUser) -> error::Result<User>;
}

pub type RepositoryObject = Arc<dyn IssueRepository>;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock truncated to microseconds, the precision the SQL backend keeps.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        micros(Utc::now())
    }
}

pub(crate) fn micros(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .duration_trunc(chrono::Duration::microseconds(1))
        .unwrap_or(instant)
}
