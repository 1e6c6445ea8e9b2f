use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::anyhow;
use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    entities::{
        comment::{Comment, NewComment},
        issue::{Issue, IssueChange, NewIssue},
        stats::{IssueStats, LocalDay},
        user::{NewUser, User},
    },
    error::{self, AddCode},
};

use super::{Clock, IssueRepository, SystemClock};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    issues: HashMap<Uuid, Issue>,
    comments: HashMap<Uuid, Comment>,
    // insertion order, breaks ties between equal timestamps
    issue_order: Vec<Uuid>,
    comment_order: Vec<Uuid>,
}

impl Tables {
    /// Issues, most recently inserted first.
    fn issues_newest_first(&self) -> impl Iterator<Item = &Issue> {
        self.issue_order
            .iter()
            .rev()
            .filter_map(|id| self.issues.get(id))
    }
}

/// Process-local backend. Nothing survives a restart.
pub struct MemoryRepository {
    db: Mutex<Tables>,
    clock: Arc<dyn Clock>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            db: Mutex::new(Tables::default()),
            clock,
        }
    }

    fn lock(&self) -> error::Result<MutexGuard<'_, Tables>> {
        self.db
            .lock()
            .map_err(|_| anyhow!("Memory repository lock poisoned").code(500))
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

// sort_by is stable, so equal timestamps keep the incoming order
fn newest_first(mut issues: Vec<Issue>) -> Vec<Issue> {
    issues.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    issues
}

#[async_trait]
impl IssueRepository for MemoryRepository {
    async fn create_issue(&self, issue: NewIssue) -> error::Result<Issue> {
        let issue = Issue::new(issue, self.clock.now());
        let mut db = self.lock()?;
        db.issue_order.push(issue.id);
        db.issues.insert(issue.id, issue.clone());
        Ok(issue)
    }

    async fn get_issue(&self, id: Uuid) -> error::Result<Option<Issue>> {
        Ok(self.lock()?.issues.get(&id).cloned())
    }

    async fn get_all_issues(&self) -> error::Result<Vec<Issue>> {
        let issues = self.lock()?.issues_newest_first().cloned().collect();
        Ok(newest_first(issues))
    }

    async fn get_issues_by_customer_email(&self, email: &str) -> error::Result<Vec<Issue>> {
        let issues = self
            .lock()?
            .issues_newest_first()
            .filter(|issue| issue.customer_email == email)
            .cloned()
            .collect();
        Ok(newest_first(issues))
    }

    async fn update_issue(&self, id: Uuid, change: IssueChange) -> error::Result<Option<Issue>> {
        let now = self.clock.now();
        let mut db = self.lock()?;
        let Some(issue) = db.issues.get_mut(&id) else {
            return Ok(None);
        };
        issue.apply(change, now);
        Ok(Some(issue.clone()))
    }

    async fn get_comments_by_issue_id(&self, issue_id: Uuid) -> error::Result<Vec<Comment>> {
        let db = self.lock()?;
        let mut comments: Vec<Comment> = db
            .comment_order
            .iter()
            .filter_map(|id| db.comments.get(id))
            .filter(|comment| comment.issue_id == issue_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments)
    }

    async fn create_comment(&self, comment: NewComment) -> error::Result<Comment> {
        let comment = Comment::new(comment, self.clock.now());
        let mut db = self.lock()?;
        db.comment_order.push(comment.id);
        db.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn get_issue_stats(&self) -> error::Result<IssueStats> {
        let today = LocalDay::containing(self.clock.now());
        Ok(IssueStats::collect(self.lock()?.issues.values(), &today))
    }

    async fn get_user(&self, id: Uuid) -> error::Result<Option<User>> {
        Ok(self.lock()?.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> error::Result<Option<User>> {
        Ok(self
            .lock()?
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> error::Result<User> {
        let mut db = self.lock()?;
        if db.users.values().any(|known| known.username == user.username) {
            return Err(anyhow!("Username {} is already taken", user.username).code(409));
        }
        let user = User::new(user);
        db.users.insert(user.id, user.clone());
        Ok(user)
    }
}
