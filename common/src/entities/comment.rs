use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub author_name: String,
    pub content: String,
    /// Internal comments are only shown to the support team.
    pub is_internal: bool,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(new: NewComment, now: DateTime<Utc>) -> Self {
        Comment {
            id: Uuid::new_v4(),
            issue_id: new.issue_id,
            author_name: new.author_name,
            content: new.content,
            is_internal: new.is_internal.unwrap_or(false),
            created_at: now,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub issue_id: Uuid,
    pub author_name: String,
    pub content: String,
    pub is_internal: Option<bool>,
}
