use anyhow::anyhow;
use common::{
    context::Context,
    entities::comment::{Comment, NewComment},
    error::{self, AddCode},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::validation;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    pub author_name: String,
    pub content: String,
    pub is_internal: Option<bool>,
}

pub struct CommentService {
    context: Context,
}

impl CommentService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn create(&self, issue_id: &str, comment: CreateComment) -> error::Result<Comment> {
        let issue_id = validation::issue_id(issue_id)?;
        validation::require("Author name", &comment.author_name)?;
        validation::require("Content", &comment.content)?;

        let issues = self.context.try_get_repository()?;

        // not transactional: issues are never deleted
        if issues.get_issue(issue_id).await?.is_none() {
            return Err(anyhow!("Issue not found").code(404));
        }

        let comment = issues
            .create_comment(NewComment {
                issue_id,
                author_name: comment.author_name,
                content: comment.content,
                is_internal: comment.is_internal,
            })
            .await?;

        log::info!(
            "Comment {} added to issue {} (internal: {})",
            comment.id,
            issue_id,
            comment.is_internal
        );
        Ok(comment)
    }
}
