use anyhow::anyhow;
use common::{
    context::Context,
    entities::{
        issue::{Issue, IssueChange, IssueDetails, NewIssue, Priority, Status},
        stats::IssueStats,
    },
    error::{self, AddCode},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{filter::IssueFilter, validation};

/// Customer submission. A `status` in the body is ignored: new issues are
/// always open.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssue {
    pub title: String,
    pub description: String,
    pub customer_name: String,
    pub customer_email: String,
    pub priority: Option<Priority>,
}

impl CreateIssue {
    fn validate(&self) -> error::Result<()> {
        validation::require("Title", &self.title)?;
        validation::require("Description", &self.description)?;
        validation::require("Customer name", &self.customer_name)?;
        validation::email(&self.customer_email)
    }
}

fn validate_change(change: &mut IssueChange) -> error::Result<()> {
    if let Some(title) = &change.title {
        validation::require("Title", title)?;
    }
    if let Some(description) = &change.description {
        validation::require("Description", description)?;
    }
    if let Some(customer_name) = &change.customer_name {
        validation::require("Customer name", customer_name)?;
    }
    if let Some(customer_email) = &change.customer_email {
        validation::email(customer_email)?;
    }
    // the dashboard sends "" for "Unassigned"
    if let Some(Some(assignee)) = &change.assigned_to {
        if assignee.trim().is_empty() {
            change.assigned_to = Some(None);
        }
    }
    Ok(())
}

pub struct IssueService {
    context: Context,
}

impl IssueService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn list(&self, filter: IssueFilter) -> error::Result<Vec<Issue>> {
        let issues = self.context.try_get_repository()?;
        Ok(filter.apply(issues.get_all_issues().await?))
    }

    pub async fn by_customer(&self, email: &str) -> error::Result<Vec<Issue>> {
        let issues = self.context.try_get_repository()?;
        issues.get_issues_by_customer_email(email).await
    }

    pub async fn find(&self, id: &str) -> error::Result<IssueDetails> {
        let id = validation::issue_id(id)?;
        let issues = self.context.try_get_repository()?;

        let Some(issue) = issues.get_issue(id).await? else {
            return Err(anyhow!("Issue not found").code(404));
        };
        let comments = issues.get_comments_by_issue_id(id).await?;

        Ok(IssueDetails { issue, comments })
    }

    pub async fn create(&self, issue: CreateIssue) -> error::Result<Issue> {
        issue.validate()?;
        let issues = self.context.try_get_repository()?;

        let issue = issues
            .create_issue(NewIssue {
                title: issue.title,
                description: issue.description,
                customer_name: issue.customer_name,
                customer_email: issue.customer_email,
                priority: issue.priority,
                status: Some(Status::Open),
                assigned_to: None,
            })
            .await?;

        log::info!("Issue {} created ({} priority)", issue.id, issue.priority);
        Ok(issue)
    }

    pub async fn change(&self, id: &str, mut change: IssueChange) -> error::Result<Issue> {
        let id = validation::issue_id(id)?;
        validate_change(&mut change)?;
        let issues = self.context.try_get_repository()?;

        let Some(issue) = issues.update_issue(id, change).await? else {
            return Err(anyhow!("Issue not found").code(404));
        };

        log::info!(
            "Issue {} updated: status {}, priority {}, assignee {:?}",
            issue.id,
            issue.status,
            issue.priority,
            issue.assigned_to
        );
        Ok(issue)
    }

    pub async fn stats(&self) -> error::Result<IssueStats> {
        let issues = self.context.try_get_repository()?;
        issues.get_issue_stats().await
    }
}
