use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::comment::Comment;

#[derive(Debug, Display, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    #[display(fmt = "open")]
    Open,
    #[display(fmt = "in-progress")]
    InProgress,
    #[display(fmt = "resolved")]
    Resolved,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::InProgress => "in-progress",
            Status::Resolved => "resolved",
        }
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Status::Open),
            "in-progress" => Ok(Status::InProgress),
            "resolved" => Ok(Status::Resolved),
            _ => Err(anyhow::anyhow!("Unknown status: {}", s)),
        }
    }
}

#[derive(Debug, Display, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[display(fmt = "low")]
    Low,
    #[default]
    #[display(fmt = "medium")]
    Medium,
    #[display(fmt = "high")]
    High,
    #[display(fmt = "urgent")]
    Urgent,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "urgent" => Ok(Priority::Urgent),
            _ => Err(anyhow::anyhow!("Unknown priority: {}", s)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub customer_name: String,
    pub customer_email: String,
    pub priority: Priority,
    pub status: Status,
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    pub fn new(new: NewIssue, now: DateTime<Utc>) -> Self {
        Issue {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            customer_name: new.customer_name,
            customer_email: new.customer_email,
            priority: new.priority.unwrap_or_default(),
            status: new.status.unwrap_or_default(),
            assigned_to: new.assigned_to,
            created_at: now,
            updated_at: now,
        }
    }

    /// Merges `change` onto the issue and refreshes `updated_at`. The new
    /// timestamp never goes backwards, even if the clock does.
    pub fn apply(&mut self, change: IssueChange, now: DateTime<Utc>) {
        if let Some(title) = change.title {
            self.title = title;
        }
        if let Some(description) = change.description {
            self.description = description;
        }
        if let Some(customer_name) = change.customer_name {
            self.customer_name = customer_name;
        }
        if let Some(customer_email) = change.customer_email {
            self.customer_email = customer_email;
        }
        if let Some(priority) = change.priority {
            self.priority = priority;
        }
        if let Some(status) = change.status {
            self.status = status;
        }
        if let Some(assigned_to) = change.assigned_to {
            self.assigned_to = assigned_to;
        }

        self.updated_at = now.max(self.updated_at).max(self.created_at);
    }
}

/// Fields accepted by `IssueRepository::create_issue`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub customer_name: String,
    pub customer_email: String,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub assigned_to: Option<String>,
}

/// Partial update. `assigned_to` is doubly optional: a missing key keeps the
/// current assignee, an explicit `null` clears it.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueChange {
    pub title: Option<String>,
    pub description: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub assigned_to: Option<Option<String>>,
}

fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// An issue together with its comment thread, oldest comment first.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueDetails {
    #[serde(flatten)]
    pub issue: Issue,
    pub comments: Vec<Comment>,
}
