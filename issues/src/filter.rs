use common::entities::issue::{Issue, Priority, Status};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

/// Team dashboard filter. Every criterion that is present must match.
#[derive(Debug, Default, Clone, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IssueFilter {
    /// Case-insensitive text searched in title, description, customer name and email
    pub search: Option<String>,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
}

impl IssueFilter {
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(str::to_lowercase)
    }

    pub fn is_empty(&self) -> bool {
        self.needle().is_none() && self.status.is_none() && self.priority.is_none()
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        if let Some(status) = self.status {
            if issue.status != status {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if issue.priority != priority {
                return false;
            }
        }
        match self.needle() {
            Some(needle) => [
                &issue.title,
                &issue.description,
                &issue.customer_name,
                &issue.customer_email,
            ]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle)),
            None => true,
        }
    }

    pub fn apply(&self, issues: Vec<Issue>) -> Vec<Issue> {
        if self.is_empty() {
            return issues;
        }
        issues.into_iter().filter(|issue| self.matches(issue)).collect()
    }
}
