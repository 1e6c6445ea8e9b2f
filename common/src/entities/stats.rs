use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::issue::{Issue, Priority, Status};

/// Dashboard counters over the whole issue set.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssueStats {
    pub open_issues: u64,
    pub in_progress: u64,
    /// Resolved issues whose last update falls on the current local day.
    pub resolved_today: u64,
    /// Urgent issues in any status.
    pub urgent: u64,
}

impl IssueStats {
    pub fn collect<'a>(issues: impl IntoIterator<Item = &'a Issue>, today: &LocalDay) -> Self {
        issues
            .into_iter()
            .fold(IssueStats::default(), |mut stats, issue| {
                match issue.status {
                    Status::Open => stats.open_issues += 1,
                    Status::InProgress => stats.in_progress += 1,
                    Status::Resolved if today.contains(issue.updated_at) => {
                        stats.resolved_today += 1
                    }
                    Status::Resolved => {}
                }
                if issue.priority == Priority::Urgent {
                    stats.urgent += 1;
                }
                stats
            })
    }
}

/// Half-open UTC range `[start, end)` covering one calendar day in the
/// server's local time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalDay {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl LocalDay {
    pub fn containing(now: DateTime<Utc>) -> Self {
        let today = now.with_timezone(&Local).date_naive();
        let start = local_midnight(today).unwrap_or(now);
        let end = today
            .succ_opt()
            .and_then(local_midnight)
            .unwrap_or(start + Duration::days(1));
        LocalDay { start, end }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }
}

fn local_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Local
        .from_local_datetime(&midnight)
        .earliest()
        // midnight swallowed by a DST jump
        .or_else(|| Local.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|local| local.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn issue(status: Status, priority: Priority, updated_at: DateTime<Utc>) -> Issue {
        Issue {
            id: Uuid::new_v4(),
            title: "t".to_string(),
            description: "d".to_string(),
            customer_name: "c".to_string(),
            customer_email: "c@example.com".to_string(),
            priority,
            status,
            assigned_to: None,
            created_at: updated_at - Duration::days(3),
            updated_at,
        }
    }

    fn local_noon(date: NaiveDate) -> DateTime<Utc> {
        Local
            .from_local_datetime(&date.and_hms_opt(12, 0, 0).unwrap())
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_dashboard_counts() {
        let today = Local::now().date_naive();
        let now = local_noon(today);
        let yesterday = local_noon(today.pred_opt().unwrap());

        let issues = vec![
            issue(Status::Open, Priority::Medium, now),
            issue(Status::InProgress, Priority::High, now),
            issue(Status::Resolved, Priority::Low, now),
            issue(Status::Resolved, Priority::Low, yesterday),
            issue(Status::Open, Priority::Urgent, now),
        ];

        let stats = IssueStats::collect(&issues, &LocalDay::containing(now));
        assert_eq!(
            stats,
            IssueStats {
                open_issues: 2,
                in_progress: 1,
                resolved_today: 1,
                urgent: 1,
            }
        );
    }

    #[test]
    fn test_urgent_counts_every_status() {
        let now = Utc::now();
        let issues = vec![
            issue(Status::Resolved, Priority::Urgent, now - Duration::days(30)),
            issue(Status::InProgress, Priority::Urgent, now),
        ];
        let stats = IssueStats::collect(&issues, &LocalDay::containing(now));
        assert_eq!(stats.urgent, 2);
        assert_eq!(stats.resolved_today, 0);
    }

    #[test]
    fn test_local_day_is_half_open() {
        let day = LocalDay::containing(Utc::now());
        assert!(day.contains(day.start));
        assert!(!day.contains(day.end));
        assert!(day.start < day.end);
    }

    #[test]
    fn test_stats_wire_names() {
        let value = serde_json::to_value(IssueStats::default()).unwrap();
        for key in ["openIssues", "inProgress", "resolvedToday", "urgent"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }
}
