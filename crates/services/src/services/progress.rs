//! Pure aggregation and filtering over a project's task collection.
//!
//! Both functions are synchronous, deterministic and side-effect free: they
//! take the most recently fetched task collection and derive values from it
//! without touching the database.

use db::models::task::{TaskStatus, TaskWithUsers};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Per-status task counts for one project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
pub struct StatusCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl StatusCounts {
    pub fn count(tasks: &[TaskWithUsers]) -> Self {
        tasks.iter().fold(Self::default(), |mut acc, task| {
            match task.status {
                TaskStatus::Todo => acc.todo += 1,
                TaskStatus::InProgress => acc.in_progress += 1,
                TaskStatus::Done => acc.done += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.todo + self.in_progress + self.done
    }

    pub fn of(&self, status: &TaskStatus) -> usize {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Done => self.done,
        }
    }

    /// Share of `status` in percent, rounded half-up. A project without
    /// tasks reports 0 for every status rather than dividing by zero.
    pub fn percentage(&self, status: &TaskStatus) -> u8 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        ((self.of(status) as f64 * 100.0) / total as f64).round() as u8
    }
}

/// Rounded per-status percentages. Rounding is independent per status, so
/// the three values may sum to slightly more or less than 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
pub struct StatusPercentages {
    pub todo: u8,
    pub in_progress: u8,
    pub done: u8,
}

/// Aggregated progress view of a project, as consumed by the sidebar and
/// counter badges.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ProjectProgress {
    pub total: usize,
    pub counts: StatusCounts,
    pub percentages: StatusPercentages,
    /// Tasks assigned to the requesting user, when an identity was given.
    pub assigned: Option<usize>,
}

impl ProjectProgress {
    pub fn compute(tasks: &[TaskWithUsers], current_user: Option<&str>) -> Self {
        let counts = StatusCounts::count(tasks);
        let percentages = StatusPercentages {
            todo: counts.percentage(&TaskStatus::Todo),
            in_progress: counts.percentage(&TaskStatus::InProgress),
            done: counts.percentage(&TaskStatus::Done),
        };
        Self {
            total: tasks.len(),
            counts,
            percentages,
            assigned: current_user.map(|email| assigned_count(tasks, email)),
        }
    }
}

/// Number of tasks assigned to `email`.
pub fn assigned_count(tasks: &[TaskWithUsers], email: &str) -> usize {
    tasks
        .iter()
        .filter(|t| t.assignee.as_ref().is_some_and(|a| a.email == email))
        .count()
}

/// Predicate pair for the task list: an optional status to match and an
/// assigned-to-me toggle.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assigned_only: bool,
}

impl TaskFilter {
    pub fn matches(&self, task: &TaskWithUsers, current_user: Option<&str>) -> bool {
        let status_ok = match &self.status {
            Some(wanted) => task.status == *wanted,
            None => true,
        };
        // An absent identity never matches an assignee; with assigned_only
        // set and no known user, nothing passes this clause.
        let assigned_ok = !self.assigned_only
            || match (current_user, task.assignee.as_ref()) {
                (Some(email), Some(assignee)) => assignee.email == email,
                _ => false,
            };
        status_ok && assigned_ok
    }

    /// Stable filter: survivors keep their relative order, the input is
    /// left untouched.
    pub fn apply(&self, tasks: &[TaskWithUsers], current_user: Option<&str>) -> Vec<TaskWithUsers> {
        tasks
            .iter()
            .filter(|t| self.matches(t, current_user))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use db::models::{task::Task, user::UserRef};
    use uuid::Uuid;

    use super::*;

    fn task(status: TaskStatus, assignee_email: Option<&str>) -> TaskWithUsers {
        let now = Utc::now();
        let assignee = assignee_email.map(|email| UserRef {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: None,
        });
        TaskWithUsers {
            task: Task {
                id: Uuid::new_v4(),
                project_id: Uuid::new_v4(),
                name: "task".to_string(),
                description: None,
                solution: None,
                status,
                assignee_id: assignee.as_ref().map(|a| a.id),
                created_by: None,
                due_date: None,
                created_at: now,
                updated_at: now,
            },
            assignee,
            author: None,
        }
    }

    #[test]
    fn test_counts_and_percentages() {
        let tasks = vec![
            task(TaskStatus::Todo, None),
            task(TaskStatus::Done, None),
            task(TaskStatus::Done, None),
        ];

        let counts = StatusCounts::count(&tasks);
        assert_eq!(counts.todo, 1);
        assert_eq!(counts.in_progress, 0);
        assert_eq!(counts.done, 2);
        assert_eq!(counts.total(), 3);

        assert_eq!(counts.percentage(&TaskStatus::Todo), 33);
        assert_eq!(counts.percentage(&TaskStatus::InProgress), 0);
        assert_eq!(counts.percentage(&TaskStatus::Done), 67);
    }

    #[test]
    fn test_empty_input_is_all_zeros() {
        let counts = StatusCounts::count(&[]);
        assert_eq!(counts, StatusCounts::default());
        assert_eq!(counts.total(), 0);
        for status in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done] {
            assert_eq!(counts.percentage(&status), 0);
        }

        let progress = ProjectProgress::compute(&[], Some("me@example.com"));
        assert_eq!(progress.total, 0);
        assert_eq!(progress.percentages, StatusPercentages::default());
        assert_eq!(progress.assigned, Some(0));
    }

    #[test]
    fn test_counts_sum_to_total() {
        let tasks = vec![
            task(TaskStatus::Todo, None),
            task(TaskStatus::InProgress, None),
            task(TaskStatus::InProgress, None),
            task(TaskStatus::Done, None),
            task(TaskStatus::Todo, None),
            task(TaskStatus::Done, None),
            task(TaskStatus::Todo, None),
        ];
        let counts = StatusCounts::count(&tasks);
        assert_eq!(counts.total(), tasks.len());
    }

    #[test]
    fn test_percentages_sum_near_100() {
        // 3/7, 2/7, 2/7 rounds to 43 + 29 + 29 = 101; independent rounding
        // may drift by up to 2 from 100.
        let tasks = vec![
            task(TaskStatus::Todo, None),
            task(TaskStatus::Todo, None),
            task(TaskStatus::Todo, None),
            task(TaskStatus::InProgress, None),
            task(TaskStatus::InProgress, None),
            task(TaskStatus::Done, None),
            task(TaskStatus::Done, None),
        ];
        let counts = StatusCounts::count(&tasks);
        let sum = counts.percentage(&TaskStatus::Todo) as i32
            + counts.percentage(&TaskStatus::InProgress) as i32
            + counts.percentage(&TaskStatus::Done) as i32;
        assert!((sum - 100).abs() <= 2, "sum was {sum}");
    }

    #[test]
    fn test_rounding_is_half_up() {
        // 1/8 = 12.5% rounds up to 13.
        let mut tasks = vec![task(TaskStatus::Done, None)];
        tasks.extend(std::iter::repeat_with(|| task(TaskStatus::Todo, None)).take(7));
        let counts = StatusCounts::count(&tasks);
        assert_eq!(counts.percentage(&TaskStatus::Done), 13);
    }

    #[test]
    fn test_status_filter() {
        let tasks = vec![
            task(TaskStatus::Todo, None),
            task(TaskStatus::Done, None),
            task(TaskStatus::InProgress, None),
        ];
        let filter = TaskFilter {
            status: Some(TaskStatus::Done),
            assigned_only: false,
        };
        let filtered = filter.apply(&tasks, None);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].status, TaskStatus::Done);
    }

    #[test]
    fn test_assigned_only_without_identity_matches_nothing() {
        let tasks = vec![
            task(TaskStatus::Todo, Some("a@example.com")),
            task(TaskStatus::Done, Some("b@example.com")),
        ];
        let filter = TaskFilter {
            status: None,
            assigned_only: true,
        };
        assert!(filter.apply(&tasks, None).is_empty());
    }

    #[test]
    fn test_assigned_only_picks_current_user() {
        let tasks = vec![
            task(TaskStatus::Todo, Some("a@example.com")),
            task(TaskStatus::Todo, None),
            task(TaskStatus::Done, Some("b@example.com")),
            task(TaskStatus::InProgress, Some("a@example.com")),
        ];
        let filter = TaskFilter {
            status: None,
            assigned_only: true,
        };
        let filtered = filter.apply(&tasks, Some("a@example.com"));
        assert_eq!(filtered.len(), 2);
        assert!(
            filtered
                .iter()
                .all(|t| t.assignee.as_ref().unwrap().email == "a@example.com")
        );
    }

    #[test]
    fn test_filter_combines_both_predicates() {
        let tasks = vec![
            task(TaskStatus::Done, Some("a@example.com")),
            task(TaskStatus::Done, Some("b@example.com")),
            task(TaskStatus::Todo, Some("a@example.com")),
        ];
        let filter = TaskFilter {
            status: Some(TaskStatus::Done),
            assigned_only: true,
        };
        let filtered = filter.apply(&tasks, Some("a@example.com"));
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_filter_preserves_order_and_is_idempotent() {
        let tasks = vec![
            task(TaskStatus::Done, None),
            task(TaskStatus::Todo, None),
            task(TaskStatus::Done, None),
            task(TaskStatus::Done, None),
        ];
        let filter = TaskFilter {
            status: Some(TaskStatus::Done),
            assigned_only: false,
        };

        let once = filter.apply(&tasks, None);
        let expected: Vec<Uuid> = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Done)
            .map(|t| t.id)
            .collect();
        let got: Vec<Uuid> = once.iter().map(|t| t.id).collect();
        assert_eq!(got, expected);

        let twice = filter.apply(&once, None);
        let again: Vec<Uuid> = twice.iter().map(|t| t.id).collect();
        assert_eq!(again, got);
    }

    #[test]
    fn test_assigned_count() {
        let tasks = vec![
            task(TaskStatus::Todo, Some("a@example.com")),
            task(TaskStatus::Done, Some("a@example.com")),
            task(TaskStatus::Done, Some("b@example.com")),
            task(TaskStatus::Todo, None),
        ];
        assert_eq!(assigned_count(&tasks, "a@example.com"), 2);
        assert_eq!(assigned_count(&tasks, "nobody@example.com"), 0);
    }
}
