use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::core::goal::{Category, Goal, Priority, Reminder, SubGoal, WorkSession};
use crate::core::instant;

/// A goal record as it may appear in the persisted store: either the current
/// schema or a legacy shape missing fields introduced later.
///
/// Discrimination happens at deserialization time: a record lacking any of
/// `category`, `subGoals`, `reminder`, `priority`, or `workSessions` cannot
/// parse as [`Goal`] and falls through to [`LegacyGoal`], so field presence
/// is decided by the type system rather than runtime checks.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawGoal {
    Current(Goal),
    Legacy(LegacyGoal),
}

/// Pre-migration goal shape. Only `id`, `title`, and `deadlineISO` are
/// required; everything else is filled with defaults during migration.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyGoal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(rename = "deadlineISO", deserialize_with = "instant::deserialize")]
    pub deadline: NaiveDateTime,
    #[serde(
        rename = "completedAtISO",
        default,
        deserialize_with = "instant::deserialize_opt"
    )]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(rename = "subGoals", default)]
    pub sub_goals: Option<Vec<SubGoal>>,
    #[serde(default)]
    pub reminder: Option<Reminder>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(rename = "estimatedHours", default)]
    pub estimated_hours: Option<f64>,
    #[serde(rename = "actualHours", default)]
    pub actual_hours: Option<f64>,
    #[serde(rename = "workSessions", default)]
    pub work_sessions: Option<Vec<WorkSession>>,
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "instant::deserialize_opt"
    )]
    pub created_at: Option<NaiveDateTime>,
}

pub fn needs_migration(raw: &RawGoal) -> bool {
    matches!(raw, RawGoal::Legacy(_))
}

/// Upgrade a raw record to the current schema. Current records pass through
/// verbatim, which is what makes migration idempotent; legacy records keep
/// every field they carry and get documented defaults for the rest.
pub fn migrate(raw: RawGoal, now: NaiveDateTime) -> Goal {
    match raw {
        RawGoal::Current(goal) => goal,
        RawGoal::Legacy(old) => {
            log::info!("migrating legacy goal record: {}", old.title);
            Goal {
                id: old.id,
                title: old.title,
                description: old.description,
                category: old.category.unwrap_or(Category::Personal),
                deadline: old.deadline,
                completed_at: old.completed_at,
                sub_goals: old.sub_goals.unwrap_or_default(),
                reminder: old.reminder.unwrap_or_default(),
                priority: old.priority.unwrap_or(Priority::Medium),
                tags: old.tags,
                estimated_hours: old.estimated_hours,
                actual_hours: old.actual_hours,
                work_sessions: old.work_sessions.unwrap_or_default(),
                created_at: Some(old.created_at.unwrap_or(now)),
            }
        }
    }
}

/// Migrate a whole persisted goal collection. Applied once per load, before
/// any engine consumes the data.
pub fn migrate_goals(raw: Vec<RawGoal>, now: NaiveDateTime) -> Vec<Goal> {
    raw.into_iter().map(|g| migrate(g, now)).collect()
}
