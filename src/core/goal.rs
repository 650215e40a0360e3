use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::instant;

/// Generate a fresh string id, unique within the process lifetime.
///
/// Ids are plain strings rather than `Uuid` values so that records created by
/// older installations (timestamp-based ids) round-trip untouched.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
    Health,
    Learning,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Health => "health",
            Self::Learning => "learning",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "work" => Some(Self::Work),
            "personal" => Some(Self::Personal),
            "health" => Some(Self::Health),
            "learning" => Some(Self::Learning),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderFrequency {
    None,
    Daily,
    Weekly,
    Custom,
}

/// Reminder settings carried on every goal. No component in this crate fires
/// reminders; the fields exist so a notification layer can be built on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub enabled: bool,
    pub frequency: ReminderFrequency,
    #[serde(
        rename = "customIntervalDays",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub custom_interval_days: Option<u32>,
    #[serde(
        rename = "lastNotifiedISO",
        default,
        deserialize_with = "instant::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_notified: Option<NaiveDateTime>,
}

impl Default for Reminder {
    fn default() -> Self {
        Self {
            enabled: false,
            frequency: ReminderFrequency::None,
            custom_interval_days: None,
            last_notified: None,
        }
    }
}

/// An atomic checklist item contributing to a goal's completion ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubGoal {
    pub id: String,
    pub title: String,
    pub completed: bool,
    #[serde(
        rename = "completedAtISO",
        default,
        deserialize_with = "instant::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<NaiveDateTime>,
}

impl SubGoal {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            completed: false,
            completed_at: None,
        }
    }
}

/// A logged quantity of hours spent on a goal on a given calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSession {
    pub id: String,
    pub date: NaiveDate,
    pub hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "createdAt", deserialize_with = "instant::deserialize")]
    pub created_at: NaiveDateTime,
}

impl WorkSession {
    pub fn new(hours: f64, description: Option<String>) -> Self {
        Self::new_at(hours, description, super::now())
    }

    pub fn new_at(hours: f64, description: Option<String>, now: NaiveDateTime) -> Self {
        Self {
            id: new_id(),
            date: now.date(),
            hours,
            description,
            created_at: now,
        }
    }
}

/// A user-defined objective with a deadline, optional sub-steps, and optional
/// effort tracking.
///
/// Invariant: a goal with `completed_at` set is complete regardless of
/// sub-goal state. Manual completion always wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: Category,
    #[serde(rename = "deadlineISO", deserialize_with = "instant::deserialize")]
    pub deadline: NaiveDateTime,
    /// `None` means pending. Serialized as an explicit `null` so restored
    /// goals keep the shape older installations wrote.
    #[serde(
        rename = "completedAtISO",
        default,
        deserialize_with = "instant::deserialize_opt"
    )]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(rename = "subGoals")]
    pub sub_goals: Vec<SubGoal>,
    pub reminder: Reminder,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(
        rename = "estimatedHours",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub estimated_hours: Option<f64>,
    /// Superseded by work-session aggregation; preserved for old records.
    #[serde(
        rename = "actualHours",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub actual_hours: Option<f64>,
    #[serde(rename = "workSessions")]
    pub work_sessions: Vec<WorkSession>,
    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "instant::deserialize_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<NaiveDateTime>,
}

impl Goal {
    pub fn new(title: impl Into<String>, deadline: NaiveDateTime) -> Self {
        Self::new_at(title, deadline, super::now())
    }

    pub fn new_at(title: impl Into<String>, deadline: NaiveDateTime, now: NaiveDateTime) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            description: None,
            category: Category::Personal,
            deadline,
            completed_at: None,
            sub_goals: Vec::new(),
            reminder: Reminder::default(),
            priority: Priority::Medium,
            tags: None,
            estimated_hours: None,
            actual_hours: None,
            work_sessions: Vec::new(),
            created_at: Some(now),
        }
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_deref()
            .is_some_and(|tags| tags.iter().any(|t| t == tag))
    }

    pub fn sub_goal(&self, id: &str) -> Option<&SubGoal> {
        self.sub_goals.iter().find(|s| s.id == id)
    }
}
