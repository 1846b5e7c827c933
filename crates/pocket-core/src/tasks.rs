use std::{fmt, str::FromStr};

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TaskError;

/// Closed set of task categories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Work,
    Personal,
    Shopping,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Work, Category::Personal, Category::Shopping];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Personal => "personal",
            Category::Shopping => "shopping",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Category {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(Category::Work),
            "personal" => Ok(Category::Personal),
            "shopping" => Ok(Category::Shopping),
            other => Err(TaskError::Validation {
                reason: format!("unknown category `{other}`"),
            }),
        }
    }
}

/// Category filter for list views: one category or everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn admits(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => *wanted == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.pad("all"),
            CategoryFilter::Only(category) => category.fmt(f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

/// Opaque task identifier, stable for the task's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Task entity. Field names follow the persisted record layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub category: Category,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
}

impl Task {
    /// Builds a fresh, incomplete task. Callers are expected to have trimmed
    /// and validated `text` already.
    pub fn new(id: TaskId, text: String, category: Category, created_at: i64) -> Self {
        Self {
            id,
            text,
            completed: false,
            category,
            created_at,
        }
    }

    /// Creation time for display. Out-of-range timestamps fall back to the epoch.
    pub fn created_at_utc(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.created_at)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Trims user input and rejects text that is empty afterwards.
pub fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_categories() {
        for category in Category::ALL {
            let parsed: Category = category.as_str().parse().expect("parse");
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn rejects_unknown_category() {
        let err = "errands".parse::<Category>().expect_err("should reject");
        assert!(matches!(err, TaskError::Validation { .. }));
        // Matching is exact; the persisted form is lowercase.
        assert!("Work".parse::<Category>().is_err());
    }

    #[test]
    fn filter_parses_all_and_single_category() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "shopping".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Shopping)
        );
        assert!("everything".parse::<CategoryFilter>().is_err());
    }

    #[test]
    fn filter_admits_matching_category_only() {
        let only_work = CategoryFilter::Only(Category::Work);
        assert!(only_work.admits(Category::Work));
        assert!(!only_work.admits(Category::Personal));
        assert!(CategoryFilter::All.admits(Category::Shopping));
    }

    #[test]
    fn serializes_with_persisted_field_names() {
        let task = Task::new(
            "1700000000000".into(),
            "buy milk".into(),
            Category::Shopping,
            1_700_000_000_000,
        );
        let value = serde_json::to_value(&task).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "id": "1700000000000",
                "text": "buy milk",
                "completed": false,
                "category": "shopping",
                "createdAt": 1_700_000_000_000i64,
            })
        );
    }

    #[test]
    fn deserialize_rejects_unknown_category() {
        let raw = r#"{"id":"a","text":"t","completed":false,"category":"errands","createdAt":1}"#;
        assert!(serde_json::from_str::<Task>(raw).is_err());
    }

    #[test]
    fn normalize_trims_and_rejects_blank() {
        assert_eq!(normalize_text("  call mom \n").as_deref(), Some("call mom"));
        assert_eq!(normalize_text(""), None);
        assert_eq!(normalize_text("   "), None);
    }

    #[test]
    fn created_at_converts_millis() {
        let task = Task::new("a".into(), "t".into(), Category::Work, 1_000);
        assert_eq!(task.created_at_utc().timestamp(), 1);
    }
}
