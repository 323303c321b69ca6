//! Task model: the schedulable unit of work plus its run-state.
//!
//! Times are whole hours. `deadline_offset` is relative to when the task was
//! created or last edited; the engine never turns it into an absolute time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskflowError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    #[default]
    Low,
    #[serde(alias = "med")]
    Medium,
    High,
}

impl Importance {
    pub const ALL: [Importance; 3] = [Importance::Low, Importance::Medium, Importance::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Importance::Low => "low",
            Importance::Medium => "medium",
            Importance::High => "high",
        }
    }
}

impl fmt::Display for Importance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Importance {
    type Err = TaskflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Importance::Low),
            "medium" | "med" => Ok(Importance::Medium),
            "high" => Ok(Importance::High),
            _ => Err(TaskflowError::validation(
                "importance",
                s,
                "expected one of low, medium, high",
            )),
        }
    }
}

/// Core task type.
///
/// Cloning yields a fully independent copy; the scheduler relies on this to
/// never touch caller-owned run-state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub name: String,

    /// Hours of processing the task needs in total.
    pub required_service_time: i64,

    /// Hours until due.
    pub deadline_offset: i64,

    pub importance: Importance,

    /// Hours still to run. Only Round Robin decrements this, on its own copy.
    pub remaining_service_time: i64,

    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn create(
        name: impl Into<String>,
        required_service_time: i64,
        deadline_offset: i64,
        importance: Importance,
    ) -> Result<Self> {
        TaskFields::new(name, required_service_time)
            .with_deadline_offset(deadline_offset)
            .with_importance(importance)
            .build()
    }

    /// Apply new field values, re-validating them.
    ///
    /// Run-state restarts: `remaining_service_time` goes back to the (new)
    /// required service time. The completion flag is kept.
    pub fn edited(&self, fields: TaskFields) -> Result<Self> {
        let mut task = fields.build()?;
        task.completed = self.completed;
        Ok(task)
    }

    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    pub fn is_pending(&self) -> bool {
        !self.completed
    }

    /// Check an already built task, e.g. one that arrived by deserialization.
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        validate_service_time(self.required_service_time)?;
        if !(0..=self.required_service_time).contains(&self.remaining_service_time) {
            return Err(TaskflowError::validation(
                "remaining_service_time",
                self.remaining_service_time,
                "must lie within 0..=required_service_time",
            ));
        }
        Ok(())
    }

    /// The editable fields of this task, e.g. to prefill an edit form.
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            name: self.name.clone(),
            required_service_time: self.required_service_time,
            deadline_offset: self.deadline_offset,
            importance: self.importance,
        }
    }
}

/// Caller-supplied values for creating or editing a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFields {
    pub name: String,
    pub required_service_time: i64,
    #[serde(default)]
    pub deadline_offset: i64,
    #[serde(default)]
    pub importance: Importance,
}

impl TaskFields {
    pub fn new(name: impl Into<String>, required_service_time: i64) -> Self {
        Self {
            name: name.into(),
            required_service_time,
            deadline_offset: 0,
            importance: Importance::Low,
        }
    }

    pub fn with_deadline_offset(mut self, hours: i64) -> Self {
        self.deadline_offset = hours;
        self
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }

    pub fn build(self) -> Result<Task> {
        validate_name(&self.name)?;
        validate_service_time(self.required_service_time)?;
        Ok(Task {
            name: self.name,
            required_service_time: self.required_service_time,
            deadline_offset: self.deadline_offset,
            importance: self.importance,
            remaining_service_time: self.required_service_time,
            completed: false,
        })
    }
}

/// Independent copies of `tasks`, safe to hand to code that mutates run-state.
pub fn snapshot(tasks: &[Task]) -> Vec<Task> {
    tasks.to_vec()
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TaskflowError::validation("name", name, "task name required"));
    }
    Ok(())
}

fn validate_service_time(hours: i64) -> Result<()> {
    if hours <= 0 {
        return Err(TaskflowError::validation(
            "required_service_time",
            hours,
            "must be a positive number of hours",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_initializes_run_state() {
        let t = Task::create("write report", 4, 16, Importance::High).unwrap();
        assert_eq!(t.remaining_service_time, 4);
        assert!(!t.completed);
        assert_eq!(t.importance, Importance::High);
    }

    #[test]
    fn create_rejects_empty_name() {
        let err = Task::create("   ", 3, 8, Importance::Low).unwrap_err();
        assert!(matches!(err, TaskflowError::Validation { field: "name", .. }));
    }

    #[test]
    fn create_rejects_non_positive_service_time() {
        for hours in [0, -2] {
            let err = Task::create("x", hours, 8, Importance::Low).unwrap_err();
            assert!(matches!(
                err,
                TaskflowError::Validation { field: "required_service_time", .. }
            ));
        }
    }

    #[test]
    fn importance_parses_known_levels_and_original_alias() {
        assert_eq!("low".parse::<Importance>().unwrap(), Importance::Low);
        assert_eq!("med".parse::<Importance>().unwrap(), Importance::Medium);
        assert_eq!("Medium".parse::<Importance>().unwrap(), Importance::Medium);
        assert_eq!(" HIGH ".parse::<Importance>().unwrap(), Importance::High);

        let err = "urgent".parse::<Importance>().unwrap_err();
        assert!(matches!(err, TaskflowError::Validation { field: "importance", .. }));
    }

    #[test]
    fn edit_resets_remaining_and_keeps_completion() {
        let mut t = Task::create("a", 6, 24, Importance::Low).unwrap();
        t.remaining_service_time = 1;
        t.mark_completed();

        let e = t
            .edited(TaskFields::new("a2", 5).with_importance(Importance::Medium))
            .unwrap();
        assert_eq!(e.name, "a2");
        assert_eq!(e.remaining_service_time, 5);
        assert!(e.completed);
        assert_eq!(e.importance, Importance::Medium);
    }

    #[test]
    fn fields_prefill_an_edit() {
        let t = Task::create("a", 6, 24, Importance::High).unwrap();
        let e = t.edited(t.fields().with_deadline_offset(8)).unwrap();
        assert_eq!(e.deadline_offset, 8);
        assert_eq!(e.importance, Importance::High);
        assert_eq!(e.required_service_time, 6);
    }

    #[test]
    fn edit_revalidates() {
        let t = Task::create("a", 6, 24, Importance::Low).unwrap();
        assert!(t.edited(TaskFields::new("a", 0)).is_err());
        assert!(t.edited(TaskFields::new("", 2)).is_err());
    }

    #[test]
    fn clone_is_independent() {
        let original = Task::create("a", 4, 8, Importance::Low).unwrap();
        let mut copy = original.clone();
        copy.remaining_service_time = 0;
        copy.name.push_str("-copy");
        assert_eq!(original.remaining_service_time, 4);
        assert_eq!(original.name, "a");
    }

    #[test]
    fn validate_catches_out_of_range_run_state() {
        let mut t = Task::create("a", 4, 8, Importance::Low).unwrap();
        t.remaining_service_time = 5;
        assert!(t.validate().is_err());
        t.remaining_service_time = -1;
        assert!(t.validate().is_err());
        t.remaining_service_time = 0;
        assert!(t.validate().is_ok());
    }

    #[test]
    fn serializes_in_camel_case() {
        let t = Task::create("a", 4, 8, Importance::Medium).unwrap();
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["requiredServiceTime"], 4);
        assert_eq!(v["deadlineOffset"], 8);
        assert_eq!(v["importance"], "medium");
        assert_eq!(v["remainingServiceTime"], 4);
        assert_eq!(v["completed"], false);

        let back: Task = serde_json::from_value(v).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn deserializes_med_alias() {
        let t: Task = serde_json::from_str(
            r#"{"name":"a","requiredServiceTime":2,"deadlineOffset":1,"importance":"med","remainingServiceTime":2}"#,
        )
        .unwrap();
        assert_eq!(t.importance, Importance::Medium);
        assert!(!t.completed);
    }
}
