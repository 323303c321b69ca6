//! Task files: JSON, TOML or CSV lists of task entries.
//!
//! Due dates are a presentation concern: they become integer deadline
//! offsets here, before anything reaches the core.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use taskflow_core::{Importance, Task, TaskFields, TaskStore};

use crate::config::CalendarSection;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskEntry {
    pub name: String,
    #[serde(alias = "required_service_time", alias = "requiredServiceTime")]
    pub hours: i64,
    /// Calendar due date, `YYYY-MM-DD` or `DD-MM-YYYY`.
    #[serde(default)]
    pub due: Option<String>,
    #[serde(default, alias = "deadline_offset", alias = "deadlineOffset")]
    pub deadline_hours: Option<i64>,
    #[serde(default)]
    pub importance: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct TomlTaskFile {
    #[serde(default)]
    task: Vec<TaskEntry>,
}

impl TaskEntry {
    pub fn into_task(self, today: NaiveDate, hours_per_day: i64) -> Result<Task> {
        let deadline_offset = match (&self.due, self.deadline_hours) {
            (Some(_), Some(_)) => bail!("give either `due` or `deadline_hours`, not both"),
            (Some(due), None) => deadline_offset_from_due(due, today, hours_per_day)?,
            (None, Some(hours)) => hours,
            (None, None) => bail!("missing `due` or `deadline_hours`"),
        };
        let importance = match self.importance.as_deref() {
            Some(s) if !s.trim().is_empty() => s.parse::<Importance>()?,
            _ => Importance::Low,
        };

        let mut task = TaskFields::new(self.name, self.hours)
            .with_deadline_offset(deadline_offset)
            .with_importance(importance)
            .build()?;
        if self.completed.unwrap_or(false) {
            task.mark_completed();
        }
        Ok(task)
    }
}

pub fn parse_due_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d-%m-%Y"))
        .map_err(|e| anyhow!("invalid due date '{s}': {e}"))
}

/// Whole days until `due`, times the working hours in a day.
pub fn deadline_offset_from_due(due: &str, today: NaiveDate, hours_per_day: i64) -> Result<i64> {
    let due = parse_due_date(due)?;
    let days = (due - today).num_days();
    if days < 0 {
        bail!("due date {due} is in the past");
    }
    Ok(days * hours_per_day)
}

pub fn today_in(tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| anyhow!("invalid timezone: {tz}"))?;
    Ok(Utc::now().with_timezone(&tz).date_naive())
}

pub fn read_entries(path: &Path) -> Result<Vec<TaskEntry>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => {
            let mut rdr = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_path(path)
                .with_context(|| format!("open {}", path.display()))?;
            rdr.deserialize()
                .collect::<Result<Vec<TaskEntry>, csv::Error>>()
                .with_context(|| format!("parse {}", path.display()))
        }
        "json" | "toml" => {
            let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            if ext == "json" {
                parse_json(&s).with_context(|| format!("parse {}", path.display()))
            } else {
                parse_toml(&s).with_context(|| format!("parse {}", path.display()))
            }
        }
        other => bail!(
            "unsupported task file type '{other}' for {} (use .json, .toml or .csv)",
            path.display()
        ),
    }
}

pub fn parse_json(s: &str) -> Result<Vec<TaskEntry>> {
    Ok(serde_json::from_str(s)?)
}

pub fn parse_toml(s: &str) -> Result<Vec<TaskEntry>> {
    let file: TomlTaskFile = toml::from_str(s)?;
    Ok(file.task)
}

pub fn entries_to_store(
    entries: Vec<TaskEntry>,
    today: NaiveDate,
    hours_per_day: i64,
) -> Result<TaskStore> {
    let tasks = entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            let name = entry.name.clone();
            entry
                .into_task(today, hours_per_day)
                .with_context(|| format!("task #{} ('{name}')", i + 1))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TaskStore::from_tasks(tasks)?)
}

pub fn load_store(path: &Path, calendar: &CalendarSection) -> Result<TaskStore> {
    let entries = read_entries(path)?;
    let today = today_in(&calendar.timezone)?;
    let store = entries_to_store(entries, today, calendar.hours_per_day)
        .with_context(|| format!("load tasks from {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        tasks = store.len(),
        pending = store.pending_count(),
        "tasks loaded"
    );
    Ok(store)
}
