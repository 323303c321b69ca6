use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use taskflow_core::{DEFAULT_QUANTUM, Limits};

use crate::state::{ensure_taskflow_home, taskflow_home};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schedule: ScheduleSection,
    pub calendar: CalendarSection,
    pub log: LogSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSection {
    /// Round Robin slice in hours.
    pub quantum: i64,
    pub max_tasks: usize,
    pub max_intervals: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSection {
    /// Working hours counted per calendar day when turning due dates into offsets.
    pub hours_per_day: i64,
    /// IANA zone used to decide what "today" is.
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// tracing-subscriber filter used when RUST_LOG is unset.
    pub filter: String,
}

impl Default for ScheduleSection {
    fn default() -> Self {
        let limits = Limits::default();
        Self {
            quantum: DEFAULT_QUANTUM,
            max_tasks: limits.max_tasks,
            max_intervals: limits.max_intervals,
        }
    }
}

impl Default for CalendarSection {
    fn default() -> Self {
        Self {
            hours_per_day: 8,
            timezone: "America/Chicago".to_string(),
        }
    }
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl ScheduleSection {
    pub fn limits(&self) -> Limits {
        Limits {
            max_tasks: self.max_tasks,
            max_intervals: self.max_intervals,
        }
    }
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(taskflow_home()?.join("config.toml"))
}

/// Load `path`, or the default location; a missing file means defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn parse_config(s: &str) -> Result<Config> {
    let cfg: Config = toml::from_str(s)?;
    if cfg.calendar.hours_per_day <= 0 {
        anyhow::bail!("calendar.hours_per_day must be positive");
    }
    Ok(cfg)
}

pub fn init_config(path: Option<&Path>) -> Result<()> {
    let p = match path {
        Some(p) => p.to_path_buf(),
        None => ensure_taskflow_home()?.join("config.toml"),
    };
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    let s = toml::to_string_pretty(&Config::default()).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_other_defaults() {
        let cfg = parse_config("[schedule]\nquantum = 3\n").unwrap();
        assert_eq!(cfg.schedule.quantum, 3);
        assert_eq!(cfg.schedule.max_tasks, Limits::default().max_tasks);
        assert_eq!(cfg.calendar.hours_per_day, 8);
        assert_eq!(cfg.log.filter, "warn");
    }

    #[test]
    fn default_round_trips_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(parse_config(&s).unwrap(), Config::default());
    }

    #[test]
    fn rejects_non_positive_workday() {
        assert!(parse_config("[calendar]\nhours_per_day = 0\n").is_err());
    }
}
