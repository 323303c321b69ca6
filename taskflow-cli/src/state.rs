use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub fn taskflow_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("TASKFLOW_HOME") {
        return Ok(PathBuf::from(dir));
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".taskflow"))
}

pub fn ensure_taskflow_home() -> Result<PathBuf> {
    let dir = taskflow_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}
