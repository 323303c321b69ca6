//! TaskStore: the caller-owned task collection.
//!
//! Tasks are addressed by position, since names need not be unique. The
//! store is the only place run-state flags like `completed` change; the
//! scheduler only ever sees snapshots taken from it.

use crate::error::{Result, TaskflowError};
use crate::task::{Task, TaskFields};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt already built tasks, validating each one.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self> {
        for task in &tasks {
            task.validate()?;
        }
        Ok(Self { tasks })
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, index: usize) -> Option<&Task> {
        self.tasks.get(index)
    }

    /// Validate and append; returns the new task's index.
    pub fn add(&mut self, fields: TaskFields) -> Result<usize> {
        let task = fields.build()?;
        tracing::debug!(name = %task.name, hours = task.required_service_time, "task added");
        self.tasks.push(task);
        Ok(self.tasks.len() - 1)
    }

    pub fn edit(&mut self, index: usize, fields: TaskFields) -> Result<&Task> {
        let slot = self.slot(index)?;
        *slot = slot.edited(fields)?;
        Ok(slot)
    }

    pub fn complete(&mut self, index: usize) -> Result<()> {
        self.slot(index)?.mark_completed();
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Task> {
        self.slot(index)?;
        Ok(self.tasks.remove(index))
    }

    /// Independent copies of the tasks not yet completed, in store order.
    pub fn pending_snapshot(&self) -> Vec<Task> {
        self.tasks.iter().filter(|t| t.is_pending()).cloned().collect()
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_pending()).count()
    }

    fn slot(&mut self, index: usize) -> Result<&mut Task> {
        let len = self.tasks.len();
        self.tasks
            .get_mut(index)
            .ok_or(TaskflowError::UnknownTask { index, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Importance;

    fn store() -> TaskStore {
        let mut s = TaskStore::new();
        s.add(TaskFields::new("essay", 4).with_deadline_offset(16)).unwrap();
        s.add(TaskFields::new("slides", 2).with_importance(Importance::High))
            .unwrap();
        s.add(TaskFields::new("essay", 1)).unwrap();
        s
    }

    #[test]
    fn add_validates_and_returns_index() {
        let mut s = store();
        assert_eq!(s.len(), 3);
        assert!(s.add(TaskFields::new("", 1)).is_err());
        assert_eq!(s.add(TaskFields::new("lab", 3)).unwrap(), 3);
    }

    #[test]
    fn complete_excludes_from_pending_snapshot() {
        let mut s = store();
        s.complete(1).unwrap();
        let pending = s.pending_snapshot();
        assert_eq!(pending.len(), 2);
        assert!(pending.iter().all(|t| t.name == "essay"));
        assert_eq!(s.pending_count(), 2);
    }

    #[test]
    fn snapshot_is_detached_from_store() {
        let s = store();
        let mut snap = s.pending_snapshot();
        snap[0].remaining_service_time = 0;
        assert_eq!(s.get(0).unwrap().remaining_service_time, 4);
    }

    #[test]
    fn edit_and_remove() {
        let mut s = store();
        let edited = s.edit(0, TaskFields::new("essay v2", 5)).unwrap();
        assert_eq!(edited.remaining_service_time, 5);

        let removed = s.remove(1).unwrap();
        assert_eq!(removed.name, "slides");
        assert_eq!(s.len(), 2);
        assert_eq!(s.get(1).unwrap().required_service_time, 1);
    }

    #[test]
    fn failed_edit_leaves_task_unchanged() {
        let mut s = store();
        assert!(s.edit(0, TaskFields::new("essay", 0)).is_err());
        assert_eq!(s.get(0).unwrap().required_service_time, 4);
    }

    #[test]
    fn unknown_index() {
        let mut s = store();
        assert_eq!(
            s.complete(9).unwrap_err(),
            TaskflowError::UnknownTask { index: 9, len: 3 }
        );
        assert!(s.remove(3).is_err());
    }

    #[test]
    fn from_tasks_rejects_broken_run_state() {
        let mut t = Task::create("a", 2, 0, Importance::Low).unwrap();
        t.remaining_service_time = 3;
        assert!(TaskStore::from_tasks(vec![t]).is_err());
    }
}
