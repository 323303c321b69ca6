//! Error types for task validation and scheduling requests.

use thiserror::Error;

/// Errors produced by the task model, the store and the scheduler engine.
///
/// Every variant carries enough context (field or parameter name and the
/// offending value) for a caller to correct its input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskflowError {
    /// A task field is malformed at creation or edit time.
    #[error("invalid task field `{field}` = {value:?}: {reason}")]
    Validation {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A scheduling parameter or snapshot breaks the engine's contract.
    #[error("invalid argument `{name}` = {value:?}: {reason}")]
    InvalidArgument {
        name: &'static str,
        value: String,
        reason: &'static str,
    },

    /// A store index does not refer to a task.
    #[error("no task at index {index} (store holds {len} tasks)")]
    UnknownTask { index: usize, len: usize },
}

impl TaskflowError {
    pub(crate) fn validation(
        field: &'static str,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        Self::Validation {
            field,
            value: value.to_string(),
            reason,
        }
    }

    pub(crate) fn invalid_argument(
        name: &'static str,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        Self::InvalidArgument {
            name,
            value: value.to_string(),
            reason,
        }
    }

    /// True for caller-input validation failures on task fields.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// True for malformed policy parameters or contract violations.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }
}

pub type Result<T> = std::result::Result<T, TaskflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_field_and_value() {
        let e = TaskflowError::validation("required_service_time", 0, "must be positive");
        assert_eq!(
            e.to_string(),
            "invalid task field `required_service_time` = \"0\": must be positive"
        );
        assert!(e.is_validation());
        assert!(!e.is_invalid_argument());
    }

    #[test]
    fn unknown_task_reports_store_size() {
        let e = TaskflowError::UnknownTask { index: 4, len: 2 };
        assert_eq!(e.to_string(), "no task at index 4 (store holds 2 tasks)");
    }
}
