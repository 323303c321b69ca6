//! taskflow-core: task model and CPU-scheduling simulator for the TaskFlow planner
//!
//! Given a snapshot of tasks, the engine computes an execution timeline under
//! Round Robin, Shortest-Job-First or Deadline-Priority. The engine clones its
//! input, so callers may run it repeatedly against the tasks they own.

pub mod error;
pub mod metrics;
pub mod scheduler;
pub mod store;
pub mod task;
pub mod timeline;

pub use error::{Result, TaskflowError};
pub use metrics::{PolicyReport, ScheduleMetrics, best_policy, compare, evaluate};
pub use scheduler::{
    DEFAULT_QUANTUM, Engine, Limits, Policy, deadline_priority, round_robin, schedule,
    shortest_job_first,
};
pub use store::TaskStore;
pub use task::{Importance, Task, TaskFields, snapshot};
pub use timeline::{Interval, Timeline};
