//! Scheduler engine: Round Robin, Shortest-Job-First and Deadline-Priority.
//!
//! Every entry point borrows the caller's tasks and works on its own clones,
//! so repeated preview runs never disturb caller state. A call either returns
//! a complete timeline or an error; nothing partial escapes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskflowError};
use crate::task::{Task, snapshot};
use crate::timeline::Timeline;

/// Round Robin time slice in hours when the caller does not pick one.
pub const DEFAULT_QUANTUM: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "kebab-case")]
pub enum Policy {
    RoundRobin { quantum: i64 },
    ShortestJobFirst,
    DeadlinePriority,
}

impl Policy {
    /// All policies, Round Robin with the default quantum.
    pub const ALL_DEFAULT: [Policy; 3] = [
        Policy::RoundRobin {
            quantum: DEFAULT_QUANTUM,
        },
        Policy::ShortestJobFirst,
        Policy::DeadlinePriority,
    ];

    /// All policies, Round Robin with the given quantum.
    pub fn all(quantum: i64) -> [Policy; 3] {
        [
            Policy::RoundRobin { quantum },
            Policy::ShortestJobFirst,
            Policy::DeadlinePriority,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Policy::RoundRobin { .. } => "Round Robin",
            Policy::ShortestJobFirst => "Shortest Job First",
            Policy::DeadlinePriority => "Priority by Deadline",
        }
    }

    /// Replace the quantum of a Round Robin policy; other policies are unchanged.
    pub fn with_quantum(self, quantum: i64) -> Self {
        match self {
            Policy::RoundRobin { .. } => Policy::RoundRobin { quantum },
            other => other,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::RoundRobin { quantum } => write!(f, "round-robin(q={quantum})"),
            Policy::ShortestJobFirst => f.write_str("sjf"),
            Policy::DeadlinePriority => f.write_str("deadline"),
        }
    }
}

impl FromStr for Policy {
    type Err = TaskflowError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rr" | "round-robin" | "roundrobin" => Ok(Policy::RoundRobin {
                quantum: DEFAULT_QUANTUM,
            }),
            "sjf" | "shortest-job-first" => Ok(Policy::ShortestJobFirst),
            "deadline" | "priority" | "deadline-priority" => Ok(Policy::DeadlinePriority),
            _ => Err(TaskflowError::invalid_argument(
                "policy",
                s,
                "expected rr, sjf or deadline",
            )),
        }
    }
}

/// Per-call bounds on work, for callers serving untrusted requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_tasks: usize,
    pub max_intervals: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_tasks: 10_000,
            max_intervals: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
    limits: Limits,
}

impl Engine {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn schedule(&self, tasks: &[Task], policy: Policy) -> Result<Timeline> {
        let timeline = match policy {
            Policy::RoundRobin { quantum } => self.round_robin(tasks, quantum)?,
            Policy::ShortestJobFirst => self.shortest_job_first(tasks)?,
            Policy::DeadlinePriority => self.deadline_priority(tasks)?,
        };
        tracing::debug!(
            %policy,
            tasks = tasks.len(),
            intervals = timeline.len(),
            makespan = timeline.makespan(),
            "schedule computed"
        );
        Ok(timeline)
    }

    /// Preemptive slicing: sweep the tasks in input order, giving each one
    /// with time left at most `quantum` hours, until nothing is left.
    pub fn round_robin(&self, tasks: &[Task], quantum: i64) -> Result<Timeline> {
        if quantum <= 0 {
            return Err(TaskflowError::invalid_argument(
                "quantum",
                quantum,
                "must be a positive number of hours",
            ));
        }
        self.check_snapshot(tasks)?;

        let slices = tasks.iter().fold(0u64, |acc, t| {
            acc.saturating_add((t.remaining_service_time as u64).div_ceil(quantum as u64))
        });
        if slices > self.limits.max_intervals as u64 {
            tracing::warn!(
                quantum,
                slices,
                max = self.limits.max_intervals,
                "round robin request rejected"
            );
            return Err(TaskflowError::invalid_argument(
                "quantum",
                quantum,
                "too small for the total service time (interval limit exceeded)",
            ));
        }

        let mut queue = snapshot(tasks);
        let mut timeline = Timeline::new();
        while queue.iter().any(|t| t.remaining_service_time > 0) {
            for (index, task) in queue.iter_mut().enumerate() {
                if task.remaining_service_time == 0 {
                    continue;
                }
                let slice = quantum.min(task.remaining_service_time);
                timeline.push(slice, &task.name, index);
                task.remaining_service_time -= slice;
            }
        }
        Ok(timeline)
    }

    /// Non-preemptive, shortest required service time first. Ties keep input order.
    pub fn shortest_job_first(&self, tasks: &[Task]) -> Result<Timeline> {
        self.check_snapshot(tasks)?;
        Ok(run_to_completion(tasks, |t| t.required_service_time))
    }

    /// Non-preemptive, earliest deadline offset first. Ties keep input order.
    ///
    /// Importance plays no part in the ordering.
    pub fn deadline_priority(&self, tasks: &[Task]) -> Result<Timeline> {
        self.check_snapshot(tasks)?;
        Ok(run_to_completion(tasks, |t| t.deadline_offset))
    }

    fn check_snapshot(&self, tasks: &[Task]) -> Result<()> {
        if tasks.len() > self.limits.max_tasks {
            tracing::warn!(
                tasks = tasks.len(),
                max = self.limits.max_tasks,
                "schedule request rejected"
            );
            return Err(TaskflowError::invalid_argument(
                "tasks",
                tasks.len(),
                "more tasks than the engine accepts per request",
            ));
        }
        for task in tasks {
            task.validate().map_err(|e| match e {
                TaskflowError::Validation { field, value, reason } => {
                    TaskflowError::InvalidArgument {
                        name: field,
                        value,
                        reason,
                    }
                }
                other => other,
            })?;
        }

        // Every policy ends at the sum of service times; it must fit the clock.
        let total = tasks
            .iter()
            .try_fold(0i64, |acc, t| acc.checked_add(t.required_service_time));
        if total.is_none() {
            tracing::warn!(tasks = tasks.len(), "schedule request rejected: clock overflow");
            return Err(TaskflowError::invalid_argument(
                "tasks",
                tasks.len(),
                "total service time does not fit the simulated clock",
            ));
        }
        Ok(())
    }
}

fn run_to_completion(tasks: &[Task], key: impl Fn(&Task) -> i64) -> Timeline {
    let queue = snapshot(tasks);
    let mut order: Vec<(usize, &Task)> = queue.iter().enumerate().collect();
    // sort_by_key is stable
    order.sort_by_key(|&(_, t)| key(t));

    let mut timeline = Timeline::new();
    for (index, task) in order {
        timeline.push(task.required_service_time, &task.name, index);
    }
    timeline
}

pub fn schedule(tasks: &[Task], policy: Policy) -> Result<Timeline> {
    Engine::default().schedule(tasks, policy)
}

pub fn round_robin(tasks: &[Task], quantum: i64) -> Result<Timeline> {
    Engine::default().round_robin(tasks, quantum)
}

pub fn shortest_job_first(tasks: &[Task]) -> Result<Timeline> {
    Engine::default().shortest_job_first(tasks)
}

pub fn deadline_priority(tasks: &[Task]) -> Result<Timeline> {
    Engine::default().deadline_priority(tasks)
}
