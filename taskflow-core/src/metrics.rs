//! Deterministic schedule quality metrics and policy comparison.
//!
//! All tasks are released at time 0, so completion time equals turnaround.
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan | End of the last interval |
//! | Average completion | Mean completion time over tasks |
//! | Average waiting | Mean of completion - service time |
//! | Lateness | max(0, completion - deadline_offset) per task |
//! | On-time rate | Fraction with completion <= deadline_offset |
//! | Context switches | Adjacent intervals belonging to different tasks |
//! | Efficiency score | round(100 * on-time rate) |

use serde::Serialize;

use crate::error::{Result, TaskflowError};
use crate::scheduler::{Engine, Policy};
use crate::task::Task;
use crate::timeline::Timeline;

/// Quality of one timeline against the tasks it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleMetrics {
    pub makespan: i64,
    pub average_completion: f64,
    pub average_waiting: f64,
    pub total_lateness: i64,
    pub max_lateness: i64,
    pub on_time: usize,
    pub on_time_rate: f64,
    pub context_switches: usize,
    /// Percentage of tasks finishing by their deadline.
    pub efficiency_score: u8,
}

/// Score `timeline` against `tasks`, the snapshot it was computed from.
///
/// Tasks that never appear in the timeline (e.g. Round Robin tasks with no
/// time left) are not counted.
pub fn evaluate(timeline: &Timeline, tasks: &[Task]) -> Result<ScheduleMetrics> {
    for iv in timeline {
        let consistent = tasks
            .get(iv.task_index)
            .is_some_and(|t| t.name == iv.task_name);
        if !consistent || iv.start >= iv.end {
            return Err(TaskflowError::invalid_argument(
                "timeline",
                format!("{}@{}..{}", iv.task_name, iv.start, iv.end),
                "interval does not match the task snapshot",
            ));
        }
    }

    let mut counted = 0usize;
    // i128 so sums and lateness against very negative deadlines cannot overflow.
    let mut total_completion = 0i128;
    let mut total_waiting = 0i128;
    let mut total_lateness = 0i128;
    let mut max_lateness = 0i128;
    let mut on_time = 0usize;

    for (index, task) in tasks.iter().enumerate() {
        let Some(completion) = timeline.completion_of(index) else {
            continue;
        };
        counted += 1;
        total_completion += i128::from(completion);
        total_waiting += i128::from(completion - timeline.service_for(index));

        let lateness = (i128::from(completion) - i128::from(task.deadline_offset)).max(0);
        if lateness == 0 {
            on_time += 1;
        }
        total_lateness += lateness;
        max_lateness = max_lateness.max(lateness);
    }

    let mean = |total: i128| {
        if counted == 0 {
            0.0
        } else {
            total as f64 / counted as f64
        }
    };
    let on_time_rate = if counted == 0 {
        1.0
    } else {
        on_time as f64 / counted as f64
    };

    Ok(ScheduleMetrics {
        makespan: timeline.makespan(),
        average_completion: mean(total_completion),
        average_waiting: mean(total_waiting),
        total_lateness: saturate(total_lateness),
        max_lateness: saturate(max_lateness),
        on_time,
        on_time_rate,
        context_switches: timeline.context_switches(),
        efficiency_score: (on_time_rate * 100.0).round() as u8,
    })
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// One policy's timeline and its metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyReport {
    pub policy: Policy,
    pub timeline: Timeline,
    pub metrics: ScheduleMetrics,
}

impl Engine {
    /// Run every policy over the same tasks and score each timeline.
    pub fn compare(&self, tasks: &[Task], quantum: i64) -> Result<Vec<PolicyReport>> {
        Policy::all(quantum)
            .into_iter()
            .map(|policy| {
                let timeline = self.schedule(tasks, policy)?;
                let metrics = evaluate(&timeline, tasks)?;
                Ok(PolicyReport {
                    policy,
                    timeline,
                    metrics,
                })
            })
            .collect()
    }
}

pub fn compare(tasks: &[Task], quantum: i64) -> Result<Vec<PolicyReport>> {
    Engine::default().compare(tasks, quantum)
}

/// Lowest total lateness, then lowest average completion, then fewest
/// context switches. Remaining ties go to the earlier report.
pub fn best_policy(reports: &[PolicyReport]) -> Option<&PolicyReport> {
    reports.iter().reduce(|best, candidate| {
        let b = &best.metrics;
        let c = &candidate.metrics;
        let better = c
            .total_lateness
            .cmp(&b.total_lateness)
            .then(c.average_completion.total_cmp(&b.average_completion))
            .then(c.context_switches.cmp(&b.context_switches))
            .is_lt();
        if better { candidate } else { best }
    })
}
