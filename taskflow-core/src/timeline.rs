//! Execution timelines produced by the scheduler.

use serde::{Deserialize, Serialize};

/// One contiguous slice of CPU time given to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub start: i64,
    pub end: i64,
    pub task_name: String,
    /// Position of the task in the snapshot the timeline was computed from.
    pub task_index: usize,
}

impl Interval {
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }
}

/// Ordered, non-overlapping intervals starting at time 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    intervals: Vec<Interval>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a slice at the current end of the timeline.
    pub(crate) fn push(&mut self, duration: i64, task_name: &str, task_index: usize) {
        debug_assert!(duration > 0);
        let start = self.makespan();
        self.intervals.push(Interval {
            start,
            end: start + duration,
            task_name: task_name.to_string(),
            task_index,
        });
    }

    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interval> {
        self.intervals.iter()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// End of the last interval, 0 when empty.
    pub fn makespan(&self) -> i64 {
        self.intervals.last().map(|iv| iv.end).unwrap_or(0)
    }

    /// Total time given to the task at `task_index`.
    pub fn service_for(&self, task_index: usize) -> i64 {
        self.intervals
            .iter()
            .filter(|iv| iv.task_index == task_index)
            .map(Interval::duration)
            .sum()
    }

    /// When the task at `task_index` ran for the last time.
    pub fn completion_of(&self, task_index: usize) -> Option<i64> {
        self.intervals
            .iter()
            .rev()
            .find(|iv| iv.task_index == task_index)
            .map(|iv| iv.end)
    }

    /// Task indices in order of first appearance.
    pub fn task_order(&self) -> Vec<usize> {
        let mut seen = Vec::new();
        for iv in &self.intervals {
            if !seen.contains(&iv.task_index) {
                seen.push(iv.task_index);
            }
        }
        seen
    }

    pub fn context_switches(&self) -> usize {
        self.intervals
            .windows(2)
            .filter(|w| w[0].task_index != w[1].task_index)
            .count()
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Timeline {
        let mut t = Timeline::new();
        t.push(2, "A", 0);
        t.push(2, "B", 1);
        t.push(1, "A", 0);
        t
    }

    #[test]
    fn push_keeps_intervals_contiguous() {
        let t = sample();
        let spans: Vec<(i64, i64)> = t.iter().map(|iv| (iv.start, iv.end)).collect();
        assert_eq!(spans, vec![(0, 2), (2, 4), (4, 5)]);
        assert_eq!(t.makespan(), 5);
    }

    #[test]
    fn per_task_queries() {
        let t = sample();
        assert_eq!(t.service_for(0), 3);
        assert_eq!(t.service_for(1), 2);
        assert_eq!(t.completion_of(0), Some(5));
        assert_eq!(t.completion_of(1), Some(4));
        assert_eq!(t.completion_of(7), None);
        assert_eq!(t.task_order(), vec![0, 1]);
        assert_eq!(t.context_switches(), 2);
    }

    #[test]
    fn empty_timeline() {
        let t = Timeline::new();
        assert!(t.is_empty());
        assert_eq!(t.makespan(), 0);
        assert_eq!(t.context_switches(), 0);
    }

    #[test]
    fn serializes_as_plain_array() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.starts_with(r#"[{"start":0,"end":2,"taskName":"A","taskIndex":0}"#));
    }
}
