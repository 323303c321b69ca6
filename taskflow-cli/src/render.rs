//! Text renderers for timelines, task lists and policy comparisons.

use std::fmt::Write as _;
use taskflow_core::{PolicyReport, Task, Timeline, best_policy};

/// Widest Gantt bar, in columns.
const GANTT_WIDTH: usize = 72;

pub fn timeline_table(timeline: &Timeline) -> String {
    let name_w = timeline
        .iter()
        .map(|iv| iv.task_name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut out = String::new();
    let _ = writeln!(out, "{:>6}  {:>6}  {:<name_w$}", "Start", "End", "Task");
    for iv in timeline {
        let _ = writeln!(out, "{:>6}  {:>6}  {:<name_w$}", iv.start, iv.end, iv.task_name);
    }
    out
}

/// Single-lane chart: one bar segment per interval, scaled to fit the terminal.
pub fn gantt(timeline: &Timeline, title: &str) -> String {
    let mut out = format!("Gantt Chart - {title}\n");
    if timeline.is_empty() {
        out.push_str("(empty timeline)\n");
        return out;
    }

    let makespan = timeline.makespan() as f64;
    let widths: Vec<usize> = timeline
        .iter()
        .map(|iv| {
            let w = (iv.end - iv.start) as f64 * GANTT_WIDTH as f64 / makespan;
            (w.round() as usize).max(1)
        })
        .collect();

    let mut bar = String::from("CPU |");
    let mut ticks: Vec<(usize, i64)> = Vec::with_capacity(widths.len() + 1);
    let mut col = 4;
    for (iv, &w) in timeline.iter().zip(&widths) {
        ticks.push((col, iv.start));
        bar.push_str(&label(&iv.task_name, w));
        bar.push('|');
        col += w + 1;
    }
    ticks.push((col, timeline.makespan()));

    let mut axis = vec![' '; col + 1];
    let mut free_from = 0;
    for (pos, t) in ticks {
        let text = t.to_string();
        if pos < free_from {
            continue;
        }
        if axis.len() < pos + text.len() {
            axis.resize(pos + text.len(), ' ');
        }
        for (i, ch) in text.chars().enumerate() {
            axis[pos + i] = ch;
        }
        free_from = pos + text.len() + 1;
    }

    out.push_str(&bar);
    out.push('\n');
    out.push_str(axis.iter().collect::<String>().trim_end());
    out.push_str("\nTime (hours)\n");
    out
}

fn label(name: &str, width: usize) -> String {
    let mut s: String = name.chars().take(width).collect();
    let len = s.chars().count();
    s.extend(std::iter::repeat_n('.', width - len));
    s
}

pub fn task_table(tasks: &[Task], hours_per_day: i64) -> String {
    let name_w = tasks
        .iter()
        .map(|t| t.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3}  {:<name_w$}  {:>5}  {:>13}  {:<10}  {}",
        "#", "Name", "Hours", "Due In (Days)", "Importance", "Status"
    );
    for (i, t) in tasks.iter().enumerate() {
        let status = if t.completed { "done" } else { "pending" };
        let _ = writeln!(
            out,
            "{:>3}  {:<name_w$}  {:>5}  {:>13}  {:<10}  {}",
            i,
            t.name,
            t.required_service_time,
            t.deadline_offset.div_euclid(hours_per_day),
            t.importance.to_string(),
            status
        );
    }
    out
}

pub fn comparison(reports: &[PolicyReport]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<22}  {:>8}  {:>14}  {:>11}  {:>13}  {:>8}  {:>10}",
        "Policy", "Makespan", "Avg completion", "Avg waiting", "Late (total)", "Switches", "Efficiency"
    );
    for r in reports {
        let m = &r.metrics;
        let _ = writeln!(
            out,
            "{:<22}  {:>8}  {:>14.2}  {:>11.2}  {:>13}  {:>8}  {:>9}%",
            r.policy.label(),
            m.makespan,
            m.average_completion,
            m.average_waiting,
            m.total_lateness,
            m.context_switches,
            m.efficiency_score
        );
    }
    if let Some(best) = best_policy(reports) {
        let _ = writeln!(out, "\nBest Scheduling Method: {}", best.policy.label());
    }
    out
}
