use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use taskflow_core::{Engine, Policy, Task, TaskStore, best_policy, snapshot};

mod config;
mod render;
mod state;
mod task_file;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "taskflow", version, about = "TaskFlow planner: CPU-scheduling simulator for your task list")]
struct Cli {
    /// Config file (default: ~/.taskflow/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute an execution timeline for the tasks in FILE
    Schedule {
        /// Task file (.json, .toml or .csv)
        file: PathBuf,

        /// rr (round robin), sjf (shortest job first) or deadline
        #[arg(long, default_value = "rr")]
        policy: String,

        /// Round Robin slice in hours (default: config schedule.quantum)
        #[arg(long)]
        quantum: Option<i64>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Also schedule tasks marked completed
        #[arg(long, default_value_t = false)]
        include_completed: bool,
    },

    /// Run every policy and score the timelines against the deadlines
    Compare {
        file: PathBuf,

        #[arg(long)]
        quantum: Option<i64>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show the tasks in FILE
    List { file: PathBuf },

    /// Write a default config file
    InitConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Gantt,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;
    init_tracing(&cfg.log.filter);

    match cli.command {
        Command::Schedule {
            file,
            policy,
            quantum,
            format,
            include_completed,
        } => {
            let policy = policy.parse::<Policy>()?;
            run_schedule(&cfg, &file, policy, quantum, format, include_completed)?;
        }

        Command::Compare {
            file,
            quantum,
            json,
        } => {
            run_compare(&cfg, &file, quantum, json)?;
        }

        Command::List { file } => {
            let store = task_file::load_store(&file, &cfg.calendar)?;
            if store.is_empty() {
                println!("No tasks in {}", file.display());
            } else {
                print!("{}", render::task_table(store.tasks(), cfg.calendar.hours_per_day));
            }
        }

        Command::InitConfig => {
            config::init_config(cli.config.as_deref())?;
        }
    }

    Ok(())
}

/// Logs go to stderr; RUST_LOG wins over the config filter.
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_snapshot(cfg: &Config, file: &Path, include_completed: bool) -> Result<Vec<Task>> {
    let store = task_file::load_store(file, &cfg.calendar)?;
    select_tasks(&store, include_completed).with_context(|| format!("scheduling {}", file.display()))
}

/// Pending tasks only, as a detached snapshot, unless completed ones are wanted too.
fn select_tasks(store: &TaskStore, include_completed: bool) -> Result<Vec<Task>> {
    let tasks = if include_completed {
        snapshot(store.tasks())
    } else {
        store.pending_snapshot()
    };
    if tasks.is_empty() {
        bail!("no pending tasks to schedule");
    }
    Ok(tasks)
}

fn run_schedule(
    cfg: &Config,
    file: &Path,
    policy: Policy,
    quantum: Option<i64>,
    format: OutputFormat,
    include_completed: bool,
) -> Result<()> {
    let tasks = load_snapshot(cfg, file, include_completed)?;
    let policy = policy.with_quantum(quantum.unwrap_or(cfg.schedule.quantum));

    let engine = Engine::new(cfg.schedule.limits());
    let timeline = engine.schedule(&tasks, policy)?;

    match format {
        OutputFormat::Table => {
            println!("# {} ({} tasks)\n", policy.label(), tasks.len());
            print!("{}", render::timeline_table(&timeline));
        }
        OutputFormat::Gantt => print!("{}", render::gantt(&timeline, policy.label())),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&timeline)?),
    }
    Ok(())
}

fn run_compare(cfg: &Config, file: &Path, quantum: Option<i64>, json: bool) -> Result<()> {
    let tasks = load_snapshot(cfg, file, false)?;
    let engine = Engine::new(cfg.schedule.limits());
    let reports = engine.compare(&tasks, quantum.unwrap_or(cfg.schedule.quantum))?;

    if json {
        let best = best_policy(&reports).map(|r| r.policy);
        let out = serde_json::json!({ "reports": reports, "best": best });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print!("{}", render::comparison(&reports));
    }
    Ok(())
}
