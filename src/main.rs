use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod availability;
mod config;
mod conflicts;
mod data;
mod grouping;
mod ingest;
mod model;
mod report;
mod selection;
mod server;
mod solver;
mod validate;

use config::{SolverArgs, SolverConfig};
use data::{SchedulingInput, SessionRecord, SolveResult, TeacherRecord};
use selection::Preference;

#[derive(Parser)]
#[command(name = "section-staffing")]
#[command(about = "Assigns teachers to course sections, preferring each course's recorded teacher", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the solver over HTTP
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080", env = "SCHEDULER_ADDR")]
        addr: SocketAddr,
        #[command(flatten)]
        solver: SolverArgs,
    },
    /// Solve a JSON request body read from a file
    Solve {
        #[arg(long)]
        input: PathBuf,
        #[command(flatten)]
        solver: SolverArgs,
        /// Print the raw result as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the courses in a timetable with their recorded teachers
    Courses {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Build a weekly schedule from a timetable and course selections
    Schedule {
        #[arg(long)]
        csv: PathBuf,
        /// Selected course and preferred teacher, as "<Course Name>=<Teacher>"
        #[arg(long = "prefer", value_name = "COURSE=TEACHER")]
        preferences: Vec<Preference>,
        #[command(flatten)]
        solver: SolverArgs,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            addr,
            solver: solver_args,
        } => {
            server::run_server(addr, SolverConfig::from(&solver_args)).await?;
        }
        Commands::Solve {
            input,
            solver: solver_args,
            json,
        } => {
            let raw = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let request: SchedulingInput = serde_json::from_str(&raw)
                .with_context(|| format!("{} is not a valid request", input.display()))?;
            let result = solver::solve_input(&request, &SolverConfig::from(&solver_args));
            print_result(&result, json)?;
        }
        Commands::Courses { csv } => {
            let timetable = ingest::read_timetable(&csv)?;
            print!("{}", report::render_courses(&timetable.sessions));
        }
        Commands::Schedule {
            csv,
            preferences,
            solver: solver_args,
            json,
        } => {
            let timetable = ingest::read_timetable(&csv)?;
            let sessions = if preferences.is_empty() {
                timetable.sessions
            } else {
                selection::apply_preferences(timetable.sessions, &preferences)
            };
            let sessions: Vec<SessionRecord> = sessions.into_iter().map(Into::into).collect();
            let teachers: Vec<TeacherRecord> =
                timetable.teachers.into_iter().map(Into::into).collect();
            let result = solver::solve(&sessions, &teachers, &SolverConfig::from(&solver_args));
            print_result(&result, json)?;
        }
    }

    Ok(())
}

fn print_result(result: &SolveResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }
    if result.feasible {
        print!("{}", report::render_schedule(&result.assignments));
        println!();
    } else {
        println!("No feasible schedule ({:?}).", result.status);
    }
    print!("{}", report::render_conflicts(&result.conflicts));
    Ok(())
}
