use std::path::PathBuf;

use structopt::StructOpt;

use edfsim::utils::{AppConfig, Result};

use crate::commands;

/// Discrete-event EDF scheduling simulator for sporadic task systems
#[derive(Debug, StructOpt)]
#[structopt(name = "edfsim")]
pub struct Opt {
    /// Merge a custom config file over the built-in defaults
    #[structopt(short = "c", long, value_name = "FILE")]
    config: Option<String>,

    #[structopt(subcommand)]
    command: Command,
}

#[derive(Debug, StructOpt)]
pub enum Command {
    /// Simulate a task system until a break time or a terminal condition
    Run(RunOpt),
    /// Show the effective configuration
    Config,
}

#[derive(Debug, StructOpt)]
pub struct RunOpt {
    /// Task system description (JSON)
    #[structopt(short = "j", long, value_name = "FILE")]
    pub task_system: PathBuf,

    /// Resume from a state dump instead of starting fresh
    #[structopt(short = "r", long, value_name = "FILE")]
    pub resume: Option<PathBuf>,

    /// Seed for the job trace
    #[structopt(short = "z", long, default_value = "0")]
    pub seed: u32,

    /// Absolute simulated time to stop at
    #[structopt(short = "t", long, value_name = "TICKS")]
    pub break_time: Option<i64>,

    /// Work units completed per time step
    #[structopt(short = "w", long, value_name = "WORK")]
    pub speed: Option<i64>,

    /// Halt as soon as a job runs past its low-criticality budget
    #[structopt(short = "b", long)]
    pub overrun_break: bool,

    /// Prefix of the state dump written after the run
    #[structopt(short = "n", long, value_name = "PREFIX")]
    pub prefix: String,
}

pub fn execute() -> Result<()> {
    let opt = Opt::from_args();
    AppConfig::merge_config(opt.config.as_deref())?;

    match opt.command {
        Command::Run(run) => commands::run(run),
        Command::Config => commands::config(),
    }
}
