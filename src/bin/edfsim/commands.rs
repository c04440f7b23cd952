use std::fs::File;
use std::io::{BufReader, BufWriter, Write};

use edfsim::utils::logging::prelude::*;
use edfsim::utils::{AppConfig, Result};
use edfsim::{EventLoop, JobGenerator, RunOutcome, TaskSystem, Time};

use crate::cli::RunOpt;

/// Wire a task system file into a generator and event loop, run to the
/// break time, and leave a state dump behind in every case.
pub fn run(opt: RunOpt) -> Result<()> {
    let file = File::open(&opt.task_system)?;
    let tasks = TaskSystem::from_reader(BufReader::new(file))?;

    // A resumed run must not pre-stage jobs at time zero; the checkpoint
    // carries the pending population instead.
    let generator = JobGenerator::new(&tasks, opt.seed, opt.resume.is_none());
    let mut evl = match &opt.resume {
        Some(path) => EventLoop::resumed(generator, BufReader::new(File::open(path)?))?,
        None => EventLoop::new(generator),
    };

    let break_time = Time(match opt.break_time {
        Some(t) => t,
        None => AppConfig::get("simulation.break_time")?,
    });
    let speed = match opt.speed {
        Some(s) => s,
        None => AppConfig::get("simulation.speed")?,
    };
    let overrun_break = opt.overrun_break || AppConfig::get("simulation.overrun_break")?;

    info!(
        tasks = tasks.len(),
        seed = opt.seed,
        %break_time,
        speed,
        overrun_break,
        resumed = opt.resume.is_some(),
        "starting simulation"
    );

    let outcome = if break_time <= evl.now() {
        // nothing to simulate
        RunOutcome::Pass
    } else {
        evl.run(break_time, speed, overrun_break)
    };

    let dump_path = format!("{}_dump.json", opt.prefix);
    let mut out = BufWriter::new(File::create(&dump_path)?);
    evl.dump(&mut out)?;
    out.flush()?;
    info!(path = %dump_path, "state dump written");

    println!("{}", evl.report(outcome));
    Ok(())
}

/// Show the configuration after all merges.
pub fn config() -> Result<()> {
    println!("{:#?}", AppConfig::fetch()?);
    Ok(())
}
