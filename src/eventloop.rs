use std::io;

use itertools::Itertools as _;

use crate::codec::{self, Checkpoint};
use crate::jobgen::JobGenerator;
use crate::jobq::{JobQueue, QueueKey};
use crate::types::{Duration, Job, Time};
use crate::utils::logging::prelude::*;
use crate::utils::{Error, Result};

/// Why a [`EventLoop::run`] call came back.
///
/// A deadline miss or an overrun is a regular result, not an error; they are
/// what the simulator exists to report. `Pass` is produced by the host when
/// the requested break time does not advance the clock at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Ok,
    DeadlineMiss,
    Overrun,
    Pass,
}

/// The two-queue event loop: EDF-ordered ready queue on one side, the job
/// generator's arrival-ordered staging queue on the other. The loop owns the
/// generator, the clock, and the prefetched next arrival.
#[derive(Debug)]
pub struct EventLoop<'ts> {
    generator: JobGenerator<'ts>,
    ready: JobQueue,
    /// Earliest future arrival, prefetched from the generator. The job due
    /// to execute next is always the ready-queue head.
    next_job: Option<Job>,
    now: Time,
    events_done: i64,
    jobs_done: i64,
}

impl<'ts> EventLoop<'ts> {
    /// Fresh event loop: prefetch the two earliest jobs, start the clock at
    /// the first arrival and make that job ready.
    pub fn new(generator: JobGenerator<'ts>) -> Self {
        let mut evl = Self::unprimed(generator);
        let current = evl.generator.rise();
        evl.next_job = evl.generator.rise();
        if let Some(current) = current {
            if let Some(next) = &evl.next_job {
                assert!(
                    current.arrival <= next.arrival,
                    "job generator produced arrivals out of order"
                );
            }
            evl.now = current.arrival;
            evl.ready.insert(current, QueueKey::ByDeadline);
        }
        evl
    }

    /// Event loop restored from a serialized checkpoint; the generator must
    /// have been constructed without refilling.
    pub fn resumed(generator: JobGenerator<'ts>, reader: impl io::Read) -> Result<Self> {
        let mut evl = Self::unprimed(generator);
        evl.load(reader)?;
        Ok(evl)
    }

    fn unprimed(generator: JobGenerator<'ts>) -> Self {
        EventLoop {
            generator,
            ready: JobQueue::new(),
            next_job: None,
            now: Time::ZERO,
            events_done: 0,
            jobs_done: 0,
        }
    }

    pub fn now(&self) -> Time {
        self.now
    }

    pub fn events_done(&self) -> i64 {
        self.events_done
    }

    pub fn jobs_done(&self) -> i64 {
        self.jobs_done
    }

    /// Advance virtual time until `break_time`, a deadline miss, or (when
    /// `overrun_break` is set) an overrun. `speed` is work units completed
    /// per tick.
    ///
    /// On a deadline miss the clock is left exactly on the missed deadline.
    /// Completing a job whose remaining work is not a multiple of `speed`
    /// costs one extra tick of capacity; the budget bookkeeping below keeps
    /// `now + runtime` invariant through that, which the break-time check
    /// relies on.
    pub fn run(&mut self, break_time: Time, speed: i64, overrun_break: bool) -> RunOutcome {
        debug!(now = %self.now, %break_time, speed, overrun_break, "run");
        while self.now < break_time {
            let arrival = match &self.next_job {
                Some(job) => job.arrival,
                None => break_time, // stream exhausted: only idle time left
            };
            let mut runtime = if arrival < break_time {
                (arrival - self.now).ticks()
            } else {
                (break_time - self.now).ticks()
            };

            // Overrun threshold of the job due to execute, captured once per
            // outer iteration. With no job ready there is nothing that could
            // overrun before the next arrival.
            let overrun_at = match self.ready.peek() {
                Some(job) => job.overrun_deadline,
                None => Time::MAX,
            };
            if overrun_break && overrun_at < arrival {
                runtime = (overrun_at - self.now).ticks();
            }

            while runtime > 0 {
                let (deadline, c) = match self.ready.peek() {
                    Some(job) => (job.absolute_deadline, job.computation),
                    None => break, // processor idle until the next arrival
                };
                let work = runtime * speed;
                if work <= c {
                    // budget fits in the job: spend all of it
                    self.now += Duration(runtime);
                    self.ready.head_mut(|job| job.computation = c - work);
                    runtime = 0;
                } else {
                    // job completes within the budget
                    let time_spent = c / speed;
                    if c % speed > 0 {
                        runtime -= 1;
                        self.now += Duration(1);
                    }
                    self.now += Duration(time_spent);
                    runtime -= time_spent;
                    self.ready.pop();
                    self.jobs_done += 1;
                }
                self.events_done += 1;
                if self.now > deadline {
                    self.now = deadline;
                    return RunOutcome::DeadlineMiss;
                }
            }

            // `now + runtime` covers the idle remainder after the ready
            // queue drained
            if self.now == break_time || self.now + Duration(runtime) == break_time {
                self.now = break_time;
                return RunOutcome::Ok;
            }
            if overrun_break && self.now == overrun_at {
                return RunOutcome::Overrun;
            }

            // arrival
            self.now = arrival;
            if let Some(job) = self.next_job.take() {
                self.ready.insert(job, QueueKey::ByDeadline);
                self.next_job = self.generator.rise();
                self.events_done += 1;
            }
        }
        RunOutcome::Ok
    }

    /// Serialize the clock and every job resident in the two queues, each
    /// job once. Non-destructive: dumping twice yields identical bytes.
    pub fn dump(&self, writer: impl io::Write) -> Result<()> {
        let jobs = self
            .ready
            .dump()
            .iter()
            .chain(self.generator.dump_pending().iter())
            .map(Job::record)
            .unique()
            .collect();
        Checkpoint {
            now: self.now.ticks(),
            jobs,
        }
        .write(writer)
    }

    /// Rebuild the combined state from a checkpoint stream: the first number
    /// is the clock, the rest are five-field job records. Future jobs go
    /// back to the generator (with their task phase advanced past them and
    /// jitter treated as zero), already-arrived jobs to the ready queue.
    fn load(&mut self, reader: impl io::Read) -> Result<()> {
        let numbers = codec::scan_numbers(reader)?;
        let mut numbers = numbers.into_iter();
        self.now = Time(
            numbers
                .next()
                .ok_or_else(|| Error::MalformedInput("empty checkpoint".into()))?
                .as_i64(),
        );

        let rest: Vec<i64> = numbers.map(|n| n.as_i64()).collect();
        if rest.len() % 5 != 0 {
            return Err(Error::MalformedInput(format!(
                "checkpoint wants 5 numbers per job, got {}",
                rest.len()
            )));
        }

        let tasks = self.generator.task_system();
        let mut ready = JobQueue::new();
        let mut pending = JobQueue::new();
        let mut phases = vec![Time::ZERO; tasks.len()];
        for rec in rest.chunks(5) {
            let job = Job::from_record((rec[0], rec[1], rec[2], rec[3], rec[4]));
            if job.arrival > self.now {
                let pos = tasks.position_of(job.task_id)?;
                // the RNG phase is not part of the dump; the resumed segment
                // gets zero jitter until the task is naturally restaged
                phases[pos] = job.arrival + tasks.get(pos).period();
                pending.insert(job, QueueKey::ByArrival);
            } else {
                ready.insert(job, QueueKey::ByDeadline);
            }
        }
        let had_records = !rest.is_empty();

        self.ready = ready;
        self.generator.replace_pending(pending);
        if had_records {
            self.generator.set_phases(phases);
        } else {
            // everything had been dropped: restart every task at the clock
            self.generator.set_phases(vec![self.now; tasks.len()]);
            self.generator.refill_all();
        }

        // Prefetch as on a fresh start. A `None` here is fine: the restored
        // pending population may already be exhausted.
        let current = self.generator.rise();
        self.next_job = self.generator.rise();
        if let (Some(current), Some(next)) = (current, self.next_job.as_ref()) {
            assert!(
                current.arrival <= next.arrival,
                "restored generator produced arrivals out of order"
            );
            self.ready.insert(current, QueueKey::ByDeadline);
        }
        self.events_done = 0;
        self.jobs_done = 0;
        Ok(())
    }

    /// One-line human-readable summary for a finished `run`.
    pub fn report(&self, outcome: RunOutcome) -> String {
        match outcome {
            RunOutcome::Ok => format!(
                "{}: End of simulation with {} events servicing {} jobs",
                self.now, self.events_done, self.jobs_done
            ),
            RunOutcome::DeadlineMiss => format!(
                "{}: Deadline miss after {} events servicing {} jobs",
                self.now, self.events_done, self.jobs_done
            ),
            RunOutcome::Overrun => format!(
                "{}: Overrun after {} events servicing {} jobs",
                self.now, self.events_done, self.jobs_done
            ),
            RunOutcome::Pass => format!("{}: Pass simulation", self.now),
        }
    }
}
