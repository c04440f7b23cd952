//! Discrete-event scheduling simulator for the sporadic real-time task model
//! under preemptive Earliest-Deadline-First on a single processor.
//!
//! The simulator advances a virtual clock through job arrivals and
//! executions: a seeded [`JobGenerator`] stages one future job per task on an
//! arrival-ordered queue, and the [`EventLoop`] interleaves those arrivals
//! with EDF execution from a deadline-ordered ready queue until a requested
//! break time, a deadline miss, or (for mixed-criticality analysis) a
//! computation overrun. The combined state can be dumped to JSON and resumed
//! in a later process.

pub mod codec;
pub mod eventloop;
pub mod jobgen;
pub mod jobq;
pub mod randsource;
pub mod tasks;
pub mod types;
pub mod utils;

pub use eventloop::{EventLoop, RunOutcome};
pub use jobgen::JobGenerator;
pub use jobq::{JobQueue, QueueKey};
pub use randsource::RandomSource;
pub use tasks::{Task, TaskSystem};
pub use types::{Duration, Job, Time};
