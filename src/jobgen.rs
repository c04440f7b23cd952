use crate::jobq::{JobQueue, QueueKey};
use crate::randsource::RandomSource;
use crate::tasks::{Task, TaskSystem};
use crate::types::{Duration, Job, Time};
use crate::utils::logging::prelude::*;

/// Produces the deterministic, seeded stream of jobs for a task system.
///
/// One future job per task is always staged on an arrival-keyed queue;
/// [`rise`](JobGenerator::rise) pops the earliest and immediately restages
/// that task, so the stream never runs dry unless the pending queue was
/// replaced by a checkpoint restore.
#[derive(Debug)]
pub struct JobGenerator<'ts> {
    tasks: &'ts TaskSystem,
    pending: JobQueue,
    /// Per-task absolute release time of the next job, by task position.
    phases: Vec<Time>,
    rng: RandomSource,
    overrun_seen: bool,
}

impl<'ts> JobGenerator<'ts> {
    pub fn new(tasks: &'ts TaskSystem, seed: u32, refill: bool) -> Self {
        let mut gen = JobGenerator {
            tasks,
            pending: JobQueue::new(),
            phases: vec![Time::ZERO; tasks.len()],
            rng: RandomSource::new(seed),
            overrun_seen: false,
        };
        if refill {
            gen.refill_all();
        }
        gen
    }

    pub fn task_system(&self) -> &'ts TaskSystem {
        self.tasks
    }

    /// Pop the earliest pending arrival and restage its task. `None` once
    /// the pending queue is exhausted (possible only after a restore).
    pub fn rise(&mut self) -> Option<Job> {
        let job = self.pending.pop()?;
        self.refill(job.task_id);
        Some(job)
    }

    /// Stage one future job for every task, in task-system order.
    pub fn refill_all(&mut self) {
        for pos in 0..self.tasks.len() {
            let id = self.tasks.get(pos).id();
            self.refill(id);
        }
    }

    /// Stage the next job of one task: draw jitter and demand, advance the
    /// task phase, mark the overrun threshold, enqueue by arrival.
    fn refill(&mut self, task_id: i64) {
        let tasks = self.tasks;
        let pos = tasks
            .position_of(task_id)
            .expect("staged job refers to a task outside the task system");
        let task = tasks.get(pos);

        let period = task.period();
        let rho = Duration((self.rng.exponential(task.beta()) * period.ticks() as f64) as i64);
        let gamma = self.draw_demand(task);
        assert!(gamma > 0, "drawn computation demand must be positive");

        let arrival = self.phases[pos];
        let deadline = arrival + task.relative_deadline();
        self.phases[pos] = arrival + period + rho;

        if gamma > task.comp(1) && !self.overrun_seen {
            self.overrun_seen = true;
            info!(
                task = task_id,
                %arrival,
                %deadline,
                computation = gamma,
                excess = gamma - task.comp(1),
                "staged first overflowing job"
            );
        }

        let overrun_deadline = if task.can_overrun() {
            arrival + Duration(task.comp(1) + 1)
        } else {
            // one past the job's own demand; a job that starts at its
            // arrival completes before this
            arrival + Duration(gamma + 1)
        };

        self.pending.insert(
            Job::new(task_id, arrival, overrun_deadline, deadline, gamma),
            QueueKey::ByArrival,
        );
    }

    /// Three-way segment selection, then a uniform draw over the segment
    /// bounds, rounded up.
    fn draw_demand(&mut self, task: &Task) -> i64 {
        let y = self.rng.uniform(0.0, 1.0);
        let segment = if y > task.prob(0) + task.prob(1) {
            2
        } else if y > task.prob(0) {
            1
        } else {
            0
        };
        let (low, high) = task.segment(segment);
        self.rng.uniform(low as f64, high as f64).ceil() as i64
    }

    /// Pending arrivals in arrival order, queue untouched.
    pub fn dump_pending(&self) -> Vec<Job> {
        self.pending.dump()
    }

    pub(crate) fn replace_pending(&mut self, pending: JobQueue) {
        self.pending = pending;
    }

    pub(crate) fn set_phases(&mut self, phases: Vec<Time>) {
        assert_eq!(
            phases.len(),
            self.tasks.len(),
            "phase vector length must match the task system"
        );
        self.phases = phases;
    }

    #[cfg(test)]
    pub(crate) fn phases(&self) -> &[Time] {
        &self.phases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::Task;
    use std::iter::FromIterator;

    fn unit_task_system() -> TaskSystem {
        TaskSystem::from_iter(vec![Task::new(
            19,
            7,
            7,
            [3, 3, 0, 0, 0, 0],
            [1.0, 0.0],
            0.0,
        )])
    }

    fn mixed_task_system() -> TaskSystem {
        TaskSystem::from_iter(vec![
            Task::new(-1, 20, 20, [1, 10, 0, 0, 0, 0], [1.0, 0.0], 0.5),
            Task::new(5, 10, 8, [1, 1, 2, 4, 5, 7], [0.5, 0.3], 1.5),
            Task::new(3, 12, 12, [1, 1, 2, 9, 0, 0], [0.9, 0.1], 0.5),
        ])
    }

    #[test]
    fn stages_one_job_per_task() {
        let ts = mixed_task_system();
        let gen = JobGenerator::new(&ts, 12312, true);
        assert_eq!(gen.dump_pending().len(), ts.len());
    }

    #[test]
    fn no_refill_leaves_the_queue_empty() {
        let ts = mixed_task_system();
        let mut gen = JobGenerator::new(&ts, 12312, false);
        assert!(gen.dump_pending().is_empty());
        assert!(gen.rise().is_none());
    }

    #[test]
    fn deterministic_task_stream() {
        let ts = unit_task_system();
        let mut gen = JobGenerator::new(&ts, 978382, true);

        // zero jitter, degenerate demand segment: arrivals fall on the
        // period grid and every job wants 3 units
        assert_eq!(gen.rise().unwrap().record(), (19, 0, 4, 7, 3));
        assert_eq!(gen.rise().unwrap().record(), (19, 7, 11, 14, 3));
        assert_eq!(gen.rise().unwrap().record(), (19, 14, 18, 21, 3));
    }

    #[test]
    fn phase_advances_by_period_without_jitter() {
        let ts = unit_task_system();
        let mut gen = JobGenerator::new(&ts, 978382, true);
        assert_eq!(gen.phases(), &[Time(7)]);
        gen.rise().unwrap();
        assert_eq!(gen.phases(), &[Time(14)]);
    }

    #[test]
    fn arrivals_are_nondecreasing() {
        let ts = mixed_task_system();
        let mut gen = JobGenerator::new(&ts, 12312, true);
        let mut last = Time(0);
        for _ in 0..100 {
            let job = gen.rise().unwrap();
            assert!(job.arrival >= last);
            last = job.arrival;
        }
    }

    #[test]
    fn demand_stays_within_segment_bounds() {
        let ts = mixed_task_system();
        let mut gen = JobGenerator::new(&ts, 12312, true);
        for _ in 0..200 {
            let job = gen.rise().unwrap();
            let task = ts.by_id(job.task_id).unwrap();
            let hi = (0..3).map(|i| task.segment(i).1).max().unwrap();
            assert!(job.computation >= 1);
            assert!(job.computation <= hi.max(1));
        }
    }

    #[test]
    fn identical_seeds_produce_identical_streams() {
        let ts = mixed_task_system();
        let mut a = JobGenerator::new(&ts, 4711, true);
        let mut b = JobGenerator::new(&ts, 4711, true);
        let xs: Vec<_> = (0..50).map(|_| a.rise().unwrap().record()).collect();
        let ys: Vec<_> = (0..50).map(|_| b.rise().unwrap().record()).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn overrun_capable_jobs_carry_the_low_budget_threshold() {
        let ts = TaskSystem::from_iter(vec![Task::new(
            2,
            10,
            10,
            [2, 2, 5, 5, 0, 0],
            [0.0, 1.0],
            0.0,
        )]);
        let mut gen = JobGenerator::new(&ts, 1, true);

        // always the high segment: demand 5, threshold at arrival + c1 + 1
        assert_eq!(gen.rise().unwrap().record(), (2, 0, 3, 10, 5));
        assert_eq!(gen.rise().unwrap().record(), (2, 10, 13, 20, 5));
    }
}
