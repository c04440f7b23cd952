use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::types::{Job, Time};

/// Which field of a job a queue orders by. The key is extracted once, at
/// insertion time, and never recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKey {
    ByArrival,
    ByDeadline,
}

impl QueueKey {
    fn of(self, job: &Job) -> Time {
        match self {
            QueueKey::ByArrival => job.arrival,
            QueueKey::ByDeadline => job.absolute_deadline,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    key: Time,
    seq: u64,
    job: Job,
}

// Ordering is on (key, seq) only; the job payload may be mutated in place
// without disturbing the heap.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Min-priority queue over jobs. Equal keys are served in insertion order.
#[derive(Debug, Clone, Default)]
pub struct JobQueue {
    heap: BinaryHeap<Reverse<Entry>>,
    next_seq: u64,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, job: Job, key: QueueKey) {
        let entry = Entry {
            key: key.of(&job),
            seq: self.next_seq,
            job,
        };
        self.next_seq += 1;
        self.heap.push(Reverse(entry));
    }

    /// The job with the smallest key, without removing it.
    pub fn peek(&self) -> Option<&Job> {
        self.heap.peek().map(|entry| &entry.0.job)
    }

    /// Remove and return the job with the smallest key.
    pub fn pop(&mut self) -> Option<Job> {
        self.heap.pop().map(|Reverse(entry)| entry.job)
    }

    /// Mutate the head job in place. Keys are captured at insert time, so
    /// changing job fields cannot break the heap order.
    pub fn head_mut<R>(&mut self, f: impl FnOnce(&mut Job) -> R) -> Option<R> {
        self.heap.peek_mut().map(|mut entry| f(&mut entry.0.job))
    }

    /// The contained jobs in key order, leaving the queue untouched.
    pub fn dump(&self) -> Vec<Job> {
        let mut heap = self.heap.clone();
        let mut jobs = Vec::with_capacity(heap.len());
        while let Some(Reverse(entry)) = heap.pop() {
            jobs.push(entry.job);
        }
        jobs
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(task_id: i64, arrival: i64, deadline: i64, computation: i64) -> Job {
        Job::new(
            task_id,
            Time(arrival),
            Time(deadline + 1),
            Time(deadline),
            computation,
        )
    }

    #[test]
    fn ordered_by_arrival() {
        let mut q = JobQueue::new();
        q.insert(job(20, 40, 50, 60), QueueKey::ByArrival);
        q.insert(job(1, 3, 4, 5), QueueKey::ByArrival);

        assert_eq!(q.peek().unwrap().arrival, Time(3));
        assert_eq!(q.pop().unwrap().task_id, 1);
        assert_eq!(q.pop().unwrap().task_id, 20);
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn ordered_by_deadline() {
        let mut q = JobQueue::new();
        q.insert(job(1, 0, 90, 5), QueueKey::ByDeadline);
        q.insert(job(2, 10, 20, 5), QueueKey::ByDeadline);
        q.insert(job(3, 5, 50, 5), QueueKey::ByDeadline);

        let order: Vec<i64> = std::iter::from_fn(|| q.pop()).map(|j| j.task_id).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn equal_keys_served_in_insertion_order() {
        let mut q = JobQueue::new();
        q.insert(job(1, 0, 12, 3), QueueKey::ByDeadline);
        q.insert(job(2, 0, 12, 3), QueueKey::ByDeadline);
        q.insert(job(3, 0, 12, 3), QueueKey::ByDeadline);

        let order: Vec<i64> = std::iter::from_fn(|| q.pop()).map(|j| j.task_id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn empty_peek_and_pop() {
        let mut q = JobQueue::new();
        assert!(q.peek().is_none());
        assert!(q.pop().is_none());
        assert!(q.is_empty());
    }

    #[test]
    fn dump_is_sorted_and_non_destructive() {
        let mut q = JobQueue::new();
        q.insert(job(20, 40, 50, 60), QueueKey::ByArrival);
        q.insert(job(1, 3, 4, 5), QueueKey::ByArrival);

        let dump = q.dump();
        assert_eq!(dump.len(), 2);
        assert_eq!(dump[0].arrival, Time(3));
        assert_eq!(dump[1].arrival, Time(40));

        // still all there, in the same order
        assert_eq!(q.len(), 2);
        assert_eq!(q.peek().unwrap().arrival, Time(3));
    }

    #[test]
    fn key_is_captured_at_insert() {
        let mut q = JobQueue::new();
        q.insert(job(1, 0, 10, 8), QueueKey::ByDeadline);
        q.insert(job(2, 0, 20, 8), QueueKey::ByDeadline);

        // mutating the head does not reorder the queue
        q.head_mut(|j| j.computation = 1).unwrap();
        assert_eq!(q.peek().unwrap().task_id, 1);
        assert_eq!(q.peek().unwrap().computation, 1);
        assert_eq!(q.pop().unwrap().task_id, 1);
        assert_eq!(q.pop().unwrap().task_id, 2);
    }
}
