use std::fmt;
use std::ops::{Add, AddAssign, Sub};

/// An absolute point on the simulated time line, in integer ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Time(pub i64);

/// A signed span between two points on the simulated time line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub i64);

impl Time {
    pub const ZERO: Time = Time(0);

    /// Largest representable time point; used where "never" is needed.
    pub const MAX: Time = Time(i64::MAX);

    pub fn ticks(self) -> i64 {
        self.0
    }
}

impl Duration {
    pub const ZERO: Duration = Duration(0);

    pub fn ticks(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<Duration> for Time {
    type Output = Time;

    fn add(self, rhs: Duration) -> Self::Output {
        Time(self.0 + rhs.0)
    }
}

impl AddAssign<Duration> for Time {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0;
    }
}

impl Sub for Time {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration(self.0 - rhs.0)
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Self) -> Self::Output {
        Duration(self.0 + rhs.0)
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration(self.0 - rhs.0)
    }
}

/// Five-field checkpoint record of a job:
/// `(task_id, arrival, overrun_deadline, absolute_deadline, computation)`.
pub type JobRecord = (i64, i64, i64, i64, i64);

/// One released instance of a task.
///
/// All fields except the remaining `computation` are fixed at release time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub task_id: i64,
    /// Absolute time the job becomes ready.
    pub arrival: Time,
    /// Absolute time at which the job has exceeded its low-criticality
    /// budget. For jobs that cannot overrun this lies beyond their own
    /// demand and is never reached.
    pub overrun_deadline: Time,
    /// Absolute latest completion time.
    pub absolute_deadline: Time,
    /// Remaining work, in work units.
    pub computation: i64,
}

impl Job {
    pub fn new(
        task_id: i64,
        arrival: Time,
        overrun_deadline: Time,
        absolute_deadline: Time,
        computation: i64,
    ) -> Self {
        Job {
            task_id,
            arrival,
            overrun_deadline,
            absolute_deadline,
            computation,
        }
    }

    pub fn record(&self) -> JobRecord {
        (
            self.task_id,
            self.arrival.0,
            self.overrun_deadline.0,
            self.absolute_deadline.0,
            self.computation,
        )
    }

    pub fn from_record(rec: JobRecord) -> Self {
        let (task_id, arrival, overrun_deadline, absolute_deadline, computation) = rec;
        Job::new(
            task_id,
            Time(arrival),
            Time(overrun_deadline),
            Time(absolute_deadline),
            computation,
        )
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Job({}, @{}<{}<{})",
            self.task_id, self.arrival, self.computation, self.absolute_deadline
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_arithmetic() {
        let t = Time(10) + Duration(5);
        assert_eq!(t, Time(15));
        assert_eq!(t - Time(3), Duration(12));

        let mut u = Time(0);
        u += Duration(7);
        assert_eq!(u, Time(7));
    }

    #[test]
    fn job_record_round_trip() {
        let j = Job::new(19, Time(7), Time(11), Time(14), 3);
        assert_eq!(j.record(), (19, 7, 11, 14, 3));
        assert_eq!(Job::from_record(j.record()), j);
    }

    #[test]
    fn job_display() {
        let j = Job::new(1, Time(3), Time(6), Time(4), 5);
        assert_eq!(j.to_string(), "Job(1, @3<5<4)");
    }
}
