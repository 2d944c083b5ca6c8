//! Places each project in exactly one time bucket.

use serde::Serialize;

use crate::projects::{ProjectStatus, ProjectSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Upcoming,
    Ongoing,
    Past,
}

impl Bucket {
    /// Terminal status wins; otherwise a project is upcoming until `now`
    /// reaches `start_time`.
    ///
    /// An active project whose end time has passed stays `Ongoing` until its
    /// owner changes the on-chain status.
    pub fn classify(status: ProjectStatus, start_time: u64, now: u64) -> Self {
        if status.is_terminal() {
            Self::Past
        } else if now < start_time {
            Self::Upcoming
        } else {
            Self::Ongoing
        }
    }

    pub fn of(summary: &ProjectSummary, now: u64) -> Self {
        Self::classify(summary.status, summary.start_time, now)
    }
}

/// Records split by bucket, each keeping enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buckets<T> {
    pub upcoming: Vec<T>,
    pub ongoing: Vec<T>,
    pub past: Vec<T>,
}

impl<T> Default for Buckets<T> {
    fn default() -> Self {
        Self {
            upcoming: Vec::new(),
            ongoing: Vec::new(),
            past: Vec::new(),
        }
    }
}

impl<T> Buckets<T> {
    pub fn push(&mut self, bucket: Bucket, item: T) {
        match bucket {
            Bucket::Upcoming => self.upcoming.push(item),
            Bucket::Ongoing => self.ongoing.push(item),
            Bucket::Past => self.past.push(item),
        }
    }

    pub fn len(&self) -> usize {
        self.upcoming.len() + self.ongoing.len() + self.past.len()
    }
}

pub fn classify_all(records: Vec<ProjectSummary>, now: u64) -> Buckets<ProjectSummary> {
    let mut buckets = Buckets::default();
    for record in records {
        let bucket = Bucket::of(&record, now);
        buckets.push(bucket, record);
    }
    buckets
}
