// Fri Jan 16 2026 - Alex

use crate::engine::task::TaskPriority;
use std::collections::BinaryHeap;
use std::fmt;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job#{}", self.0)
    }
}

pub struct PrioritizedJob {
    pub id: JobId,
    pub priority: TaskPriority,
    pub job: Job,
}

impl PartialEq for PrioritizedJob {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.id == other.id
    }
}

impl Eq for PrioritizedJob {}

impl PartialOrd for PrioritizedJob {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PrioritizedJob {
    // Max-heap: higher priority first, then the older (smaller) id.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.id.cmp(&self.id))
    }
}

pub struct JobQueue {
    heap: BinaryHeap<PrioritizedJob>,
    next_id: u64,
}

impl JobQueue {
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_id: 1,
        }
    }

    pub fn push(&mut self, job: Job, priority: TaskPriority) -> JobId {
        let id = JobId(self.next_id);
        self.next_id += 1;
        self.heap.push(PrioritizedJob { id, priority, job });
        id
    }

    pub fn pop(&mut self) -> Option<PrioritizedJob> {
        self.heap.pop()
    }

    /// Removes a job that has not been picked up yet.
    pub fn remove(&mut self, id: JobId) -> Option<Job> {
        if !self.heap.iter().any(|j| j.id == id) {
            return None;
        }

        let mut jobs = std::mem::take(&mut self.heap).into_vec();
        let pos = jobs.iter().position(|j| j.id == id)?;
        let removed = jobs.swap_remove(pos);
        self.heap = BinaryHeap::from(jobs);
        Some(removed.job)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}
