// Fri Jan 16 2026 - Alex

use crate::config::Config;
use crate::engine::scheduler::{Job, JobId, JobQueue};
use crate::engine::task::TaskPriority;
use parking_lot::{Condvar, Mutex};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const DEFAULT_EXPIRY: Duration = Duration::from_secs(30);

struct PoolState {
    queue: JobQueue,
    max_threads: usize,
    expiry: Duration,
    threads: usize,
    idle: usize,
    running: usize,
    reserved: usize,
    next_worker_id: usize,
    shutdown: bool,
}

impl PoolState {
    fn active(&self) -> usize {
        self.running + self.reserved
    }

    fn has_work(&self) -> bool {
        self.running > 0 || !self.queue.is_empty()
    }
}

struct PoolShared {
    state: Mutex<PoolState>,
    job_available: Condvar,
    all_done: Condvar,
    name_prefix: String,
    stack_size: Option<usize>,
}

// Shuts the pool down once the last user-facing handle goes away. Worker
// threads only hold `PoolShared`, so they never keep the pool open.
struct ShutdownGuard {
    shared: Arc<PoolShared>,
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        self.shared.shutdown();
    }
}

/// A bounded set of reusable threads. Cloning gives another handle to the
/// same pool.
#[derive(Clone)]
pub struct WorkerPool {
    shared: Arc<PoolShared>,
    _guard: Arc<ShutdownGuard>,
}

impl WorkerPool {
    pub fn new(max_threads: usize) -> Self {
        Self::build(max_threads, DEFAULT_EXPIRY, "engine-worker".to_string(), None)
    }

    pub fn from_config(config: &Config) -> Self {
        Self::build(
            config.max_threads,
            Duration::from_millis(config.expiry_timeout_ms),
            config.thread_name_prefix.clone(),
            config.stack_size,
        )
    }

    fn build(max_threads: usize, expiry: Duration, name_prefix: String, stack_size: Option<usize>) -> Self {
        let shared = Arc::new(PoolShared {
            state: Mutex::new(PoolState {
                queue: JobQueue::new(),
                max_threads: max_threads.max(1),
                expiry,
                threads: 0,
                idle: 0,
                running: 0,
                reserved: 0,
                next_worker_id: 0,
                shutdown: false,
            }),
            job_available: Condvar::new(),
            all_done: Condvar::new(),
            name_prefix,
            stack_size,
        });

        log::debug!("Worker pool created with up to {} threads", max_threads.max(1));

        Self {
            _guard: Arc::new(ShutdownGuard { shared: shared.clone() }),
            shared,
        }
    }

    /// Queues `job`. The job is handed back if the pool is shut down or has
    /// no thread that could ever run it.
    pub fn start(&self, job: Job, priority: TaskPriority) -> Result<JobId, Job> {
        let mut state = self.shared.state.lock();
        if state.shutdown {
            return Err(job);
        }

        let id = state.queue.push(job, priority);

        if state.queue.len() > state.idle && state.threads < state.max_threads {
            if let Err(e) = PoolShared::spawn_worker(&self.shared, &mut state) {
                log::warn!("Failed to spawn pool thread: {}", e);
                if state.threads == 0 {
                    if let Some(job) = state.queue.remove(id) {
                        return Err(job);
                    }
                }
            }
        }

        self.shared.job_available.notify_one();
        Ok(id)
    }

    /// Accepts `job` only if a thread can pick it up right away.
    pub fn try_start(&self, job: Job) -> Result<JobId, Job> {
        let mut state = self.shared.state.lock();
        if state.shutdown || state.active() + state.queue.len() >= state.max_threads {
            return Err(job);
        }

        let id = state.queue.push(job, TaskPriority::Normal);

        if state.queue.len() > state.idle && state.threads < state.max_threads {
            if let Err(e) = PoolShared::spawn_worker(&self.shared, &mut state) {
                log::warn!("Failed to spawn pool thread: {}", e);
                if let Some(job) = state.queue.remove(id) {
                    return Err(job);
                }
            }
        }

        self.shared.job_available.notify_one();
        Ok(id)
    }

    /// Takes a job back out of the queue if no thread has picked it up yet.
    pub fn steal(&self, id: JobId) -> Option<Job> {
        let job = self.shared.state.lock().queue.remove(id);
        if job.is_some() {
            log::trace!("Stole {} from the pool queue", id);
        }
        job
    }

    /// Counts the calling thread against the pool's limit until
    /// `release_thread` is called.
    pub fn reserve_thread(&self) {
        self.shared.state.lock().reserved += 1;
    }

    pub fn release_thread(&self) {
        let mut state = self.shared.state.lock();
        state.reserved = state.reserved.saturating_sub(1);
        self.shared.job_available.notify_one();
    }

    pub fn set_max_thread_count(&self, max_threads: usize) {
        let mut state = self.shared.state.lock();
        state.max_threads = max_threads.max(1);

        while !state.shutdown && state.queue.len() > state.idle && state.threads < state.max_threads {
            if let Err(e) = PoolShared::spawn_worker(&self.shared, &mut state) {
                log::warn!("Failed to spawn pool thread: {}", e);
                break;
            }
        }
        self.shared.job_available.notify_all();
    }

    pub fn max_thread_count(&self) -> usize {
        self.shared.state.lock().max_threads
    }

    /// Threads running a job plus reserved threads.
    pub fn active_thread_count(&self) -> usize {
        self.shared.state.lock().active()
    }

    /// Live threads, busy or idle.
    pub fn thread_count(&self) -> usize {
        self.shared.state.lock().threads
    }

    pub fn queued_count(&self) -> usize {
        self.shared.state.lock().queue.len()
    }

    pub fn set_expiry_timeout(&self, expiry: Duration) {
        self.shared.state.lock().expiry = expiry;
        self.shared.job_available.notify_all();
    }

    pub fn expiry_timeout(&self) -> Duration {
        self.shared.state.lock().expiry
    }

    /// Waits until the queue is empty and no job is running. Returns false
    /// on timeout.
    pub fn wait_for_done(&self, timeout: Option<Duration>) -> bool {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut state = self.shared.state.lock();

        while state.has_work() {
            match deadline {
                Some(deadline) => {
                    if self.shared.all_done.wait_until(&mut state, deadline).timed_out() {
                        return !state.has_work();
                    }
                }
                None => self.shared.all_done.wait(&mut state),
            }
        }
        true
    }

    /// Stops accepting jobs. Queued jobs still run; idle threads exit.
    pub fn shutdown(&self) {
        self.shared.shutdown();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.state.lock().shutdown
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("WorkerPool")
            .field("max_threads", &state.max_threads)
            .field("threads", &state.threads)
            .field("running", &state.running)
            .field("reserved", &state.reserved)
            .field("queued", &state.queue.len())
            .finish()
    }
}

impl PoolShared {
    fn shutdown(&self) {
        let mut state = self.state.lock();
        if !state.shutdown {
            state.shutdown = true;
            log::debug!("Worker pool shutting down ({} queued)", state.queue.len());
        }
        self.job_available.notify_all();
    }

    fn spawn_worker(shared: &Arc<PoolShared>, state: &mut PoolState) -> std::io::Result<()> {
        let id = state.next_worker_id;
        let mut builder = thread::Builder::new().name(format!("{}-{}", shared.name_prefix, id));
        if let Some(size) = shared.stack_size {
            builder = builder.stack_size(size);
        }

        let worker_shared = shared.clone();
        builder.spawn(move || PoolShared::worker_loop(worker_shared))?;

        state.next_worker_id += 1;
        state.threads += 1;
        Ok(())
    }

    fn worker_loop(shared: Arc<PoolShared>) {
        loop {
            let next = {
                let mut state = shared.state.lock();
                loop {
                    if state.active() < state.max_threads {
                        if let Some(next) = state.queue.pop() {
                            state.running += 1;
                            break Some(next);
                        }
                    }
                    if state.shutdown && state.queue.is_empty() {
                        break None;
                    }

                    state.idle += 1;
                    let expiry = state.expiry;
                    let timed_out = shared.job_available.wait_for(&mut state, expiry).timed_out();
                    state.idle -= 1;

                    if timed_out && state.queue.is_empty() {
                        log::trace!("Pool thread expired after {:?} idle", expiry);
                        break None;
                    }
                }
            };

            let next = match next {
                Some(next) => next,
                None => {
                    let mut state = shared.state.lock();
                    state.threads -= 1;
                    if !state.has_work() {
                        shared.all_done.notify_all();
                    }
                    return;
                }
            };

            let id = next.id;
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(next.job)) {
                let msg = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic payload".to_string());
                log::error!("Pool {} panicked: {}", id, msg);
            }

            let mut state = shared.state.lock();
            state.running -= 1;
            if !state.has_work() {
                shared.all_done.notify_all();
            }
            if !state.queue.is_empty() {
                shared.job_available.notify_one();
            }
        }
    }
}
