// Fri Jan 16 2026 - Alex

use crate::engine::barrier::Barrier;
use crate::engine::error::{guarded, ErrorStore, TaskError};
use crate::engine::future::{ResultChannel, TaskFuture, DEFAULT_PROGRESS_INTERVAL};
use crate::engine::scheduler::Job;
use crate::engine::task::{EngineContext, Task, TaskPriority, ThreadStatus};
use crate::engine::worker::WorkerPool;
use crate::utils::logging::scoped_timer;
use std::sync::Arc;
use std::time::Duration;

/// Drives one `Task` in single-threaded, blocking or asynchronous mode.
/// Every start method consumes the engine.
pub struct TaskEngine<T: Task> {
    task: T,
    pool: WorkerPool,
    priority: TaskPriority,
    progress_interval: Duration,
}

impl<T: Task> TaskEngine<T> {
    pub fn new(task: T, pool: WorkerPool) -> Self {
        Self {
            task,
            pool,
            priority: TaskPriority::Normal,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn task(&self) -> &T {
        &self.task
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    /// Runs the task on the calling thread only.
    pub fn start_single_threaded(self) -> Result<Option<T::Output>, TaskError> {
        self.start_single_threaded_with(|task| task.result())
    }

    pub fn start_single_threaded_with<R, F>(self, extract: F) -> Result<R, TaskError>
    where
        F: FnOnce(&T) -> R,
    {
        let ctx = EngineContext::new(None);
        let task = self.task;

        guarded(|| task.start(&ctx))?;

        let outcome = guarded(|| loop {
            if task.thread_function(&ctx)? == ThreadStatus::Finished {
                return Ok(());
            }
        });
        let finished = guarded(|| task.finish(&ctx));

        outcome?;
        finished?;
        Ok(extract(&task))
    }

    /// Runs the task on the calling thread plus pool workers and returns once
    /// every worker has left.
    pub fn start_blocking(self) -> Result<Option<T::Output>, TaskError> {
        self.start_blocking_with(|task| task.result())
    }

    /// Blocking run that hands the finished task to `extract` instead of
    /// calling `Task::result`.
    pub fn start_blocking_with<R, F>(self, extract: F) -> Result<R, TaskError>
    where
        F: FnOnce(&T) -> R,
    {
        let _timer = scoped_timer("blocking task");
        Arc::new(EngineCore::new(self, None)).run_blocking(extract)
    }

    /// Starts the task on the pool and returns immediately. The last worker
    /// to leave reports the final result and releases the engine.
    pub fn start_asynchronously(self) -> TaskFuture<T::Output> {
        let channel = Arc::new(ResultChannel::with_progress_interval(self.progress_interval));

        // Must happen before any worker runs, or a fast task could finish
        // before it is marked started.
        channel.report_started();
        let future = TaskFuture::new(channel.clone());
        let core = Arc::new(EngineCore::new(self, Some(channel.clone())));

        if let Err(e) = guarded(|| core.task.start(&core.ctx)) {
            channel.report_error(e);
            channel.report_finished(None);
            return future;
        }

        core.barrier.acquire();
        match core.pool.start(core.clone().into_job(), core.priority) {
            Ok(id) => channel.set_runnable(core.pool.clone(), id),
            Err(job) => {
                log::warn!("Worker pool rejected task, running it on the calling thread");
                job();
            }
        }
        future
    }
}

struct EngineCore<T: Task> {
    task: T,
    ctx: EngineContext<T::Output>,
    pool: WorkerPool,
    priority: TaskPriority,
    barrier: Barrier,
    errors: ErrorStore,
}

impl<T: Task> EngineCore<T> {
    fn new(engine: TaskEngine<T>, channel: Option<Arc<ResultChannel<T::Output>>>) -> Self {
        Self {
            task: engine.task,
            ctx: EngineContext::new(channel),
            pool: engine.pool,
            priority: engine.priority,
            barrier: Barrier::new(),
            errors: ErrorStore::new(),
        }
    }

    // The calling thread works as the first worker. Helpers join only if the
    // pool accepts them, otherwise the caller does everything alone.
    fn run_blocking<R, F>(self: &Arc<Self>, extract: F) -> Result<R, TaskError>
    where
        F: FnOnce(&T) -> R,
    {
        guarded(|| self.task.start(&self.ctx))?;

        self.barrier.acquire();
        let throttled = match guarded(|| {
            self.start_threads();
            self.worker_loop()
        }) {
            Ok(throttled) => throttled,
            Err(e) => {
                self.handle_error(e);
                false
            }
        };
        if !throttled {
            self.barrier.release();
        }
        self.barrier.wait();

        if let Err(e) = guarded(|| self.task.finish(&self.ctx)) {
            self.handle_error(e);
        }
        if let Some(e) = self.errors.take() {
            return Err(e);
        }
        Ok(extract(&self.task))
    }

    fn into_job(self: Arc<Self>) -> Job {
        Box::new(move || self.run())
    }

    // Body of every pool job.
    fn run(self: Arc<Self>) {
        if self.ctx.is_canceled() {
            self.thread_exit();
            return;
        }

        match guarded(|| {
            self.start_threads();
            self.worker_loop()
        }) {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => self.handle_error(e),
        }
        self.thread_exit();
    }

    /// Returns true when the worker was throttled out; its barrier slot is
    /// already released in that case.
    fn worker_loop(&self) -> Result<bool, TaskError> {
        loop {
            if self.task.thread_function(&self.ctx)? == ThreadStatus::Finished {
                return Ok(false);
            }
            if self.ctx.is_canceled() {
                return Ok(false);
            }
            if !self.task.should_throttle_thread(&self.ctx) {
                continue;
            }
            if self.barrier.release_unless_last() {
                log::trace!("Worker throttled out, {} left", self.barrier.current_count().abs());
                return Ok(true);
            }
            // Last worker standing keeps going, but not while paused.
            if self.ctx.is_paused() {
                self.ctx.wait_for_resume();
                if self.ctx.is_canceled() {
                    return Ok(false);
                }
            }
        }
    }

    fn start_threads(self: &Arc<Self>) {
        while self.task.should_start_thread(&self.ctx) && self.start_thread() {}
    }

    fn start_thread(self: &Arc<Self>) -> bool {
        if self.ctx.is_canceled() {
            return false;
        }

        self.barrier.acquire();
        match self.pool.try_start(self.clone().into_job()) {
            Ok(_) => true,
            Err(_) => {
                self.barrier.release();
                false
            }
        }
    }

    fn thread_exit(&self) {
        let last = self.barrier.release() == 0;
        if last && self.ctx.is_asynchronous() {
            self.asynchronous_finish();
        }
    }

    fn handle_error(&self, e: TaskError) {
        match self.ctx.channel() {
            Some(channel) => channel.report_error(e),
            None => self.errors.set(e),
        }
    }

    fn asynchronous_finish(&self) {
        let channel = match self.ctx.channel() {
            Some(channel) => channel,
            None => return,
        };

        if let Err(e) = guarded(|| self.task.finish(&self.ctx)) {
            log::error!("Task finish failed: {}", e);
            channel.report_error(e);
        }
        let result = match guarded(|| Ok(self.task.result())) {
            Ok(result) => result,
            Err(e) => {
                log::error!("Task result failed: {}", e);
                channel.report_error(e);
                None
            }
        };

        channel.report_finished(result);
        log::debug!("Asynchronous task finished");
    }
}
