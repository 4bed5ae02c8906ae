// Fri Jan 16 2026 - Alex

use crate::engine::core::TaskEngine;
use crate::engine::error::TaskError;
use crate::engine::future::TaskFuture;
use crate::engine::task::{EngineContext, Task, ThreadStatus};
use crate::engine::worker::WorkerPool;
use parking_lot::Mutex;

/// Runs one closure on one worker. No helper threads are started.
pub struct RunFunction<F, R> {
    function: Mutex<Option<F>>,
    output: Mutex<Option<R>>,
}

impl<F, R> RunFunction<F, R>
where
    F: FnOnce() -> Result<R, TaskError>,
{
    pub fn new(function: F) -> Self {
        Self {
            function: Mutex::new(Some(function)),
            output: Mutex::new(None),
        }
    }
}

impl<F, R> Task for RunFunction<F, R>
where
    F: FnOnce() -> Result<R, TaskError> + Send + 'static,
    R: Send + 'static,
{
    type Output = R;

    fn thread_function(&self, _ctx: &EngineContext<R>) -> Result<ThreadStatus, TaskError> {
        if let Some(function) = self.function.lock().take() {
            let value = function()?;
            *self.output.lock() = Some(value);
        }
        Ok(ThreadStatus::Finished)
    }

    fn should_start_thread(&self, _ctx: &EngineContext<R>) -> bool {
        false
    }

    fn result(&self) -> Option<R> {
        self.output.lock().take()
    }
}

/// Runs `function` on the pool. The value becomes the future's single result.
pub fn run<F, R>(pool: &WorkerPool, function: F) -> TaskFuture<R>
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    try_run(pool, move || Ok(function()))
}

/// Like `run`, but an `Err` is reported to the future instead of a value.
pub fn try_run<F, R>(pool: &WorkerPool, function: F) -> TaskFuture<R>
where
    F: FnOnce() -> Result<R, TaskError> + Send + 'static,
    R: Send + 'static,
{
    TaskEngine::new(RunFunction::new(function), pool.clone()).start_asynchronously()
}
