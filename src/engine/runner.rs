// Fri Jan 16 2026 - Alex

use crate::config::Config;
use crate::engine::core::TaskEngine;
use crate::engine::error::TaskError;
use crate::engine::future::TaskFuture;
use crate::engine::task::{Task, TaskPriority};
use crate::engine::worker::WorkerPool;
use std::time::Duration;

/// Holds a freshly built engine until the caller picks an execution mode:
/// convert into a `TaskFuture` to run asynchronously, or call one of the
/// blocking methods to get the value directly.
pub struct EngineStarter<T: Task> {
    engine: TaskEngine<T>,
}

impl<T: Task> EngineStarter<T> {
    pub fn new(engine: TaskEngine<T>) -> Self {
        Self { engine }
    }

    pub fn start_asynchronously(self) -> TaskFuture<T::Output> {
        self.engine.start_asynchronously()
    }

    pub fn start_blocking(self) -> Result<T::Output, TaskError> {
        self.engine
            .start_blocking()?
            .ok_or(TaskError::MissingResult(0))
    }

    pub fn start_single_threaded(self) -> Result<T::Output, TaskError> {
        self.engine
            .start_single_threaded()?
            .ok_or(TaskError::MissingResult(0))
    }

    pub fn engine(&self) -> &TaskEngine<T> {
        &self.engine
    }
}

impl<T: Task<Output = ()>> EngineStarter<T> {
    /// Blocking run for tasks that produce no value.
    pub fn run_blocking(self) -> Result<(), TaskError> {
        self.engine.start_blocking_with(|_| ())
    }
}

impl<T: Task> From<EngineStarter<T>> for TaskFuture<T::Output> {
    fn from(starter: EngineStarter<T>) -> Self {
        starter.start_asynchronously()
    }
}

pub fn start_engine<T: Task>(task: T, pool: &WorkerPool) -> EngineStarter<T> {
    EngineStarter::new(TaskEngine::new(task, pool.clone()))
}

pub struct EngineStarterBuilder<T: Task> {
    task: Option<T>,
    pool: Option<WorkerPool>,
    priority: TaskPriority,
    progress_interval: Option<Duration>,
}

impl<T: Task> EngineStarterBuilder<T> {
    pub fn new() -> Self {
        Self {
            task: None,
            pool: None,
            priority: TaskPriority::Normal,
            progress_interval: None,
        }
    }

    pub fn with_task(mut self, task: T) -> Self {
        self.task = Some(task);
        self
    }

    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_config(mut self, config: &Config) -> Self {
        self.progress_interval = Some(Duration::from_millis(config.progress_interval_ms));
        self
    }

    pub fn build(self) -> Result<EngineStarter<T>, TaskError> {
        let task = self.task
            .ok_or_else(|| TaskError::failed("Task not set"))?;

        let pool = self.pool
            .ok_or_else(|| TaskError::failed("Worker pool not set"))?;

        let mut engine = TaskEngine::new(task, pool).with_priority(self.priority);
        if let Some(interval) = self.progress_interval {
            engine = engine.with_progress_interval(interval);
        }

        Ok(EngineStarter::new(engine))
    }
}

impl<T: Task> Default for EngineStarterBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::task::{EngineContext, ThreadStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Sum {
        upto: u64,
        next: AtomicUsize,
        total: AtomicUsize,
    }

    impl Sum {
        fn new(upto: u64) -> Self {
            Self {
                upto,
                next: AtomicUsize::new(1),
                total: AtomicUsize::new(0),
            }
        }
    }

    impl Task for Sum {
        type Output = u64;

        fn thread_function(&self, _ctx: &EngineContext<u64>) -> Result<ThreadStatus, TaskError> {
            let i = self.next.fetch_add(1, Ordering::SeqCst);
            if i as u64 > self.upto {
                return Ok(ThreadStatus::Finished);
            }
            self.total.fetch_add(i, Ordering::SeqCst);
            Ok(ThreadStatus::Continue)
        }

        fn result(&self) -> Option<u64> {
            Some(self.total.load(Ordering::SeqCst) as u64)
        }
    }

    struct Touch {
        hits: Arc<AtomicUsize>,
    }

    impl Task for Touch {
        type Output = ();

        fn should_start_thread(&self, _ctx: &EngineContext<()>) -> bool {
            false
        }

        fn thread_function(&self, _ctx: &EngineContext<()>) -> Result<ThreadStatus, TaskError> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            Ok(ThreadStatus::Finished)
        }
    }

    struct Silent;

    impl Task for Silent {
        type Output = u32;

        fn thread_function(&self, _ctx: &EngineContext<u32>) -> Result<ThreadStatus, TaskError> {
            Ok(ThreadStatus::Finished)
        }
    }

    #[test]
    fn test_starter_blocking_returns_value() {
        let pool = WorkerPool::new(4);
        assert_eq!(start_engine(Sum::new(100), &pool).start_blocking(), Ok(5050));
        assert_eq!(start_engine(Sum::new(100), &pool).start_single_threaded(), Ok(5050));
    }

    #[test]
    fn test_starter_converts_into_future() {
        let pool = WorkerPool::new(4);
        let future: TaskFuture<u64> = start_engine(Sum::new(100), &pool).into();
        assert_eq!(future.result(), Ok(5050));
        assert!(future.is_finished());
    }

    #[test]
    fn test_unit_starter_runs_blocking() {
        let pool = WorkerPool::new(2);
        let hits = Arc::new(AtomicUsize::new(0));
        let starter = start_engine(Touch { hits: hits.clone() }, &pool);
        assert_eq!(starter.run_blocking(), Ok(()));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_missing_result_is_an_error() {
        let pool = WorkerPool::new(1);
        assert_eq!(
            start_engine(Silent, &pool).start_blocking(),
            Err(TaskError::MissingResult(0))
        );
    }

    #[test]
    fn test_builder_requires_task_and_pool() {
        let missing_pool = EngineStarterBuilder::new().with_task(Silent).build();
        assert!(missing_pool.is_err());

        let missing_task: Result<EngineStarter<Silent>, _> =
            EngineStarterBuilder::new().with_pool(WorkerPool::new(1)).build();
        assert!(missing_task.is_err());

        let starter = EngineStarterBuilder::new()
            .with_task(Sum::new(10))
            .with_pool(WorkerPool::new(2))
            .with_priority(TaskPriority::High)
            .with_config(&Config::default())
            .build()
            .unwrap();
        assert_eq!(starter.engine().priority(), TaskPriority::High);
        assert_eq!(starter.start_blocking(), Ok(55));
    }
}
