// Fri Jan 16 2026 - Alex

use crate::engine::error::TaskError;
use crate::engine::future::ResultChannel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// What a worker wants after one call to `Task::thread_function`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadStatus {
    /// Call again. The engine may throttle the worker here.
    Continue,
    /// This worker is done.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskPriority {
    Low = 0,
    Normal = 1,
    High = 2,
    Critical = 3,
}

impl Default for TaskPriority {
    fn default() -> Self {
        TaskPriority::Normal
    }
}

/// A user algorithm driven by a `TaskEngine`.
///
/// `thread_function` is called concurrently from every worker, so state
/// shared between calls needs interior mutability. `start` runs once before
/// any worker, `finish` once after the last worker has left.
pub trait Task: Send + Sync + 'static {
    type Output: Send + 'static;

    fn start(&self, ctx: &EngineContext<Self::Output>) -> Result<(), TaskError> {
        let _ = ctx;
        Ok(())
    }

    fn finish(&self, ctx: &EngineContext<Self::Output>) -> Result<(), TaskError> {
        let _ = ctx;
        Ok(())
    }

    fn thread_function(&self, ctx: &EngineContext<Self::Output>) -> Result<ThreadStatus, TaskError>;

    fn should_start_thread(&self, ctx: &EngineContext<Self::Output>) -> bool {
        !ctx.is_paused()
    }

    fn should_throttle_thread(&self, ctx: &EngineContext<Self::Output>) -> bool {
        ctx.is_paused()
    }

    /// Final value, taken after `finish`.
    fn result(&self) -> Option<Self::Output> {
        None
    }
}

/// What a task sees of the engine running it. Without a result channel
/// (single-threaded and blocking runs) reports are dropped and the task is
/// never paused or canceled.
pub struct EngineContext<T> {
    channel: Option<Arc<ResultChannel<T>>>,
}

impl<T> EngineContext<T> {
    pub(crate) fn new(channel: Option<Arc<ResultChannel<T>>>) -> Self {
        Self { channel }
    }

    pub fn detached() -> Self {
        Self { channel: None }
    }

    pub fn channel(&self) -> Option<&Arc<ResultChannel<T>>> {
        self.channel.as_ref()
    }

    pub fn is_asynchronous(&self) -> bool {
        self.channel.is_some()
    }

    pub fn is_canceled(&self) -> bool {
        self.channel.as_ref().map_or(false, |c| c.is_canceled())
    }

    pub fn is_paused(&self) -> bool {
        self.channel.as_ref().map_or(false, |c| c.is_paused())
    }

    pub fn wait_for_resume(&self) {
        if let Some(channel) = &self.channel {
            channel.wait_for_resume();
        }
    }

    pub fn is_progress_reporting_enabled(&self) -> bool {
        self.channel
            .as_ref()
            .map_or(false, |c| c.is_progress_reporting_enabled())
    }

    pub fn set_progress_range(&self, minimum: i32, maximum: i32) {
        if let Some(channel) = &self.channel {
            channel.set_progress_range(minimum, maximum);
        }
    }

    pub fn set_progress_value(&self, value: i32) {
        if let Some(channel) = &self.channel {
            channel.set_progress_value(value);
        }
    }

    pub fn set_progress_value_and_text(&self, value: i32, text: &str) {
        if let Some(channel) = &self.channel {
            channel.set_progress_value_and_text(value, text);
        }
    }

    pub fn report_result(&self, value: T, index: Option<usize>) {
        if let Some(channel) = &self.channel {
            channel.report_result(value, index);
        }
    }

    pub fn report_results(&self, values: Vec<T>, begin: Option<usize>) {
        if let Some(channel) = &self.channel {
            channel.report_results(values, begin);
        }
    }
}
