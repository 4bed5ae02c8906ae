// Fri Jan 16 2026 - Alex

use parking_lot::Mutex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum TaskError {
    #[error("Task failed: {0}")]
    Failed(String),
    #[error("Task panicked: {0}")]
    Panicked(String),
    #[error("Task was canceled")]
    Canceled,
    #[error("No result reported at index {0}")]
    MissingResult(usize),
    #[error("{0}")]
    Custom(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskError {
    pub fn failed(msg: impl Into<String>) -> Self {
        TaskError::Failed(msg.into())
    }

    pub fn custom<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TaskError::Custom(Arc::new(err))
    }

    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let msg = if let Some(s) = payload.downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        TaskError::Panicked(msg)
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, TaskError::Canceled)
    }
}

impl PartialEq for TaskError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TaskError::Failed(a), TaskError::Failed(b)) => a == b,
            (TaskError::Panicked(a), TaskError::Panicked(b)) => a == b,
            (TaskError::Canceled, TaskError::Canceled) => true,
            (TaskError::MissingResult(a), TaskError::MissingResult(b)) => a == b,
            (TaskError::Custom(a), TaskError::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Runs `f`, turning a panic into `TaskError::Panicked`.
pub fn guarded<R, F>(f: F) -> Result<R, TaskError>
where
    F: FnOnce() -> Result<R, TaskError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(TaskError::from_panic(payload)),
    }
}

/// First-error-wins slot used when no result channel is attached.
#[derive(Debug, Default)]
pub struct ErrorStore {
    slot: Mutex<Option<TaskError>>,
}

impl ErrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, err: TaskError) {
        let mut slot = self.slot.lock();
        if slot.is_none() {
            *slot = Some(err);
        } else {
            log::debug!("Discarding secondary task error: {}", err);
        }
    }

    pub fn has_error(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn take(&self) -> Option<TaskError> {
        self.slot.lock().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guarded_captures_panic() {
        let result: Result<(), TaskError> = guarded(|| panic!("boom"));
        assert_eq!(result, Err(TaskError::Panicked("boom".to_string())));
    }

    #[test]
    fn test_guarded_passes_errors_through() {
        let result: Result<u32, TaskError> = guarded(|| Err(TaskError::failed("nope")));
        assert_eq!(result, Err(TaskError::Failed("nope".to_string())));

        let ok: Result<u32, TaskError> = guarded(|| Ok(7));
        assert_eq!(ok, Ok(7));
    }

    #[test]
    fn test_error_store_first_wins() {
        let store = ErrorStore::new();
        assert!(!store.has_error());

        store.set(TaskError::failed("first"));
        store.set(TaskError::failed("second"));

        assert_eq!(store.take(), Some(TaskError::Failed("first".to_string())));
        assert_eq!(store.take(), None);
    }

    #[test]
    fn test_custom_error_display() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let err = TaskError::custom(io);
        assert_eq!(err.to_string(), "disk gone");
    }
}
