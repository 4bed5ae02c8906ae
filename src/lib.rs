// Tue Jan 15 2026 - Alex

pub mod config;
pub mod engine;
pub mod utils;

pub use config::{Config, ConfigError};
pub use engine::{
    blocking_mapped, mapped, run, start_engine, try_run, Barrier, EngineContext, EngineStarter,
    FutureEvent, FutureState, ResultChannel, Task, TaskEngine, TaskError, TaskFuture,
    TaskPriority, ThreadStatus, WorkerPool,
};
