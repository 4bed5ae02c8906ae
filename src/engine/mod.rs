// Tue Jan 13 2026 - Alex

pub mod barrier;
pub mod core;
pub mod error;
pub mod future;
pub mod iterate;
pub mod result;
pub mod run;
pub mod runner;
pub mod scheduler;
pub mod task;
pub mod worker;

pub use self::core::TaskEngine;
pub use barrier::Barrier;
pub use error::TaskError;
pub use future::{FutureEvent, FutureState, ResultChannel, TaskFuture, TaskPhase};
pub use iterate::{blocking_mapped, mapped, mapped_engine, mapped_with_block_size, IterateKernel};
pub use result::ResultStore;
pub use run::{run, try_run, RunFunction};
pub use runner::{start_engine, EngineStarter, EngineStarterBuilder};
pub use scheduler::{JobId, JobQueue};
pub use task::{EngineContext, Task, TaskPriority, ThreadStatus};
pub use worker::WorkerPool;
