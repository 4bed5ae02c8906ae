// Fri Jan 16 2026 - Alex

use crate::engine::core::TaskEngine;
use crate::engine::error::TaskError;
use crate::engine::future::TaskFuture;
use crate::engine::task::{EngineContext, Task, ThreadStatus};
use crate::engine::worker::WorkerPool;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Applies `map` to every input, a block of indices at a time. Results keep
/// input order: asynchronous runs report each block at its input index,
/// blocking runs collect into the kernel.
pub struct IterateKernel<I, R, F> {
    items: Vec<I>,
    map: F,
    block_size: usize,
    threads: usize,
    resolved_block_size: AtomicUsize,
    next: AtomicUsize,
    completed: AtomicUsize,
    collected: Mutex<Vec<Option<R>>>,
}

impl<I, R, F> IterateKernel<I, R, F>
where
    F: Fn(&I) -> R,
{
    pub fn new(items: Vec<I>, map: F) -> Self {
        Self {
            items,
            map,
            block_size: 0,
            threads: num_cpus::get(),
            resolved_block_size: AtomicUsize::new(1),
            next: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            collected: Mutex::new(Vec::new()),
        }
    }

    /// Fixed block size. Zero picks one from the input length and thread count.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Thread count used to pick an automatic block size. Defaults to the CPU count.
    pub fn with_thread_count(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Results gathered by a blocking run, in input order.
    pub fn take_results(&self) -> Vec<R> {
        std::mem::take(&mut *self.collected.lock())
            .into_iter()
            .flatten()
            .collect()
    }

    fn effective_block_size(&self) -> usize {
        if self.block_size > 0 {
            self.block_size
        } else {
            (self.items.len() / (self.threads * 2)).max(1)
        }
    }
}

impl<I, R, F> Task for IterateKernel<I, R, F>
where
    I: Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(&I) -> R + Send + Sync + 'static,
{
    type Output = R;

    fn start(&self, ctx: &EngineContext<R>) -> Result<(), TaskError> {
        if !ctx.is_asynchronous() {
            let mut collected = self.collected.lock();
            collected.clear();
            collected.resize_with(self.items.len(), || None);
        }
        self.resolved_block_size
            .store(self.effective_block_size(), Ordering::SeqCst);
        ctx.set_progress_range(0, i32::try_from(self.items.len()).unwrap_or(i32::MAX));
        Ok(())
    }

    fn thread_function(&self, ctx: &EngineContext<R>) -> Result<ThreadStatus, TaskError> {
        let total = self.items.len();
        let block_size = self.resolved_block_size.load(Ordering::SeqCst).max(1);

        loop {
            if ctx.is_canceled() {
                return Ok(ThreadStatus::Finished);
            }
            if self.should_throttle_thread(ctx) {
                return Ok(ThreadStatus::Continue);
            }

            let begin = self.next.fetch_add(block_size, Ordering::SeqCst);
            if begin >= total {
                return Ok(ThreadStatus::Finished);
            }
            let end = (begin + block_size).min(total);

            let values: Vec<R> = self.items[begin..end].iter().map(&self.map).collect();
            if ctx.is_asynchronous() {
                ctx.report_results(values, Some(begin));
            } else {
                let mut collected = self.collected.lock();
                for (slot, value) in collected[begin..end].iter_mut().zip(values) {
                    *slot = Some(value);
                }
            }

            let done = self.completed.fetch_add(end - begin, Ordering::SeqCst) + (end - begin);
            if done == total || ctx.is_progress_reporting_enabled() {
                ctx.set_progress_value(i32::try_from(done).unwrap_or(i32::MAX));
            }
        }
    }

    fn should_start_thread(&self, ctx: &EngineContext<R>) -> bool {
        !ctx.is_paused() && self.next.load(Ordering::SeqCst) < self.items.len()
    }
}

/// Engine for a map over `items`, ready for any start mode. Collect blocking
/// and single-threaded results with `IterateKernel::take_results`.
pub fn mapped_engine<I, R, F>(pool: &WorkerPool, items: Vec<I>, map: F, block_size: Option<usize>) -> TaskEngine<IterateKernel<I, R, F>>
where
    I: Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(&I) -> R + Send + Sync + 'static,
{
    let kernel = IterateKernel::new(items, map)
        .with_block_size(block_size.unwrap_or(0))
        .with_thread_count(pool.max_thread_count());
    TaskEngine::new(kernel, pool.clone())
}

/// Maps `items` on the pool and returns at once. Results arrive at the
/// index of their input.
pub fn mapped<I, R, F>(pool: &WorkerPool, items: Vec<I>, map: F) -> TaskFuture<R>
where
    I: Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(&I) -> R + Send + Sync + 'static,
{
    mapped_with_block_size(pool, items, map, None)
}

pub fn mapped_with_block_size<I, R, F>(pool: &WorkerPool, items: Vec<I>, map: F, block_size: Option<usize>) -> TaskFuture<R>
where
    I: Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(&I) -> R + Send + Sync + 'static,
{
    mapped_engine(pool, items, map, block_size).start_asynchronously()
}

/// Maps `items` using the calling thread and the pool, returning the results
/// in input order.
pub fn blocking_mapped<I, R, F>(pool: &WorkerPool, items: Vec<I>, map: F) -> Result<Vec<R>, TaskError>
where
    I: Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(&I) -> R + Send + Sync + 'static,
{
    mapped_engine(pool, items, map, None).start_blocking_with(|kernel| kernel.take_results())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::future::FutureEvent;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_blocking_mapped_keeps_order() {
        let pool = WorkerPool::new(4);
        let items: Vec<u64> = (0..1000).collect();
        let squares = blocking_mapped(&pool, items, |x| x * x).unwrap();
        assert_eq!(squares.len(), 1000);
        assert!(squares.iter().enumerate().all(|(i, v)| *v == (i * i) as u64));
    }

    #[test]
    fn test_async_mapped_matches_blocking() {
        let pool = WorkerPool::new(4);
        let items: Vec<u32> = (0..500).collect();

        let blocking = blocking_mapped(&pool, items.clone(), |x| x.to_string()).unwrap();
        let future = mapped(&pool, items, |x| x.to_string());

        while !future.is_finished() {
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(future.results().unwrap(), blocking);
        assert_eq!(future.progress_value(), 500);
        assert_eq!(future.progress_maximum(), 500);
    }

    #[test]
    fn test_single_threaded_engine_collects() {
        let pool = WorkerPool::new(4);
        let items: Vec<i32> = (0..50).collect();
        let out = mapped_engine(&pool, items, |x| -x, Some(7))
            .start_single_threaded_with(|kernel| kernel.take_results())
            .unwrap();
        assert_eq!(out, (0..50).map(|x| -x).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_input() {
        let pool = WorkerPool::new(2);
        let out: Vec<u8> = blocking_mapped(&pool, Vec::<u8>::new(), |x| *x).unwrap();
        assert!(out.is_empty());

        let future = mapped(&pool, Vec::<u8>::new(), |x| *x);
        assert_eq!(future.results(), Ok(vec![]));
    }

    #[test]
    fn test_cancel_stops_mapping() {
        let pool = WorkerPool::new(2);
        let items: Vec<u32> = (0..10_000).collect();
        let future = mapped_with_block_size(
            &pool,
            items,
            |x| {
                thread::sleep(Duration::from_micros(200));
                *x
            },
            Some(1),
        );

        while future.result_count() == 0 {
            thread::sleep(Duration::from_millis(1));
        }
        future.cancel();

        assert_eq!(future.wait_for_finished(), Ok(()));
        assert!(future.channel().result_slots().len() < 10_000);
    }

    #[test]
    fn test_progress_events_reach_maximum() {
        let pool = WorkerPool::new(3);
        let items: Vec<u32> = (0..200).collect();
        let future = mapped_with_block_size(&pool, items, |x| x + 1, Some(10));
        let events = future.watch();
        future.wait_for_finished().unwrap();

        let last_progress = events
            .try_iter()
            .filter_map(|e| match e {
                FutureEvent::Progress { value, .. } => Some(value),
                _ => None,
            })
            .last();
        assert_eq!(last_progress, Some(200));
    }

    #[test]
    fn test_mapping_errors_surface_as_panics() {
        let pool = WorkerPool::new(2);
        let items: Vec<u32> = (0..10).collect();
        let result = blocking_mapped(&pool, items, |x| {
            if *x == 7 {
                panic!("bad item");
            }
            *x
        });
        assert_eq!(result, Err(TaskError::Panicked("bad item".to_string())));
    }

    #[test]
    fn test_block_size_resolution() {
        let kernel = IterateKernel::new((0..100).collect::<Vec<u32>>(), |x: &u32| *x).with_thread_count(5);
        assert_eq!(kernel.effective_block_size(), 10);

        let tiny = IterateKernel::new(vec![1u32, 2], |x: &u32| *x).with_thread_count(8);
        assert_eq!(tiny.effective_block_size(), 1);

        let fixed = IterateKernel::new(vec![1u32], |x: &u32| *x)
            .with_block_size(4)
            .with_thread_count(8);
        assert_eq!(fixed.effective_block_size(), 4);
        assert_eq!(fixed.len(), 1);
    }

    #[test]
    fn test_kernel_built_directly_finishes_in_every_mode() {
        let (tx, rx) = std::sync::mpsc::channel();
        thread::spawn(move || {
            let pool = WorkerPool::new(2);
            let blocking = TaskEngine::new(IterateKernel::new(vec![1u32, 2, 3], |x| *x * 2), pool.clone())
                .start_blocking_with(|kernel| kernel.take_results());
            let single = TaskEngine::new(IterateKernel::new(vec![4u32, 5], |x| *x * 2), pool.clone())
                .start_single_threaded_with(|kernel| kernel.take_results());
            let future = TaskEngine::new(IterateKernel::new(vec![6u32], |x| *x * 2), pool)
                .start_asynchronously();
            let _ = tx.send((blocking, single, future.results()));
        });

        let (blocking, single, asynchronous) = rx
            .recv_timeout(Duration::from_secs(10))
            .expect("map over a directly built kernel did not return");
        assert_eq!(blocking, Ok(vec![2, 4, 6]));
        assert_eq!(single, Ok(vec![8, 10]));
        assert_eq!(asynchronous, Ok(vec![12]));
    }
}
