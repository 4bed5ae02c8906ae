// Fri Jan 16 2026 - Alex

use crate::engine::error::TaskError;
use crate::engine::result::ResultStore;
use crate::engine::scheduler::JobId;
use crate::engine::worker::WorkerPool;
use bitflags::bitflags;
use parking_lot::{Condvar, Mutex};
use std::ops::Range;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_millis(40);

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FutureState: u32 {
        const STARTED = 1 << 0;
        const RUNNING = 1 << 1;
        const FINISHED = 1 << 2;
        const CANCELED = 1 << 3;
        const PAUSED = 1 << 4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskPhase {
    Created,
    Running,
    Finished,
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FutureEvent {
    Started,
    Finished,
    Canceled,
    Paused,
    Resumed,
    ProgressRange { minimum: i32, maximum: i32 },
    Progress { value: i32, text: String },
    ResultsReady { begin: usize, end: usize },
}

struct ChannelInner<T> {
    results: ResultStore<T>,
    error: Option<TaskError>,
    progress_minimum: i32,
    progress_maximum: i32,
    progress_value: i32,
    progress_text: String,
    last_progress_event: Option<Instant>,
    runnable: Option<(WorkerPool, JobId)>,
    watchers: Vec<Sender<FutureEvent>>,
}

impl<T> ChannelInner<T> {
    fn emit(&mut self, event: FutureEvent) {
        self.watchers.retain(|w| w.send(event.clone()).is_ok());
    }
}

/// Shared state between the engine that produces a task's results and the
/// `TaskFuture` handles that read them.
pub struct ResultChannel<T> {
    state: AtomicU32,
    inner: Mutex<ChannelInner<T>>,
    changed: Condvar,
    resumed: Condvar,
    progress_interval: Duration,
}

impl<T> ResultChannel<T> {
    pub fn new() -> Self {
        Self::with_progress_interval(DEFAULT_PROGRESS_INTERVAL)
    }

    pub fn with_progress_interval(progress_interval: Duration) -> Self {
        Self {
            state: AtomicU32::new(0),
            inner: Mutex::new(ChannelInner {
                results: ResultStore::new(),
                error: None,
                progress_minimum: 0,
                progress_maximum: 0,
                progress_value: 0,
                progress_text: String::new(),
                last_progress_event: None,
                runnable: None,
                watchers: Vec::new(),
            }),
            changed: Condvar::new(),
            resumed: Condvar::new(),
            progress_interval,
        }
    }

    pub fn state(&self) -> FutureState {
        FutureState::from_bits_truncate(self.state.load(Ordering::Acquire))
    }

    fn has(&self, flags: FutureState) -> bool {
        self.state().intersects(flags)
    }

    // State bits are only written with the inner lock held.
    fn switch_on(&self, flags: FutureState) {
        self.state.fetch_or(flags.bits(), Ordering::AcqRel);
    }

    fn switch_off(&self, flags: FutureState) {
        self.state.fetch_and(!flags.bits(), Ordering::AcqRel);
    }

    pub fn phase(&self) -> TaskPhase {
        let state = self.state();
        if state.contains(FutureState::CANCELED) {
            TaskPhase::Canceled
        } else if state.contains(FutureState::FINISHED) {
            TaskPhase::Finished
        } else if state.contains(FutureState::STARTED) {
            TaskPhase::Running
        } else {
            TaskPhase::Created
        }
    }

    pub fn is_started(&self) -> bool {
        self.has(FutureState::STARTED)
    }

    pub fn is_running(&self) -> bool {
        self.has(FutureState::RUNNING)
    }

    pub fn is_finished(&self) -> bool {
        self.has(FutureState::FINISHED)
    }

    pub fn is_canceled(&self) -> bool {
        self.has(FutureState::CANCELED)
    }

    pub fn is_paused(&self) -> bool {
        self.has(FutureState::PAUSED)
    }

    pub fn report_started(&self) {
        let mut inner = self.inner.lock();
        if self.has(FutureState::STARTED | FutureState::CANCELED | FutureState::FINISHED) {
            log::trace!("report_started ignored in state {:?}", self.state());
            return;
        }
        self.switch_on(FutureState::STARTED | FutureState::RUNNING);
        inner.emit(FutureEvent::Started);
    }

    /// Stores `value` at `index`, or appends it when `index` is `None`.
    pub fn report_result(&self, value: T, index: Option<usize>) {
        let mut inner = self.inner.lock();
        if self.has(FutureState::CANCELED | FutureState::FINISHED) {
            log::trace!("report_result ignored in state {:?}", self.state());
            return;
        }
        let stored = inner.results.add_result(index, value);
        inner.emit(FutureEvent::ResultsReady {
            begin: stored,
            end: stored + 1,
        });
        self.changed.notify_all();
    }

    /// Stores `values` at consecutive indices starting at `begin`.
    pub fn report_results(&self, values: Vec<T>, begin: Option<usize>) {
        if values.is_empty() {
            return;
        }
        let mut inner = self.inner.lock();
        if self.has(FutureState::CANCELED | FutureState::FINISHED) {
            log::trace!("report_results ignored in state {:?}", self.state());
            return;
        }
        let Range { start, end } = inner.results.add_results(begin, values);
        inner.emit(FutureEvent::ResultsReady { begin: start, end });
        self.changed.notify_all();
    }

    /// Keeps the first error, cancels the task and wakes every waiter.
    pub fn report_error(&self, error: TaskError) {
        let mut inner = self.inner.lock();
        if self.has(FutureState::CANCELED | FutureState::FINISHED) {
            log::debug!("Discarding task error after cancel/finish: {}", error);
            return;
        }
        log::debug!("Task error captured: {}", error);
        inner.error = Some(error);
        self.switch_off(FutureState::PAUSED);
        self.switch_on(FutureState::CANCELED);
        inner.emit(FutureEvent::Canceled);
        self.resumed.notify_all();
        self.changed.notify_all();
    }

    pub fn report_finished(&self, value: Option<T>) {
        let mut inner = self.inner.lock();
        if self.has(FutureState::FINISHED) {
            log::trace!("report_finished ignored, already finished");
            return;
        }
        if let Some(value) = value {
            if !self.has(FutureState::CANCELED) {
                let stored = inner.results.add_result(None, value);
                inner.emit(FutureEvent::ResultsReady {
                    begin: stored,
                    end: stored + 1,
                });
            }
        }
        self.switch_off(FutureState::RUNNING);
        self.switch_on(FutureState::FINISHED);
        inner.runnable = None;
        inner.emit(FutureEvent::Finished);
        self.changed.notify_all();
        self.resumed.notify_all();
    }

    /// Requests cooperative cancellation. Also wakes paused workers.
    pub fn cancel(&self) {
        let mut inner = self.inner.lock();
        if self.has(FutureState::CANCELED | FutureState::FINISHED) {
            return;
        }
        self.switch_off(FutureState::PAUSED);
        self.switch_on(FutureState::CANCELED);
        inner.emit(FutureEvent::Canceled);
        self.resumed.notify_all();
        self.changed.notify_all();
    }

    pub fn set_paused(&self, paused: bool) {
        let mut inner = self.inner.lock();
        if self.has(FutureState::CANCELED | FutureState::FINISHED) {
            return;
        }
        if paused == self.has(FutureState::PAUSED) {
            return;
        }
        if paused {
            self.switch_on(FutureState::PAUSED);
            inner.emit(FutureEvent::Paused);
        } else {
            self.switch_off(FutureState::PAUSED);
            inner.emit(FutureEvent::Resumed);
            self.resumed.notify_all();
        }
    }

    pub fn toggle_paused(&self) {
        self.set_paused(!self.is_paused());
    }

    /// Blocks while the task is paused. Returns early on cancel or finish.
    pub fn wait_for_resume(&self) {
        let mut inner = self.inner.lock();
        while self.is_paused() && !self.has(FutureState::CANCELED | FutureState::FINISHED) {
            self.resumed.wait(&mut inner);
        }
    }

    pub fn set_progress_range(&self, minimum: i32, maximum: i32) {
        let mut inner = self.inner.lock();
        inner.progress_minimum = minimum;
        inner.progress_maximum = maximum.max(minimum);
        inner.progress_value = minimum;
        let event = FutureEvent::ProgressRange {
            minimum: inner.progress_minimum,
            maximum: inner.progress_maximum,
        };
        inner.emit(event);
    }

    pub fn set_progress_value(&self, value: i32) {
        self.update_progress(value, None);
    }

    pub fn set_progress_value_and_text(&self, value: i32, text: impl Into<String>) {
        self.update_progress(value, Some(text.into()));
    }

    fn update_progress(&self, value: i32, text: Option<String>) {
        let mut inner = self.inner.lock();
        if self.has(FutureState::CANCELED | FutureState::FINISHED) {
            return;
        }
        let text_changed = text.as_ref().map_or(false, |t| *t != inner.progress_text);
        if value <= inner.progress_value && !text_changed {
            return;
        }
        inner.progress_value = inner.progress_value.max(value);
        if let Some(text) = text {
            inner.progress_text = text;
        }

        let at_maximum = inner.progress_value == inner.progress_maximum;
        let due = inner
            .last_progress_event
            .map_or(true, |last| last.elapsed() >= self.progress_interval);
        if !due && !at_maximum {
            return;
        }

        inner.last_progress_event = Some(Instant::now());
        let event = FutureEvent::Progress {
            value: inner.progress_value,
            text: inner.progress_text.clone(),
        };
        inner.emit(event);
    }

    /// True when a progress update would be delivered right now.
    pub fn is_progress_reporting_enabled(&self) -> bool {
        let inner = self.inner.lock();
        inner
            .last_progress_event
            .map_or(true, |last| last.elapsed() >= self.progress_interval)
    }

    pub fn progress_value(&self) -> i32 {
        self.inner.lock().progress_value
    }

    pub fn progress_minimum(&self) -> i32 {
        self.inner.lock().progress_minimum
    }

    pub fn progress_maximum(&self) -> i32 {
        self.inner.lock().progress_maximum
    }

    pub fn progress_text(&self) -> String {
        self.inner.lock().progress_text.clone()
    }

    pub fn error(&self) -> Option<TaskError> {
        self.inner.lock().error.clone()
    }

    pub fn result_count(&self) -> usize {
        self.inner.lock().results.count()
    }

    pub fn is_result_ready_at(&self, index: usize) -> bool {
        self.inner.lock().results.contains(index)
    }

    /// Remembers the queued pool job that drives this channel so a waiting
    /// reader can run it inline.
    pub fn set_runnable(&self, pool: WorkerPool, job: JobId) {
        let mut inner = self.inner.lock();
        if !self.is_finished() {
            inner.runnable = Some((pool, job));
        }
    }

    fn run_stolen_job(&self) {
        let runnable = self.inner.lock().runnable.take();
        if let Some((pool, id)) = runnable {
            if let Some(job) = pool.steal(id) {
                log::debug!("Running {} inline on the waiting thread", id);
                job();
            }
        }
    }

    pub fn wait_for_finished(&self) -> Result<(), TaskError> {
        self.run_stolen_job();
        let mut inner = self.inner.lock();
        while !self.is_finished() {
            self.changed.wait(&mut inner);
        }
        match &inner.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Like `wait_for_finished`, but gives up after `timeout`.
    pub fn wait_for_finished_timeout(&self, timeout: Duration) -> Option<Result<(), TaskError>> {
        let deadline = Instant::now() + timeout;
        let mut inner = self.inner.lock();
        while !self.is_finished() {
            if self.changed.wait_until(&mut inner, deadline).timed_out() && !self.is_finished() {
                return None;
            }
        }
        Some(match &inner.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        })
    }

    /// Subscribes to state changes. The current state is replayed first.
    pub fn watch(&self) -> Receiver<FutureEvent> {
        let (tx, rx) = channel();
        let mut inner = self.inner.lock();
        let state = self.state();

        let mut replay = Vec::new();
        if state.contains(FutureState::STARTED) {
            replay.push(FutureEvent::Started);
        }
        if inner.progress_maximum != inner.progress_minimum {
            replay.push(FutureEvent::ProgressRange {
                minimum: inner.progress_minimum,
                maximum: inner.progress_maximum,
            });
            replay.push(FutureEvent::Progress {
                value: inner.progress_value,
                text: inner.progress_text.clone(),
            });
        }
        if inner.results.len() > 0 {
            replay.push(FutureEvent::ResultsReady {
                begin: 0,
                end: inner.results.len(),
            });
        }
        if state.contains(FutureState::PAUSED) {
            replay.push(FutureEvent::Paused);
        }
        if state.contains(FutureState::CANCELED) {
            replay.push(FutureEvent::Canceled);
        }
        if state.contains(FutureState::FINISHED) {
            replay.push(FutureEvent::Finished);
        }

        for event in replay {
            let _ = tx.send(event);
        }
        inner.watchers.push(tx);
        rx
    }
}

impl<T: Clone> ResultChannel<T> {
    /// Blocks until a result exists at `index` or the task finishes.
    pub fn result_at(&self, index: usize) -> Result<T, TaskError> {
        self.run_stolen_job();
        let mut inner = self.inner.lock();
        while !self.is_finished() && !inner.results.contains(index) {
            self.changed.wait(&mut inner);
        }
        if let Some(err) = &inner.error {
            return Err(err.clone());
        }
        match inner.results.get(index) {
            Some(value) => Ok(value.clone()),
            None if self.is_canceled() => Err(TaskError::Canceled),
            None => Err(TaskError::MissingResult(index)),
        }
    }

    /// Waits for the task to finish and returns every stored result in index
    /// order.
    pub fn results(&self) -> Result<Vec<T>, TaskError> {
        self.wait_for_finished()?;
        Ok(self.inner.lock().results.values())
    }

    /// Non-blocking snapshot of every slot up to the highest index written.
    pub fn result_slots(&self) -> Vec<Option<T>> {
        self.inner.lock().results.slots()
    }
}

impl<T> Default for ResultChannel<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Reader-side handle to a running task. Clones share the same channel.
pub struct TaskFuture<T> {
    channel: Arc<ResultChannel<T>>,
}

impl<T> Clone for TaskFuture<T> {
    fn clone(&self) -> Self {
        Self {
            channel: self.channel.clone(),
        }
    }
}

impl<T> TaskFuture<T> {
    pub fn new(channel: Arc<ResultChannel<T>>) -> Self {
        Self { channel }
    }

    /// A future that is already finished with the given results.
    pub fn ready(values: Vec<T>) -> Self {
        let channel = Arc::new(ResultChannel::new());
        channel.report_started();
        channel.report_results(values, None);
        channel.report_finished(None);
        Self { channel }
    }

    pub fn channel(&self) -> &Arc<ResultChannel<T>> {
        &self.channel
    }

    pub fn state(&self) -> FutureState {
        self.channel.state()
    }

    pub fn phase(&self) -> TaskPhase {
        self.channel.phase()
    }

    pub fn is_started(&self) -> bool {
        self.channel.is_started()
    }

    pub fn is_running(&self) -> bool {
        self.channel.is_running()
    }

    pub fn is_finished(&self) -> bool {
        self.channel.is_finished()
    }

    pub fn is_canceled(&self) -> bool {
        self.channel.is_canceled()
    }

    pub fn is_paused(&self) -> bool {
        self.channel.is_paused()
    }

    pub fn cancel(&self) {
        self.channel.cancel();
    }

    pub fn set_paused(&self, paused: bool) {
        self.channel.set_paused(paused);
    }

    pub fn pause(&self) {
        self.channel.set_paused(true);
    }

    pub fn resume(&self) {
        self.channel.set_paused(false);
    }

    pub fn toggle_paused(&self) {
        self.channel.toggle_paused();
    }

    pub fn progress_value(&self) -> i32 {
        self.channel.progress_value()
    }

    pub fn progress_minimum(&self) -> i32 {
        self.channel.progress_minimum()
    }

    pub fn progress_maximum(&self) -> i32 {
        self.channel.progress_maximum()
    }

    pub fn progress_text(&self) -> String {
        self.channel.progress_text()
    }

    pub fn result_count(&self) -> usize {
        self.channel.result_count()
    }

    pub fn is_result_ready_at(&self, index: usize) -> bool {
        self.channel.is_result_ready_at(index)
    }

    pub fn wait_for_finished(&self) -> Result<(), TaskError> {
        self.channel.wait_for_finished()
    }

    pub fn wait_for_finished_timeout(&self, timeout: Duration) -> Option<Result<(), TaskError>> {
        self.channel.wait_for_finished_timeout(timeout)
    }

    pub fn watch(&self) -> Receiver<FutureEvent> {
        self.channel.watch()
    }
}

impl<T: Clone> TaskFuture<T> {
    pub fn result(&self) -> Result<T, TaskError> {
        self.channel.result_at(0)
    }

    pub fn result_at(&self, index: usize) -> Result<T, TaskError> {
        self.channel.result_at(index)
    }

    pub fn results(&self) -> Result<Vec<T>, TaskError> {
        self.channel.results()
    }

    pub fn result_slots(&self) -> Vec<Option<T>> {
        self.channel.result_slots()
    }
}

impl<T> std::fmt::Debug for TaskFuture<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskFuture")
            .field("state", &self.channel.state())
            .field("results", &self.channel.result_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::thread;

    fn started<T>() -> Arc<ResultChannel<T>> {
        let channel = Arc::new(ResultChannel::new());
        channel.report_started();
        channel
    }

    #[test]
    fn test_lifecycle_phases() {
        let channel: Arc<ResultChannel<u32>> = Arc::new(ResultChannel::new());
        assert_eq!(channel.phase(), TaskPhase::Created);

        channel.report_started();
        assert_eq!(channel.phase(), TaskPhase::Running);
        assert!(channel.is_running());

        channel.report_finished(Some(5));
        assert_eq!(channel.phase(), TaskPhase::Finished);
        assert!(!channel.is_running());
        assert_eq!(channel.result_at(0), Ok(5));
    }

    #[test]
    fn test_out_of_order_results() {
        let channel = started::<char>();
        channel.report_result('v', Some(2));
        channel.report_result('w', Some(0));
        channel.report_finished(None);

        let future = TaskFuture::new(channel);
        assert_eq!(future.result_slots(), vec![Some('w'), None, Some('v')]);
        assert_eq!(future.results(), Ok(vec!['w', 'v']));
        assert_eq!(future.result_at(1), Err(TaskError::MissingResult(1)));
    }

    #[test]
    fn test_writes_after_finish_are_ignored() {
        let channel = started::<u32>();
        channel.report_result(1, None);
        channel.report_finished(None);

        channel.report_result(2, None);
        channel.report_results(vec![3, 4], None);
        channel.report_error(TaskError::failed("late"));
        channel.set_progress_value(10);

        assert_eq!(channel.results(), Ok(vec![1]));
        assert_eq!(channel.error(), None);
        assert_eq!(channel.progress_value(), 0);
    }

    #[test]
    fn test_first_error_wins_and_cancels() {
        let channel = started::<u32>();
        channel.report_error(TaskError::failed("first"));
        channel.report_error(TaskError::failed("second"));
        assert!(channel.is_canceled());
        channel.report_finished(None);

        let future = TaskFuture::new(channel);
        assert_eq!(future.wait_for_finished(), Err(TaskError::failed("first")));
        assert_eq!(future.result(), Err(TaskError::failed("first")));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let channel = started::<u32>();
        let events = channel.watch();

        channel.cancel();
        channel.cancel();
        for _ in 0..10 {
            assert!(channel.is_canceled());
        }

        let canceled: Vec<_> = events
            .try_iter()
            .filter(|e| *e == FutureEvent::Canceled)
            .collect();
        assert_eq!(canceled.len(), 1);
    }

    #[test]
    fn test_canceled_result_access() {
        let channel = started::<u32>();
        channel.cancel();
        channel.report_finished(Some(3));
        assert_eq!(channel.wait_for_finished(), Ok(()));
        assert_eq!(channel.result_at(0), Err(TaskError::Canceled));
    }

    #[test]
    fn test_wait_for_resume_unblocks_on_resume() {
        let channel = started::<u32>();
        channel.set_paused(true);

        let woke = Arc::new(AtomicBool::new(false));
        let waiter = {
            let channel = channel.clone();
            let woke = woke.clone();
            thread::spawn(move || {
                channel.wait_for_resume();
                woke.store(true, Ordering::SeqCst);
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!woke.load(Ordering::SeqCst));

        channel.set_paused(false);
        waiter.join().unwrap();
        assert!(woke.load(Ordering::SeqCst));
    }

    #[test]
    fn test_cancel_wakes_paused_waiter() {
        let channel = started::<u32>();
        channel.set_paused(true);

        let waiter = {
            let channel = channel.clone();
            thread::spawn(move || channel.wait_for_resume())
        };

        thread::sleep(Duration::from_millis(20));
        channel.cancel();
        waiter.join().unwrap();
        assert!(channel.is_canceled());
        assert!(!channel.is_paused());
    }

    #[test]
    fn test_toggle_paused() {
        let channel = started::<u32>();
        channel.toggle_paused();
        assert!(channel.is_paused());
        channel.toggle_paused();
        assert!(!channel.is_paused());
    }

    #[test]
    fn test_progress_is_monotonic() {
        let channel: Arc<ResultChannel<u32>> = Arc::new(ResultChannel::with_progress_interval(Duration::ZERO));
        channel.report_started();
        channel.set_progress_range(0, 10);
        channel.set_progress_value(4);
        channel.set_progress_value(2);
        assert_eq!(channel.progress_value(), 4);

        channel.set_progress_value_and_text(4, "halfway");
        assert_eq!(channel.progress_text(), "halfway");
        assert_eq!(channel.progress_value(), 4);
    }

    #[test]
    fn test_progress_events_are_rate_limited() {
        let channel: Arc<ResultChannel<u32>> =
            Arc::new(ResultChannel::with_progress_interval(Duration::from_secs(60)));
        channel.report_started();
        channel.set_progress_range(0, 100);
        let events = channel.watch();

        assert!(channel.is_progress_reporting_enabled());
        channel.set_progress_value(1);
        assert!(!channel.is_progress_reporting_enabled());
        channel.set_progress_value(2);
        channel.set_progress_value(100);

        let values: Vec<i32> = events
            .try_iter()
            .filter_map(|e| match e {
                FutureEvent::Progress { value, .. } => Some(value),
                _ => None,
            })
            .collect();
        // replayed 0, first update, then the final value at the maximum
        assert_eq!(values, vec![0, 1, 100]);
    }

    #[test]
    fn test_watch_replays_state() {
        let channel = started::<u32>();
        channel.report_result(7, None);
        channel.report_finished(None);

        let events: Vec<_> = channel.watch().try_iter().collect();
        assert_eq!(
            events,
            vec![
                FutureEvent::Started,
                FutureEvent::ResultsReady { begin: 0, end: 1 },
                FutureEvent::Finished,
            ]
        );
    }

    #[test]
    fn test_result_at_blocks_until_reported() {
        let channel = started::<u32>();
        let producer = {
            let channel = channel.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                channel.report_result(42, Some(3));
            })
        };

        assert_eq!(channel.result_at(3), Ok(42));
        producer.join().unwrap();
        assert!(!channel.is_finished());
        channel.report_finished(None);
    }

    #[test]
    fn test_wait_for_finished_timeout() {
        let channel = started::<u32>();
        assert!(channel.wait_for_finished_timeout(Duration::from_millis(10)).is_none());
        channel.report_finished(None);
        assert_eq!(channel.wait_for_finished_timeout(Duration::from_millis(10)), Some(Ok(())));
    }

    #[test]
    fn test_ready_future() {
        let future = TaskFuture::ready(vec![1, 2, 3]);
        assert!(future.is_finished());
        assert_eq!(future.results(), Ok(vec![1, 2, 3]));
        assert_eq!(future.result_count(), 3);
    }
}
