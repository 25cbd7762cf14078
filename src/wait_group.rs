//! Counting completion barrier.
//!
//! The launcher calls [`WaitGroup::add`] before starting each task, every task
//! holds a [`Done`] guard that decrements the count when dropped, and the
//! launcher blocks in [`WaitGroup::wait`] until the count is back to zero.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;

#[derive(Debug, Default)]
struct State {
    outstanding: usize,
    panicked: usize,
}

#[derive(Debug, Default)]
struct Inner {
    state: Mutex<State>,
    zero: Condvar,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Debug, Clone, Default)]
pub struct WaitGroup {
    inner: Arc<Inner>,
}

impl WaitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, count: usize) {
        self.inner.lock().outstanding += count;
    }

    /// Mark one task as finished, waking waiters when none remain.
    pub fn done(&self) {
        let mut state = self.inner.lock();
        debug_assert!(state.outstanding > 0, "done() called more times than add()");
        state.outstanding = state.outstanding.saturating_sub(1);
        if state.outstanding == 0 {
            self.inner.zero.notify_all();
        }
    }

    /// Guard that calls [`done`](Self::done) when dropped, including on unwind.
    pub fn guard(&self) -> Done {
        Done { group: self.clone() }
    }

    /// Block until every added task has called `done`.
    pub fn wait(&self) {
        let state = self.inner.lock();
        let _state = self
            .inner
            .zero
            .wait_while(state, |s| s.outstanding > 0)
            .unwrap_or_else(|poisoned| poisoned.into_inner());
    }

    pub fn outstanding(&self) -> usize {
        self.inner.lock().outstanding
    }

    /// Number of guards dropped while their thread was panicking.
    pub fn panicked(&self) -> usize {
        self.inner.lock().panicked
    }
}

#[must_use = "dropping the guard immediately marks the task done"]
pub struct Done {
    group: WaitGroup,
}

impl Drop for Done {
    fn drop(&mut self) {
        if thread::panicking() {
            self.group.inner.lock().panicked += 1;
        }
        self.group.done();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn wait_on_empty_group_returns() {
        let wg = WaitGroup::new();
        wg.wait();
        assert_eq!(wg.outstanding(), 0);
    }

    #[test]
    fn wait_blocks_until_all_done() {
        let wg = WaitGroup::new();
        let finished = Arc::new(AtomicUsize::new(0));

        for i in 0..8 {
            wg.add(1);
            let done = wg.guard();
            let finished = Arc::clone(&finished);
            thread::spawn(move || {
                let _done = done;
                thread::sleep(Duration::from_millis(5 * (i % 3)));
                finished.fetch_add(1, Ordering::SeqCst);
            });
        }

        wg.wait();
        assert_eq!(finished.load(Ordering::SeqCst), 8);
        assert_eq!(wg.outstanding(), 0);
        assert_eq!(wg.panicked(), 0);
    }

    #[test]
    fn panicking_task_still_signals() {
        let wg = WaitGroup::new();
        wg.add(2);

        let done = wg.guard();
        let bad = thread::spawn(move || {
            let _done = done;
            panic!("task failed");
        });
        let done = wg.guard();
        thread::spawn(move || drop(done));

        wg.wait();
        assert!(bad.join().is_err());
        assert_eq!(wg.panicked(), 1);
    }

    #[test]
    fn group_is_reusable() {
        let wg = WaitGroup::new();
        for _ in 0..3 {
            wg.add(1);
            wg.done();
            wg.wait();
        }
        assert_eq!(wg.outstanding(), 0);
    }
}
