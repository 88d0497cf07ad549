//! Request coalescing: concurrent calls for the same key share one
//! execution and one result.
//!
//! Ported from the Go original's `sync.WaitGroup`-based `call`/`Group`.
//! `wg.Done()` unblocks waiters *before* the leader re-acquires the lock to
//! delete the map entry in the original; this implementation preserves that
//! ordering by signaling completion through the `Condvar` first and only
//! then taking the map lock to remove the entry, so a waiter can in
//! principle observe the result microseconds before cleanup finishes.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

enum Outcome<T, E> {
    Pending,
    Done(Result<T, E>),
}

struct Call<T, E> {
    state: Mutex<Outcome<T, E>>,
    done: Condvar,
}

/// Coalesces concurrent calls keyed by a `String`. The first caller for a
/// given key executes `f`; every other caller for that key, arriving while
/// the first is still running, blocks and receives the same result without
/// calling `f` itself.
pub struct Group<T, E> {
    inflight: Mutex<HashMap<String, Arc<Call<T, E>>>>,
}

impl<T, E> Default for Group<T, E> {
    fn default() -> Self {
        Group {
            inflight: Mutex::new(HashMap::new()),
        }
    }
}

impl<T, E> Group<T, E>
where
    T: Clone,
    E: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` for `key`, or waits for an already-running call for the same
    /// key and shares its result.
    pub fn do_call(&self, key: &str, f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let mut inflight = self.inflight.lock();
        if let Some(call) = inflight.get(key).cloned() {
            drop(inflight);
            return Self::wait_for(&call);
        }

        let call = Arc::new(Call {
            state: Mutex::new(Outcome::Pending),
            done: Condvar::new(),
        });
        inflight.insert(key.to_string(), Arc::clone(&call));
        drop(inflight);

        let result = f();

        {
            let mut state = call.state.lock();
            *state = Outcome::Done(result.clone());
            call.done.notify_all();
        }

        let mut inflight = self.inflight.lock();
        inflight.remove(key);

        result
    }

    fn wait_for(call: &Call<T, E>) -> Result<T, E> {
        let mut state = call.state.lock();
        loop {
            match &*state {
                Outcome::Done(result) => return result.clone(),
                Outcome::Pending => call.done.wait(&mut state),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn runs_once_for_concurrent_identical_keys() {
        let group = Arc::new(Group::<i32, String>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(10));

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let group = Arc::clone(&group);
                let calls = Arc::clone(&calls);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    group.do_call("x", || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        Ok(42)
                    })
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for result in results {
            assert_eq!(result, Ok(42));
        }
    }

    #[test]
    fn a_later_call_runs_again_once_the_first_has_finished() {
        let group = Group::<i32, String>::new();
        let calls = AtomicUsize::new(0);

        let first = group.do_call("x", || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(1)
        });
        let second = group.do_call("x", || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(2)
        });

        assert_eq!(first, Ok(1));
        assert_eq!(second, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn errors_are_shared_within_one_inflight_call() {
        let group = Arc::new(Group::<i32, String>::new());
        let barrier = Arc::new(Barrier::new(2));

        let g1 = Arc::clone(&group);
        let b1 = Arc::clone(&barrier);
        let h1 = thread::spawn(move || {
            b1.wait();
            g1.do_call("x", || {
                thread::sleep(Duration::from_millis(20));
                Err::<i32, _>("boom".to_string())
            })
        });

        let g2 = Arc::clone(&group);
        let b2 = Arc::clone(&barrier);
        let h2 = thread::spawn(move || {
            b2.wait();
            thread::sleep(Duration::from_millis(5));
            g2.do_call("x", || Ok(999))
        });

        assert_eq!(h1.join().unwrap(), Err("boom".to_string()));
        assert_eq!(h2.join().unwrap(), Err("boom".to_string()));
    }
}
